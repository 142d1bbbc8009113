//! Server configuration.

use std::net::SocketAddr;

use tracing::{info, warn};

use crate::identity::{
    Authenticator, CachedIdentity, IdentityCacheConfig, IdentityClient, IdentityClientConfig,
    IdentityError, InvalidTokenList, StaticTokens,
};

const ENV_BIND: &str = "TRAIN_STATION_BIND";
const ENV_DATABASE_URL: &str = "TRAIN_STATION_DATABASE_URL";
const ENV_MAX_CONNECTIONS: &str = "TRAIN_STATION_MAX_CONNECTIONS";
const ENV_IDENTITY_URL: &str = "TRAIN_STATION_IDENTITY_URL";
const ENV_TOKENS: &str = "TRAIN_STATION_TOKENS";

/// Errors from reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var}: {message}")]
    Invalid { var: &'static str, message: String },

    #[error("TRAIN_STATION_TOKENS: {0}")]
    Tokens(#[from] InvalidTokenList),
}

/// Where caller identities come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityConfig {
    /// Fixed token table.
    Static(StaticTokens),
    /// External user service behind a cache.
    Remote {
        client: IdentityClientConfig,
        cache: IdentityCacheConfig,
    },
}

impl IdentityConfig {
    /// Build the authenticator this configuration describes.
    pub fn authenticator(&self) -> Result<Authenticator, IdentityError> {
        match self {
            IdentityConfig::Static(tokens) => {
                if tokens.is_empty() {
                    warn!("no tokens configured; every request is anonymous");
                } else {
                    info!(tokens = tokens.len(), "using static token table");
                }
                Ok(Authenticator::Static(tokens.clone()))
            }
            IdentityConfig::Remote { client, cache } => {
                info!(base_url = %client.base_url, "using remote identity service");
                let client = IdentityClient::new(client.clone())?;
                Ok(Authenticator::Remote(CachedIdentity::new(client, cache)))
            }
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        IdentityConfig::Static(StaticTokens::new())
    }
}

/// Configuration for the HTTP server and its collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind_addr: SocketAddr,

    /// sqlx connection URL for the SQLite database.
    pub database_url: String,

    /// Maximum pooled database connections.
    pub max_connections: u32,

    pub identity: IdentityConfig,
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    pub fn with_database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = url.into();
        self
    }

    pub fn with_max_connections(mut self, n: u32) -> Self {
        self.max_connections = n;
        self
    }

    pub fn with_identity(mut self, identity: IdentityConfig) -> Self {
        self.identity = identity;
        self
    }

    /// Read configuration from `TRAIN_STATION_*` environment variables.
    ///
    /// Unset variables keep their defaults. When both an identity URL and
    /// a token table are set, the identity URL wins.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(bind) = lookup(ENV_BIND) {
            config.bind_addr = bind.parse().map_err(|e| ConfigError::Invalid {
                var: ENV_BIND,
                message: format!("{e}"),
            })?;
        }

        if let Some(url) = lookup(ENV_DATABASE_URL) {
            config.database_url = url;
        }

        if let Some(n) = lookup(ENV_MAX_CONNECTIONS) {
            config.max_connections = match n.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: ENV_MAX_CONNECTIONS,
                        message: format!("expected a positive integer, got {n:?}"),
                    });
                }
            };
        }

        if let Some(url) = lookup(ENV_IDENTITY_URL).filter(|u| !u.trim().is_empty()) {
            config.identity = IdentityConfig::Remote {
                client: IdentityClientConfig::new().with_base_url(url),
                cache: IdentityCacheConfig::default(),
            };
        } else if let Some(tokens) = lookup(ENV_TOKENS) {
            config.identity = IdentityConfig::Static(StaticTokens::parse(&tokens)?);
        }

        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            database_url: "sqlite://train_station.db".to_string(),
            max_connections: 5,
            identity: IdentityConfig::default(),
        }
    }
}
