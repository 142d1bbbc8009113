//! User service client.

use serde::Deserialize;

use super::{Identity, IdentityError, IdentityProvider};

/// Default base URL for the user service.
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api/users";

/// Body of `GET {base_url}/me`.
#[derive(Debug, Deserialize)]
struct MeResponse {
    id: i64,
    #[serde(default)]
    is_staff: bool,
}

/// Configuration for the user service client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityClientConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl IdentityClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for IdentityClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 5,
        }
    }
}

/// Client for the external user service.
#[derive(Debug, Clone)]
pub struct IdentityClient {
    http: reqwest::Client,
    base_url: String,
}

impl IdentityClient {
    pub fn new(config: IdentityClientConfig) -> Result<Self, IdentityError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }
}

impl IdentityProvider for IdentityClient {
    async fn resolve(&self, token: &str) -> Result<Option<Identity>, IdentityError> {
        let url = format!("{}/me", self.base_url);

        let response = self.http.get(&url).bearer_auth(token).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Ok(None);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IdentityError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        let me: MeResponse = serde_json::from_str(&body).map_err(|e| IdentityError::Json {
            message: e.to_string(),
        })?;

        Ok(Some(Identity {
            user_id: me.id,
            is_staff: me.is_staff,
        }))
    }
}
