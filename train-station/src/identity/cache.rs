//! Caching layer for identity lookups.
//!
//! Every request carrying a token would otherwise cost a round trip to the
//! user service. Lookups, including negative ones, are kept for a short TTL
//! so a revoked token stops working within that window.

use std::time::Duration;

use moka::future::Cache as MokaCache;

use super::{Identity, IdentityError, IdentityProvider};

/// Configuration for the identity cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityCacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached tokens.
    pub max_capacity: u64,
}

impl Default for IdentityCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            max_capacity: 10_000,
        }
    }
}

/// An identity provider with a token cache in front.
///
/// Provider errors are not cached.
pub struct CachedIdentity<P> {
    inner: P,
    tokens: MokaCache<String, Option<Identity>>,
}

impl<P> CachedIdentity<P> {
    pub fn new(inner: P, config: &IdentityCacheConfig) -> Self {
        let tokens = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { inner, tokens }
    }
}

impl<P> IdentityProvider for CachedIdentity<P>
where
    P: IdentityProvider + Sync,
{
    async fn resolve(&self, token: &str) -> Result<Option<Identity>, IdentityError> {
        if let Some(hit) = self.tokens.get(token).await {
            tracing::trace!("identity cache hit");
            return Ok(hit);
        }

        let resolved = self.inner.resolve(token).await?;
        self.tokens.insert(token.to_string(), resolved).await;
        Ok(resolved)
    }
}
