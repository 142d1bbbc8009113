//! Caller identity.
//!
//! Accounts live in an external user service. This module only turns the
//! bearer token on a request into a [`Caller`]: either a static token table
//! (local runs and tests) or the remote service behind a short-lived cache.

mod cache;
mod client;
mod error;
mod tokens;

use std::future::Future;

pub use cache::{CachedIdentity, IdentityCacheConfig};
pub use client::{IdentityClient, IdentityClientConfig};
pub use error::IdentityError;
pub use tokens::{InvalidTokenList, StaticTokens};

/// An authenticated user as reported by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identity {
    pub user_id: i64,
    /// Staff users may modify the catalog.
    pub is_staff: bool,
}

/// Who is making a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller {
    Anonymous,
    Authenticated(Identity),
}

impl From<Option<Identity>> for Caller {
    fn from(identity: Option<Identity>) -> Self {
        identity.map_or(Caller::Anonymous, Caller::Authenticated)
    }
}

/// Resolves bearer tokens to identities.
///
/// `Ok(None)` means the token is unknown or revoked; errors are reserved
/// for the provider itself failing.
pub trait IdentityProvider {
    fn resolve(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Option<Identity>, IdentityError>> + Send;
}

/// The configured identity source.
pub enum Authenticator {
    Static(StaticTokens),
    Remote(CachedIdentity<IdentityClient>),
}

impl Authenticator {
    /// Resolve the caller from an `Authorization` header value.
    ///
    /// No header, another scheme or an unknown token all give
    /// [`Caller::Anonymous`].
    pub async fn caller(&self, authorization: Option<&str>) -> Result<Caller, IdentityError> {
        let Some(token) = authorization.and_then(bearer_token) else {
            return Ok(Caller::Anonymous);
        };

        let identity = match self {
            Authenticator::Static(tokens) => tokens.resolve(token).await?,
            Authenticator::Remote(remote) => remote.resolve(token).await?,
        };
        Ok(identity.into())
    }
}

/// Extract the token from a `Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
