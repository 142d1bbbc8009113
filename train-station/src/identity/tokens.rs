//! Static token table.

use std::collections::HashMap;

use super::{Identity, IdentityError, IdentityProvider};

/// Error returned when parsing a malformed token list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid token entry {entry:?}: {reason}")]
pub struct InvalidTokenList {
    entry: String,
    reason: &'static str,
}

/// Fixed token → identity table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticTokens {
    tokens: HashMap<String, Identity>,
}

impl StaticTokens {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a token.
    pub fn with(mut self, token: impl Into<String>, identity: Identity) -> Self {
        self.tokens.insert(token.into(), identity);
        self
    }

    /// Parse `token:user_id[:admin]` entries separated by commas.
    pub fn parse(list: &str) -> Result<Self, InvalidTokenList> {
        let mut tokens = Self::new();
        for entry in list.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let invalid = |reason| InvalidTokenList {
                entry: entry.to_string(),
                reason,
            };

            let mut parts = entry.split(':');
            let token = parts.next().filter(|t| !t.is_empty()).ok_or_else(|| invalid("empty token"))?;
            let user_id = parts
                .next()
                .and_then(|id| id.parse::<i64>().ok())
                .ok_or_else(|| invalid("user id must be an integer"))?;
            let is_staff = match parts.next() {
                None => false,
                Some("admin") => true,
                Some(_) => return Err(invalid("role must be `admin` or omitted")),
            };
            if parts.next().is_some() {
                return Err(invalid("too many fields"));
            }

            tokens = tokens.with(token, Identity { user_id, is_staff });
        }
        Ok(tokens)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl IdentityProvider for StaticTokens {
    async fn resolve(&self, token: &str) -> Result<Option<Identity>, IdentityError> {
        Ok(self.tokens.get(token).copied())
    }
}
