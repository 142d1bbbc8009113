//! Identity provider error types.

/// Errors from resolving a token against the identity provider.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned an unexpected status
    #[error("identity API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to parse the provider's response
    #[error("JSON parse error: {message}")]
    Json { message: String },
}
