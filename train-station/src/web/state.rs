//! Application state for the web layer.

use std::sync::Arc;

use crate::identity::Authenticator;
use crate::store::Store;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database handle (cheap to clone, pooled)
    pub store: Store,

    /// Resolves bearer tokens to callers
    pub auth: Arc<Authenticator>,
}

impl AppState {
    pub fn new(store: Store, auth: Authenticator) -> Self {
        Self {
            store,
            auth: Arc::new(auth),
        }
    }
}
