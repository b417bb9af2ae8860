//! Identity provider seam. The gate only needs one operation: exchange an
//! opaque token for an identity. Implementations must not log token material.

pub mod firebase;

pub use firebase::FirebaseProvider;

use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;

/// Identity returned by a successful exchange.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    pub email: Option<String>,
}

impl Identity {
    #[must_use]
    pub fn new(uid: impl Into<String>, email: Option<String>) -> Self {
        Self {
            uid: uid.into(),
            email,
        }
    }

    /// Email when known, otherwise the subject id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.email.as_deref().unwrap_or(&self.uid)
    }
}

/// Why an exchange failed. Only used for diagnostics; the gate collapses
/// every variant into a single denial reason.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("token rejected: {0}")]
    Rejected(String),
    #[error("provider unavailable: {0}")]
    Unavailable(String),
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

pub trait IdentityProvider: Send + Sync {
    /// Exchange a credential token for the identity it represents.
    fn exchange(&self, token: &str) -> impl Future<Output = Result<Identity, ProviderError>> + Send;
}

impl<P: IdentityProvider> IdentityProvider for std::sync::Arc<P> {
    fn exchange(&self, token: &str) -> impl Future<Output = Result<Identity, ProviderError>> + Send {
        (**self).exchange(token)
    }
}
