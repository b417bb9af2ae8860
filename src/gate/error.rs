use thiserror::Error;

/// Reasons a page load is denied. All three are final for the page load and
/// are shown to the user only through their display string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GateError {
    #[error("Invalid referrer or source")]
    OriginRejected,
    #[error("No authentication token provided")]
    TokenMissing,
    #[error("Invalid authentication token")]
    TokenInvalid,
}
