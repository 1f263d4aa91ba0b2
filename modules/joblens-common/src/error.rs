use thiserror::Error;

/// Failure taxonomy for everything that crosses the network boundary.
///
/// `AuthExpired` is special: the gateway resolves it transparently (refresh and
/// replay) where possible, and only a failed refresh escalates it to terminal.
/// Everything else surfaces as-is. `Clone` so the error surface can hand copies
/// to the display layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("network error: {0}")]
    Network(String),

    #[error("authentication expired")]
    AuthExpired,

    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("invalid server payload: {0}")]
    Validation(String),
}

impl SyncError {
    pub fn is_auth(&self) -> bool {
        matches!(self, SyncError::AuthExpired)
    }
}
