use std::sync::Mutex;

use tracing::error;

use joblens_common::SyncError;

/// Single place terminal errors land.
///
/// Holds the most recent failure for the display layer. Fetch starts clear
/// it; a new failure overwrites whatever was there.
#[derive(Default)]
pub struct ErrorSurface {
    latest: Mutex<Option<SyncError>>,
}

impl ErrorSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&self, err: SyncError) {
        error!(error = %err, "terminal error surfaced");
        *self.latest.lock().unwrap() = Some(err);
    }

    pub fn current(&self) -> Option<SyncError> {
        self.latest.lock().unwrap().clone()
    }

    /// Take the error, leaving the surface clear (dismiss affordance).
    pub fn take(&self) -> Option<SyncError> {
        self.latest.lock().unwrap().take()
    }

    pub fn clear(&self) {
        *self.latest.lock().unwrap() = None;
    }
}
