//! Cooperative cancellation.
//!
//! A run checks its [`CancelSignal`] between stages and periodically inside
//! the terracer loop. Either of its two sources (the generator that owns the
//! run, or the caller of one request) aborts it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::TerrainError;
use crate::pipeline::Stage;

/// Shared cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Combined cancellation sources for one run.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    owner: Option<CancelToken>,
    request: Option<CancelToken>,
}

impl CancelSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        Self::default()
    }

    /// Cancelled when either the owner or the request token is.
    pub fn new(owner: CancelToken, request: Option<CancelToken>) -> Self {
        Self {
            owner: Some(owner),
            request,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.owner.iter().chain(self.request.iter()).any(CancelToken::is_cancelled)
    }

    /// Fail with [`TerrainError::Cancelled`] if either source fired.
    pub fn check(&self, stage: Stage) -> Result<(), TerrainError> {
        if self.is_cancelled() {
            Err(TerrainError::Cancelled { stage })
        } else {
            Ok(())
        }
    }
}

impl From<CancelToken> for CancelSignal {
    fn from(token: CancelToken) -> Self {
        Self {
            owner: None,
            request: Some(token),
        }
    }
}
