use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::MiningError;

/// Shared flag that asks a running nonce search to stop.
///
/// Clones observe the same flag; once triggered it stays set.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Stop conditions for `Block::mine`.
#[derive(Debug, Clone, Default)]
pub struct MiningLimits {
    pub max_attempts: Option<u64>,
    pub cancel: Option<CancelFlag>,
}

impl MiningLimits {
    /// Search until a nonce is found.
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_max_attempts(max_attempts: u64) -> Self {
        Self {
            max_attempts: Some(max_attempts),
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Called after each failed attempt.
    pub(crate) fn check(&self, attempts: u64) -> Result<(), MiningError> {
        if let Some(cancel) = &self.cancel {
            if cancel.is_triggered() {
                return Err(MiningError::Cancelled { attempts });
            }
        }
        match self.max_attempts {
            Some(max) if attempts >= max => Err(MiningError::Exhausted { attempts }),
            _ => Ok(()),
        }
    }
}
