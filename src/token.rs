//! Single-use cancellation tokens.
//!
//! Every effect execution owns one token. The scheduler keeps a clone so it
//! can cancel the execution; primitives poll it at every suspension point.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Marker returned by primitives when their token was canceled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Canceled;

/// Result of a cancellable step
pub type Step = Result<(), Canceled>;

#[derive(Debug)]
struct TokenState {
    canceled: AtomicBool,
    generation: u64,
}

/// Cancellation signal shared between one effect task and the scheduler.
///
/// Transitions live -> canceled exactly once and never back.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    state: Arc<TokenState>,
}

impl CancellationToken {
    /// Create a live token outside the scheduler (generation 0)
    pub fn new() -> Self {
        Self::with_generation(0)
    }

    pub(crate) fn with_generation(generation: u64) -> Self {
        Self {
            state: Arc::new(TokenState {
                canceled: AtomicBool::new(false),
                generation,
            }),
        }
    }

    /// Cancel the token.
    ///
    /// Returns `true` only for the call that performed the transition.
    pub fn cancel(&self) -> bool {
        !self.state.canceled.swap(true, Ordering::AcqRel)
    }

    pub fn is_canceled(&self) -> bool {
        self.state.canceled.load(Ordering::Acquire)
    }

    /// Generation of the execution this token belongs to
    pub fn generation(&self) -> u64 {
        self.state.generation
    }

    /// `Err(Canceled)` once the token has been canceled
    pub fn check(&self) -> Step {
        if self.is_canceled() {
            Err(Canceled)
        } else {
            Ok(())
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}
