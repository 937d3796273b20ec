//! Cooperative cancellation.
//!
//! The extractor polls a [`Cancellation`] at fixed checkpoints: on entry,
//! before binding content, before every field read and before every list
//! node. Nothing is interrupted; a set signal is noticed at the next
//! checkpoint and the whole call fails with [`Error::Cancelled`](crate::Error::Cancelled).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A signal the extractor polls between steps.
pub trait Cancellation {
    /// Returns true once the caller no longer wants results.
    fn is_cancelled(&self) -> bool;
}

/// A signal that never fires.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancel;

impl Cancellation for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// `true` means cancelled.
impl Cancellation for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::SeqCst)
    }
}

impl<T: Cancellation + ?Sized> Cancellation for &T {
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

impl<T: Cancellation + ?Sized> Cancellation for Arc<T> {
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

/// Adapts a "still active" predicate: cancelled once it returns false.
///
/// # Example
///
/// ```rust
/// use rs_booklist::cancel::{Cancellation, Liveness};
///
/// let active = Liveness(|| false);
/// assert!(active.is_cancelled());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Liveness<F>(pub F);

impl<F: Fn() -> bool> Cancellation for Liveness<F> {
    fn is_cancelled(&self) -> bool {
        !(self.0)()
    }
}
