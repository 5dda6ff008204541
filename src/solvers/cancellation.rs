use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// A flag used to cancel a solving operation from another thread.
///
/// Cancellation is cooperative: the solver checks the flag between compilation and solving,
/// and between successive solver calls.
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    /// Requests the cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst)
    }

    /// Returns `true` iff the cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clears the flag.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_flag() {
        let flag = CancellationFlag::default();
        let other = flag.clone();
        assert!(!flag.is_cancelled());
        std::thread::spawn(move || other.cancel()).join().unwrap();
        assert!(flag.is_cancelled());
        flag.reset();
        assert!(!flag.is_cancelled());
    }
}
