//! Batch progress reporting.

/// Progress update emitted once per finished item of a migration batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchProgress {
    /// Meeting whose transfer just finished.
    pub meeting_id: String,
    /// Whether the transfer call for this meeting succeeded.
    pub succeeded: bool,
    /// Items finished so far, including this one.
    pub completed: u64,
    /// Items in the batch.
    pub total: u64,
}

/// Callback receiving batch progress.
pub trait ProgressCallback: Send + Sync {
    /// Called after each item finishes.
    ///
    /// # Arguments
    /// * `progress` - Progress of the running batch
    ///
    /// # Returns
    /// - `true` to keep scheduling items
    /// - `false` to stop; items not yet started are reported as cancelled
    fn on_progress(&self, progress: &BatchProgress) -> bool;
}

/// A progress callback that wraps a closure.
pub struct FnProgress<F> {
    callback: F,
}

impl<F> ProgressCallback for FnProgress<F>
where
    F: Fn(&BatchProgress) -> bool + Send + Sync,
{
    fn on_progress(&self, progress: &BatchProgress) -> bool {
        (self.callback)(progress)
    }
}

/// Create a progress callback from a closure.
///
/// # Arguments
/// * `f` - Closure that receives progress and returns whether to continue
pub fn progress_fn<F>(f: F) -> FnProgress<F>
where
    F: Fn(&BatchProgress) -> bool + Send + Sync,
{
    FnProgress { callback: f }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    fn update(completed: u64) -> BatchProgress {
        BatchProgress {
            meeting_id: format!("m{}", completed),
            succeeded: true,
            completed,
            total: 3,
        }
    }

    #[test]
    fn test_fn_progress_can_stop_batch() {
        let callback = progress_fn(|p: &BatchProgress| p.completed < 2);
        assert!(callback.on_progress(&update(1)));
        assert!(!callback.on_progress(&update(2)));
    }

    #[test]
    fn test_fn_progress_captures_state() {
        let seen: Arc<AtomicU64> = Arc::new(AtomicU64::new(0));
        let seen_clone: Arc<AtomicU64> = seen.clone();

        let callback = progress_fn(move |p: &BatchProgress| {
            seen_clone.store(p.completed, Ordering::SeqCst);
            true
        });

        callback.on_progress(&update(1));
        callback.on_progress(&update(3));

        assert_eq!(seen.load(Ordering::SeqCst), 3);
    }
}
