use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Runs the most recently scheduled task once input has been quiet for
/// `delay`. Scheduling again aborts whatever is still pending, so at most one
/// task per debouncer is ever waiting or running.
///
/// Must be used from inside a tokio runtime.
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn schedule<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        }));
    }

    /// Abort the pending task. Returns true if one was still outstanding.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn only_last_task_runs() {
        let fired = Arc::new(AtomicUsize::new(0));
        let last = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new(Duration::from_millis(300));

        for n in 1..=3 {
            let fired = fired.clone();
            let last = last.clone();
            debouncer.schedule(async move {
                fired.fetch_add(1, Ordering::SeqCst);
                last.store(n, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(last.load(Ordering::SeqCst), 3);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn spaced_inputs_each_fire() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new(Duration::from_millis(300));

        for _ in 0..2 {
            let fired = fired.clone();
            debouncer.schedule(async move {
                fired.fetch_add(1, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(350)).await;
        }

        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_and_drop_abort_pending() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new(Duration::from_millis(300));

        let f = fired.clone();
        debouncer.schedule(async move {
            f.fetch_add(1, Ordering::SeqCst);
        });
        assert!(debouncer.is_pending());
        assert!(debouncer.cancel());
        assert!(!debouncer.cancel());

        let f = fired.clone();
        debouncer.schedule(async move {
            f.fetch_add(1, Ordering::SeqCst);
        });
        drop(debouncer);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
