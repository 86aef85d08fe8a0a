//! Timer-owning debouncer.
//!
//! Each `schedule()` restarts the countdown; the callback fires once after `delay` of
//! quiet. Dropping the debouncer cancels a pending call.
//!
//! Timers run on a tokio runtime: the one passed to [`Debouncer::with_handle`], the one
//! current at construction, or the one current when `schedule()` is called. With none of
//! these, scheduling is skipped with a warning.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

pub struct Debouncer {
    delay: Duration,
    callback: Arc<dyn Fn() + Send + Sync>,
    runtime: Option<Handle>,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    /// Binds to the current runtime if there is one.
    pub fn new(delay: Duration, callback: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            delay,
            callback: Arc::new(callback),
            runtime: Handle::try_current().ok(),
            pending: None,
        }
    }

    /// Spawns timers on `runtime`, so `schedule()` works from any thread.
    pub fn with_handle(
        delay: Duration,
        runtime: Handle,
        callback: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        Self {
            delay,
            callback: Arc::new(callback),
            runtime: Some(runtime),
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Restarts the countdown. Returns whether a timer is now pending.
    pub fn schedule(&mut self) -> bool {
        self.cancel();

        let Some(runtime) = self.runtime.clone().or_else(|| Handle::try_current().ok()) else {
            tracing::warn!(target: "system", "No async runtime available, debounced call skipped");
            return false;
        };

        let delay = self.delay;
        let callback = Arc::clone(&self.callback);
        self.pending = Some(runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            callback();
        }));
        true
    }

    /// Drops the pending call, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
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
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(delay: Duration) -> (Debouncer, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let debouncer = Debouncer::new(delay, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (debouncer, count)
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_schedules_fire_once() {
        let (mut debouncer, count) = counting(Duration::from_secs(1));

        for _ in 0..5 {
            debouncer.schedule();
            tokio::time::sleep(Duration::from_millis(300)).await;
        }
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(800)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_fire_separately() {
        let (mut debouncer, count) = counting(Duration::from_secs(1));

        debouncer.schedule();
        tokio::time::sleep(Duration::from_millis(1500)).await;
        debouncer.schedule();
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_schedule_without_runtime_is_skipped() {
        let (mut debouncer, count) = counting(Duration::from_millis(10));
        assert!(!debouncer.schedule());
        assert!(!debouncer.is_pending());
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_with_handle_schedules_from_plain_thread() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_time()
            .build()
            .unwrap();

        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let mut debouncer =
            Debouncer::with_handle(Duration::from_millis(20), runtime.handle().clone(), move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });

        assert!(debouncer.schedule());
        assert!(debouncer.schedule());
        std::thread::sleep(Duration::from_millis(300));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_and_drop_prevent_firing() {
        let (mut debouncer, count) = counting(Duration::from_secs(1));
        debouncer.schedule();
        assert!(debouncer.is_pending());
        debouncer.cancel();
        assert!(!debouncer.is_pending());
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        debouncer.schedule();
        drop(debouncer);
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
