//! Scheduled tasks - cancellable fixed-interval loops
//!
//! Every periodic job in the backend (feed polling, catalog refresh, position
//! emission) is a [`RepeatingTask`]. Spawning one returns a [`TaskHandle`]
//! whose `stop()` cancels the pending sleep as well as a tick that is still
//! in flight, so a stopped task never re-arms itself.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Fixed-interval schedule for a background job
#[derive(Debug, Clone)]
pub struct RepeatingTask {
    name: String,
    interval: Duration,
    initial_delay: Duration,
}

impl RepeatingTask {
    /// First tick runs immediately, later ticks `interval` after the previous one finished
    pub fn new(name: impl Into<String>, interval: Duration) -> Self {
        Self {
            name: name.into(),
            interval,
            initial_delay: Duration::ZERO,
        }
    }

    /// Postpone the first tick
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Spawn the loop on the current tokio runtime
    pub fn spawn<F, Fut>(self, mut tick: F) -> TaskHandle
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let name = self.name.clone();

        tracing::info!(
            "Scheduling {} (interval: {:?}, initial delay: {:?})",
            self.name,
            self.interval,
            self.initial_delay
        );

        let join = tokio::spawn(async move {
            if !self.initial_delay.is_zero() {
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => return,
                    _ = tokio::time::sleep(self.initial_delay) => {}
                }
            }

            loop {
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    _ = tick() => {}
                }

                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    _ = tokio::time::sleep(self.interval) => {}
                }
            }

            tracing::debug!("{} loop exited", self.name);
        });

        TaskHandle {
            name,
            token,
            join: Arc::new(std::sync::Mutex::new(Some(join))),
        }
    }
}

/// Handle to a spawned [`RepeatingTask`]
#[derive(Debug, Clone)]
pub struct TaskHandle {
    name: String,
    token: CancellationToken,
    join: Arc<std::sync::Mutex<Option<JoinHandle<()>>>>,
}

impl TaskHandle {
    /// Cancel the task. Safe to call any number of times.
    pub fn stop(&self) {
        if !self.token.is_cancelled() {
            tracing::info!("Stopping {}", self.name);
            self.token.cancel();
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stop the task and wait until its loop has exited
    pub async fn shutdown(&self) {
        self.stop();

        let join = match self.join.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        if let Some(join) = join {
            if let Err(e) = join.await {
                tracing::warn!("{} terminated abnormally: {}", self.name, e);
            }
        }
    }
}

/// All tasks belonging to one feed service
#[derive(Debug, Clone)]
pub struct ServiceHandle {
    name: &'static str,
    tasks: Vec<TaskHandle>,
}

impl ServiceHandle {
    pub fn new(name: &'static str, tasks: Vec<TaskHandle>) -> Self {
        Self { name, tasks }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn stop(&self) {
        for task in &self.tasks {
            task.stop();
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.tasks.iter().all(TaskHandle::is_stopped)
    }

    pub async fn shutdown(&self) {
        self.stop();
        for task in &self.tasks {
            task.shutdown().await;
        }
        tracing::info!("{} service stopped", self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    fn counting_task(interval: Duration) -> (TaskHandle, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let handle = RepeatingTask::new("counter", interval).spawn(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        (handle, count)
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_is_immediate_then_fixed_interval() {
        let (handle, count) = counting_task(Duration::from_secs(10));
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_millis(9_999)).await;
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_millis(2)).await;
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 2);

        handle.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_delay() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let handle = RepeatingTask::new("delayed", Duration::from_secs(1))
            .with_initial_delay(Duration::from_secs(5))
            .spawn(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            });

        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::advance(Duration::from_millis(5_001)).await;
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_idempotent_and_final() {
        let (handle, count) = counting_task(Duration::from_secs(1));
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        handle.stop();
        handle.stop();
        assert!(handle.is_stopped());

        tokio::time::advance(Duration::from_secs(30)).await;
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        handle.shutdown().await;
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_in_flight_tick() {
        let started = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicUsize::new(0));
        let (s, f) = (started.clone(), finished.clone());

        let handle = RepeatingTask::new("slow", Duration::from_secs(1)).spawn(move || {
            let (s, f) = (s.clone(), f.clone());
            async move {
                s.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_secs(10)).await;
                f.fetch_add(1, Ordering::SeqCst);
            }
        });

        settle().await;
        assert_eq!(started.load(Ordering::SeqCst), 1);

        handle.stop();
        tokio::time::advance(Duration::from_secs(60)).await;
        settle().await;

        assert_eq!(started.load(Ordering::SeqCst), 1);
        assert_eq!(finished.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_service_handle_stops_every_task() {
        let (a, _) = counting_task(Duration::from_secs(1));
        let (b, _) = counting_task(Duration::from_secs(1));
        let service = ServiceHandle::new("pair", vec![a.clone(), b.clone()]);

        assert!(!service.is_stopped());
        service.stop();
        assert!(a.is_stopped() && b.is_stopped());
        service.shutdown().await;
    }
}
