//! Auto-refresh controller: owns the poll timer, the "last refreshed"
//! timestamp, and the manual-sync busy flag for one site screen.
//!
//! The timer and the lifecycle state are owned by the instance and released
//! together on `stop()` or drop, so a remounted screen can never leak a
//! second timer.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration, Instant};

/// Default poll period: 10 minutes.
pub const POLL_INTERVAL: Duration = Duration::from_secs(600);

/// Zero-argument async load callback. The controller never inspects its
/// result; it only awaits completion to stamp the refresh timestamp.
pub type LoadFn = Arc<dyn Fn() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Active,
    Inactive,
    Background,
}

impl Lifecycle {
    fn is_foreground(self) -> bool {
        matches!(self, Lifecycle::Active)
    }
}

#[derive(Default)]
struct Shared {
    last_refresh: Mutex<Option<Instant>>,
    syncing: AtomicBool,
}

/// Clears the syncing flag on every exit path, including unwinds.
struct SyncGuard<'a>(&'a AtomicBool);

impl<'a> SyncGuard<'a> {
    fn engage(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        SyncGuard(flag)
    }
}

impl Drop for SyncGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct AutoRefresh {
    load: LoadFn,
    period: Duration,
    shared: Arc<Shared>,
    poll_handle: Option<JoinHandle<()>>,
    lifecycle: Lifecycle,
}

impl AutoRefresh {
    pub fn with_period(load: LoadFn, period: Duration) -> Self {
        Self {
            load,
            period,
            shared: Arc::new(Shared::default()),
            poll_handle: None,
            lifecycle: Lifecycle::Active,
        }
    }

    /// Mount: run the load once immediately, then arm the poll timer.
    pub async fn start(&mut self) {
        self.refresh_now().await;
        self.arm();
    }

    /// Unmount: disarm the timer. No further loads fire after this returns.
    pub fn stop(&mut self) {
        self.disarm();
    }

    /// Run the load callback once and stamp the refresh timestamp when it
    /// completes. Overlapping invocations are not serialized; the stamp
    /// reflects whichever load finishes last.
    pub async fn refresh_now(&self) {
        run_load(&self.load, &self.shared).await;
    }

    /// Manual sync: flag busy, fire the sync trigger, then reload once.
    /// The trigger result is ignored: the reload happens even when the sync
    /// endpoint call fails, and the busy flag clears on every exit path.
    pub async fn sync<F, T>(&self, trigger: F)
    where
        F: Future<Output = Option<T>>,
    {
        let _guard = SyncGuard::engage(&self.shared.syncing);
        let _ = trigger.await;
        self.refresh_now().await;
    }

    pub fn syncing(&self) -> bool {
        self.shared.syncing.load(Ordering::SeqCst)
    }

    pub fn is_polling(&self) -> bool {
        self.poll_handle.is_some()
    }

    /// Foreground/background transition. Resuming to the foreground reloads
    /// immediately and re-arms; leaving it disarms without loading.
    pub async fn handle_lifecycle(&mut self, next: Lifecycle) {
        let was_foreground = self.lifecycle.is_foreground();
        self.lifecycle = next;

        if !was_foreground && next.is_foreground() {
            self.refresh_now().await;
            self.arm();
        } else if was_foreground && !next.is_foreground() {
            self.disarm();
        }
    }

    /// Human-readable staleness, recomputed from the wall clock at call time.
    /// `None` until the first load completes.
    pub fn last_updated_text(&self) -> Option<String> {
        let at = (*self.shared.last_refresh.lock().unwrap())?;
        Some(last_updated_label(at.elapsed()))
    }

    // Arming while armed is a no-op: rapid lifecycle flapping must never
    // stack a second timer.
    fn arm(&mut self) {
        if self.poll_handle.is_some() {
            return;
        }
        let load = Arc::clone(&self.load);
        let shared = Arc::clone(&self.shared);
        let period = self.period;
        self.poll_handle = Some(tokio::spawn(async move {
            loop {
                sleep(period).await;
                run_load(&load, &shared).await;
            }
        }));
    }

    fn disarm(&mut self) {
        if let Some(handle) = self.poll_handle.take() {
            handle.abort();
        }
    }
}

impl Drop for AutoRefresh {
    fn drop(&mut self) {
        self.disarm();
    }
}

async fn run_load(load: &LoadFn, shared: &Shared) {
    (load)().await;
    *shared.last_refresh.lock().unwrap() = Some(Instant::now());
}

pub fn last_updated_label(elapsed: Duration) -> String {
    let mins = elapsed.as_millis() / 60_000;
    match mins {
        0 => "Last updated: just now".to_string(),
        1 => "Last updated: 1 minute ago".to_string(),
        n => format!("Last updated: {} minutes ago", n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting_load() -> (LoadFn, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let load: LoadFn = Arc::new(move || {
            let c = Arc::clone(&c);
            Box::pin(async move {
                c.fetch_add(1, Ordering::SeqCst);
            })
        });
        (load, count)
    }

    #[tokio::test]
    async fn start_loads_once_and_stamps_before_first_tick() {
        let (load, count) = counting_load();
        let mut r = AutoRefresh::with_period(load, Duration::from_millis(50));

        r.start().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(
            r.last_updated_text().as_deref(),
            Some("Last updated: just now")
        );

        sleep(Duration::from_millis(10)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        r.stop();
    }

    #[tokio::test]
    async fn arming_twice_keeps_a_single_timer() {
        let (load, count) = counting_load();
        let mut r = AutoRefresh::with_period(load, Duration::from_millis(50));

        r.start().await;
        r.arm();
        r.arm();

        sleep(Duration::from_millis(125)).await;
        // Initial load plus ticks at ~50ms and ~100ms; a duplicate timer
        // would double the tick count.
        assert_eq!(count.load(Ordering::SeqCst), 3);
        r.stop();
    }

    #[tokio::test]
    async fn background_disarms_without_loading_and_resume_reloads_once() {
        let (load, count) = counting_load();
        let mut r = AutoRefresh::with_period(load, Duration::from_millis(50));

        r.start().await;
        assert!(r.is_polling());

        r.handle_lifecycle(Lifecycle::Background).await;
        assert!(!r.is_polling());
        assert_eq!(count.load(Ordering::SeqCst), 1);

        sleep(Duration::from_millis(120)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        r.handle_lifecycle(Lifecycle::Active).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert!(r.is_polling());
        r.stop();
    }

    #[tokio::test]
    async fn inactive_counts_as_leaving_the_foreground() {
        let (load, count) = counting_load();
        let mut r = AutoRefresh::with_period(load, Duration::from_millis(50));

        r.start().await;
        r.handle_lifecycle(Lifecycle::Inactive).await;
        assert!(!r.is_polling());

        // Inactive -> Background must not trigger a resume load.
        r.handle_lifecycle(Lifecycle::Background).await;
        assert!(!r.is_polling());
        assert_eq!(count.load(Ordering::SeqCst), 1);
        r.stop();
    }

    #[tokio::test]
    async fn sync_flags_busy_and_clears_even_when_trigger_fails() {
        let (load, count) = counting_load();
        let r = AutoRefresh::with_period(load, Duration::from_millis(50));

        assert!(!r.syncing());
        r.sync(async {
            assert!(r.syncing());
            None::<()>
        })
        .await;

        // Trailing load ran despite the failed trigger; flag released.
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!r.syncing());
        assert!(r.last_updated_text().is_some());
    }

    #[tokio::test]
    async fn no_loads_after_stop() {
        let (load, count) = counting_load();
        let mut r = AutoRefresh::with_period(load, Duration::from_millis(40));

        r.start().await;
        r.stop();
        assert!(!r.is_polling());

        sleep(Duration::from_millis(120)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn drop_releases_the_timer() {
        let (load, count) = counting_load();
        {
            let mut r = AutoRefresh::with_period(load, Duration::from_millis(40));
            r.start().await;
        }
        sleep(Duration::from_millis(120)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn last_updated_label_boundaries() {
        assert_eq!(
            last_updated_label(Duration::from_secs(0)),
            "Last updated: just now"
        );
        assert_eq!(
            last_updated_label(Duration::from_secs(59)),
            "Last updated: just now"
        );
        assert_eq!(
            last_updated_label(Duration::from_secs(60)),
            "Last updated: 1 minute ago"
        );
        assert_eq!(
            last_updated_label(Duration::from_secs(119)),
            "Last updated: 1 minute ago"
        );
        assert_eq!(
            last_updated_label(Duration::from_secs(120)),
            "Last updated: 2 minutes ago"
        );
        assert_eq!(
            last_updated_label(Duration::from_secs(45 * 60)),
            "Last updated: 45 minutes ago"
        );
    }
}
