//! Periodic refresh lifecycle
//!
//! The engine itself never fetches data; a [`SnapshotSource`] is the
//! storage-layer seam and the only suspension point in the system. Starting
//! real-time mode spawns a tokio task that ticks on the configured interval,
//! fetches a snapshot, and refreshes the engine. Stopping (or dropping) the
//! returned handle aborts the task, so no further refresh can be triggered
//! after teardown.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::error::{Error, Result};
use crate::models::Snapshot;

use super::engine::InsightEngine;

/// Supplier of record snapshots, owned by the storage layer.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch(&self) -> Result<Snapshot>;
}

/// Handle for a running periodic-refresh task.
///
/// The task is aborted on [`stop`](RealtimeHandle::stop) and on drop; a
/// stopped handle can never fire another refresh.
pub struct RealtimeHandle {
    task: JoinHandle<()>,
}

impl RealtimeHandle {
    pub fn stop(self) {
        self.task.abort();
    }

    pub fn is_stopped(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for RealtimeHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl InsightEngine {
    /// Start the periodic refresh task.
    ///
    /// Each tick fetches a snapshot and refreshes. A tick that finds the
    /// engine busy is skipped; the refresh already in flight wins. Fetch
    /// failures are logged and the task keeps ticking.
    pub fn start_realtime(
        self: &Arc<Self>,
        source: Arc<dyn SnapshotSource>,
    ) -> RealtimeHandle {
        let engine = Arc::clone(self);
        let interval_ms = engine.config().update_interval_ms.max(1);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick of a tokio interval completes immediately;
            // consume it so refreshes start one full interval after start.
            ticker.tick().await;

            loop {
                ticker.tick().await;

                let snapshot = match source.fetch().await {
                    Ok(snapshot) => snapshot,
                    Err(e) => {
                        tracing::warn!(error = %e, "Snapshot fetch failed, skipping tick");
                        continue;
                    }
                };

                match engine.refresh(&snapshot).await {
                    Ok(insights) => {
                        tracing::debug!(count = insights.len(), "Periodic refresh applied");
                    }
                    Err(Error::EngineBusy) => {
                        tracing::debug!("Engine busy, skipping periodic refresh");
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Periodic refresh failed");
                    }
                }
            }
        });

        RealtimeHandle { task }
    }

    /// Start the periodic task only when the configuration enables it.
    pub fn start_if_realtime(
        self: &Arc<Self>,
        source: Arc<dyn SnapshotSource>,
    ) -> Option<RealtimeHandle> {
        if !self.config().real_time {
            return None;
        }
        Some(self.start_realtime(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::config::EngineConfig;
    use crate::models::ShipmentRecord;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        fetches: AtomicUsize,
    }

    #[async_trait]
    impl SnapshotSource for CountingSource {
        async fn fetch(&self) -> Result<Snapshot> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Snapshot::new(
                vec![ShipmentRecord::new(
                    "r1",
                    10.0,
                    0.0,
                    Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
                    "east",
                )],
                100.0,
            )
        }
    }

    struct FailingSource;

    #[async_trait]
    impl SnapshotSource for FailingSource {
        async fn fetch(&self) -> Result<Snapshot> {
            Err(Error::Source("storage offline".into()))
        }
    }

    fn engine_with_interval(ms: u64) -> Arc<InsightEngine> {
        Arc::new(InsightEngine::new(EngineConfig {
            real_time: true,
            update_interval_ms: ms,
            ..EngineConfig::default()
        }))
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_drive_refreshes() {
        let engine = engine_with_interval(50);
        let source = Arc::new(CountingSource {
            fetches: AtomicUsize::new(0),
        });

        let handle = engine.start_realtime(Arc::clone(&source) as Arc<dyn SnapshotSource>);

        // The paused clock auto-advances; sleeping past three intervals lets
        // the task tick three times.
        tokio::time::sleep(Duration::from_millis(170)).await;

        let fetched = source.fetches.load(Ordering::SeqCst);
        assert!(fetched >= 3, "expected >= 3 fetches, got {fetched}");
        assert!(engine.last_run().is_some());

        handle.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_prevents_further_refreshes() {
        let engine = engine_with_interval(50);
        let source = Arc::new(CountingSource {
            fetches: AtomicUsize::new(0),
        });

        let handle = engine.start_realtime(Arc::clone(&source) as Arc<dyn SnapshotSource>);
        tokio::time::sleep(Duration::from_millis(120)).await;
        handle.stop();

        let after_stop = source.fetches.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(source.fetches.load(Ordering::SeqCst), after_stop);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_handle_aborts_task() {
        let engine = engine_with_interval(50);
        let source = Arc::new(CountingSource {
            fetches: AtomicUsize::new(0),
        });

        {
            let _handle = engine.start_realtime(Arc::clone(&source) as Arc<dyn SnapshotSource>);
            tokio::time::sleep(Duration::from_millis(60)).await;
        }

        let after_drop = source.fetches.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(source.fetches.load(Ordering::SeqCst), after_drop);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_if_realtime_respects_config() {
        let disabled = Arc::new(InsightEngine::new(EngineConfig::default()));
        let source = Arc::new(CountingSource {
            fetches: AtomicUsize::new(0),
        });
        assert!(disabled
            .start_if_realtime(Arc::clone(&source) as Arc<dyn SnapshotSource>)
            .is_none());

        let enabled = engine_with_interval(50);
        let handle = enabled
            .start_if_realtime(Arc::clone(&source) as Arc<dyn SnapshotSource>)
            .expect("real_time config must start the task");
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(source.fetches.load(Ordering::SeqCst) >= 1);
        handle.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_failure_keeps_ticking() {
        let engine = engine_with_interval(50);
        let handle = engine.start_realtime(Arc::new(FailingSource));

        tokio::time::sleep(Duration::from_millis(200)).await;

        // No refresh ever applied, but the task is still alive.
        assert!(engine.last_run().is_none());
        assert!(!handle.is_stopped());

        handle.stop();
    }
}
