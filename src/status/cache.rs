// src/status/cache.rs
//
// Last-known server status, written by the single refresh task and read by
// any number of request handlers. Readers only ever get a snapshot copy.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::{debug, warn};
use parking_lot::RwLock;
use tokio::task::JoinHandle;

use super::prober::StatusProber;
use crate::models::status::{StatusResult, StatusSnapshot};

#[derive(Debug, Default)]
struct CacheEntry {
    /// None only before the first probe has completed.
    result: Option<StatusResult>,
    updated_at: u64,
}

#[derive(Debug, Default)]
pub struct StatusCache {
    entry: RwLock<CacheEntry>,
}

impl StatusCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cached entry with a completed probe outcome.
    pub fn store(&self, result: StatusResult) {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        let mut entry = self.entry.write();
        // updated_at never goes backwards, even if the wall clock does.
        entry.updated_at = now.max(entry.updated_at);
        entry.result = Some(result);
    }

    /// Non-blocking read of the most recent entry. Before the first probe
    /// completes this is the offline sentinel with `updated_at` 0.
    pub fn snapshot(&self) -> StatusSnapshot {
        let entry = self.entry.read();
        let result = entry
            .result
            .clone()
            .unwrap_or_else(StatusResult::offline);

        StatusSnapshot {
            online: result.online,
            players_online: result.players_online,
            players_max: result.players_max,
            version: result.version,
            updated_at: entry.updated_at,
        }
    }
}

/// Handle to the background refresh task. Dropping it leaves the task
/// running for the process lifetime; `stop` tears it down.
pub struct RefreshHandle {
    task: JoinHandle<()>,
}

impl RefreshHandle {
    pub fn stop(&self) {
        self.task.abort();
    }
}

/// Spawn the refresh loop: probe, store the outcome (failures collapse to
/// the offline result), sleep, repeat. Probe errors never end the loop.
pub fn spawn_refresh_loop(
    cache: Arc<StatusCache>,
    prober: StatusProber,
    interval: Duration,
) -> RefreshHandle {
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;

            let result = match prober.probe().await {
                Ok(result) => {
                    debug!(
                        "status probe ok: {}/{} players, version {}",
                        result.players_online, result.players_max, result.version
                    );
                    result
                }
                Err(e) => {
                    warn!("status probe failed: {}", e);
                    StatusResult::offline()
                }
            };

            cache.store(result);
        }
    });

    RefreshHandle { task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_snapshot_before_first_probe() {
        let cache = StatusCache::new();
        let snapshot = cache.snapshot();
        assert_eq!(
            snapshot,
            StatusSnapshot {
                online: false,
                players_online: 0,
                players_max: 0,
                version: "?".to_string(),
                updated_at: 0,
            }
        );
    }

    #[test]
    fn test_store_then_snapshot() {
        let cache = StatusCache::new();
        cache.store(StatusResult {
            online: true,
            players_online: 3,
            players_max: 64,
            version: "1.20.1".to_string(),
        });

        let snapshot = cache.snapshot();
        assert!(snapshot.online);
        assert_eq!(snapshot.players_online, 3);
        assert_eq!(snapshot.players_max, 64);
        assert_eq!(snapshot.version, "1.20.1");
        assert!(snapshot.updated_at > 0);

        // Reads have no side effects: repeated snapshots are identical.
        assert_eq!(cache.snapshot(), snapshot);
        assert_eq!(cache.snapshot(), snapshot);
    }

    #[test]
    fn test_updated_at_is_monotonic() {
        let cache = StatusCache::new();
        cache.store(StatusResult::offline());
        let first = cache.snapshot().updated_at;
        cache.store(StatusResult::offline());
        assert!(cache.snapshot().updated_at >= first);
    }

    #[test]
    fn test_concurrent_readers_never_see_torn_entry() {
        // Every stored result keeps players_online == players_max, so any
        // snapshot mixing fields from two writes is detectable.
        let cache = Arc::new(StatusCache::new());
        let writer_cache = Arc::clone(&cache);

        let writer = thread::spawn(move || {
            for i in 0..2_000u32 {
                writer_cache.store(StatusResult {
                    online: true,
                    players_online: i,
                    players_max: i,
                    version: format!("v{}", i),
                });
            }
        });

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for _ in 0..2_000 {
                        let snapshot = cache.snapshot();
                        assert_eq!(snapshot.players_online, snapshot.players_max);
                        if snapshot.online {
                            assert_eq!(
                                snapshot.version,
                                format!("v{}", snapshot.players_online)
                            );
                        }
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
    }

    #[tokio::test]
    async fn test_refresh_loop_updates_cache_despite_failures() {
        // Nothing listens on the target port, so every probe fails; the
        // loop must keep running and publish the offline result.
        let cache = Arc::new(StatusCache::new());
        let prober = StatusProber::new(
            "127.0.0.1".to_string(),
            1,
            Duration::from_millis(100),
        );
        let handle = spawn_refresh_loop(Arc::clone(&cache), prober, Duration::from_millis(20));

        let mut updated = false;
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            let snapshot = cache.snapshot();
            if snapshot.updated_at > 0 {
                assert!(!snapshot.online);
                assert_eq!(snapshot.version, "?");
                updated = true;
                break;
            }
        }
        handle.stop();
        assert!(updated, "refresh loop never stored a result");
    }
}
