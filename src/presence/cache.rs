use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::records::{PresenceByUser, load_presence};
use super::Result;

pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

struct CacheEntry<T> {
    value: Arc<T>,
    stored_at: Instant,
}

/// Single-slot memoizer with a time-to-live.
///
/// The lock is held across the whole check-load-store sequence, so at most
/// one load runs at a time and callers queued behind it see its result.
pub struct TtlCache<T> {
    ttl: Duration,
    slot: Mutex<Option<CacheEntry<T>>>,
}

impl<T> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached value while it is younger than the TTL, otherwise
    /// runs `load` and stores its result. Errors from `load` are returned
    /// without touching the slot.
    pub fn get_or_try_insert_with<E, F>(&self, load: F) -> std::result::Result<Arc<T>, E>
    where
        F: FnOnce() -> std::result::Result<T, E>,
    {
        let mut slot = self.lock();

        if let Some(entry) = slot.as_ref() {
            if entry.stored_at.elapsed() < self.ttl {
                return Ok(entry.value.clone());
            }
        }

        let value = Arc::new(load()?);
        *slot = Some(CacheEntry {
            value: value.clone(),
            stored_at: Instant::now(),
        });
        Ok(value)
    }

    /// Drops the cached value so the next access reloads.
    pub fn invalidate(&self) {
        self.lock().take();
    }

    // A panic inside a loader leaves the slot unchanged, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, Option<CacheEntry<T>>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Attendance data read from a CSV file and memoized for the cache TTL.
pub struct PresenceStore {
    csv_path: PathBuf,
    cache: TtlCache<PresenceByUser>,
}

impl PresenceStore {
    pub fn new(csv_path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            csv_path: csv_path.into(),
            cache: TtlCache::new(ttl),
        }
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }

    /// Blocking: parses the CSV on a cache miss.
    pub fn get(&self) -> Result<Arc<PresenceByUser>> {
        self.cache.get_or_try_insert_with(|| {
            debug!(path = %self.csv_path.display(), "Presence cache miss, parsing attendance data.");
            load_presence(&self.csv_path)
        })
    }

    pub fn invalidate(&self) {
        info!("Presence cache invalidated.");
        self.cache.invalidate();
    }
}
