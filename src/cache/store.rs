//! Draft cache storage.
//!
//! Holds transient, handle-keyed snapshots of content that is mid-workflow:
//! extracted but not yet approved and persisted. Entries expire after a
//! fixed TTL; eviction is lazy, performed at the start of every insert and
//! lookup rather than by a background timer.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use metrics::counter;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::content::WeeklyContent;

use super::clock::Clock;
use super::config::DraftCacheConfig;
use super::lock::mutex_lock;

const SOURCE: &str = "cache::store";

/// Content held under a draft handle.
///
/// The cache never interprets payload structure beyond the week-number
/// probe used for the secondary projection; consumers branch on the
/// variant instead of sniffing dynamic shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DraftPayload {
    /// Full calendar from the extraction flow: week label to weekly content.
    Calendar(BTreeMap<String, WeeklyContent>),
    /// A single edited week, as submitted by a draft update.
    Week(WeeklyContent),
    /// Regenerated week content from the regeneration flow.
    WeekContent(String),
    /// Regenerated day subcontent from the regeneration flow.
    Subcontent(String),
}

impl DraftPayload {
    /// Week number carried by the payload's week label, when it has one.
    fn week_number(&self) -> Option<u64> {
        match self {
            DraftPayload::Week(content) => content.week_number().map(u64::from),
            _ => None,
        }
    }
}

/// A draft entry together with its lifecycle instants, as returned to
/// callers by lookup and update.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftSnapshot {
    pub handle: String,
    pub payload: DraftPayload,
    pub created_at: u64,
    pub expires_at: u64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DraftError {
    /// Handle absent or already swept. Never retried internally; the caller
    /// must restart the workflow from extraction.
    #[error("draft not found or expired")]
    NotFound,
}

struct DraftEntry {
    payload: DraftPayload,
    created_at: u64,
}

struct DraftState {
    entries: HashMap<String, DraftEntry>,
    /// Numeric-keyed projection kept in sync on insert and update. Writes
    /// only; not swept together with the primary map.
    projection: HashMap<u64, DraftPayload>,
    last_handle: u64,
}

/// Process-wide draft store. All four operations go through one mutex so
/// the primary map and the projection mutate atomically with respect to
/// each other.
pub struct DraftStore {
    state: Mutex<DraftState>,
    ttl_seconds: u64,
    clock: Arc<dyn Clock>,
}

impl DraftStore {
    pub fn new(config: &DraftCacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(DraftState {
                entries: HashMap::new(),
                projection: HashMap::new(),
                last_handle: 0,
            }),
            ttl_seconds: config.ttl_seconds,
            clock,
        }
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Store a payload under a fresh handle and return its snapshot.
    ///
    /// Sweeps expired entries first, amortizing cleanup onto insert calls.
    /// Handles are decimal strings seeded from whole seconds since epoch
    /// and strictly increasing, so rapid successive inserts never collide.
    pub fn insert(&self, payload: DraftPayload) -> DraftSnapshot {
        let now = self.clock.now_secs();
        let mut state = mutex_lock(&self.state, SOURCE, "insert");
        Self::sweep(&mut state, now, self.ttl_seconds);

        let numeric_handle = state.last_handle.saturating_add(1).max(now);
        state.last_handle = numeric_handle;
        let handle = numeric_handle.to_string();

        state.entries.insert(
            handle.clone(),
            DraftEntry {
                payload: payload.clone(),
                created_at: now,
            },
        );
        state.projection.insert(numeric_handle, payload.clone());

        DraftSnapshot {
            handle,
            payload,
            created_at: now,
            expires_at: now + self.ttl_seconds,
        }
    }

    /// Fetch the payload stored under `handle`, sweeping expired entries
    /// first.
    pub fn lookup(&self, handle: &str) -> Result<DraftSnapshot, DraftError> {
        let now = self.clock.now_secs();
        let mut state = mutex_lock(&self.state, SOURCE, "lookup");
        Self::sweep(&mut state, now, self.ttl_seconds);

        match state.entries.get(handle) {
            Some(entry) => {
                counter!("postweave_draft_hit_total").increment(1);
                Ok(DraftSnapshot {
                    handle: handle.to_string(),
                    payload: entry.payload.clone(),
                    created_at: entry.created_at,
                    expires_at: entry.created_at + self.ttl_seconds,
                })
            }
            None => {
                counter!("postweave_draft_miss_total").increment(1);
                Err(DraftError::NotFound)
            }
        }
    }

    /// Replace the payload under `handle` and refresh its TTL.
    ///
    /// An update extends life: `created_at` is reset to now. When the new
    /// payload carries a parseable week number, the projection is rewritten
    /// under that key; otherwise the projection is left untouched.
    pub fn update(&self, handle: &str, payload: DraftPayload) -> Result<DraftSnapshot, DraftError> {
        let now = self.clock.now_secs();
        let mut state = mutex_lock(&self.state, SOURCE, "update");
        Self::sweep(&mut state, now, self.ttl_seconds);

        let week_key = payload.week_number();

        let entry = state.entries.get_mut(handle).ok_or(DraftError::NotFound)?;
        entry.payload = payload.clone();
        entry.created_at = now;

        if let Some(week) = week_key.filter(|week| *week > 0) {
            state.projection.insert(week, payload.clone());
        }

        Ok(DraftSnapshot {
            handle: handle.to_string(),
            payload,
            created_at: now,
            expires_at: now + self.ttl_seconds,
        })
    }

    /// Read the numeric-keyed projection. Legacy call path; see module docs.
    pub fn projected(&self, key: u64) -> Option<DraftPayload> {
        let state = mutex_lock(&self.state, SOURCE, "projected");
        state.projection.get(&key).cloned()
    }

    /// Number of live entries in the primary map, without sweeping.
    pub fn len(&self) -> usize {
        mutex_lock(&self.state, SOURCE, "len").entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove entries older than the TTL. An entry aged exactly `ttl` is
    /// still live. The projection is intentionally not swept.
    fn sweep(state: &mut DraftState, now: u64, ttl: u64) {
        let before = state.entries.len();
        state
            .entries
            .retain(|_, entry| now.saturating_sub(entry.created_at) <= ttl);
        let evicted = before - state.entries.len();
        if evicted > 0 {
            counter!("postweave_draft_evict_total").increment(evicted as u64);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::clock::manual::ManualClock;
    use crate::domain::content::ContentItem;

    const TTL: u64 = 600;

    fn store_at(start: u64) -> (Arc<ManualClock>, DraftStore) {
        let clock = Arc::new(ManualClock::at(start));
        let store = DraftStore::new(
            &DraftCacheConfig { ttl_seconds: TTL },
            clock.clone() as Arc<dyn Clock>,
        );
        (clock, store)
    }

    fn weekly(week: &str) -> WeeklyContent {
        let mut content_by_days = BTreeMap::new();
        content_by_days.insert("Monday".to_string(), vec![ContentItem::text("hello")]);
        WeeklyContent {
            week: week.to_string(),
            content_by_days,
        }
    }

    fn calendar(week: &str) -> DraftPayload {
        let mut weeks = BTreeMap::new();
        weeks.insert(week.to_string(), weekly(week));
        DraftPayload::Calendar(weeks)
    }

    #[test]
    fn insert_then_lookup_round_trips() {
        let (_, store) = store_at(1_000);
        let payload = calendar("Week 1");

        let inserted = store.insert(payload.clone());
        let found = store.lookup(&inserted.handle).expect("live entry");

        assert_eq!(found.payload, payload);
        assert_eq!(found.created_at, 1_000);
        assert_eq!(found.expires_at, 1_000 + TTL);
    }

    #[test]
    fn entry_survives_to_exactly_ttl_and_not_beyond() {
        let (clock, store) = store_at(0);
        let inserted = store.insert(calendar("Week 1"));

        clock.set(599);
        assert!(store.lookup(&inserted.handle).is_ok());

        clock.set(TTL);
        assert!(store.lookup(&inserted.handle).is_ok());

        clock.set(TTL + 1);
        assert_eq!(store.lookup(&inserted.handle), Err(DraftError::NotFound));
    }

    #[test]
    fn update_refreshes_ttl() {
        let (clock, store) = store_at(0);
        let inserted = store.insert(calendar("Week 1"));

        clock.set(599);
        let updated = store
            .update(&inserted.handle, DraftPayload::Week(weekly("Week 1")))
            .expect("entry still live");
        assert_eq!(updated.expires_at, 599 + TTL);

        // A non-refreshing TTL would have expired this entry at t=600.
        clock.set(599 + 599);
        assert!(store.lookup(&inserted.handle).is_ok());

        clock.set(599 + TTL + 1);
        assert_eq!(store.lookup(&inserted.handle), Err(DraftError::NotFound));
    }

    #[test]
    fn update_on_expired_handle_is_not_found() {
        let (clock, store) = store_at(0);
        let inserted = store.insert(calendar("Week 1"));

        clock.set(TTL + 1);
        assert_eq!(
            store.update(&inserted.handle, DraftPayload::Week(weekly("Week 1"))),
            Err(DraftError::NotFound)
        );
    }

    #[test]
    fn rapid_inserts_mint_distinct_handles() {
        let (_, store) = store_at(1_000);

        let first = store.insert(calendar("Week 1"));
        let second = store.insert(calendar("Week 2"));

        assert_ne!(first.handle, second.handle);
        assert_eq!(store.len(), 2);
        assert!(store.lookup(&first.handle).is_ok());
        assert!(store.lookup(&second.handle).is_ok());
    }

    #[test]
    fn handles_stay_monotonic_across_clock_jumps() {
        let (clock, store) = store_at(2_000);
        let first = store.insert(calendar("Week 1"));

        // A clock stepping backwards must not reissue an earlier handle.
        clock.set(1_500);
        let second = store.insert(calendar("Week 2"));

        let first_numeric: u64 = first.handle.parse().expect("numeric handle");
        let second_numeric: u64 = second.handle.parse().expect("numeric handle");
        assert!(second_numeric > first_numeric);
    }

    #[test]
    fn sweep_retains_exactly_the_live_subset() {
        let (clock, store) = store_at(0);
        let first = store.insert(calendar("Week 1"));

        clock.set(300);
        let second = store.insert(calendar("Week 2"));

        clock.set(650);
        // First entry is 650s old (expired); second is 350s old (live).
        assert_eq!(store.lookup(&first.handle), Err(DraftError::NotFound));
        assert!(store.lookup(&second.handle).is_ok());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn insert_writes_projection_under_numeric_handle() {
        let (_, store) = store_at(1_000);
        let payload = calendar("Week 1");
        let inserted = store.insert(payload.clone());

        let key: u64 = inserted.handle.parse().expect("numeric handle");
        assert_eq!(store.projected(key), Some(payload));
    }

    #[test]
    fn update_projects_under_parsed_week_number() {
        let (_, store) = store_at(1_000);
        let inserted = store.insert(calendar("Week 1"));

        let edited = DraftPayload::Week(weekly("Week 3"));
        store
            .update(&inserted.handle, edited.clone())
            .expect("live entry");

        assert_eq!(store.projected(3), Some(edited));
    }

    #[test]
    fn update_with_unparseable_week_label_skips_projection() {
        let (_, store) = store_at(1_000);
        let inserted = store.insert(calendar("Week 1"));

        let edited = DraftPayload::Week(weekly("Sprint Alpha"));
        let updated = store
            .update(&inserted.handle, edited.clone())
            .expect("update succeeds even without a projection write");
        assert_eq!(updated.payload, edited);

        // Only the insert-time key exists.
        let key: u64 = inserted.handle.parse().expect("numeric handle");
        assert!(store.projected(key).is_some());
    }

    #[test]
    fn projection_outlives_primary_expiry() {
        let (clock, store) = store_at(0);
        let inserted = store.insert(calendar("Week 1"));
        let key: u64 = inserted.handle.parse().expect("numeric handle");

        clock.set(TTL + 1);
        assert_eq!(store.lookup(&inserted.handle), Err(DraftError::NotFound));
        assert!(store.projected(key).is_some());
    }

    #[test]
    fn regenerated_payloads_round_trip() {
        let (_, store) = store_at(1_000);
        let payload = DraftPayload::Subcontent("fresh take".to_string());
        let inserted = store.insert(payload.clone());
        assert_eq!(store.lookup(&inserted.handle).map(|s| s.payload), Ok(payload));
    }
}
