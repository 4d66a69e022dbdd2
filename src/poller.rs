//! Recurring fetches for the live-data tabs.
//!
//! Each category has at most one armed handle, kept in an owned table keyed by
//! category. A handle carries a generation number; a fetch result is written to
//! the store only if its category is still armed with the generation that
//! issued it. Requests in flight are never aborted, so stopping a category is
//! just removing its table entry.
//!
//! Lock order: handle table, then store.

use crate::api::DashboardApi;
use crate::constants::{messages, poll};
use crate::error::EngineError;
use crate::store::{self, Banner, BannerSource, NoticeLevel, SharedStore};
use crate::tabs::Tab;
use crate::types::{ChannelStats, HashtagBundle};
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::MissedTickBehavior;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PollCategory {
    LiveStats,
    Hashtags,
}

impl PollCategory {
    pub const ALL: [PollCategory; 2] = [PollCategory::LiveStats, PollCategory::Hashtags];

    pub fn label(self) -> &'static str {
        match self {
            PollCategory::LiveStats => "live stats",
            PollCategory::Hashtags => "hashtags",
        }
    }

    /// The tab whose visibility arms this category
    pub fn owner_tab(self) -> Tab {
        match self {
            PollCategory::LiveStats => Tab::Live,
            PollCategory::Hashtags => Tab::Hashtags,
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            PollCategory::LiveStats => messages::LIVE_STATS_FAILED,
            PollCategory::Hashtags => messages::HASHTAGS_FAILED,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub live_stats_interval: Duration,
    pub hashtag_interval: Duration,
    pub failure_threshold: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            live_stats_interval: Duration::from_millis(poll::LIVE_STATS_INTERVAL_MS),
            hashtag_interval: Duration::from_millis(poll::HASHTAG_INTERVAL_MS),
            failure_threshold: poll::FAILURE_WARN_THRESHOLD,
        }
    }
}

impl PollSettings {
    pub fn interval(&self, category: PollCategory) -> Duration {
        match category {
            PollCategory::LiveStats => self.live_stats_interval,
            PollCategory::Hashtags => self.hashtag_interval,
        }
    }
}

/// Result of one fetch, before reconciliation
#[derive(Debug, Clone)]
pub enum PollSnapshot {
    LiveStats(ChannelStats),
    Hashtags(HashtagBundle),
}

struct PollHandle {
    generation: u64,
    interval: Duration,
    _stop: oneshot::Sender<()>, // dropping it wakes the timer task
}

#[derive(Default)]
struct HandleTable {
    next_generation: u64,
    handles: HashMap<PollCategory, PollHandle>,
}

impl HandleTable {
    fn is_current(&self, category: PollCategory, generation: u64) -> bool {
        self.handles
            .get(&category)
            .is_some_and(|h| h.generation == generation)
    }
}

type SharedTable = Arc<Mutex<HandleTable>>;

fn lock_table(table: &SharedTable) -> MutexGuard<'_, HandleTable> {
    table.lock().unwrap_or_else(|p| p.into_inner())
}

pub struct PollingScheduler {
    store: SharedStore,
    api: Arc<dyn DashboardApi>,
    settings: PollSettings,
    table: SharedTable,
}

impl PollingScheduler {
    pub fn new(store: SharedStore, api: Arc<dyn DashboardApi>, settings: PollSettings) -> Self {
        Self {
            store,
            api,
            settings,
            table: Arc::new(Mutex::new(HandleTable::default())),
        }
    }

    pub fn settings(&self) -> PollSettings { self.settings }

    /// Arm `category`: fetch now, then on every interval tick.
    ///
    /// No-op (returns false) when the category is already armed. Must be
    /// called from within a tokio runtime.
    pub fn start(&self, category: PollCategory) -> bool {
        let mut table = lock_table(&self.table);
        if table.handles.contains_key(&category) {
            log::debug!("[poller] {} already armed", category.label());
            return false;
        }

        table.next_generation += 1;
        let generation = table.next_generation;
        let interval = self.settings.interval(category);
        let (stop_tx, stop_rx) = oneshot::channel();
        table.handles.insert(
            category,
            PollHandle {
                generation,
                interval,
                _stop: stop_tx,
            },
        );
        drop(table);

        log::info!(
            "[poller] start {} every {}ms (gen {})",
            category.label(),
            interval.as_millis(),
            generation
        );
        tokio::spawn(run_timer(
            category,
            generation,
            interval,
            stop_rx,
            Arc::clone(&self.table),
            Arc::clone(&self.store),
            Arc::clone(&self.api),
            self.settings.failure_threshold,
        ));
        true
    }

    /// Disarm `category`. No-op (returns false) when it is not armed.
    pub fn stop(&self, category: PollCategory) -> bool {
        let removed = lock_table(&self.table).handles.remove(&category);
        match removed {
            Some(handle) => {
                log::info!(
                    "[poller] stop {} (gen {}, {}ms)",
                    category.label(),
                    handle.generation,
                    handle.interval.as_millis()
                );
                true
            }
            None => false,
        }
    }

    pub fn stop_all(&self) {
        for category in PollCategory::ALL {
            self.stop(category);
        }
    }

    pub fn is_armed(&self, category: PollCategory) -> bool {
        lock_table(&self.table).handles.contains_key(&category)
    }

    pub fn armed_count(&self) -> usize {
        lock_table(&self.table).handles.len()
    }

    pub fn armed_categories(&self) -> Vec<PollCategory> {
        let table = lock_table(&self.table);
        PollCategory::ALL
            .into_iter()
            .filter(|c| table.handles.contains_key(c))
            .collect()
    }
}

impl Drop for PollingScheduler {
    fn drop(&mut self) {
        self.stop_all();
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_timer(
    category: PollCategory,
    generation: u64,
    period: Duration,
    mut stop_rx: oneshot::Receiver<()>,
    table: SharedTable,
    store: SharedStore,
    api: Arc<dyn DashboardApi>,
    failure_threshold: u32,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = &mut stop_rx => break,
            _ = ticker.tick() => {}
        }

        log::debug!("[poller] {} tick (gen {})", category.label(), generation);
        let outcome = fetch(api.as_ref(), category).await;
        if !reconcile(&table, &store, category, generation, outcome, failure_threshold) {
            break;
        }
    }
    log::debug!("[poller] {} timer exited (gen {})", category.label(), generation);
}

async fn fetch(
    api: &dyn DashboardApi,
    category: PollCategory,
) -> Result<PollSnapshot, crate::error::ApiError> {
    match category {
        PollCategory::LiveStats => api.live_stats().await.map(PollSnapshot::LiveStats),
        PollCategory::Hashtags => api.hashtags().await.map(PollSnapshot::Hashtags),
    }
}

/// Apply one fetch outcome. Returns false when the handle that issued it is
/// gone, in which case nothing was written.
fn reconcile(
    table: &SharedTable,
    store: &SharedStore,
    category: PollCategory,
    generation: u64,
    outcome: Result<PollSnapshot, crate::error::ApiError>,
    failure_threshold: u32,
) -> bool {
    // Held until the write is done so a concurrent stop cannot slip in between.
    let table = lock_table(table);
    if !table.is_current(category, generation) {
        log::debug!(
            "[poller] discarding {} result from stopped timer (gen {})",
            category.label(),
            generation
        );
        return false;
    }

    let mut s = store::lock(store);
    match outcome {
        Ok(snapshot) => {
            let was_degraded = s.poll_health(category).degraded;
            s.record_poll_success(category);
            s.clear_banner(BannerSource::Poll(category));
            if was_degraded {
                log::info!("[poller] {} recovered", category.label());
            }
            match snapshot {
                PollSnapshot::LiveStats(stats) => {
                    let deltas = s.set_live_stats(stats, Utc::now());
                    if s.active_tab() == Tab::Live && deltas.any_changed() {
                        log::debug!("[poller] live stats moved: {:?}", deltas);
                    }
                }
                PollSnapshot::Hashtags(bundle) => s.set_hashtags(bundle),
            }
        }
        Err(e) => {
            log::warn!("[poller] {} fetch failed: {}", category.label(), e);
            match EngineError::from_fetch(&e, category.label()) {
                EngineError::Unauthenticated => s.set_authenticated(false),
                EngineError::QuotaExceeded => {
                    s.raise_banner(BannerSource::Poll(category), Banner::QuotaExceeded);
                }
                _ => {
                    s.push_notice(NoticeLevel::Error, category.failure_message());
                    if s.record_poll_failure(category, failure_threshold) {
                        log::warn!(
                            "[poller] {} has failed {} times in a row",
                            category.label(),
                            failure_threshold
                        );
                    }
                }
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_map_to_tabs() {
        assert_eq!(PollCategory::LiveStats.owner_tab(), Tab::Live);
        assert_eq!(PollCategory::Hashtags.owner_tab(), Tab::Hashtags);
    }

    #[test]
    fn test_default_intervals() {
        let s = PollSettings::default();
        assert_eq!(s.interval(PollCategory::LiveStats), Duration::from_secs(30));
        assert_eq!(s.interval(PollCategory::Hashtags), Duration::from_secs(300));
        assert_eq!(s.failure_threshold, 3);
    }

    #[test]
    fn test_generation_check() {
        let mut table = HandleTable::default();
        let (tx, _rx) = oneshot::channel();
        table.handles.insert(
            PollCategory::LiveStats,
            PollHandle { generation: 4, interval: Duration::from_secs(1), _stop: tx },
        );
        assert!(table.is_current(PollCategory::LiveStats, 4));
        assert!(!table.is_current(PollCategory::LiveStats, 3));
        assert!(!table.is_current(PollCategory::Hashtags, 4));
    }
}
