//! Single owner of everything the dashboard knows during a session.
//!
//! Only the mutation manager, the poller's reconciliation step and the tab
//! controller's filter setters write here; everything else reads. The store
//! lives behind a `std::sync::Mutex` that is never held across an `.await`.

use crate::constants::app::MAX_NOTICES;
use crate::delta::{describe_stats, StatDeltas};
use crate::filter;
use crate::poller::PollCategory;
use crate::tabs::Tab;
use crate::types::{
    ActionState, Analytics, ChannelStats, CommentThread, FilterConfig, HashtagBundle, SortOrder,
    StatsSnapshot, Video,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

pub type SharedStore = Arc<Mutex<ViewStateStore>>;

/// Lock the store, recovering the data if a previous holder panicked
pub fn lock(store: &SharedStore) -> MutexGuard<'_, ViewStateStore> {
    store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// One-shot message for the renderer (toast / alert)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Persistent informational banner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Banner {
    QuotaExceeded,
    DemoMode,
}

/// Fetch that raised a banner; each clears only its own entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BannerSource {
    Comments,
    Videos,
    Analytics,
    Poll(PollCategory),
}

impl Banner {
    pub fn message(self) -> &'static str {
        match self {
            Banner::QuotaExceeded => crate::constants::messages::QUOTA_EXCEEDED,
            Banner::DemoMode => crate::constants::messages::DEMO_MODE,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PollHealth {
    pub consecutive_failures: u32,
    pub degraded: bool,
}

#[derive(Debug)]
pub struct ViewStateStore {
    threads: Vec<CommentThread>,
    videos: Vec<Video>,
    live_stats: Option<StatsSnapshot>,
    last_deltas: Option<StatDeltas>,
    hashtags: Option<HashtagBundle>,
    analytics: Option<Analytics>,

    filter: FilterConfig,
    owner_override: Option<String>, // from config, wins over payloads
    learned_owner: Option<String>,  // channelId seen in list payloads

    active_tab: Tab,
    authenticated: bool,
    banners: HashMap<BannerSource, Banner>,

    notices: VecDeque<Notice>,
    inline_errors: HashMap<String, String>, // comment id -> validation message
    reply_drafts: HashMap<String, String>,  // comment id -> unsent reply text
    poll_health: HashMap<PollCategory, PollHealth>,

    revision: u64,
}

impl Default for ViewStateStore {
    fn default() -> Self {
        Self::new(FilterConfig::default(), None)
    }
}

impl ViewStateStore {
    pub fn new(filter: FilterConfig, owner_override: Option<String>) -> Self {
        Self {
            threads: Vec::new(),
            videos: Vec::new(),
            live_stats: None,
            last_deltas: None,
            hashtags: None,
            analytics: None,
            filter,
            owner_override,
            learned_owner: None,
            active_tab: Tab::Comments,
            authenticated: false,
            banners: HashMap::new(),
            notices: VecDeque::new(),
            inline_errors: HashMap::new(),
            reply_drafts: HashMap::new(),
            poll_health: HashMap::new(),
            revision: 0,
        }
    }

    pub fn shared(self) -> SharedStore {
        Arc::new(Mutex::new(self))
    }

    // ----- getters -----
    pub fn threads(&self) -> &[CommentThread] { &self.threads }
    pub fn videos(&self) -> &[Video] { &self.videos }
    pub fn live_stats(&self) -> Option<&StatsSnapshot> { self.live_stats.as_ref() }
    pub fn last_deltas(&self) -> Option<&StatDeltas> { self.last_deltas.as_ref() }
    pub fn hashtags(&self) -> Option<&HashtagBundle> { self.hashtags.as_ref() }
    pub fn analytics(&self) -> Option<&Analytics> { self.analytics.as_ref() }
    pub fn filter(&self) -> FilterConfig { self.filter }
    pub fn active_tab(&self) -> Tab { self.active_tab }
    pub fn is_authenticated(&self) -> bool { self.authenticated }
    pub fn demo_mode(&self) -> bool { self.banners.values().any(|b| *b == Banner::DemoMode) }
    pub fn revision(&self) -> u64 { self.revision }

    pub fn owner_id(&self) -> Option<&str> {
        self.owner_override
            .as_deref()
            .or(self.learned_owner.as_deref())
    }

    /// Comments after the active filter configuration
    pub fn visible_threads(&self) -> Vec<CommentThread> {
        filter::apply(&self.threads, &self.filter, self.owner_id())
    }

    pub fn thread(&self, id: &str) -> Option<&CommentThread> {
        self.threads.iter().find(|t| t.matches_id(id))
    }

    pub fn action_state(&self, id: &str) -> Option<ActionState> {
        self.thread(id).map(CommentThread::action_state)
    }

    // ----- snapshot replacement -----
    pub fn replace_threads(&mut self, threads: Vec<CommentThread>, channel_id: Option<String>) {
        self.threads = threads;
        if channel_id.is_some() {
            self.learned_owner = channel_id;
        }
        self.invalidate();
    }

    pub fn replace_videos(&mut self, videos: Vec<Video>, channel_id: Option<String>) {
        self.videos = videos;
        if channel_id.is_some() {
            self.learned_owner = channel_id;
        }
        self.invalidate();
    }

    /// Store a full stats snapshot and return how it moved against the last one
    pub fn set_live_stats(&mut self, stats: ChannelStats, fetched_at: DateTime<Utc>) -> StatDeltas {
        let deltas = describe_stats(self.live_stats.as_ref().map(|s| &s.stats), &stats);
        self.live_stats = Some(StatsSnapshot { stats, fetched_at });
        self.last_deltas = Some(deltas);
        self.invalidate();
        deltas
    }

    pub fn set_hashtags(&mut self, bundle: HashtagBundle) {
        self.hashtags = Some(bundle);
        self.invalidate();
    }

    pub fn set_analytics(&mut self, analytics: Analytics) {
        self.analytics = Some(analytics);
        self.invalidate();
    }

    // ----- filter setters -----
    pub fn set_hide_owner_comments(&mut self, on: bool) {
        self.filter.hide_owner_comments = on;
        self.invalidate();
    }

    pub fn set_show_unreplied_only(&mut self, on: bool) {
        self.filter.show_unreplied_only = on;
        self.invalidate();
    }

    pub fn set_sort_order(&mut self, order: SortOrder) {
        self.filter.sort_order = order;
        self.invalidate();
    }

    // ----- optimistic state -----
    /// Overwrite the like/heart fields of one comment; false if it is gone
    pub fn apply_action_state(&mut self, id: &str, state: ActionState) -> bool {
        let Some(thread) = self.threads.iter_mut().find(|t| t.matches_id(id)) else {
            return false;
        };
        thread.set_action_state(state);
        self.invalidate();
        true
    }

    pub fn set_reply_draft(&mut self, id: &str, text: String) {
        self.inline_errors.remove(id);
        self.reply_drafts.insert(id.to_string(), text);
    }

    pub fn reply_draft(&self, id: &str) -> &str {
        self.reply_drafts.get(id).map(String::as_str).unwrap_or("")
    }

    pub fn clear_reply_draft(&mut self, id: &str) {
        self.reply_drafts.remove(id);
        self.invalidate();
    }

    pub fn set_inline_error(&mut self, id: &str, message: &str) {
        self.inline_errors.insert(id.to_string(), message.to_string());
        self.invalidate();
    }

    pub fn inline_error(&self, id: &str) -> Option<&str> {
        self.inline_errors.get(id).map(String::as_str)
    }

    pub fn inline_errors(&self) -> &HashMap<String, String> {
        &self.inline_errors
    }

    // ----- session / tab -----
    pub fn set_authenticated(&mut self, on: bool) {
        if self.authenticated != on {
            log::info!("[store] authenticated: {} -> {}", self.authenticated, on);
        }
        self.authenticated = on;
        self.invalidate();
    }

    pub fn set_active_tab(&mut self, tab: Tab) {
        self.active_tab = tab;
        self.invalidate();
    }

    /// Demo data on screen outranks a plain quota failure elsewhere
    pub fn banner(&self) -> Option<Banner> {
        if self.demo_mode() {
            Some(Banner::DemoMode)
        } else if self.banners.is_empty() {
            None
        } else {
            Some(Banner::QuotaExceeded)
        }
    }

    pub fn raise_banner(&mut self, source: BannerSource, banner: Banner) {
        if self.banners.insert(source, banner) != Some(banner) {
            self.invalidate();
        }
    }

    pub fn clear_banner(&mut self, source: BannerSource) {
        if self.banners.remove(&source).is_some() {
            self.invalidate();
        }
    }

    // ----- notices -----
    pub fn push_notice(&mut self, level: NoticeLevel, message: impl Into<String>) {
        if self.notices.len() >= MAX_NOTICES {
            self.notices.pop_front();
        }
        self.notices.push_back(Notice {
            level,
            message: message.into(),
            at: Utc::now(),
        });
    }

    pub fn notices(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    // ----- poll health -----
    pub fn poll_health(&self, category: PollCategory) -> PollHealth {
        self.poll_health.get(&category).copied().unwrap_or_default()
    }

    pub fn record_poll_success(&mut self, category: PollCategory) {
        self.poll_health.insert(category, PollHealth::default());
    }

    /// Count one failure; returns true when this failure crossed the threshold
    pub fn record_poll_failure(&mut self, category: PollCategory, threshold: u32) -> bool {
        let health = self.poll_health.entry(category).or_default();
        health.consecutive_failures = health.consecutive_failures.saturating_add(1);
        let crossed = !health.degraded && health.consecutive_failures >= threshold;
        if crossed {
            health.degraded = true;
        }
        crossed
    }

    fn invalidate(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_override_wins() {
        let mut s = ViewStateStore::new(FilterConfig::default(), Some("UCcfg".into()));
        s.replace_threads(Vec::new(), Some("UCpayload".into()));
        assert_eq!(s.owner_id(), Some("UCcfg"));

        let mut s = ViewStateStore::default();
        assert_eq!(s.owner_id(), None);
        s.replace_videos(Vec::new(), Some("UCpayload".into()));
        assert_eq!(s.owner_id(), Some("UCpayload"));
    }

    #[test]
    fn test_filter_setters_invalidate() {
        let mut s = ViewStateStore::default();
        let r0 = s.revision();
        s.set_sort_order(SortOrder::Oldest);
        s.set_show_unreplied_only(true);
        assert_eq!(s.filter().sort_order, SortOrder::Oldest);
        assert!(s.filter().show_unreplied_only);
        assert_eq!(s.revision(), r0 + 2);
    }

    #[test]
    fn test_notice_queue_is_bounded() {
        let mut s = ViewStateStore::default();
        for i in 0..(MAX_NOTICES + 5) {
            s.push_notice(NoticeLevel::Warning, format!("n{i}"));
        }
        let drained = s.drain_notices();
        assert_eq!(drained.len(), MAX_NOTICES);
        assert_eq!(drained[0].message, "n5");
        assert!(s.drain_notices().is_empty());
    }

    #[test]
    fn test_poll_failure_threshold() {
        let mut s = ViewStateStore::default();
        assert!(!s.record_poll_failure(PollCategory::LiveStats, 2));
        assert!(s.record_poll_failure(PollCategory::LiveStats, 2));
        assert!(!s.record_poll_failure(PollCategory::LiveStats, 2));
        assert!(s.poll_health(PollCategory::LiveStats).degraded);
        s.record_poll_success(PollCategory::LiveStats);
        assert_eq!(s.poll_health(PollCategory::LiveStats), PollHealth::default());
    }

    #[test]
    fn test_demo_banner_not_downgraded() {
        let mut s = ViewStateStore::default();
        s.raise_banner(BannerSource::Comments, Banner::DemoMode);
        s.raise_banner(BannerSource::Videos, Banner::QuotaExceeded);
        assert_eq!(s.banner(), Some(Banner::DemoMode));
        assert!(s.demo_mode());

        s.clear_banner(BannerSource::Comments);
        assert!(!s.demo_mode());
        assert_eq!(s.banner(), Some(Banner::QuotaExceeded));
        s.clear_banner(BannerSource::Videos);
        assert_eq!(s.banner(), None);
    }

    #[test]
    fn test_live_stats_deltas() {
        let mut s = ViewStateStore::default();
        let first = s.set_live_stats(
            ChannelStats { subscriber_count: 5, ..Default::default() },
            Utc::now(),
        );
        assert!(!first.any_changed());
        let second = s.set_live_stats(
            ChannelStats { subscriber_count: 8, ..Default::default() },
            Utc::now(),
        );
        assert_eq!(second.subscribers.magnitude, 3);
        assert_eq!(s.live_stats().map(|l| l.stats.subscriber_count), Some(8));
    }
}
