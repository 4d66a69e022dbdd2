//! Tab selection and the polling timers each tab owns.

use crate::poller::{PollCategory, PollingScheduler};
use crate::store::{self, SharedStore};
use crate::types::SortOrder;
use anyhow::{anyhow, Result};
use serde::Serialize;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Comments,
    Videos,
    Live,
    Hashtags,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Comments, Tab::Videos, Tab::Live, Tab::Hashtags];

    pub fn as_str(self) -> &'static str {
        match self {
            Tab::Comments => "comments",
            Tab::Videos => "videos",
            Tab::Live => "live",
            Tab::Hashtags => "hashtags",
        }
    }

    /// Polling category this tab keeps armed while active
    pub fn poll_category(self) -> Option<PollCategory> {
        PollCategory::ALL.into_iter().find(|c| c.owner_tab() == self)
    }
}

impl FromStr for Tab {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "comments" => Ok(Tab::Comments),
            "videos" => Ok(Tab::Videos),
            "live" | "live-stats" => Ok(Tab::Live),
            "hashtags" | "trends" => Ok(Tab::Hashtags),
            other => Err(anyhow!(
                "Invalid tab: '{}' (expected comments, videos, live or hashtags)",
                other
            )),
        }
    }
}

impl std::fmt::Display for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Active-view state machine. Owns the scheduler so that a polling handle is
/// armed exactly while its tab is showing.
pub struct TabController {
    store: SharedStore,
    scheduler: PollingScheduler,
}

impl TabController {
    pub fn new(store: SharedStore, scheduler: PollingScheduler) -> Self {
        Self { store, scheduler }
    }

    pub fn scheduler(&self) -> &PollingScheduler { &self.scheduler }

    pub fn active(&self) -> Tab {
        store::lock(&self.store).active_tab()
    }

    /// Switch to `tab`. Timers of the tab being left are disarmed before the
    /// new tab's timer is armed and before this returns, so any result still
    /// in flight for the old tab is discarded on arrival.
    pub fn select(&self, tab: Tab) {
        let from = self.active();

        for category in PollCategory::ALL {
            if category.owner_tab() != tab {
                self.scheduler.stop(category);
            }
        }
        // Invalidate the derived view before the first fetch can land.
        store::lock(&self.store).set_active_tab(tab);
        if let Some(category) = tab.poll_category() {
            self.scheduler.start(category);
        }

        if from != tab {
            log::info!("[tabs] {} -> {}", from, tab);
        }
    }

    /// Leave every polled view; used on logout and shutdown
    pub fn park(&self) {
        self.scheduler.stop_all();
    }

    pub fn set_hide_owner_comments(&self, on: bool) {
        store::lock(&self.store).set_hide_owner_comments(on);
    }

    pub fn set_show_unreplied_only(&self, on: bool) {
        store::lock(&self.store).set_show_unreplied_only(on);
    }

    pub fn set_sort_order(&self, order: SortOrder) {
        store::lock(&self.store).set_sort_order(order);
    }
}
