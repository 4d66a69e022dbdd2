use crate::api::DashboardApi;
use crate::config::Config;
use crate::constants::messages;
use crate::error::{ApiError, EngineError};
use crate::mutation::MutationManager;
use crate::poller::PollingScheduler;
use crate::session;
use crate::store::{self, Banner, BannerSource, Notice, NoticeLevel, SharedStore, ViewStateStore};
use crate::tabs::{Tab, TabController};
use crate::types::{ActionKind, CommentThread, Listing, SortOrder};
use crate::ui_snapshot::DashboardSnapshot;
use chrono::Utc;
use std::sync::Arc;

/// Engine facade: one per session. Owns the store and every component that
/// writes to it; renderers only see snapshots and notices.
pub struct Dashboard {
    config: Config,
    store: SharedStore,
    api: Arc<dyn DashboardApi>,
    mutations: MutationManager,
    tabs: TabController,
}

impl Dashboard {
    pub fn new(config: Config, api: Arc<dyn DashboardApi>) -> Self {
        let store =
            ViewStateStore::new(config.filter_config(), config.owner_channel_id.clone()).shared();
        let scheduler = PollingScheduler::new(
            Arc::clone(&store),
            Arc::clone(&api),
            config.poll_settings(),
        );
        Self {
            mutations: MutationManager::new(Arc::clone(&store), Arc::clone(&api)),
            tabs: TabController::new(Arc::clone(&store), scheduler),
            config,
            store,
            api,
        }
    }

    pub fn config(&self) -> &Config { &self.config }
    pub fn store(&self) -> &SharedStore { &self.store }
    pub fn scheduler(&self) -> &PollingScheduler { self.tabs.scheduler() }
    pub fn mutations(&self) -> &MutationManager { &self.mutations }
    pub fn active_tab(&self) -> Tab { self.tabs.active() }
    pub fn is_authenticated(&self) -> bool { store::lock(&self.store).is_authenticated() }

    /// Session start: auth check, then comments and videos together, then
    /// the analytics summary once. Returns whether the session is logged in.
    pub async fn bootstrap(&self) -> bool {
        let authenticated = session::check_auth_status(self.api.as_ref()).await;
        store::lock(&self.store).set_authenticated(authenticated);
        if !authenticated {
            log::info!("[app] not logged in, waiting for login");
            return false;
        }

        let (comments, videos) = futures::join!(self.refresh_comments(), self.refresh_videos());
        if let Err(e) = comments {
            log::warn!("[app] initial comment load failed: {e}");
        }
        if let Err(e) = videos {
            log::warn!("[app] initial video load failed: {e}");
        }
        if let Err(e) = self.fetch_analytics().await {
            log::warn!("[app] analytics unavailable: {e}");
        }

        // Re-enter the current tab so a polled view starts its timer.
        self.tabs.select(self.tabs.active());
        true
    }

    pub async fn login_url(&self) -> anyhow::Result<String> {
        session::login_url(self.api.as_ref()).await
    }

    pub async fn refresh_comments(&self) -> Result<(), EngineError> {
        let outcome = self.api.list_comments().await;
        let mut s = store::lock(&self.store);
        match outcome {
            Ok(listing) => {
                let listing = apply_listing_flags(&mut s, listing, BannerSource::Comments)?;
                log::info!("[app] loaded {} comment threads", listing.items.len());
                s.replace_threads(listing.items, listing.channel_id);
                Ok(())
            }
            Err(e) => Err(fetch_failed(&mut s, &e, BannerSource::Comments, "comments", messages::COMMENTS_FAILED)),
        }
    }

    pub async fn refresh_videos(&self) -> Result<(), EngineError> {
        let outcome = self.api.list_videos().await;
        let mut s = store::lock(&self.store);
        match outcome {
            Ok(listing) => {
                let listing = apply_listing_flags(&mut s, listing, BannerSource::Videos)?;
                log::info!("[app] loaded {} videos", listing.items.len());
                s.replace_videos(listing.items, listing.channel_id);
                Ok(())
            }
            Err(e) => Err(fetch_failed(&mut s, &e, BannerSource::Videos, "videos", messages::VIDEOS_FAILED)),
        }
    }

    pub async fn fetch_analytics(&self) -> Result<(), EngineError> {
        let outcome = self.api.analytics().await;
        let mut s = store::lock(&self.store);
        match outcome {
            Ok(analytics) => {
                s.clear_banner(BannerSource::Analytics);
                s.set_analytics(analytics);
                Ok(())
            }
            Err(e) => Err(fetch_failed(&mut s, &e, BannerSource::Analytics, "analytics", messages::ANALYTICS_FAILED)),
        }
    }

    pub fn select_tab(&self, tab: Tab) {
        self.tabs.select(tab);
    }

    pub async fn toggle_like(&self, comment_id: &str) -> Result<ActionKind, EngineError> {
        self.mutations.toggle_like(comment_id).await
    }

    pub async fn toggle_heart(&self, comment_id: &str) -> Result<ActionKind, EngineError> {
        self.mutations.toggle_heart(comment_id).await
    }

    pub fn set_reply_draft(&self, comment_id: &str, text: impl Into<String>) {
        store::lock(&self.store).set_reply_draft(comment_id, text.into());
    }

    /// Post the draft for `comment_id`; on success the thread list is reloaded
    /// so the new reply count shows up.
    pub async fn reply(&self, comment_id: &str) -> Result<(), EngineError> {
        self.mutations.reply(comment_id).await?;
        if let Err(e) = self.refresh_comments().await {
            log::warn!("[app] refresh after reply failed: {e}");
        }
        Ok(())
    }

    pub fn set_hide_owner_comments(&self, on: bool) {
        self.tabs.set_hide_owner_comments(on);
    }

    pub fn set_show_unreplied_only(&self, on: bool) {
        self.tabs.set_show_unreplied_only(on);
    }

    pub fn set_sort_order(&self, order: SortOrder) {
        self.tabs.set_sort_order(order);
    }

    pub fn visible_threads(&self) -> Vec<CommentThread> {
        store::lock(&self.store).visible_threads()
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        let armed = self.scheduler().armed_categories();
        let s = store::lock(&self.store);
        DashboardSnapshot::build(&s, &armed, Utc::now())
    }

    pub fn drain_notices(&self) -> Vec<Notice> {
        store::lock(&self.store).drain_notices()
    }

    /// Stop every timer; the dashboard stays usable for one-shot calls
    pub fn shutdown(&self) {
        log::info!("[app] shutting down polling");
        self.tabs.park();
    }
}

/// Translate the 429 / demo flags of a list payload into this listing's banner.
/// A plain quota failure keeps the previous data and yields an error; a normal
/// payload clears only this listing's banner.
fn apply_listing_flags<T>(
    s: &mut ViewStateStore,
    listing: Listing<T>,
    source: BannerSource,
) -> Result<Listing<T>, EngineError> {
    if listing.is_demo {
        if s.banner() != Some(Banner::DemoMode) {
            log::info!("[app] {source:?}: serving demo data");
        }
        s.raise_banner(source, Banner::DemoMode);
        return Ok(listing);
    }
    if listing.quota_exceeded {
        log::warn!("[app] {source:?}: quota exceeded, keeping previous data");
        s.raise_banner(source, Banner::QuotaExceeded);
        return Err(EngineError::QuotaExceeded);
    }
    s.clear_banner(source);
    Ok(listing)
}

/// Classify a failed one-shot fetch and record it for the user
fn fetch_failed(
    s: &mut ViewStateStore,
    err: &ApiError,
    source: BannerSource,
    category: &'static str,
    message: &str,
) -> EngineError {
    log::error!("[app] {category} fetch failed: {err}");
    let classified = EngineError::from_fetch(err, category);
    match &classified {
        EngineError::Unauthenticated => s.set_authenticated(false),
        EngineError::QuotaExceeded => s.raise_banner(source, Banner::QuotaExceeded),
        _ => s.push_notice(NoticeLevel::Error, message),
    }
    classified
}
