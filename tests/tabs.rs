//! Tab switching, session bootstrap and the derived comment view

mod common;

use common::{settle, settle_for, stats, thread, FakeApi, OWNER};
use echotube::error::ApiError;
use echotube::poller::PollCategory;
use echotube::store::{self, Banner};
use echotube::tabs::Tab;
use echotube::types::{Listing, SortOrder};
use echotube::{Config, Dashboard};
use std::sync::Arc;

fn dashboard(api: FakeApi) -> (Dashboard, Arc<FakeApi>) {
    let api = Arc::new(api);
    (Dashboard::new(Config::default(), api.clone()), api)
}

fn ids(dash: &Dashboard) -> Vec<String> {
    dash.visible_threads()
        .iter()
        .map(|t| t.comment_id().to_string())
        .collect()
}

#[tokio::test(start_paused = true)]
async fn timer_is_armed_only_while_its_tab_is_active() {
    let (dash, _api) = dashboard(FakeApi::new());
    let walk = [
        Tab::Live,
        Tab::Hashtags,
        Tab::Comments,
        Tab::Live,
        Tab::Live,
        Tab::Videos,
        Tab::Hashtags,
        Tab::Comments,
    ];

    for tab in walk {
        dash.select_tab(tab);
        settle().await;
        assert_eq!(dash.active_tab(), tab);
        let expected: Vec<PollCategory> = tab.poll_category().into_iter().collect();
        assert_eq!(dash.scheduler().armed_categories(), expected, "after selecting {tab}");
    }
}

#[tokio::test(start_paused = true)]
async fn reselecting_live_keeps_single_timer() {
    let (dash, api) = dashboard(FakeApi::new());
    dash.select_tab(Tab::Live);
    dash.select_tab(Tab::Live);
    settle().await;

    assert_eq!(dash.scheduler().armed_count(), 1);
    assert_eq!(api.count("live_stats"), 1);
    settle_for(30_000).await;
    assert_eq!(api.count("live_stats"), 2);
}

#[tokio::test(start_paused = true)]
async fn leaving_live_discards_in_flight_fetch() {
    let api = FakeApi::new().with_live_stats(vec![Ok(stats(500))]);
    let gate = api.hold("live_stats");
    let (dash, api) = dashboard(api);

    dash.select_tab(Tab::Live);
    settle().await;
    assert_eq!(api.count("live_stats"), 1);

    dash.select_tab(Tab::Comments);
    gate.add_permits(1);
    settle().await;

    assert!(store::lock(dash.store()).live_stats().is_none());
    assert!(!dash.scheduler().is_armed(PollCategory::LiveStats));
}

#[tokio::test]
async fn owner_comments_hidden_and_sorted_newest_first() {
    let threads = vec![
        thread("A", OWNER, 10, 0, 0),
        thread("B", "UCfan1", 20, 0, 0),
        thread("C", "UCfan2", 5, 0, 0),
    ];
    let (dash, _api) = dashboard(FakeApi::new().with_threads(threads));
    dash.refresh_comments().await.unwrap();

    assert_eq!(ids(&dash), ["B", "C"]);

    dash.set_hide_owner_comments(false);
    assert_eq!(ids(&dash), ["B", "A", "C"]);

    dash.set_sort_order(SortOrder::Oldest);
    assert_eq!(ids(&dash), ["C", "A", "B"]);
}

#[tokio::test]
async fn unreplied_filter_composes_with_owner_filter() {
    let threads = vec![
        thread("A", OWNER, 1, 0, 0),
        thread("B", "UCfan", 2, 3, 0),
        thread("C", "UCfan", 3, 0, 0),
    ];
    let (dash, _api) = dashboard(FakeApi::new().with_threads(threads));
    dash.refresh_comments().await.unwrap();

    dash.set_show_unreplied_only(true);
    assert_eq!(ids(&dash), ["C"]);

    dash.set_hide_owner_comments(false);
    assert_eq!(ids(&dash), ["C", "A"]);
}

#[tokio::test]
async fn snapshot_lists_comments_only_on_comments_tab() {
    let (dash, _api) = dashboard(FakeApi::new().with_threads(vec![thread("B", "UCfan", 1, 0, 0)]));
    dash.refresh_comments().await.unwrap();
    assert_eq!(dash.snapshot().comments.len(), 1);

    dash.select_tab(Tab::Videos);
    let snap = dash.snapshot();
    assert!(snap.comments.is_empty());
    assert_eq!(snap.total_comments, 1);
}

#[tokio::test]
async fn bootstrap_without_session_loads_nothing() {
    let api = FakeApi::new();
    *api.authenticated.lock().unwrap() = false;
    let (dash, api) = dashboard(api);

    assert!(!dash.bootstrap().await);
    assert!(!dash.is_authenticated());
    assert_eq!(api.calls(), ["auth_status"]);
    assert!(dash.login_url().await.unwrap().starts_with("https://"));
}

#[tokio::test]
async fn bootstrap_loads_lists_then_analytics() {
    let (dash, api) = dashboard(FakeApi::new().with_threads(vec![thread("B", "UCfan", 1, 0, 0)]));

    assert!(dash.bootstrap().await);
    let calls = api.calls();
    assert_eq!(calls[0], "auth_status");
    assert!(calls[1..3].contains(&"comments".to_string()));
    assert!(calls[1..3].contains(&"videos".to_string()));
    assert_eq!(calls[3], "analytics");
    assert!(store::lock(dash.store()).analytics().is_some());
    assert_eq!(store::lock(dash.store()).owner_id(), Some(OWNER));
}

#[tokio::test]
async fn demo_payload_sets_demo_banner() {
    let api = FakeApi::new();
    *api.comments.lock().unwrap() = Some(Ok(Listing {
        items: vec![thread("B", "UCdemo", 1, 0, 0)],
        channel_id: None,
        is_demo: true,
        quota_exceeded: true,
    }));
    *api.videos.lock().unwrap() = Some(Ok(Listing::quota_exhausted()));
    let (dash, _api) = dashboard(api);

    dash.refresh_comments().await.unwrap();
    assert!(dash.refresh_videos().await.is_err());

    let s = store::lock(dash.store());
    assert!(s.demo_mode());
    assert_eq!(s.banner(), Some(Banner::DemoMode));
    assert_eq!(s.threads().len(), 1);
}

#[tokio::test]
async fn demo_comments_keep_banner_after_videos_load() {
    let api = FakeApi::new();
    *api.comments.lock().unwrap() = Some(Ok(Listing {
        items: vec![thread("B", "UCdemo", 1, 0, 0)],
        channel_id: None,
        is_demo: true,
        quota_exceeded: true,
    }));
    let (dash, api) = dashboard(api);

    dash.refresh_comments().await.unwrap();
    dash.refresh_videos().await.unwrap();
    {
        let s = store::lock(dash.store());
        assert!(s.demo_mode());
        assert_eq!(s.banner(), Some(Banner::DemoMode));
        assert_eq!(s.threads().len(), 1);
    }

    // Only a normal comment listing retires the demo banner.
    *api.comments.lock().unwrap() = None;
    dash.refresh_comments().await.unwrap();
    let s = store::lock(dash.store());
    assert!(!s.demo_mode());
    assert_eq!(s.banner(), None);
}

#[tokio::test]
async fn quota_without_demo_keeps_previous_threads() {
    let (dash, api) = dashboard(FakeApi::new().with_threads(vec![thread("B", "UCfan", 1, 0, 0)]));
    dash.refresh_comments().await.unwrap();

    *api.comments.lock().unwrap() = Some(Ok(Listing::quota_exhausted()));
    assert!(dash.refresh_comments().await.is_err());

    let s = store::lock(dash.store());
    assert_eq!(s.banner(), Some(Banner::QuotaExceeded));
    assert_eq!(s.threads().len(), 1);
}

#[tokio::test]
async fn failed_analytics_surfaces_notice() {
    let api = FakeApi::new();
    *api.analytics.lock().unwrap() = Some(Err(ApiError::Transport("timeout".into())));
    let (dash, _api) = dashboard(api);

    assert!(dash.fetch_analytics().await.is_err());
    let notices = dash.drain_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].message, "Failed to fetch analytics data.");
}
