//! Scripted in-memory backend shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use echotube::api::DashboardApi;
use echotube::error::ApiError;
use echotube::types::{
    ActionKind, Analytics, ChannelStats, CommentThread, HashtagBundle, Listing, Video,
};
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

pub const OWNER: &str = "UCowner";

/// Build a thread the way the backend sends it
pub fn thread(id: &str, author: &str, published_secs: i64, replies: u64, likes: u64) -> CommentThread {
    let published = chrono::DateTime::from_timestamp(1_700_000_000 + published_secs, 0)
        .unwrap()
        .to_rfc3339();
    serde_json::from_value(json!({
        "id": format!("t-{id}"),
        "snippet": {
            "videoId": "vid1",
            "totalReplyCount": replies,
            "topLevelComment": {
                "id": id,
                "snippet": {
                    "authorChannelId": { "value": author },
                    "authorDisplayName": author,
                    "textDisplay": format!("comment {id}"),
                    "publishedAt": published,
                    "likeCount": likes
                }
            }
        }
    }))
    .unwrap()
}

pub fn stats(subscribers: u64) -> ChannelStats {
    ChannelStats {
        subscriber_count: subscribers,
        view_count: subscribers * 100,
        video_count: 10,
        channel_name: "Test Channel".into(),
        channel_thumbnail: String::new(),
    }
}

pub fn listing<T>(items: Vec<T>) -> Listing<T> {
    Listing {
        items,
        channel_id: Some(OWNER.to_string()),
        is_demo: false,
        quota_exceeded: false,
    }
}

/// Let spawned tasks run; with a paused clock this also advances time by `ms`
pub async fn settle_for(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

pub async fn settle() {
    settle_for(5).await;
}

#[derive(Default)]
pub struct FakeApi {
    pub authenticated: Mutex<bool>,
    pub comments: Mutex<Option<Result<Listing<CommentThread>, ApiError>>>,
    pub videos: Mutex<Option<Result<Listing<Video>, ApiError>>>,
    pub analytics: Mutex<Option<Result<Analytics, ApiError>>>,
    pub hashtags: Mutex<Option<Result<HashtagBundle, ApiError>>>,
    /// Popped per call; when empty the last answer is `Ok(stats(0))`
    pub live_stats: Mutex<VecDeque<Result<ChannelStats, ApiError>>>,
    /// Popped per toggle call; when empty the toggle succeeds
    pub toggle_results: Mutex<VecDeque<Result<(), ApiError>>>,
    pub reply_result: Mutex<Option<Result<(), ApiError>>>,
    gates: Mutex<HashMap<&'static str, Arc<Semaphore>>>,
    calls: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn new() -> Self {
        let api = Self::default();
        *api.authenticated.lock().unwrap() = true;
        api
    }

    pub fn with_threads(self, threads: Vec<CommentThread>) -> Self {
        *self.comments.lock().unwrap() = Some(Ok(listing(threads)));
        self
    }

    pub fn with_live_stats(self, answers: Vec<Result<ChannelStats, ApiError>>) -> Self {
        *self.live_stats.lock().unwrap() = answers.into();
        self
    }

    pub fn fail_next_toggle(&self, err: ApiError) {
        self.toggle_results.lock().unwrap().push_back(Err(err));
    }

    /// Block every future call to `endpoint` until permits are added
    pub fn hold(&self, endpoint: &'static str) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.gates.lock().unwrap().insert(endpoint, Arc::clone(&gate));
        gate
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, endpoint: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == endpoint).count()
    }

    async fn enter(&self, endpoint: &'static str) {
        self.calls.lock().unwrap().push(endpoint.to_string());
        let gate = self.gates.lock().unwrap().get(endpoint).cloned();
        if let Some(gate) = gate {
            gate.acquire().await.unwrap().forget();
        }
    }
}

#[async_trait]
impl DashboardApi for FakeApi {
    async fn auth_status(&self) -> Result<bool, ApiError> {
        self.enter("auth_status").await;
        Ok(*self.authenticated.lock().unwrap())
    }

    async fn login_url(&self) -> Result<String, ApiError> {
        self.enter("login_url").await;
        Ok("https://accounts.example/o/oauth2/auth?client_id=test".to_string())
    }

    async fn list_comments(&self) -> Result<Listing<CommentThread>, ApiError> {
        self.enter("comments").await;
        self.comments
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Ok(listing(Vec::new())))
    }

    async fn list_videos(&self) -> Result<Listing<Video>, ApiError> {
        self.enter("videos").await;
        self.videos
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Ok(listing(Vec::new())))
    }

    async fn live_stats(&self) -> Result<ChannelStats, ApiError> {
        self.enter("live_stats").await;
        self.live_stats
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(stats(0)))
    }

    async fn hashtags(&self) -> Result<HashtagBundle, ApiError> {
        self.enter("hashtags").await;
        self.hashtags
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Ok(HashtagBundle::default()))
    }

    async fn analytics(&self) -> Result<Analytics, ApiError> {
        self.enter("analytics").await;
        self.analytics
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Ok(Analytics::default()))
    }

    async fn toggle(&self, kind: ActionKind, _comment_id: &str) -> Result<(), ApiError> {
        self.enter(kind.verb()).await;
        self.toggle_results.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }

    async fn reply(&self, _comment_id: &str, _text: &str) -> Result<(), ApiError> {
        self.enter("reply").await;
        self.reply_result.lock().unwrap().clone().unwrap_or(Ok(()))
    }
}
