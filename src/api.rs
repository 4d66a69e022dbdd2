//! Remote operations consumed by the engine.
//!
//! `DashboardApi` is the seam the engine talks to; `HttpApi` is the reqwest
//! implementation against the dashboard backend. Session credentials travel
//! as cookies held by the client's cookie store.

use crate::error::ApiError;
use crate::filter::parse_threads;
use crate::types::{
    ActionKind, Analytics, AuthStatus, ChannelStats, CommentThread, HashtagBundle, Listing,
    LoginStart, Video,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;

#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// `GET /auth/status`
    async fn auth_status(&self) -> Result<bool, ApiError>;
    /// `GET /auth/login`, returns the provider URL to redirect to
    async fn login_url(&self) -> Result<String, ApiError>;
    /// `GET /api/comments`; a 429 is reported inside the listing, not as an error
    async fn list_comments(&self) -> Result<Listing<CommentThread>, ApiError>;
    /// `GET /api/videos`; same 429 handling as comments
    async fn list_videos(&self) -> Result<Listing<Video>, ApiError>;
    /// `GET /api/live-stats`
    async fn live_stats(&self) -> Result<ChannelStats, ApiError>;
    /// `GET /api/hashtags`
    async fn hashtags(&self) -> Result<HashtagBundle, ApiError>;
    /// `GET /api/analytics`
    async fn analytics(&self) -> Result<Analytics, ApiError>;
    /// `POST /api/{like,unlike,heart,unheart}`
    async fn toggle(&self, kind: ActionKind, comment_id: &str) -> Result<(), ApiError>;
    /// `POST /api/reply`
    async fn reply(&self, comment_id: &str, text: &str) -> Result<(), ApiError>;
}

pub struct HttpApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpApi {
    pub fn new(base_url: &str, timeout_ms: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .pool_max_idle_per_host(8)
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        log::debug!("[api] GET {path}");
        let res = self.client.get(self.url(path)).send().await?;
        let res = check_status(res).await?;
        res.json::<T>()
            .await
            .map_err(|e| ApiError::Decode(format!("{path}: {e}")))
    }

    async fn post(&self, path: &str, body: Value) -> Result<(), ApiError> {
        log::debug!("[api] POST {path}");
        let res = self.client.post(self.url(path)).json(&body).send().await?;
        check_status(res).await.map(|_| ())
    }

    /// Shared handling for the list endpoints (comments, videos)
    async fn get_listing<T>(
        &self,
        path: &str,
        keys: &[&str],
        parse: fn(&Value) -> Vec<T>,
    ) -> Result<Listing<T>, ApiError> {
        log::debug!("[api] GET {path}");
        let res = self.client.get(self.url(path)).send().await?;

        if res.status() == StatusCode::TOO_MANY_REQUESTS {
            let body: Value = res.json().await.unwrap_or(Value::Null);
            if body.get("is_demo").and_then(Value::as_bool).unwrap_or(false) {
                log::info!("[api] {path}: quota exceeded, demo payload supplied");
                return Ok(Listing {
                    items: parse(pick(&body, keys)),
                    channel_id: channel_id(&body),
                    is_demo: true,
                    quota_exceeded: true,
                });
            }
            log::info!("[api] {path}: quota exceeded");
            return Ok(Listing::quota_exhausted());
        }

        let res = check_status(res).await?;
        let body: Value = res
            .json()
            .await
            .map_err(|e| ApiError::Decode(format!("{path}: {e}")))?;

        Ok(Listing {
            items: parse(pick(&body, keys)),
            channel_id: channel_id(&body),
            is_demo: body.get("is_demo").and_then(Value::as_bool).unwrap_or(false),
            quota_exceeded: false,
        })
    }
}

#[async_trait]
impl DashboardApi for HttpApi {
    async fn auth_status(&self) -> Result<bool, ApiError> {
        let status: AuthStatus = self.get_json("/auth/status").await?;
        Ok(status.authenticated)
    }

    async fn login_url(&self) -> Result<String, ApiError> {
        let start: LoginStart = self.get_json("/auth/login").await?;
        Ok(start.auth_url)
    }

    async fn list_comments(&self) -> Result<Listing<CommentThread>, ApiError> {
        self.get_listing("/api/comments", &["items", "comments"], parse_threads)
            .await
    }

    async fn list_videos(&self) -> Result<Listing<Video>, ApiError> {
        self.get_listing("/api/videos", &["videos"], parse_items::<Video>)
            .await
    }

    async fn live_stats(&self) -> Result<ChannelStats, ApiError> {
        self.get_json("/api/live-stats").await
    }

    async fn hashtags(&self) -> Result<HashtagBundle, ApiError> {
        self.get_json("/api/hashtags").await
    }

    async fn analytics(&self) -> Result<Analytics, ApiError> {
        self.get_json("/api/analytics").await
    }

    async fn toggle(&self, kind: ActionKind, comment_id: &str) -> Result<(), ApiError> {
        self.post(kind.path(), json!({ "commentId": comment_id })).await
    }

    async fn reply(&self, comment_id: &str, text: &str) -> Result<(), ApiError> {
        self.post(
            ActionKind::Reply.path(),
            json!({ "commentId": comment_id, "replyText": text }),
        )
        .await
    }
}

/// Map non-2xx responses onto `ApiError`, passing successes through
async fn check_status(res: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized);
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(ApiError::QuotaExceeded { demo: false });
    }

    let text = res.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| {
            if text.is_empty() {
                status.canonical_reason().unwrap_or("unknown error").to_string()
            } else {
                text
            }
        });
    log::warn!("[api] http {}: {}", status.as_u16(), message);
    Err(ApiError::Status {
        code: status.as_u16(),
        message,
    })
}

fn pick<'a>(body: &'a Value, keys: &[&str]) -> &'a Value {
    keys.iter()
        .find_map(|k| body.get(*k))
        .unwrap_or(&Value::Null)
}

fn channel_id(body: &Value) -> Option<String> {
    body.get("channelId")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Decode a list, dropping entries that fail to parse
fn parse_items<T: DeserializeOwned>(raw: &Value) -> Vec<T> {
    let Some(items) = raw.as_array() else {
        log::warn!("[api] expected a list payload");
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match serde_json::from_value::<T>(item.clone()) {
            Ok(v) => Some(v),
            Err(e) => {
                log::warn!("[api] skipping malformed entry: {e}");
                None
            }
        })
        .collect()
}
