//! Serializable view of the dashboard for renderers.
//!
//! One-way data flow: the engine builds a `DashboardSnapshot` from the store
//! and the renderer (or the CLI) prints / draws it. Nothing here is read back.

use crate::constants::app::DEFAULT_VIDEO_THUMBNAIL;
use crate::delta::StatDeltas;
use crate::poller::PollCategory;
use crate::store::{PollHealth, ViewStateStore};
use crate::tabs::Tab;
use crate::types::{
    Analytics, CommentThread, FilterConfig, HashtagBundle, MonetizationStatus, Video,
};
use crate::util_text::{comment_permalink, format_duration, format_number, format_relative};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub tab: Tab,
    pub authenticated: bool,
    pub demo_mode: bool,
    pub banner: Option<BannerView>,
    pub filter: FilterConfig,
    pub revision: u64,

    /// Comments after filtering; only populated while the Comments tab is active
    pub comments: Vec<CommentRow>,
    /// Threads held before filtering
    pub total_comments: usize,
    pub videos: Vec<VideoRow>,
    pub live: Option<LiveView>,
    pub hashtags: Option<HashtagBundle>,
    pub analytics: Option<Analytics>,
    pub polling: Vec<PollStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BannerView {
    pub kind: crate::store::Banner,
    pub message: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentRow {
    pub thread_id: String,
    pub comment_id: String,
    pub author: String,
    pub author_avatar: String,
    pub text: String,
    pub published: String,
    pub like_count: u64,
    pub liked: bool,
    pub hearted: bool,
    pub reply_count: u64,
    pub video_title: String,
    pub video_thumbnail: String,
    pub permalink: String,
    pub reply_draft: String,
    pub inline_error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VideoRow {
    pub id: String,
    pub title: String,
    pub thumbnail: Option<String>,
    pub published: String,
    pub views: String,
    pub likes: String,
    pub comments: String,
    pub duration: String,
    pub monetization: MonetizationStatus,
    pub estimated_earnings: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LiveView {
    pub channel_name: String,
    pub channel_thumbnail: String,
    pub subscribers: String,
    pub views: String,
    pub videos: String,
    pub deltas: Option<StatDeltas>,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PollStatus {
    pub category: PollCategory,
    pub armed: bool,
    #[serde(flatten)]
    pub health: PollHealth,
}

impl DashboardSnapshot {
    /// Build from the store. `armed` lists the categories whose timers are
    /// currently running; `now` anchors the relative timestamps.
    pub fn build(store: &ViewStateStore, armed: &[PollCategory], now: DateTime<Utc>) -> Self {
        let comments = if store.active_tab() == Tab::Comments {
            store
                .visible_threads()
                .iter()
                .map(|t| comment_row(store, t, now))
                .collect()
        } else {
            Vec::new()
        };

        let live = store.live_stats().map(|snap| LiveView {
            channel_name: snap.stats.channel_name.clone(),
            channel_thumbnail: snap.stats.channel_thumbnail.clone(),
            subscribers: format_number(snap.stats.subscriber_count),
            views: format_number(snap.stats.view_count),
            videos: format_number(snap.stats.video_count),
            deltas: store.last_deltas().copied(),
            fetched_at: snap.fetched_at,
        });

        let polling = PollCategory::ALL
            .into_iter()
            .map(|category| PollStatus {
                category,
                armed: armed.contains(&category),
                health: store.poll_health(category),
            })
            .collect();

        Self {
            tab: store.active_tab(),
            authenticated: store.is_authenticated(),
            demo_mode: store.demo_mode(),
            banner: store.banner().map(|kind| BannerView {
                kind,
                message: kind.message(),
            }),
            filter: store.filter(),
            revision: store.revision(),
            comments,
            total_comments: store.threads().len(),
            videos: store.videos().iter().map(|v| video_row(v, now)).collect(),
            live,
            hashtags: store.hashtags().cloned(),
            analytics: store.analytics().cloned(),
            polling,
        }
    }
}

fn comment_row(store: &ViewStateStore, t: &CommentThread, now: DateTime<Utc>) -> CommentRow {
    let c = &t.snippet.top_level_comment.snippet;
    let details = t.video_details.as_ref();
    CommentRow {
        thread_id: t.id.clone(),
        comment_id: t.comment_id().to_string(),
        author: c.author_display_name.clone(),
        author_avatar: c.author_profile_image_url.clone(),
        text: c.text_display.clone(),
        published: format_relative(c.published_at, now),
        like_count: c.like_count,
        liked: c.liked,
        hearted: c.hearted,
        reply_count: t.reply_count(),
        video_title: details.map(|d| d.title.clone()).unwrap_or_default(),
        video_thumbnail: details
            .and_then(|d| d.thumbnails.as_ref())
            .and_then(|th| th.medium.as_ref())
            .map(|m| m.url.clone())
            .unwrap_or_else(|| DEFAULT_VIDEO_THUMBNAIL.to_string()),
        permalink: comment_permalink(&t.snippet.video_id, t.comment_id()),
        reply_draft: store.reply_draft(t.comment_id()).to_string(),
        inline_error: store.inline_error(t.comment_id()).map(str::to_string),
    }
}

fn video_row(v: &Video, now: DateTime<Utc>) -> VideoRow {
    VideoRow {
        id: v.id.clone(),
        title: v.title.clone(),
        thumbnail: v.thumbnail.as_ref().map(|t| t.url().to_string()),
        published: format_relative(v.published_at, now),
        views: format_number(v.view_count),
        likes: format_number(v.like_count),
        comments: format_number(v.comment_count),
        duration: v
            .duration
            .as_deref()
            .map(format_duration)
            .unwrap_or_else(|| "00:00".to_string()),
        monetization: v.monetization_status,
        estimated_earnings: v.estimated_earnings,
    }
}
