use crate::util_text::{de_lenient_datetime, de_lenient_f64, de_lenient_u64};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ----- comments -----

/// A top-level comment plus reply-count metadata and denormalized video context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentThread {
    pub id: String,
    pub snippet: ThreadSnippet,
    #[serde(default)]
    pub video_details: Option<VideoDetails>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadSnippet {
    #[serde(default)]
    pub video_id: String,
    #[serde(default, deserialize_with = "de_lenient_u64")]
    pub total_reply_count: u64,
    pub top_level_comment: TopLevelComment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopLevelComment {
    pub id: String,
    pub snippet: CommentSnippet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentSnippet {
    #[serde(default)]
    pub author_channel_id: Option<AuthorChannelId>,
    #[serde(default)]
    pub author_display_name: String,
    #[serde(default)]
    pub author_profile_image_url: String,
    #[serde(default)]
    pub text_display: String,
    #[serde(default, deserialize_with = "de_lenient_datetime")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de_lenient_u64")]
    pub like_count: u64,
    /// Local view of whether the channel owner liked this comment
    #[serde(default)]
    pub liked: bool,
    #[serde(default)]
    pub hearted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorChannelId {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VideoDetails {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub thumbnails: Option<Thumbnails>,
    #[serde(default)]
    pub statistics: Option<VideoStatistics>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Thumbnails {
    #[serde(default)]
    pub medium: Option<SizedThumbnail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizedThumbnail {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatistics {
    #[serde(default, deserialize_with = "de_lenient_u64")]
    pub view_count: u64,
    #[serde(default, deserialize_with = "de_lenient_u64")]
    pub like_count: u64,
}

/// The fields an optimistic like/heart toggle touches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActionState {
    pub liked: bool,
    pub hearted: bool,
    pub like_count: u64,
}

impl CommentThread {
    /// Id used by the mutation endpoints (the top-level comment's id)
    pub fn comment_id(&self) -> &str {
        &self.snippet.top_level_comment.id
    }

    pub fn author_id(&self) -> Option<&str> {
        self.snippet
            .top_level_comment
            .snippet
            .author_channel_id
            .as_ref()
            .map(|a| a.value.as_str())
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.snippet.top_level_comment.snippet.published_at
    }

    pub fn reply_count(&self) -> u64 {
        self.snippet.total_reply_count
    }

    pub fn action_state(&self) -> ActionState {
        let s = &self.snippet.top_level_comment.snippet;
        ActionState {
            liked: s.liked,
            hearted: s.hearted,
            like_count: s.like_count,
        }
    }

    pub fn set_action_state(&mut self, state: ActionState) {
        let s = &mut self.snippet.top_level_comment.snippet;
        s.liked = state.liked;
        s.hearted = state.hearted;
        s.like_count = state.like_count;
    }

    /// Thread id or top-level comment id; the UI addresses comments by either
    pub fn matches_id(&self, id: &str) -> bool {
        self.id == id || self.comment_id() == id
    }
}

// ----- videos -----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub thumbnail: Option<Thumbnail>,
    #[serde(default, deserialize_with = "de_lenient_datetime")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de_lenient_u64")]
    pub view_count: u64,
    #[serde(default, deserialize_with = "de_lenient_u64")]
    pub like_count: u64,
    #[serde(default, deserialize_with = "de_lenient_u64")]
    pub comment_count: u64,
    /// ISO 8601 duration, e.g. `PT4M13S`
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub monetization_status: MonetizationStatus,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub estimated_earnings: f64,
}

/// The backend sends either a bare URL or a sized thumbnail object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Thumbnail {
    Url(String),
    Sized(SizedThumbnail),
}

impl Thumbnail {
    pub fn url(&self) -> &str {
        match self {
            Thumbnail::Url(u) => u,
            Thumbnail::Sized(t) => &t.url,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonetizationStatus {
    Monetized,
    Limited,
    Demonetized,
    #[default]
    #[serde(other)]
    None,
}

// ----- live stats / analytics -----

/// Full channel counters snapshot; every fetch replaces the previous one
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStats {
    #[serde(default, deserialize_with = "de_lenient_u64")]
    pub subscriber_count: u64,
    #[serde(default, deserialize_with = "de_lenient_u64")]
    pub view_count: u64,
    #[serde(default, deserialize_with = "de_lenient_u64")]
    pub video_count: u64,
    #[serde(default)]
    pub channel_name: String,
    #[serde(default)]
    pub channel_thumbnail: String,
}

/// Channel stats stamped with the moment they arrived
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub stats: ChannelStats,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    #[serde(default)]
    pub monetized: bool,
    #[serde(default, deserialize_with = "de_lenient_u64")]
    pub total_views: u64,
    #[serde(default, deserialize_with = "de_lenient_u64")]
    pub subscribers: u64,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub total_earnings: f64,
}

// ----- hashtags -----

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HashtagBundle {
    #[serde(default)]
    pub hashtags: HashtagCategories,
    #[serde(default)]
    pub channel_topics: Vec<String>,
    #[serde(default, deserialize_with = "de_lenient_datetime")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HashtagCategories {
    #[serde(default)]
    pub trending: Vec<HashtagEntry>,
    #[serde(default)]
    pub popular: Vec<HashtagEntry>,
    #[serde(default)]
    pub growing: Vec<HashtagEntry>,
    #[serde(default)]
    pub niche: Vec<HashtagEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HashtagEntry {
    #[serde(alias = "tag")]
    pub hashtag: String,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub score: f64,
    #[serde(default, deserialize_with = "de_lenient_u64")]
    pub usage_count: u64,
    #[serde(default, deserialize_with = "de_lenient_u64")]
    pub avg_views: u64,
    #[serde(default, deserialize_with = "de_lenient_u64")]
    pub avg_likes: u64,
    #[serde(default)]
    pub example_videos: Vec<ExampleVideo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleVideo {
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "de_lenient_u64")]
    pub views: u64,
    #[serde(default, deserialize_with = "de_lenient_u64")]
    pub likes: u64,
}

// ----- filter configuration -----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

impl std::str::FromStr for SortOrder {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "newest" => Ok(SortOrder::Newest),
            "oldest" => Ok(SortOrder::Oldest),
            _ => Err(anyhow::anyhow!(
                "Invalid sort order '{s}'. Valid options: newest, oldest"
            )),
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortOrder::Newest => write!(f, "newest"),
            SortOrder::Oldest => write!(f, "oldest"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterConfig {
    pub hide_owner_comments: bool,
    pub show_unreplied_only: bool,
    pub sort_order: SortOrder,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            hide_owner_comments: true,
            show_unreplied_only: false,
            sort_order: SortOrder::Newest,
        }
    }
}

// ----- mutations -----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Like,
    Unlike,
    Heart,
    Unheart,
    Reply,
}

/// Actions in the same family must never be pending twice for one comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionFamily {
    Like,
    Heart,
    Reply,
}

impl ActionKind {
    pub fn family(self) -> ActionFamily {
        match self {
            ActionKind::Like | ActionKind::Unlike => ActionFamily::Like,
            ActionKind::Heart | ActionKind::Unheart => ActionFamily::Heart,
            ActionKind::Reply => ActionFamily::Reply,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            ActionKind::Like => "/api/like",
            ActionKind::Unlike => "/api/unlike",
            ActionKind::Heart => "/api/heart",
            ActionKind::Unheart => "/api/unheart",
            ActionKind::Reply => "/api/reply",
        }
    }

    pub fn verb(self) -> &'static str {
        match self {
            ActionKind::Like => "like",
            ActionKind::Unlike => "unlike",
            ActionKind::Heart => "heart",
            ActionKind::Unheart => "unheart",
            ActionKind::Reply => "reply",
        }
    }
}

impl std::fmt::Display for ActionFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionFamily::Like => write!(f, "like"),
            ActionFamily::Heart => write!(f, "heart"),
            ActionFamily::Reply => write!(f, "reply"),
        }
    }
}

/// One user action in flight: what was asked and what to restore on failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRequest {
    pub kind: ActionKind,
    pub comment_id: String,
    pub prior: Option<ActionState>,
}

// ----- wire payloads -----

/// A list endpoint result after 429/demo classification
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub channel_id: Option<String>,
    pub is_demo: bool,
    pub quota_exceeded: bool,
}

impl<T> Listing<T> {
    pub fn quota_exhausted() -> Self {
        Self {
            items: Vec::new(),
            channel_id: None,
            is_demo: false,
            quota_exceeded: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthStatus {
    #[serde(default)]
    pub authenticated: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginStart {
    pub auth_url: String,
}
