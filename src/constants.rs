//! Application constants
//!
//! Centralized constants for polling cadence, notice handling and user-facing
//! strings used throughout the engine.

/// Polling cadence per live-data category
pub mod poll {
    /// Live channel statistics refresh period (milliseconds)
    pub const LIVE_STATS_INTERVAL_MS: u64 = 30_000;

    /// Hashtag trend analysis refresh period (milliseconds)
    ///
    /// Hashtag analysis is expensive upstream, so it refreshes far less often
    /// than the channel counters.
    pub const HASHTAG_INTERVAL_MS: u64 = 300_000;

    /// Consecutive failures after which a category is flagged as degraded
    pub const FAILURE_WARN_THRESHOLD: u32 = 3;
}

/// HTTP client behavior
pub mod net {
    /// Default base URL of the dashboard backend
    pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";

    /// Default per-request timeout (milliseconds)
    pub const REQUEST_TIMEOUT_MS: u64 = 10_000;
}

/// Application state and behavior constants
pub mod app {
    /// Maximum number of notices retained until the renderer drains them
    pub const MAX_NOTICES: usize = 20;

    /// Fallback thumbnail when a comment's video has none
    pub const DEFAULT_VIDEO_THUMBNAIL: &str = "https://i.ytimg.com/vi/default.jpg";
}

/// User-facing message strings
pub mod messages {
    pub const REPLY_EMPTY: &str = "Please enter a reply";
    pub const REPLY_POSTED: &str = "Reply posted successfully!";
    pub const REPLY_FAILED: &str = "Failed to post reply. Please try again.";

    pub const LIVE_STATS_FAILED: &str = "Failed to fetch live statistics";
    pub const HASHTAGS_FAILED: &str = "Failed to fetch hashtag analysis";
    pub const ANALYTICS_FAILED: &str = "Failed to fetch analytics data.";
    pub const COMMENTS_FAILED: &str = "Failed to load comments.";
    pub const VIDEOS_FAILED: &str = "Failed to load videos.";

    pub const QUOTA_EXCEEDED: &str =
        "We've hit the YouTube API quota limit. Please try again later.";
    pub const DEMO_MODE: &str =
        "The YouTube API quota has been exceeded. You are currently viewing demo data.";
}
