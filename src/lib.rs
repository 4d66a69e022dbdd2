//! EchoTube - channel comment moderation dashboard
//!
//! This library is the client-side state and synchronization engine behind the
//! dashboard: it keeps the last known comments, videos, channel statistics and
//! hashtag trends, derives the filtered comment view, applies like/heart/reply
//! optimistically with rollback, and runs the polling timers for the live tabs.
//!
//! ## Architecture
//!
//! - [`store::ViewStateStore`] owns all session state behind a mutex
//! - [`filter`] derives the visible comment list
//! - [`mutation::MutationManager`] runs optimistic toggles and replies
//! - [`poller::PollingScheduler`] owns one timer per live-data category
//! - [`tabs::TabController`] arms and disarms timers as tabs change
//! - [`app::Dashboard`] ties them together for a renderer
//!
//! ## Usage
//!
//! ```bash
//! cargo run -- --api-base-url http://localhost:5000
//! ```

// Data model and pure helpers
pub mod constants;
pub mod delta;
pub mod error;
pub mod filter;
pub mod types;
pub mod util_text;

// Remote collaborator
pub mod api;
pub mod session;

// Engine
pub mod mutation;
pub mod poller;
pub mod store;
pub mod tabs;

pub mod app;
pub mod config;
pub mod ui_snapshot;

pub use app::Dashboard;
pub use config::Config;
