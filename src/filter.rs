//! Derived comment view: owner/unreplied filters plus publish-time ordering.

use crate::types::{CommentThread, FilterConfig, SortOrder};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::cmp::Ordering;

/// Filter and order threads for display.
///
/// Pure and deterministic. Sorting is stable, so threads sharing a publish
/// time keep their fetch order. Threads with an unknown publish time order
/// as the oldest possible instant.
pub fn apply(
    threads: &[CommentThread],
    config: &FilterConfig,
    owner_id: Option<&str>,
) -> Vec<CommentThread> {
    let mut visible: Vec<CommentThread> = threads
        .iter()
        .filter(|t| !(config.hide_owner_comments && is_owner(t, owner_id)))
        .filter(|t| !config.show_unreplied_only || t.reply_count() == 0)
        .cloned()
        .collect();

    visible.sort_by(|a, b| compare_published(a, b, config.sort_order));
    visible
}

/// Same as [`apply`] for a raw payload; anything that is not a list of
/// threads yields an empty view plus a diagnostic.
pub fn apply_value(
    raw: &Value,
    config: &FilterConfig,
    owner_id: Option<&str>,
) -> Vec<CommentThread> {
    apply(&parse_threads(raw), config, owner_id)
}

/// Decode a thread list, skipping entries that do not have the thread shape.
pub fn parse_threads(raw: &Value) -> Vec<CommentThread> {
    let Some(items) = raw.as_array() else {
        log::warn!("[filter] comment payload is not an array: {}", kind_of(raw));
        return Vec::new();
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| {
            match serde_json::from_value::<CommentThread>(item.clone()) {
                Ok(t) => Some(t),
                Err(e) => {
                    log::warn!("[filter] skipping malformed thread #{i}: {e}");
                    None
                }
            }
        })
        .collect()
}

fn is_owner(thread: &CommentThread, owner_id: Option<&str>) -> bool {
    match (thread.author_id(), owner_id) {
        (Some(author), Some(owner)) => author == owner,
        _ => false,
    }
}

fn compare_published(a: &CommentThread, b: &CommentThread, order: SortOrder) -> Ordering {
    let key = |t: &CommentThread| t.published_at().unwrap_or(DateTime::<Utc>::MIN_UTC);
    match order {
        SortOrder::Newest => key(b).cmp(&key(a)),
        SortOrder::Oldest => key(a).cmp(&key(b)),
    }
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
