//! Classify counter changes between two live-stats snapshots.
//!
//! The renderer animates a counter only when [`describe`] reports a change;
//! the direction picks the slide direction and the magnitude is shown as a
//! `+N` / `-N` hint.

use crate::types::ChannelStats;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Increase,
    Decrease,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatDelta {
    pub changed: bool,
    /// `None` whenever `changed` is false
    pub direction: Option<Direction>,
    pub magnitude: u64,
}

impl StatDelta {
    pub const UNCHANGED: StatDelta = StatDelta {
        changed: false,
        direction: None,
        magnitude: 0,
    };
}

/// Compare a counter against its previous value.
///
/// An absent previous value is the first-ever fetch and never animates.
pub fn describe(old: Option<u64>, new: u64) -> StatDelta {
    let Some(old) = old else {
        return StatDelta::UNCHANGED;
    };
    if old == new {
        return StatDelta::UNCHANGED;
    }
    let direction = if new > old {
        Direction::Increase
    } else {
        Direction::Decrease
    };
    StatDelta {
        changed: true,
        direction: Some(direction),
        magnitude: old.abs_diff(new),
    }
}

/// Per-counter deltas for one live-stats refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatDeltas {
    pub subscribers: StatDelta,
    pub views: StatDelta,
    pub videos: StatDelta,
}

impl StatDeltas {
    pub fn any_changed(&self) -> bool {
        self.subscribers.changed || self.views.changed || self.videos.changed
    }
}

pub fn describe_stats(old: Option<&ChannelStats>, new: &ChannelStats) -> StatDeltas {
    StatDeltas {
        subscribers: describe(old.map(|o| o.subscriber_count), new.subscriber_count),
        views: describe(old.map(|o| o.view_count), new.view_count),
        videos: describe(old.map(|o| o.video_count), new.video_count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_fetch_never_changes() {
        assert_eq!(describe(None, 500), StatDelta::UNCHANGED);
    }

    #[test]
    fn test_equal_values() {
        let d = describe(Some(42), 42);
        assert!(!d.changed);
        assert_eq!(d.direction, None);
        assert_eq!(d.magnitude, 0);
    }

    #[test]
    fn test_increase_and_decrease() {
        let up = describe(Some(100), 130);
        assert!(up.changed);
        assert_eq!(up.direction, Some(Direction::Increase));
        assert_eq!(up.magnitude, 30);

        let down = describe(Some(100), 95);
        assert_eq!(down.direction, Some(Direction::Decrease));
        assert_eq!(down.magnitude, 5);
    }

    #[test]
    fn test_extremes_do_not_overflow() {
        let d = describe(Some(0), u64::MAX);
        assert_eq!(d.magnitude, u64::MAX);
    }

    #[test]
    fn test_describe_stats() {
        let old = ChannelStats {
            subscriber_count: 10,
            view_count: 1_000,
            video_count: 3,
            ..Default::default()
        };
        let new = ChannelStats {
            subscriber_count: 12,
            view_count: 1_000,
            video_count: 2,
            ..Default::default()
        };
        let d = describe_stats(Some(&old), &new);
        assert_eq!(d.subscribers.direction, Some(Direction::Increase));
        assert!(!d.views.changed);
        assert_eq!(d.videos.direction, Some(Direction::Decrease));
        assert!(d.any_changed());
        assert!(!describe_stats(None, &new).any_changed());
    }
}
