//! Optimistic like/heart toggles and replies.
//!
//! The state machine is split into two pure steps so it can be observed and
//! tested without a network: [`optimistic`] turns the prior state into what
//! the user sees immediately, and [`reconcile`] decides the final state once
//! the remote call has resolved. A rollback touches only the fields of the
//! failed action's family, so a like and a heart in flight together settle
//! independently. [`MutationManager`] drives both against the
//! shared store and guarantees at most one pending request per
//! `(comment, action family)`.

use crate::api::DashboardApi;
use crate::constants::messages;
use crate::error::{ApiError, EngineError};
use crate::store::{self, NoticeLevel, SharedStore};
use crate::types::{ActionFamily, ActionKind, ActionState, MutationRequest};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Which remote action a toggle on `family` resolves to, given the prior state
pub fn toggle_kind(family: ActionFamily, prior: ActionState) -> Option<ActionKind> {
    match family {
        ActionFamily::Like => Some(if prior.liked { ActionKind::Unlike } else { ActionKind::Like }),
        ActionFamily::Heart => Some(if prior.hearted { ActionKind::Unheart } else { ActionKind::Heart }),
        ActionFamily::Reply => None,
    }
}

/// State shown while `kind` is in flight
pub fn optimistic(prior: ActionState, kind: ActionKind) -> ActionState {
    match kind {
        ActionKind::Like => ActionState {
            liked: true,
            like_count: prior.like_count.saturating_add(1),
            ..prior
        },
        ActionKind::Unlike => ActionState {
            liked: false,
            like_count: prior.like_count.saturating_sub(1),
            ..prior
        },
        ActionKind::Heart => ActionState { hearted: true, ..prior },
        ActionKind::Unheart => ActionState { hearted: false, ..prior },
        ActionKind::Reply => prior,
    }
}

/// Final state once the remote call resolved. Success keeps `current`; a
/// failure restores the request's own fields from its prior snapshot and
/// leaves the other family alone. A like whose optimistic flag was already
/// overwritten (by a reload) is not reversed twice.
pub fn reconcile(
    current: ActionState,
    request: &MutationRequest,
    outcome: &Result<(), ApiError>,
) -> ActionState {
    let (Err(_), Some(prior)) = (outcome, request.prior) else {
        return current;
    };
    match request.kind {
        ActionKind::Like | ActionKind::Unlike if current.liked != prior.liked => ActionState {
            liked: prior.liked,
            like_count: if prior.liked {
                current.like_count.saturating_add(1)
            } else {
                current.like_count.saturating_sub(1)
            },
            ..current
        },
        ActionKind::Heart | ActionKind::Unheart => ActionState {
            hearted: prior.hearted,
            ..current
        },
        _ => current,
    }
}

type PendingKey = (String, ActionFamily);

/// Removes its key from the pending set when the request settles
struct PendingGuard {
    pending: Arc<Mutex<HashSet<PendingKey>>>,
    key: PendingKey,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        let mut pending = self.pending.lock().unwrap_or_else(|p| p.into_inner());
        pending.remove(&self.key);
    }
}

#[derive(Clone)]
pub struct MutationManager {
    store: SharedStore,
    api: Arc<dyn DashboardApi>,
    pending: Arc<Mutex<HashSet<PendingKey>>>,
}

impl MutationManager {
    pub fn new(store: SharedStore, api: Arc<dyn DashboardApi>) -> Self {
        Self {
            store,
            api,
            pending: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Whether a request of `family` is in flight for `comment_id`
    pub fn is_pending(&self, comment_id: &str, family: ActionFamily) -> bool {
        let pending = self.pending.lock().unwrap_or_else(|p| p.into_inner());
        pending.contains(&(comment_id.to_string(), family))
    }

    fn begin(&self, comment_id: &str, family: ActionFamily) -> Result<PendingGuard, EngineError> {
        let key = (comment_id.to_string(), family);
        let mut pending = self.pending.lock().unwrap_or_else(|p| p.into_inner());
        if !pending.insert(key.clone()) {
            log::info!("[mutation] {family} already pending for {comment_id}, rejecting");
            return Err(EngineError::Busy {
                comment_id: comment_id.to_string(),
                family,
            });
        }
        Ok(PendingGuard {
            pending: Arc::clone(&self.pending),
            key,
        })
    }

    pub async fn toggle_like(&self, comment_id: &str) -> Result<ActionKind, EngineError> {
        self.toggle(comment_id, ActionFamily::Like).await
    }

    pub async fn toggle_heart(&self, comment_id: &str) -> Result<ActionKind, EngineError> {
        self.toggle(comment_id, ActionFamily::Heart).await
    }

    /// Flip like or heart: apply locally, call the backend, roll back on failure.
    /// Returns the action that was committed.
    async fn toggle(&self, comment_id: &str, family: ActionFamily) -> Result<ActionKind, EngineError> {
        let _guard = self.begin(comment_id, family)?;

        // Optimistic write happens before the request is dispatched.
        let request = {
            let mut s = store::lock(&self.store);
            let prior = s
                .action_state(comment_id)
                .ok_or_else(|| EngineError::UnknownComment(comment_id.to_string()))?;
            let kind = toggle_kind(family, prior)
                .ok_or_else(|| EngineError::UnknownComment(comment_id.to_string()))?;
            s.apply_action_state(comment_id, optimistic(prior, kind));
            MutationRequest {
                kind,
                comment_id: comment_id.to_string(),
                prior: Some(prior),
            }
        };
        log::debug!("[mutation] {} {} dispatched", request.kind.verb(), comment_id);
        let outcome = self.api.toggle(request.kind, comment_id).await;

        let mut s = store::lock(&self.store);
        if let Some(current) = s.action_state(comment_id) {
            let settled = reconcile(current, &request, &outcome);
            if settled != current {
                s.apply_action_state(comment_id, settled);
            }
        }

        match outcome {
            Ok(()) => {
                log::info!("[mutation] Successfully {}d comment {}", request.kind.verb(), comment_id);
                Ok(request.kind)
            }
            Err(e) => {
                log::error!("[mutation] {} {} failed: {}", request.kind.verb(), comment_id, e);
                let err = EngineError::from_mutation(&e, request.kind.verb());
                match &err {
                    EngineError::Unauthenticated => s.set_authenticated(false),
                    other => s.push_notice(NoticeLevel::Error, other.to_string()),
                }
                Err(err)
            }
        }
    }

    /// Post the stored draft for `comment_id`.
    ///
    /// Empty drafts fail before any network call. On success the draft is
    /// cleared and the caller should refresh comments; on failure the draft
    /// stays so the user can retry.
    pub async fn reply(&self, comment_id: &str) -> Result<(), EngineError> {
        let text = {
            let mut s = store::lock(&self.store);
            let text = s.reply_draft(comment_id).trim().to_string();
            if text.is_empty() {
                s.set_inline_error(comment_id, messages::REPLY_EMPTY);
                return Err(EngineError::Validation {
                    message: messages::REPLY_EMPTY.to_string(),
                });
            }
            text
        };

        let _guard = self.begin(comment_id, ActionFamily::Reply)?;
        log::debug!("[mutation] reply to {comment_id} dispatched ({} chars)", text.len());
        let outcome = self.api.reply(comment_id, &text).await;

        let mut s = store::lock(&self.store);
        match outcome {
            Ok(()) => {
                s.clear_reply_draft(comment_id);
                s.push_notice(NoticeLevel::Info, messages::REPLY_POSTED);
                log::info!("[mutation] reply posted to {comment_id}");
                Ok(())
            }
            Err(e) => {
                log::error!("[mutation] reply to {comment_id} failed: {e}");
                let err = EngineError::from_mutation(&e, ActionKind::Reply.verb());
                match &err {
                    EngineError::Unauthenticated => s.set_authenticated(false),
                    _ => s.push_notice(NoticeLevel::Error, messages::REPLY_FAILED),
                }
                Err(err)
            }
        }
    }
}
