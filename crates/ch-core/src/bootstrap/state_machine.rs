//! Profile bootstrap state machine.
//!
//! Defines a pure state transition function for fetching the authoritative
//! profile of the signed-in user. Every fetch is tagged with the identity it
//! was issued for; results whose tag is not the one currently awaited are
//! dropped, whatever order they arrive in.

use std::time::Duration;

use super::RetryPolicy;
use crate::ids::UserId;
use crate::ports::errors::FetchError;
use crate::profile::ProfileRow;

/// Identity of one logical fetch.
///
/// 一次逻辑拉取的身份标识。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchTag {
    pub user_id: UserId,
    /// Bumped on every activation or refresh.
    pub generation: u64,
}

impl FetchTag {
    pub fn new(user_id: impl Into<UserId>, generation: u64) -> Self {
        Self {
            user_id: user_id.into(),
            generation,
        }
    }
}

/// Bootstrap state.
///
/// 引导流程状态。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapState {
    /// No session; nothing to fetch.
    ///
    /// 无会话，不拉取。
    Disabled,
    /// Waiting for the fetch identified by `tag`.
    ///
    /// 等待拉取结果。
    Fetching { tag: FetchTag, attempt: u32 },
    /// Profile fetched for `tag`.
    ///
    /// 拉取成功。
    Ready { tag: FetchTag, profile: ProfileRow },
    /// Fetch settled with an error; retries exhausted or not applicable.
    ///
    /// 拉取失败（已停止重试）。
    Failed { tag: FetchTag, error: FetchError },
}

impl BootstrapState {
    pub fn tag(&self) -> Option<&FetchTag> {
        match self {
            BootstrapState::Disabled => None,
            BootstrapState::Fetching { tag, .. }
            | BootstrapState::Ready { tag, .. }
            | BootstrapState::Failed { tag, .. } => Some(tag),
        }
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.tag().map(|tag| &tag.user_id)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, BootstrapState::Fetching { .. })
    }

    pub fn profile(&self) -> Option<&ProfileRow> {
        match self {
            BootstrapState::Ready { profile, .. } => Some(profile),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            BootstrapState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Events that drive the bootstrap flow.
///
/// 驱动引导流程的事件。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapEvent {
    /// A session for `tag.user_id` is present. `cached` holds a previously
    /// fetched row for that user, if any.
    Activate {
        tag: FetchTag,
        cached: Option<ProfileRow>,
    },
    /// The session went away.
    Deactivate,
    /// Re-fetch the current user's profile under a new tag.
    Refresh { tag: FetchTag },
    /// Fetch result (network callback).
    FetchSucceeded { tag: FetchTag, profile: ProfileRow },
    /// Fetch failure (network callback).
    FetchFailed { tag: FetchTag, error: FetchError },
}

/// Side-effects produced by state transitions.
///
/// 状态迁移产生的副作用。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapAction {
    /// Fetch the profile of `tag.user_id` after `delay`. `retry` is 0 for the
    /// first attempt.
    Fetch {
        tag: FetchTag,
        retry: u32,
        delay: Duration,
    },
    /// Abort whatever fetch is in flight.
    CancelFetch,
    /// Write the fetched profile into the app store, once per tag.
    SyncProfile { tag: FetchTag, profile: ProfileRow },
}

/// Pure bootstrap state machine.
///
/// 纯状态机：不包含副作用。
pub struct BootstrapStateMachine;

impl BootstrapStateMachine {
    pub fn transition(
        state: BootstrapState,
        event: BootstrapEvent,
        policy: &RetryPolicy,
    ) -> (BootstrapState, Vec<BootstrapAction>) {
        match (state, event) {
            (BootstrapState::Disabled, BootstrapEvent::Deactivate) => {
                (BootstrapState::Disabled, Vec::new())
            }
            (state, BootstrapEvent::Deactivate) => {
                let actions = cancel_if_fetching(&state);
                (BootstrapState::Disabled, actions)
            }
            (state, BootstrapEvent::Activate { tag, cached }) => {
                if state.user_id() == Some(&tag.user_id) {
                    return (state, Vec::new());
                }
                let mut actions = cancel_if_fetching(&state);
                match cached {
                    Some(profile) => {
                        actions.push(BootstrapAction::SyncProfile {
                            tag: tag.clone(),
                            profile: profile.clone(),
                        });
                        (BootstrapState::Ready { tag, profile }, actions)
                    }
                    None => {
                        actions.push(first_fetch(&tag));
                        (BootstrapState::Fetching { tag, attempt: 0 }, actions)
                    }
                }
            }
            (BootstrapState::Disabled, BootstrapEvent::Refresh { .. }) => {
                (BootstrapState::Disabled, Vec::new())
            }
            (state, BootstrapEvent::Refresh { tag }) => {
                if state.user_id() != Some(&tag.user_id) {
                    return (state, Vec::new());
                }
                let mut actions = cancel_if_fetching(&state);
                actions.push(first_fetch(&tag));
                (BootstrapState::Fetching { tag, attempt: 0 }, actions)
            }
            (
                BootstrapState::Fetching { tag: current, .. },
                BootstrapEvent::FetchSucceeded { tag, profile },
            ) if current == tag => {
                if profile.id != tag.user_id {
                    let error = FetchError::Malformed(format!(
                        "profile id {} does not match requested {}",
                        profile.id, tag.user_id
                    ));
                    return (BootstrapState::Failed { tag, error }, Vec::new());
                }
                let actions = vec![BootstrapAction::SyncProfile {
                    tag: tag.clone(),
                    profile: profile.clone(),
                }];
                (BootstrapState::Ready { tag, profile }, actions)
            }
            (
                BootstrapState::Fetching {
                    tag: current,
                    attempt,
                },
                BootstrapEvent::FetchFailed { tag, error },
            ) if current == tag => {
                let retry = attempt + 1;
                if error.is_transient() && policy.allows_retry(retry) {
                    let actions = vec![BootstrapAction::Fetch {
                        tag: tag.clone(),
                        retry,
                        delay: policy.delay_for(retry),
                    }];
                    (
                        BootstrapState::Fetching {
                            tag,
                            attempt: retry,
                        },
                        actions,
                    )
                } else {
                    (BootstrapState::Failed { tag, error }, Vec::new())
                }
            }
            (state, BootstrapEvent::FetchSucceeded { tag, .. })
            | (state, BootstrapEvent::FetchFailed { tag, .. }) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    stale_user = %tag.user_id,
                    stale_generation = tag.generation,
                    current = ?state.tag(),
                    "discarding stale profile fetch result"
                );
                #[cfg(not(feature = "tracing"))]
                let _ = tag;
                (state, Vec::new())
            }
        }
    }
}

fn first_fetch(tag: &FetchTag) -> BootstrapAction {
    BootstrapAction::Fetch {
        tag: tag.clone(),
        retry: 0,
        delay: Duration::ZERO,
    }
}

fn cancel_if_fetching(state: &BootstrapState) -> Vec<BootstrapAction> {
    if state.is_loading() {
        vec![BootstrapAction::CancelFetch]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RetryPolicy {
        RetryPolicy::new(2, Duration::from_millis(10), Duration::from_millis(100))
    }

    fn row(id: &str, completed: Option<bool>) -> ProfileRow {
        let mut row = ProfileRow::empty(id);
        row.completed = completed;
        row
    }

    fn fetching(user: &str, generation: u64) -> BootstrapState {
        BootstrapState::Fetching {
            tag: FetchTag::new(user, generation),
            attempt: 0,
        }
    }

    #[test]
    fn activate_from_disabled_starts_first_fetch() {
        let tag = FetchTag::new("u1", 1);
        let (next, actions) = BootstrapStateMachine::transition(
            BootstrapState::Disabled,
            BootstrapEvent::Activate {
                tag: tag.clone(),
                cached: None,
            },
            &policy(),
        );
        assert_eq!(next, fetching("u1", 1));
        assert_eq!(
            actions,
            vec![BootstrapAction::Fetch {
                tag,
                retry: 0,
                delay: Duration::ZERO
            }]
        );
    }

    #[test]
    fn activate_same_user_is_deduplicated() {
        let state = fetching("u1", 1);
        let (next, actions) = BootstrapStateMachine::transition(
            state.clone(),
            BootstrapEvent::Activate {
                tag: FetchTag::new("u1", 2),
                cached: None,
            },
            &policy(),
        );
        assert_eq!(next, state);
        assert!(actions.is_empty());
    }

    #[test]
    fn activate_with_cached_row_is_ready_and_syncs() {
        let tag = FetchTag::new("u1", 3);
        let cached = row("u1", Some(true));
        let (next, actions) = BootstrapStateMachine::transition(
            BootstrapState::Disabled,
            BootstrapEvent::Activate {
                tag: tag.clone(),
                cached: Some(cached.clone()),
            },
            &policy(),
        );
        assert_eq!(
            next,
            BootstrapState::Ready {
                tag: tag.clone(),
                profile: cached.clone()
            }
        );
        assert_eq!(
            actions,
            vec![BootstrapAction::SyncProfile {
                tag,
                profile: cached
            }]
        );
    }

    #[test]
    fn switching_user_cancels_in_flight_fetch() {
        let (next, actions) = BootstrapStateMachine::transition(
            fetching("u1", 1),
            BootstrapEvent::Activate {
                tag: FetchTag::new("u2", 2),
                cached: None,
            },
            &policy(),
        );
        assert_eq!(next, fetching("u2", 2));
        assert_eq!(actions[0], BootstrapAction::CancelFetch);
        assert!(matches!(actions[1], BootstrapAction::Fetch { retry: 0, .. }));
    }

    #[test]
    fn success_for_current_tag_syncs_profile() {
        let tag = FetchTag::new("u1", 1);
        let profile = row("u1", Some(false));
        let (next, actions) = BootstrapStateMachine::transition(
            fetching("u1", 1),
            BootstrapEvent::FetchSucceeded {
                tag: tag.clone(),
                profile: profile.clone(),
            },
            &policy(),
        );
        assert_eq!(next.profile(), Some(&profile));
        assert_eq!(actions, vec![BootstrapAction::SyncProfile { tag, profile }]);
    }

    #[test]
    fn stale_success_is_discarded() {
        let state = fetching("u2", 2);
        let (next, actions) = BootstrapStateMachine::transition(
            state.clone(),
            BootstrapEvent::FetchSucceeded {
                tag: FetchTag::new("u1", 1),
                profile: row("u1", Some(true)),
            },
            &policy(),
        );
        assert_eq!(next, state);
        assert!(actions.is_empty());
    }

    #[test]
    fn late_result_after_deactivate_is_discarded() {
        let (next, _) = BootstrapStateMachine::transition(
            fetching("u1", 1),
            BootstrapEvent::Deactivate,
            &policy(),
        );
        assert_eq!(next, BootstrapState::Disabled);

        let (next, actions) = BootstrapStateMachine::transition(
            next,
            BootstrapEvent::FetchSucceeded {
                tag: FetchTag::new("u1", 1),
                profile: row("u1", Some(true)),
            },
            &policy(),
        );
        assert_eq!(next, BootstrapState::Disabled);
        assert!(actions.is_empty());
    }

    #[test]
    fn same_user_older_generation_is_stale() {
        let state = fetching("u1", 5);
        let (next, actions) = BootstrapStateMachine::transition(
            state.clone(),
            BootstrapEvent::FetchSucceeded {
                tag: FetchTag::new("u1", 4),
                profile: row("u1", Some(false)),
            },
            &policy(),
        );
        assert_eq!(next, state);
        assert!(actions.is_empty());
    }

    #[test]
    fn mismatched_row_id_fails_without_sync() {
        let tag = FetchTag::new("u1", 1);
        let (next, actions) = BootstrapStateMachine::transition(
            fetching("u1", 1),
            BootstrapEvent::FetchSucceeded {
                tag,
                profile: row("someone-else", Some(true)),
            },
            &policy(),
        );
        assert!(matches!(
            next,
            BootstrapState::Failed {
                error: FetchError::Malformed(_),
                ..
            }
        ));
        assert!(actions.is_empty());
    }

    #[test]
    fn transient_failure_retries_with_backoff_then_settles() {
        let tag = FetchTag::new("u1", 1);
        let policy = policy();
        let failed = || BootstrapEvent::FetchFailed {
            tag: FetchTag::new("u1", 1),
            error: FetchError::Timeout,
        };

        let (state, actions) =
            BootstrapStateMachine::transition(fetching("u1", 1), failed(), &policy);
        assert_eq!(
            actions,
            vec![BootstrapAction::Fetch {
                tag: tag.clone(),
                retry: 1,
                delay: Duration::from_millis(10)
            }]
        );

        let (state, actions) = BootstrapStateMachine::transition(state, failed(), &policy);
        assert_eq!(
            actions,
            vec![BootstrapAction::Fetch {
                tag: tag.clone(),
                retry: 2,
                delay: Duration::from_millis(20)
            }]
        );

        let (state, actions) = BootstrapStateMachine::transition(state, failed(), &policy);
        assert!(actions.is_empty());
        assert_eq!(
            state,
            BootstrapState::Failed {
                tag,
                error: FetchError::Timeout
            }
        );
    }

    #[test]
    fn not_found_settles_immediately() {
        let (state, actions) = BootstrapStateMachine::transition(
            fetching("u1", 1),
            BootstrapEvent::FetchFailed {
                tag: FetchTag::new("u1", 1),
                error: FetchError::NotFound,
            },
            &policy(),
        );
        assert_eq!(state.error(), Some(&FetchError::NotFound));
        assert!(!state.is_loading());
        assert!(actions.is_empty());
    }

    #[test]
    fn failed_state_is_not_refetched_by_repeated_activation() {
        let state = BootstrapState::Failed {
            tag: FetchTag::new("u1", 1),
            error: FetchError::NotFound,
        };
        let (next, actions) = BootstrapStateMachine::transition(
            state.clone(),
            BootstrapEvent::Activate {
                tag: FetchTag::new("u1", 2),
                cached: None,
            },
            &policy(),
        );
        assert_eq!(next, state);
        assert!(actions.is_empty());
    }

    #[test]
    fn refresh_supersedes_current_fetch() {
        let (next, actions) = BootstrapStateMachine::transition(
            fetching("u1", 1),
            BootstrapEvent::Refresh {
                tag: FetchTag::new("u1", 2),
            },
            &policy(),
        );
        assert_eq!(next, fetching("u1", 2));
        assert_eq!(actions[0], BootstrapAction::CancelFetch);
        assert!(matches!(&actions[1], BootstrapAction::Fetch { tag, .. } if tag.generation == 2));
    }

    #[test]
    fn refresh_for_other_user_or_disabled_is_ignored() {
        let state = BootstrapState::Ready {
            tag: FetchTag::new("u1", 1),
            profile: row("u1", Some(true)),
        };
        let (next, actions) = BootstrapStateMachine::transition(
            state.clone(),
            BootstrapEvent::Refresh {
                tag: FetchTag::new("u2", 2),
            },
            &policy(),
        );
        assert_eq!(next, state);
        assert!(actions.is_empty());

        let (next, actions) = BootstrapStateMachine::transition(
            BootstrapState::Disabled,
            BootstrapEvent::Refresh {
                tag: FetchTag::new("u1", 2),
            },
            &policy(),
        );
        assert_eq!(next, BootstrapState::Disabled);
        assert!(actions.is_empty());
    }

    #[test]
    fn deactivate_while_ready_does_not_cancel() {
        let state = BootstrapState::Ready {
            tag: FetchTag::new("u1", 1),
            profile: row("u1", Some(true)),
        };
        let (next, actions) =
            BootstrapStateMachine::transition(state, BootstrapEvent::Deactivate, &policy());
        assert_eq!(next, BootstrapState::Disabled);
        assert!(actions.is_empty());
    }
}
