//! Action availability rules
//!
//! Decides which lifecycle actions a user may request in a given state.
//! Non-moderators are refused everything; an ended meeting refuses every
//! state change.

use serde::{Deserialize, Serialize};

use crate::machine::MeetingState;
use crate::types::{ActionKey, MeetingAction};

pub const MODERATOR_ONLY_REASON: &str = "仅主持人/联席主持可操作";

/// Inputs to the availability rules
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyContext {
    pub state: MeetingState,
    pub can_moderate: bool,
}

impl PolicyContext {
    pub fn new(state: MeetingState, can_moderate: bool) -> Self {
        Self {
            state,
            can_moderate,
        }
    }
}

/// Reason shown when `key` is disabled for a moderator
fn state_reason(key: ActionKey) -> &'static str {
    match key {
        ActionKey::Start => "会议已开始或已结束",
        ActionKey::Pause => "当前不在进行中",
        ActionKey::Resume => "当前不在暂停中",
        ActionKey::End => "会议已结束",
    }
}

fn is_allowed(key: ActionKey, state: MeetingState) -> bool {
    match key {
        ActionKey::Start => state == MeetingState::Idle,
        ActionKey::Pause => state == MeetingState::Live,
        ActionKey::Resume => state == MeetingState::Paused,
        ActionKey::End => !state.is_final(),
    }
}

/// Availability of start, pause, resume and end, in that order
pub fn get_action_availability(ctx: PolicyContext) -> Vec<MeetingAction> {
    ActionKey::ALL
        .iter()
        .map(|&key| find_action(ctx, key))
        .collect()
}

/// Look up one action's availability
pub fn find_action(ctx: PolicyContext, key: ActionKey) -> MeetingAction {
    if ctx.can_moderate {
        MeetingAction::new(key, is_allowed(key, ctx.state), state_reason(key))
    } else {
        MeetingAction::new(key, false, MODERATOR_ONLY_REASON)
    }
}
