//! Timeline rows for display

use super::{payload_str, truthy};
use crate::protocol::{event_type_label, format_actor_label, format_event_time};
use crate::types::{ActorRole, Event, EventType, TimelineItem};

const PLACEHOLDER_DETAIL: &str = "—";
const MEMBER_FALLBACK: &str = "成员";

/// One display row per event, in log order
pub fn build_event_timeline(events: &[Event]) -> Vec<TimelineItem> {
    events.iter().map(timeline_item).collect()
}

fn timeline_item(event: &Event) -> TimelineItem {
    let role = if event.actor.role.is_empty() {
        ActorRole::System
    } else {
        event.actor.role.clone()
    };

    TimelineItem {
        id: event.id.clone(),
        time_label: format_event_time(event.timestamp),
        title: event_type_label(event.event_type).to_string(),
        actor_label: format_actor_label(&event.actor.name, &role),
        detail: event_detail(event),
        raw: event.clone(),
    }
}

fn event_detail(event: &Event) -> String {
    let member = || payload_str(event, "name").unwrap_or(MEMBER_FALLBACK);
    let enabled = || truthy(event.payload_field("enabled"));

    let text = match event.event_type {
        EventType::MicToggled if enabled() => "麦克风已开启",
        EventType::MicToggled => "麦克风已关闭",
        EventType::CameraToggled if enabled() => "摄像头已开启",
        EventType::CameraToggled => "摄像头已关闭",
        EventType::HandRaised => "举手请求已提交",
        EventType::HandLowered => "举手已放下",
        EventType::ScreenShareStarted => "开始共享屏幕",
        EventType::ScreenShareStopped => "停止共享屏幕",
        EventType::MicPolicyChanged if truthy(event.payload_field("allowParticipantMic")) => {
            "允许参会者自主持麦"
        }
        EventType::MicPolicyChanged => "参会者发言需审批",
        EventType::SpeakerAllowed => return format!("允许 {} 发言", member()),
        EventType::MeetingLocked => "新成员需审批",
        EventType::MeetingUnlocked => "允许直接入会",
        EventType::WaitApproved => return format!("{} 已通过等候室", member()),
        EventType::WaitRejected => return format!("{} 已被拒绝", member()),
        _ => payload_str(event, "reason").unwrap_or(PLACEHOLDER_DETAIL),
    };
    text.to_string()
}
