//! Display labels for timeline and status panels

use chrono::{Local, TimeZone};

use crate::types::{ActorRole, EventType, SYSTEM_ACTOR_NAME};

/// Shown when a role or name cannot be resolved
pub const UNKNOWN_LABEL: &str = "未知";

pub fn event_type_label(event_type: EventType) -> &'static str {
    match event_type {
        EventType::MeetingStarted => "会议开始",
        EventType::MeetingPaused => "会议暂停",
        EventType::MeetingResumed => "会议继续",
        EventType::MeetingEnded => "会议结束",
        EventType::UserJoined => "成员加入",
        EventType::UserLeft => "成员离开",
        EventType::RoleChanged => "角色调整",
        EventType::MicToggled => "麦克风切换",
        EventType::CameraToggled => "摄像头切换",
        EventType::HandRaised => "举手",
        EventType::HandLowered => "放下举手",
        EventType::ScreenShareStarted => "开始共享",
        EventType::ScreenShareStopped => "停止共享",
        EventType::MeetingLocked => "会议锁定",
        EventType::MeetingUnlocked => "会议解锁",
        EventType::MicPolicyChanged => "发言策略更新",
        EventType::SpeakerAllowed => "允许发言",
        EventType::WaitApproved => "等候室通过",
        EventType::WaitRejected => "等候室拒绝",
    }
}

/// Role label; unknown roles are shown verbatim, empty ones as "未知"
pub fn role_label(role: &ActorRole) -> &str {
    match role {
        ActorRole::Host => "主持人",
        ActorRole::Cohost => "联席主持人",
        ActorRole::Participant => "参会者",
        ActorRole::System => "系统",
        ActorRole::Other(raw) if raw.is_empty() => UNKNOWN_LABEL,
        ActorRole::Other(raw) => raw,
    }
}

/// `name（role）`, falling back to the system name
pub fn format_actor_label(name: &str, role: &ActorRole) -> String {
    let name = if name.is_empty() { SYSTEM_ACTOR_NAME } else { name };
    format!("{}（{}）", name, role_label(role))
}

/// Local wall-clock time as `HH:MM:SS`
pub fn format_event_time(timestamp_millis: i64) -> String {
    match Local.timestamp_millis_opt(timestamp_millis).single() {
        Some(time) => time.format("%H:%M:%S").to_string(),
        None => "--:--:--".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_labels() {
        assert_eq!(role_label(&ActorRole::Cohost), "联席主持人");
        assert_eq!(role_label(&ActorRole::from("guest")), "guest");
        assert_eq!(role_label(&ActorRole::from("")), UNKNOWN_LABEL);
    }

    #[test]
    fn test_actor_label_falls_back_to_system_name() {
        assert_eq!(
            format_actor_label("张三", &ActorRole::Participant),
            "张三（参会者）"
        );
        assert_eq!(format_actor_label("", &ActorRole::System), "系统（系统）");
    }

    #[test]
    fn test_event_time_shape() {
        let label = format_event_time(1704103200000);
        assert_eq!(label.len(), 8);
        assert_eq!(label.matches(':').count(), 2);
    }

    #[test]
    fn test_every_type_has_a_label() {
        for event_type in EventType::ALL {
            assert!(!event_type_label(event_type).is_empty());
        }
    }
}
