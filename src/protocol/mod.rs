//! Meeting event protocol
//!
//! - `schema`: protocol version and per-type payload contract
//! - `labels`: display labels for event types, roles and timestamps

mod labels;
mod schema;

pub use labels::{
    event_type_label, format_actor_label, format_event_time, role_label, UNKNOWN_LABEL,
};
pub use schema::{payload_schema, PayloadSchema, EVENT_VERSION};
