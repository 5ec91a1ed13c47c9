//! Field keys and event names shared by log producers and log assertions

// Operation boundary
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_CHANGE_SET_ID: &str = "change_set_id";

// Document identifiers
pub const FIELD_ENTITY_ID: &str = "entity_id";
pub const FIELD_ENTITY_TYPE: &str = "entity_type";
pub const FIELD_TAG: &str = "tag";

// Collection sizes
pub const FIELD_CHANGE_COUNT: &str = "change_count";
pub const FIELD_LISTENER_COUNT: &str = "listener_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Lifecycle events
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
