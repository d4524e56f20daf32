//! Field keys and event names shared by every bridge log line
//!
//! A dispatched command produces one `start` line and then exactly one of
//! `end` or `end_error`, all carrying the same `request_id`.

/// Module path of the emitting code
pub const FIELD_COMPONENT: &str = "component";
/// Command name, or `apply_plan` for a whole plan run
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_DURATION_MS: &str = "duration_ms";

pub const FIELD_ENTITY_ID: &str = "entity_id";

// Present on end_error only
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";
pub const FIELD_ERROR: &str = "error";

pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

/// Whether `event` closes a command bracket
pub fn is_terminal_event(event: &str) -> bool {
    event == EVENT_END || event == EVENT_END_ERROR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_events() {
        assert!(!is_terminal_event(EVENT_START));
        assert!(is_terminal_event(EVENT_END));
        assert!(is_terminal_event(EVENT_END_ERROR));
        assert!(!is_terminal_event("end-error"));
    }
}
