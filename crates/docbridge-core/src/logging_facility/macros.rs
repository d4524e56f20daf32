//! Command bracketing macros
//!
//! Every dispatched command is bracketed by exactly one `log_op_start!` and
//! then exactly one `log_op_end!` or `log_op_error!`. All three stamp
//! `component`, `op` and `event`; extra `key = value` fields pass straight
//! through to `tracing`, so `request_id` is added by the caller.
//!
//! The macros resolve `tracing` and the schema constants through this crate,
//! so callers need neither as a direct dependency.

#[doc(hidden)]
#[macro_export]
macro_rules! __log_op_event {
    ($level:ident, $op:expr, $event:ident $(, $($field:tt)*)?) => {
        $crate::__private::tracing::$level!(
            component = module_path!(),
            op = $op,
            event = $crate::__private::schema::$event,
            $($($field)*)?
        )
    };
}

/// Open the bracket for `op`
///
/// ```
/// # use docbridge_core::log_op_start;
/// log_op_start!("create-frame");
/// log_op_start!("create-frame", request_id = "r1");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {
        $crate::__log_op_event!(info, $op, EVENT_START $(, $($field)*)?)
    };
}

/// Close the bracket for `op` after success
///
/// ```
/// # use docbridge_core::log_op_end;
/// log_op_end!("set-fill", duration_ms = 3);
/// log_op_end!("set-fill", duration_ms = 3, request_id = "r1");
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {
        $crate::__log_op_event!(
            info, $op, EVENT_END, duration_ms = $duration $(, $($field)*)?
        )
    };
}

/// Close the bracket for `op` with a failure
///
/// `$err` is anything convertible into [`ExError`](crate::errors::ExError);
/// its kind, stable code, message and entity id (when known) are logged.
///
/// ```
/// # use docbridge_core::{log_op_error, errors::BridgeError};
/// let err = BridgeError::EntityNotFound { id: Some("1:4".to_string()) };
/// log_op_error!("set-fill", &err, duration_ms = 1);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        $crate::__log_op_event!(
            error, $op, EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            error = ex_err.message(),
            entity_id = ex_err.entity_id()
            $(, $($field)*)?
        )
    }};
}
