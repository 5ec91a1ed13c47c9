//! Operation boundary macros
//!
//! Each document operation brackets its work with `log_op_start!` and
//! exactly one of `log_op_end!` or `log_op_error!`. The `component`, `op`
//! and `event` keys come from `gedgraph_core_types::schema`; extra fields
//! are passed through to `tracing` unchanged.

/// Open an operation boundary
///
/// ```
/// # use gedgraph_core::log_op_start;
/// log_op_start!("create_entity");
/// log_op_start!("create_entity", entity_type = "INDI");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)+)?) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::logging_facility::schema::EVENT_START,
            $($($field)+)?
        )
    };
}

/// Close an operation boundary that succeeded
///
/// `duration_ms` is mandatory so every end event can be timed.
///
/// ```
/// # use gedgraph_core::log_op_end;
/// log_op_end!("link", duration_ms = 3);
/// log_op_end!("create_entity", duration_ms = 1, entity_id = "I001");
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)+)?) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::logging_facility::schema::EVENT_END,
            duration_ms = $duration,
            $($($field)+)?
        )
    };
}

/// Close an operation boundary that failed
///
/// Anything convertible into `ExError` is accepted; its stable kind and
/// `ERR_*` code are recorded as `err_kind` and `err_code`.
///
/// ```
/// # use gedgraph_core::{log_op_error, errors::GedcomError};
/// let err = GedcomError::EntityNotFound { id: "I9".to_string() };
/// log_op_error!("delete_entity", err, duration_ms = 0);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)+)?) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::logging_facility::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            $($($field)+)?
        )
    }};
}
