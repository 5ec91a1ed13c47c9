//! Structured logging for document operations
//!
//! `init(profile)` installs the process subscriber once. The
//! `log_op_start!`, `log_op_end!` and `log_op_error!` macros bracket each
//! logged operation, and `test_capture` records events in memory so tests
//! can assert on them.
//!
//! ```rust
//! use gedgraph_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```
//!
//! Logged operations: `create_entity`, `delete_entity`, `rename_entity`,
//! `link`, `link_all`, `commit` and `undo`. Each emits one
//! start event and exactly one end or end_error event.

pub mod init;
pub mod macros;
pub mod test_capture;

#[doc(hidden)]
pub use gedgraph_core_types::schema;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
