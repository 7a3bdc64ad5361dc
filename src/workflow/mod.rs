//! Command handlers.
//!
//! Each handler mounts the registration controller for one action through
//! [`AppContext::with_controller`], prints the outcome and maps blocking
//! outcomes to errors so the process exits non-zero.
mod context;
mod edit;
mod init;
mod status;
mod submit;
mod verify;

pub use context::AppContext;
pub use edit::{run_attach, run_back, run_blur, run_next, run_reset, run_set};
pub use init::run_init;
pub use status::run_status;
pub use submit::{run_fees, run_review, run_submit};
pub use verify::{run_request_link, run_verify};
