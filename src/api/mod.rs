//! HTTP API module for the payroll engine.
//!
//! This module exposes the payroll composer over REST: a health check, a
//! flat payroll preview and a full calculation with audit trace.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::PayrollRequest;
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
