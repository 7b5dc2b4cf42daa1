//! HTTP API module for the payroll batch engine.
//!
//! This module provides the REST endpoints over the batch service:
//! validation, exception resolution, workflow navigation, execution, and
//! cycle completion.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    AdvanceRequest, CompleteRequest, ExecuteRequest, ResolveRequest, ValidateRequest,
};
pub use response::{AdvanceResponse, ApiError, CancelResponse, ExceptionListResponse};
pub use state::AppState;
