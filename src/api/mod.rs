//! HTTP API module for the payroll engine.
//!
//! This module provides the REST endpoints for stateless payroll and
//! settlement calculations, legal parameter lookups and the payroll period
//! and settlement lifecycles.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    CreatePeriodRequest, CreateSettlementRequest, EntryAdjustmentRequest, ParameterUpdateRequest,
    ParametersQuery, PayrollCalculationRequest, SettlementAdjustmentRequest,
    SettlementCalculationRequest,
};
pub use response::{
    ApiError, ApiErrorResponse, ParameterUpdateResponse, ParametersResponse,
    SettlementCalculationResponse,
};
pub use state::AppState;
