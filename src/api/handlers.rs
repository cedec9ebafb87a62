//! HTTP request handlers for the payroll engine API.
//!
//! This module contains the router and the handler functions for all API
//! endpoints. Handlers parse the request, delegate to the calculation engine
//! or a service and translate [`EngineError`]s into JSON error bodies.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    routing::{get, post, put},
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{
    PayrollInput, SettlementInput, calculate_payroll_entry, calculate_settlement,
};
use crate::error::EngineError;
use crate::models::{
    Contract, Employee, ManualAdjustment, Novedad, PayrollEntry, PayrollPeriod, Settlement,
};

use super::request::{
    CreatePeriodRequest, CreateSettlementRequest, EntryAdjustmentRequest,
    ParameterUpdateRequest, ParametersQuery, PayrollCalculationRequest,
    SettlementAdjustmentRequest, SettlementCalculationRequest,
};
use super::response::{
    ApiError, ApiErrorResponse, ParameterUpdateResponse, ParametersResponse,
    SettlementCalculationResponse,
};
use super::state::AppState;

type ApiResult<T> = Result<(StatusCode, Json<T>), ApiErrorResponse>;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/payroll/calculate", post(calculate_payroll_handler))
        .route("/settlements/calculate", post(calculate_settlement_handler))
        .route("/config/parameters", get(get_parameters_handler))
        .route("/config/parameters/:key", put(update_parameter_handler))
        .route("/employees", post(register_employee_handler))
        .route("/contracts", post(register_contract_handler))
        .route("/novedades", post(record_novedad_handler))
        .route(
            "/payroll/periods",
            post(create_period_handler).get(list_periods_handler),
        )
        .route("/payroll/periods/:id", get(get_period_handler))
        .route("/payroll/periods/:id/liquidate", post(liquidate_period_handler))
        .route("/payroll/periods/:id/adjustments", post(adjust_entry_handler))
        .route("/payroll/periods/:id/approve", post(approve_period_handler))
        .route("/payroll/periods/:id/close", post(close_period_handler))
        .route("/settlements", post(create_settlement_handler))
        .route("/settlements/:id", get(get_settlement_handler))
        .route("/settlements/:id/calculate", post(recalculate_settlement_handler))
        .route("/settlements/:id/adjustments", post(adjust_settlement_handler))
        .route("/settlements/:id/approve", post(approve_settlement_handler))
        .route("/settlements/:id/pay", post(pay_settlement_handler))
        .with_state(state)
}

/// Handler for POST /payroll/calculate.
///
/// Calculates one payroll entry without storing anything.
async fn calculate_payroll_handler(
    State(state): State<AppState>,
    payload: Result<Json<PayrollCalculationRequest>, JsonRejection>,
) -> ApiResult<PayrollEntry> {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing payroll calculation request");

    let request = parse_json(payload, correlation_id)?;
    let params = state
        .config()
        .parameters_for(request.period_start)
        .map_err(|e| failed(e, correlation_id))?;
    let input = PayrollInput {
        contract: &request.contract,
        period_start: request.period_start,
        period_end: request.period_end,
        novedades: &request.novedades,
    };
    let entry = calculate_payroll_entry(&input, &params).map_err(|e| failed(e, correlation_id))?;

    info!(
        correlation_id = %correlation_id,
        employee_id = %entry.employee_id,
        novedades = request.novedades.len(),
        net_pay = %entry.totals.net_pay,
        duration_us = entry.audit_trace.duration_us,
        "Payroll calculation completed successfully"
    );
    Ok((StatusCode::OK, Json(entry)))
}

/// Handler for POST /settlements/calculate.
///
/// Calculates a final settlement without storing anything.
async fn calculate_settlement_handler(
    State(state): State<AppState>,
    payload: Result<Json<SettlementCalculationRequest>, JsonRejection>,
) -> ApiResult<SettlementCalculationResponse> {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing settlement calculation request");

    let request = parse_json(payload, correlation_id)?;
    let params = state
        .config()
        .parameters_for(request.termination_date)
        .map_err(|e| failed(e, correlation_id))?;
    let terms = &request.terms;
    let input = SettlementInput {
        contract: &request.contract,
        termination_date: request.termination_date,
        termination_reason: request.termination_reason,
        last_cesantias_cut: terms.last_cesantias_cut,
        last_service_bonus_date: terms.last_service_bonus_date,
        vacation_days_taken: terms.vacation_days_taken,
        unpaid_salary_days: terms.unpaid_salary_days,
        average_variable_salary: terms.average_variable_salary,
    };
    let calculation = calculate_settlement(&input, &params).map_err(|e| failed(e, correlation_id))?;

    info!(
        correlation_id = %correlation_id,
        contract_id = %request.contract.id,
        total = %calculation.total,
        "Settlement calculation completed successfully"
    );
    Ok((
        StatusCode::OK,
        Json(SettlementCalculationResponse::new(
            request.contract.id.clone(),
            request.termination_date,
            calculation,
        )),
    ))
}

/// Handler for GET /config/parameters?date=YYYY-MM-DD.
async fn get_parameters_handler(
    State(state): State<AppState>,
    query: Result<Query<ParametersQuery>, QueryRejection>,
) -> ApiResult<ParametersResponse> {
    let correlation_id = Uuid::new_v4();
    let Query(query) = query.map_err(|rejection| {
        warn!(correlation_id = %correlation_id, error = %rejection, "Invalid query string");
        ApiErrorResponse::bad_request(ApiError::validation_error(rejection.body_text()))
    })?;

    let config = state.config();
    let country = config.metadata().map_err(|e| failed(e, correlation_id))?;
    let parameters = config
        .parameters_for(query.date)
        .map_err(|e| failed(e, correlation_id))?;
    Ok((StatusCode::OK, Json(ParametersResponse { country, parameters })))
}

/// Handler for PUT /config/parameters/:key.
async fn update_parameter_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    payload: Result<Json<ParameterUpdateRequest>, JsonRejection>,
) -> ApiResult<ParameterUpdateResponse> {
    let correlation_id = Uuid::new_v4();
    let request = parse_json(payload, correlation_id)?;

    let config = state.config();
    let previous = config
        .set_parameter(&key, request.value, request.effective_on)
        .map_err(|e| failed(e, correlation_id))?;
    let effective_date = config
        .parameters_for(request.effective_on)
        .map_err(|e| failed(e, correlation_id))?
        .effective_date;

    info!(correlation_id = %correlation_id, key = %key, "Parameter update applied");
    Ok((
        StatusCode::OK,
        Json(ParameterUpdateResponse {
            key,
            previous,
            value: request.value,
            effective_date,
        }),
    ))
}

/// Handler for POST /employees.
async fn register_employee_handler(
    State(state): State<AppState>,
    payload: Result<Json<Employee>, JsonRejection>,
) -> ApiResult<Employee> {
    let correlation_id = Uuid::new_v4();
    let employee = parse_json(payload, correlation_id)?;
    created(state.payroll().register_employee(employee), correlation_id)
}

/// Handler for POST /contracts.
async fn register_contract_handler(
    State(state): State<AppState>,
    payload: Result<Json<Contract>, JsonRejection>,
) -> ApiResult<Contract> {
    let correlation_id = Uuid::new_v4();
    let contract = parse_json(payload, correlation_id)?;
    created(state.payroll().register_contract(contract), correlation_id)
}

/// Handler for POST /novedades.
async fn record_novedad_handler(
    State(state): State<AppState>,
    payload: Result<Json<Novedad>, JsonRejection>,
) -> ApiResult<Novedad> {
    let correlation_id = Uuid::new_v4();
    let novedad = parse_json(payload, correlation_id)?;
    created(state.payroll().record_novedad(novedad), correlation_id)
}

/// Handler for POST /payroll/periods.
async fn create_period_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreatePeriodRequest>, JsonRejection>,
) -> ApiResult<PayrollPeriod> {
    let correlation_id = Uuid::new_v4();
    let request = parse_json(payload, correlation_id)?;
    created(
        state
            .payroll()
            .create_period(request.start_date, request.end_date, request.frequency),
        correlation_id,
    )
}

/// Handler for GET /payroll/periods.
async fn list_periods_handler(State(state): State<AppState>) -> ApiResult<Vec<PayrollPeriod>> {
    ok(state.payroll().list_periods(), Uuid::new_v4())
}

/// Handler for GET /payroll/periods/:id.
async fn get_period_handler(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<PayrollPeriod> {
    let correlation_id = Uuid::new_v4();
    let id = parse_id(id, correlation_id)?;
    ok(state.payroll().get_period(id), correlation_id)
}

/// Handler for POST /payroll/periods/:id/liquidate.
async fn liquidate_period_handler(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<PayrollPeriod> {
    let correlation_id = Uuid::new_v4();
    let id = parse_id(id, correlation_id)?;
    info!(correlation_id = %correlation_id, period_id = %id, "Liquidating payroll period");
    ok(state.payroll().liquidate_period(id), correlation_id)
}

/// Handler for POST /payroll/periods/:id/adjustments.
async fn adjust_entry_handler(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<EntryAdjustmentRequest>, JsonRejection>,
) -> ApiResult<ManualAdjustment> {
    let correlation_id = Uuid::new_v4();
    let id = parse_id(id, correlation_id)?;
    let request = parse_json(payload, correlation_id)?;
    created(state.payroll().adjust_entry(id, request.into()), correlation_id)
}

/// Handler for POST /payroll/periods/:id/approve.
async fn approve_period_handler(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<PayrollPeriod> {
    let correlation_id = Uuid::new_v4();
    let id = parse_id(id, correlation_id)?;
    ok(state.payroll().approve_period(id), correlation_id)
}

/// Handler for POST /payroll/periods/:id/close.
async fn close_period_handler(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<PayrollPeriod> {
    let correlation_id = Uuid::new_v4();
    let id = parse_id(id, correlation_id)?;
    ok(state.payroll().close_period(id), correlation_id)
}

/// Handler for POST /settlements.
async fn create_settlement_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateSettlementRequest>, JsonRejection>,
) -> ApiResult<Settlement> {
    let correlation_id = Uuid::new_v4();
    let request = parse_json(payload, correlation_id)?;
    created(
        state.settlements().create_settlement(request.into()),
        correlation_id,
    )
}

/// Handler for GET /settlements/:id.
async fn get_settlement_handler(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Settlement> {
    let correlation_id = Uuid::new_v4();
    let id = parse_id(id, correlation_id)?;
    ok(state.settlements().get_settlement(id), correlation_id)
}

/// Handler for POST /settlements/:id/calculate.
async fn recalculate_settlement_handler(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Settlement> {
    let correlation_id = Uuid::new_v4();
    let id = parse_id(id, correlation_id)?;
    info!(correlation_id = %correlation_id, settlement_id = %id, "Calculating settlement");
    ok(state.settlements().calculate(id), correlation_id)
}

/// Handler for POST /settlements/:id/adjustments.
async fn adjust_settlement_handler(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<SettlementAdjustmentRequest>, JsonRejection>,
) -> ApiResult<ManualAdjustment> {
    let correlation_id = Uuid::new_v4();
    let id = parse_id(id, correlation_id)?;
    let request = parse_json(payload, correlation_id)?;
    created(
        state.settlements().adjust(
            id,
            request.concept,
            request.new_amount,
            &request.reason,
            &request.adjusted_by,
        ),
        correlation_id,
    )
}

/// Handler for POST /settlements/:id/approve.
async fn approve_settlement_handler(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Settlement> {
    let correlation_id = Uuid::new_v4();
    let id = parse_id(id, correlation_id)?;
    ok(state.settlements().approve(id), correlation_id)
}

/// Handler for POST /settlements/:id/pay.
async fn pay_settlement_handler(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Settlement> {
    let correlation_id = Uuid::new_v4();
    let id = parse_id(id, correlation_id)?;
    ok(state.settlements().mark_paid(id), correlation_id)
}

/// Unwraps a JSON body or turns the rejection into a 400.
///
/// Missing fields are reported as `VALIDATION_ERROR`; anything else the
/// body could not be parsed for is `MALFORMED_JSON`.
fn parse_json<T>(
    payload: Result<Json<T>, JsonRejection>,
    correlation_id: Uuid,
) -> Result<T, ApiErrorResponse> {
    let rejection = match payload {
        Ok(Json(body)) => return Ok(body),
        Err(rejection) => rejection,
    };

    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    Err(ApiErrorResponse::bad_request(error))
}

fn parse_id(
    id: Result<Path<Uuid>, PathRejection>,
    correlation_id: Uuid,
) -> Result<Uuid, ApiErrorResponse> {
    match id {
        Ok(Path(id)) => Ok(id),
        Err(rejection) => {
            warn!(correlation_id = %correlation_id, error = %rejection, "Invalid path id");
            Err(ApiErrorResponse::bad_request(ApiError::validation_error(
                rejection.body_text(),
            )))
        }
    }
}

fn failed(error: EngineError, correlation_id: Uuid) -> ApiErrorResponse {
    warn!(
        correlation_id = %correlation_id,
        error = %error,
        "Request failed"
    );
    error.into()
}

fn ok<T: Serialize>(result: Result<T, EngineError>, correlation_id: Uuid) -> ApiResult<T> {
    respond(StatusCode::OK, result, correlation_id)
}

fn created<T: Serialize>(result: Result<T, EngineError>, correlation_id: Uuid) -> ApiResult<T> {
    respond(StatusCode::CREATED, result, correlation_id)
}

fn respond<T: Serialize>(
    status: StatusCode,
    result: Result<T, EngineError>,
    correlation_id: Uuid,
) -> ApiResult<T> {
    result
        .map(|body| (status, Json(body)))
        .map_err(|e| failed(e, correlation_id))
}
