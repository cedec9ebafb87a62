//! Integration tests for the payroll engine HTTP API.
//!
//! This test suite covers:
//! - Stateless payroll calculation (full month, fortnight, novedades, high salary)
//! - Stateless contract settlement
//! - Legal parameter lookup and tuning
//! - Payroll period lifecycle
//! - Settlement lifecycle
//! - Error cases

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::str::FromStr;
use tower::ServiceExt;

use nomina_engine::api::{AppState, create_router};
use nomina_engine::config::ConfigLoader;

// =============================================================================
// Test Helpers
// =============================================================================

fn create_router_for_test() -> Router {
    let config = ConfigLoader::load("./config/colombia").expect("Failed to load config");
    create_router(AppState::new(config))
}

fn normalize_decimal(s: &str) -> String {
    Decimal::from_str(s).unwrap().normalize().to_string()
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(match body {
            Some(value) => Body::from(value.to_string()),
            None => Body::empty(),
        })
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body_bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };
    (status, json)
}

fn contract(id: &str, employee_id: &str, salary: &str, start: &str) -> Value {
    json!({
        "id": id,
        "employee_id": employee_id,
        "contract_type": "indefinite",
        "salary_type": "ordinary",
        "monthly_salary": salary,
        "start_date": start
    })
}

fn payroll_request(salary: &str, start: &str, end: &str, novedades: Vec<Value>) -> Value {
    json!({
        "contract": contract("ct_001", "emp_001", salary, "2024-01-01"),
        "period_start": start,
        "period_end": end,
        "novedades": novedades
    })
}

fn assert_amount(value: &Value, expected: &str) {
    let actual = value
        .as_str()
        .unwrap_or_else(|| panic!("Expected a decimal string, got {}", value));
    assert_eq!(
        normalize_decimal(actual),
        normalize_decimal(expected),
        "Expected {}, got {}",
        expected,
        actual
    );
}

fn line_amount(lines: &Value, concept: &str) -> Option<String> {
    lines
        .as_array()?
        .iter()
        .find(|l| l["concept"] == concept)
        .and_then(|l| l["amount"].as_str())
        .map(normalize_decimal)
}

async fn seed_employee(router: &Router, employee_id: &str, contract_id: &str, salary: &str) {
    let (status, _) = send(
        router,
        "POST",
        "/employees",
        Some(json!({
            "id": employee_id,
            "document_number": format!("CC{}", employee_id),
            "full_name": "Ana María Restrepo"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        router,
        "POST",
        "/contracts",
        Some(contract(contract_id, employee_id, salary, "2023-01-16")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

// =============================================================================
// SECTION 1: Stateless Payroll Calculation
// =============================================================================

#[tokio::test]
async fn test_full_month_minimum_profile() {
    let router = create_router_for_test();
    let (status, entry) = send(
        &router,
        "POST",
        "/payroll/calculate",
        Some(payroll_request("2000000", "2025-03-01", "2025-03-31", vec![])),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(entry["days_worked"], 30);
    assert_amount(&entry["totals"]["gross_earnings"], "2200000");
    assert_amount(&entry["totals"]["total_deductions"], "160000");
    assert_amount(&entry["totals"]["net_pay"], "2040000");
    assert_amount(&entry["totals"]["ibc"], "2000000");
    assert_eq!(
        line_amount(&entry["earnings"], "transport_allowance").as_deref(),
        Some("200000")
    );
}

#[tokio::test]
async fn test_second_fortnight_pays_fifteen_days() {
    let router = create_router_for_test();
    let (status, entry) = send(
        &router,
        "POST",
        "/payroll/calculate",
        Some(payroll_request("2000000", "2025-03-16", "2025-03-31", vec![])),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(entry["days_worked"], 15);
    assert_eq!(
        line_amount(&entry["earnings"], "base_salary").as_deref(),
        Some("1000000")
    );
    assert_eq!(
        line_amount(&entry["earnings"], "transport_allowance").as_deref(),
        Some("100000")
    );
    assert_amount(&entry["totals"]["net_pay"], "1020000");
}

#[tokio::test]
async fn test_novedades_in_a_month() {
    let router = create_router_for_test();
    let novedades = vec![
        json!({"id": "nov_1", "employee_id": "emp_001", "date": "2025-03-10",
               "kind": {"type": "overtime", "overtime_kind": "daytime_overtime", "hours": "4"}}),
        json!({"id": "nov_2", "employee_id": "emp_001", "date": "2025-03-20",
               "kind": {"type": "commission", "amount": "150000"}}),
        json!({"id": "nov_3", "employee_id": "emp_001", "date": "2025-03-25",
               "kind": {"type": "bonus", "amount": "100000", "constitutes_salary": false}}),
    ];
    let (status, entry) = send(
        &router,
        "POST",
        "/payroll/calculate",
        Some(payroll_request("2300000", "2025-03-01", "2025-03-31", novedades)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        line_amount(&entry["earnings"], "overtime").as_deref(),
        Some("50000")
    );
    assert_amount(&entry["totals"]["ibc"], "2500000");
    assert_amount(&entry["totals"]["gross_earnings"], "2800000");
    assert_amount(&entry["totals"]["net_pay"], "2600000");
    assert!(line_amount(&entry["deductions"], "withholding_tax").is_none());
}

#[tokio::test]
async fn test_high_salary_deductions() {
    let router = create_router_for_test();
    let (status, entry) = send(
        &router,
        "POST",
        "/payroll/calculate",
        Some(payroll_request("10000000", "2025-03-01", "2025-03-31", vec![])),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(line_amount(&entry["earnings"], "transport_allowance").is_none());
    assert_eq!(
        line_amount(&entry["deductions"], "solidarity_fund").as_deref(),
        Some("100000")
    );
    assert_eq!(
        line_amount(&entry["deductions"], "withholding_tax").as_deref(),
        Some("398000")
    );
    assert_amount(&entry["totals"]["net_pay"], "8702000");
}

#[tokio::test]
async fn test_audit_trace_is_returned() {
    let router = create_router_for_test();
    let (_, entry) = send(
        &router,
        "POST",
        "/payroll/calculate",
        Some(payroll_request("2000000", "2025-03-01", "2025-03-31", vec![])),
    )
    .await;

    let steps = entry["audit_trace"]["steps"].as_array().unwrap();
    assert!(!steps.is_empty());
    for (i, step) in steps.iter().enumerate() {
        assert_eq!(step["step_number"], i as u64 + 1);
        assert!(step["legal_ref"].as_str().is_some());
    }
}

// =============================================================================
// SECTION 2: Stateless Settlement
// =============================================================================

fn settlement_request(reason: &str) -> Value {
    json!({
        "contract": contract("ct_001", "emp_001", "2000000", "2023-01-16"),
        "termination_date": "2025-06-30",
        "termination_reason": reason,
        "terms": {"vacation_days_taken": "30"}
    })
}

#[tokio::test]
async fn test_resignation_settlement() {
    let router = create_router_for_test();
    let (status, body) = send(
        &router,
        "POST",
        "/settlements/calculate",
        Some(settlement_request("resignation")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["contract_id"], "ct_001");
    assert_eq!(line_amount(&body["lines"], "cesantias").as_deref(), Some("1100000"));
    assert_eq!(line_amount(&body["lines"], "vacation").as_deref(), Some("458333"));
    assert!(line_amount(&body["lines"], "indemnification").is_none());
    assert_amount(&body["total"], "2724333");
}

#[tokio::test]
async fn test_dismissal_without_just_cause_settlement() {
    let router = create_router_for_test();
    let (status, body) = send(
        &router,
        "POST",
        "/settlements/calculate",
        Some(settlement_request("without_just_cause")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        line_amount(&body["lines"], "indemnification").as_deref(),
        Some("3944444")
    );
    assert_amount(&body["total"], "6668777");
}

// =============================================================================
// SECTION 3: Legal Parameters
// =============================================================================

#[tokio::test]
async fn test_mid_year_parameter_change() {
    let router = create_router_for_test();

    let (status, before) = send(&router, "GET", "/config/parameters?date=2025-07-14", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_amount(&before["parameters"]["monthly_hours"], "230");

    let (_, after) = send(&router, "GET", "/config/parameters?date=2025-07-15", None).await;
    assert_amount(&after["parameters"]["monthly_hours"], "220");
}

#[tokio::test]
async fn test_parameter_update_is_used_by_calculations() {
    let router = create_router_for_test();

    let (status, updated) = send(
        &router,
        "PUT",
        "/config/parameters/transport_allowance",
        Some(json!({"value": "210000", "effective_on": "2025-03-01"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_amount(&updated["previous"], "200000");
    assert_eq!(updated["effective_date"], "2025-01-01");

    let (_, entry) = send(
        &router,
        "POST",
        "/payroll/calculate",
        Some(payroll_request("2000000", "2025-03-01", "2025-03-31", vec![])),
    )
    .await;
    assert_eq!(
        line_amount(&entry["earnings"], "transport_allowance").as_deref(),
        Some("210000")
    );
}

#[tokio::test]
async fn test_unknown_parameter_key_returns_404() {
    let router = create_router_for_test();
    let (status, error) = send(
        &router,
        "PUT",
        "/config/parameters/holiday_bonus",
        Some(json!({"value": "1", "effective_on": "2025-03-01"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["code"], "PARAMETER_NOT_FOUND");
}

// =============================================================================
// SECTION 4: Payroll Period Lifecycle
// =============================================================================

#[tokio::test]
async fn test_payroll_period_lifecycle() {
    let router = create_router_for_test();
    seed_employee(&router, "emp_001", "ct_001", "2000000").await;
    seed_employee(&router, "emp_002", "ct_002", "10000000").await;

    let (status, _) = send(
        &router,
        "POST",
        "/novedades",
        Some(json!({"id": "nov_1", "employee_id": "emp_001", "date": "2025-03-10",
                    "kind": {"type": "voluntary_deduction", "description": "loan", "amount": "100000"}})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, period) = send(
        &router,
        "POST",
        "/payroll/periods",
        Some(json!({"start_date": "2025-03-01", "end_date": "2025-03-31", "frequency": "monthly"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(period["status"], "draft");
    let id = period["id"].as_str().unwrap().to_string();

    let (status, liquidated) =
        send(&router, "POST", &format!("/payroll/periods/{}/liquidate", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(liquidated["status"], "liquidated");
    let entries = liquidated["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_amount(&entries[0]["totals"]["net_pay"], "1940000");
    assert_amount(&entries[1]["totals"]["net_pay"], "8702000");

    let (status, adjustment) = send(
        &router,
        "POST",
        &format!("/payroll/periods/{}/adjustments", id),
        Some(json!({
            "employee_id": "emp_001",
            "concept": "voluntary_deduction",
            "detail": "loan",
            "new_amount": "50000",
            "reason": "installment rescheduled",
            "adjusted_by": "analyst"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_amount(&adjustment["previous_amount"], "100000");

    let (_, fetched) = send(&router, "GET", &format!("/payroll/periods/{}", id), None).await;
    assert_amount(&fetched["entries"][0]["totals"]["net_pay"], "1990000");

    let (status, approved) =
        send(&router, "POST", &format!("/payroll/periods/{}/approve", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "approved");

    let (status, error) =
        send(&router, "POST", &format!("/payroll/periods/{}/liquidate", id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["code"], "INVALID_TRANSITION");

    let (status, closed) =
        send(&router, "POST", &format!("/payroll/periods/{}/close", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(closed["status"], "closed");

    let (status, periods) = send(&router, "GET", "/payroll/periods", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(periods.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_adjusting_unknown_line_returns_400() {
    let router = create_router_for_test();
    seed_employee(&router, "emp_001", "ct_001", "2000000").await;

    let (_, period) = send(
        &router,
        "POST",
        "/payroll/periods",
        Some(json!({"start_date": "2025-03-01", "end_date": "2025-03-31", "frequency": "monthly"})),
    )
    .await;
    let id = period["id"].as_str().unwrap().to_string();
    send(&router, "POST", &format!("/payroll/periods/{}/liquidate", id), None).await;

    let (status, error) = send(
        &router,
        "POST",
        &format!("/payroll/periods/{}/adjustments", id),
        Some(json!({
            "employee_id": "emp_001",
            "concept": "withholding_tax",
            "new_amount": "1000",
            "reason": "x",
            "adjusted_by": "analyst"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "ADJUSTMENT_TARGET_NOT_FOUND");
}

#[tokio::test]
async fn test_adjustment_names_contract_after_mid_period_change() {
    let router = create_router_for_test();
    let (status, _) = send(
        &router,
        "POST",
        "/employees",
        Some(json!({"id": "emp_001", "document_number": "CC1", "full_name": "Ana María Restrepo"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let mut first = contract("ct_a", "emp_001", "2000000", "2023-01-16");
    first["end_date"] = json!("2025-03-15");
    let second = contract("ct_b", "emp_001", "2500000", "2025-03-16");
    for body in [first, second] {
        let (status, _) = send(&router, "POST", "/contracts", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, period) = send(
        &router,
        "POST",
        "/payroll/periods",
        Some(json!({"start_date": "2025-03-01", "end_date": "2025-03-31", "frequency": "monthly"})),
    )
    .await;
    let id = period["id"].as_str().unwrap().to_string();
    let (_, liquidated) =
        send(&router, "POST", &format!("/payroll/periods/{}/liquidate", id), None).await;
    assert_eq!(liquidated["entries"].as_array().unwrap().len(), 2);

    let adjustment = |contract_id: Option<&str>| {
        let mut body = json!({
            "employee_id": "emp_001",
            "concept": "health",
            "new_amount": "1000",
            "reason": "EPS reconciliation",
            "adjusted_by": "analyst"
        });
        if let Some(contract_id) = contract_id {
            body["contract_id"] = json!(contract_id);
        }
        body
    };

    let uri = format!("/payroll/periods/{}/adjustments", id);
    let (status, error) = send(&router, "POST", &uri, Some(adjustment(None))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "AMBIGUOUS_ENTRY");

    let (status, _) = send(&router, "POST", &uri, Some(adjustment(Some("ct_b")))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, stored) = send(&router, "GET", &format!("/payroll/periods/{}", id), None).await;
    let entry = stored["entries"]
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["contract_id"] == "ct_b")
        .unwrap();
    assert_eq!(entry["adjustments"].as_array().unwrap().len(), 1);
}

// =============================================================================
// SECTION 5: Settlement Lifecycle
// =============================================================================

#[tokio::test]
async fn test_settlement_lifecycle() {
    let router = create_router_for_test();
    seed_employee(&router, "emp_001", "ct_001", "2000000").await;

    let create = json!({
        "contract_id": "ct_001",
        "termination_date": "2025-06-30",
        "termination_reason": "resignation",
        "terms": {"vacation_days_taken": "30"}
    });
    let (status, draft) = send(&router, "POST", "/settlements", Some(create.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(draft["status"], "draft");
    let id = draft["id"].as_str().unwrap().to_string();

    let (status, error) = send(&router, "POST", "/settlements", Some(create.clone())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["code"], "CONFLICT");

    let (status, calculated) =
        send(&router, "POST", &format!("/settlements/{}/calculate", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(calculated["status"], "calculated");
    assert_amount(&calculated["total"], "2724333");

    let (status, _) = send(
        &router,
        "POST",
        &format!("/settlements/{}/adjustments", id),
        Some(json!({
            "concept": "vacation",
            "new_amount": "500000",
            "reason": "agreed with the worker",
            "adjusted_by": "hr"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, fetched) = send(&router, "GET", &format!("/settlements/{}", id), None).await;
    assert_amount(&fetched["total"], "2766000");

    let (status, _) = send(&router, "POST", &format!("/settlements/{}/pay", id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    send(&router, "POST", &format!("/settlements/{}/approve", id), None).await;
    let (status, paid) = send(&router, "POST", &format!("/settlements/{}/pay", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["status"], "paid");

    let (status, _) = send(&router, "POST", "/settlements", Some(create)).await;
    assert_eq!(status, StatusCode::CREATED);
}

// =============================================================================
// SECTION 6: Error Cases
// =============================================================================

#[tokio::test]
async fn test_malformed_json_returns_400() {
    let router = create_router_for_test();
    let request = Request::builder()
        .method("POST")
        .uri("/payroll/calculate")
        .header("Content-Type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_field_returns_validation_error() {
    let router = create_router_for_test();
    let mut request = payroll_request("2000000", "2025-03-01", "2025-03-31", vec![]);
    request.as_object_mut().unwrap().remove("period_end");

    let (status, error) = send(&router, "POST", "/payroll/calculate", Some(request)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "VALIDATION_ERROR");
    assert!(error["message"].as_str().unwrap().contains("period_end"));
}

#[tokio::test]
async fn test_wrong_field_type_returns_malformed_json() {
    let router = create_router_for_test();
    let mut request = payroll_request("2000000", "2025-03-01", "2025-03-31", vec![]);
    request["period_end"] = json!(31);

    let (status, error) = send(&router, "POST", "/payroll/calculate", Some(request)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "MALFORMED_JSON");
}

#[tokio::test]
async fn test_contract_for_unknown_employee_returns_404() {
    let router = create_router_for_test();
    let (status, error) = send(
        &router,
        "POST",
        "/contracts",
        Some(contract("ct_001", "emp_404", "2000000", "2024-01-01")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_period_with_end_before_start_returns_400() {
    let router = create_router_for_test();
    let (status, error) = send(
        &router,
        "POST",
        "/payroll/periods",
        Some(json!({"start_date": "2025-03-31", "end_date": "2025-03-01", "frequency": "monthly"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "INVALID_PERIOD");
}

#[tokio::test]
async fn test_invalid_novedad_returns_400() {
    let router = create_router_for_test();
    seed_employee(&router, "emp_001", "ct_001", "2000000").await;
    let (status, error) = send(
        &router,
        "POST",
        "/novedades",
        Some(json!({"id": "nov_1", "employee_id": "emp_001", "date": "2025-03-10",
                    "kind": {"type": "incapacity", "days": 0}})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "INVALID_NOVEDAD");
}

#[tokio::test]
async fn test_termination_before_contract_start_returns_400() {
    let router = create_router_for_test();
    let mut request = settlement_request("resignation");
    request["contract"]["start_date"] = json!("2025-02-01");
    request["termination_date"] = json!("2025-01-31");
    let (status, error) = send(&router, "POST", "/settlements/calculate", Some(request)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "INVALID_CONTRACT");
}
