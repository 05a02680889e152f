//! Integration tests for the payroll engine.
//!
//! This test suite drives the HTTP API and the library entry points through
//! the main payroll scenarios:
//! - Salaries in the exempt and taxed brackets
//! - Bracket boundaries
//! - Allowances and other deductions
//! - IRT base modes
//! - Negative net salary
//! - Loaded versus built-in configuration
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

use payroll_engine::api::{AppState, create_router};
use payroll_engine::calculation::{compute, evaluate, preview_payroll};
use payroll_engine::config::{ConfigLoader, PayrollConfig};
use payroll_engine::models::{BracketTable, InssRates, IrtBaseMode, PayrollInput, PayrollOptions};

// =============================================================================
// Test Helpers
// =============================================================================

fn create_router_for_test() -> Router {
    let config = ConfigLoader::load("./config/angola")
        .expect("Failed to load config")
        .into_config();
    create_router(AppState::new(config))
}

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

async fn post_json(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

async fn preview(body: Value) -> Value {
    let (status, json) = post_json(create_router_for_test(), "/payroll/preview", body).await;
    assert_eq!(status, StatusCode::OK, "unexpected response: {}", json);
    json
}

fn assert_amounts(result: &Value, expected: &[(&str, i64)]) {
    for (field, amount) in expected {
        assert_eq!(
            result[*field].as_i64(),
            Some(*amount),
            "field {} in {}",
            field,
            result
        );
    }
}

// =============================================================================
// Reference Scenarios
// =============================================================================

#[tokio::test]
async fn test_salary_of_200000_in_third_bracket() {
    let result = preview(json!({ "gross_salary": 200000 })).await;

    assert_amounts(
        &result,
        &[
            ("taxable_gross", 200_000),
            ("inss_employee", 6_000),
            ("inss_employer", 16_000),
            ("irt_base", 194_000),
            ("irt", 19_540),
            ("net_salary", 174_460),
            ("total_cost_employer", 216_000),
        ],
    );
}

#[tokio::test]
async fn test_salary_of_50000_is_irt_exempt() {
    let result = preview(json!({ "gross_salary": 50000 })).await;

    assert_amounts(
        &result,
        &[
            ("taxable_gross", 50_000),
            ("inss_employee", 1_500),
            ("irt_base", 48_500),
            ("irt", 0),
            ("net_salary", 48_500),
        ],
    );
}

#[tokio::test]
async fn test_preview_returns_every_field_as_integer() {
    let result = preview(json!({ "gross_salary": "123456.78" })).await;
    let object = result.as_object().unwrap();

    assert_eq!(object.len(), 11);
    for (field, value) in object {
        assert!(value.is_i64(), "field {} is not an integer: {}", field, value);
    }
}

// =============================================================================
// Bracket Boundaries
// =============================================================================

#[tokio::test]
async fn test_irt_base_on_threshold_uses_lower_bracket() {
    // Gross mode puts the IRT base exactly on the 150 000 threshold
    let result = preview(json!({ "gross_salary": 150000, "irt_base_mode": "gross" })).await;

    assert_amounts(&result, &[("irt_base", 150_000), ("irt", 6_500)]);
}

#[tokio::test]
async fn test_irt_base_just_above_threshold_uses_upper_bracket() {
    let result = preview(json!({ "gross_salary": 150001, "irt_base_mode": "gross" })).await;

    // 12 500 + 0.16 x 1
    assert_amounts(&result, &[("irt_base", 150_001), ("irt", 12_500)]);
}

#[test]
fn test_default_table_taxes_nothing_at_zero() {
    let table = BracketTable::angola_default();
    assert_eq!(evaluate(&table, Decimal::ZERO).unwrap(), Decimal::ZERO);
}

// =============================================================================
// Allowances, Deductions and Base Modes
// =============================================================================

#[tokio::test]
async fn test_allowances_and_other_deductions() {
    let result = preview(json!({
        "gross_salary": 150000,
        "taxable_allowances": 20000,
        "non_taxable_allowances": 15000,
        "other_deductions": 5000
    }))
    .await;

    assert_amounts(
        &result,
        &[
            ("taxable_gross", 170_000),
            ("inss_employee", 5_100),
            ("inss_employer", 13_600),
            ("irt_base", 164_900),
            ("irt", 14_884),
            ("net_salary", 160_016),
            ("total_cost_employer", 198_600),
        ],
    );
}

#[tokio::test]
async fn test_non_taxable_allowances_do_not_change_irt() {
    let without = preview(json!({ "gross_salary": 300000 })).await;
    let with = preview(json!({ "gross_salary": 300000, "non_taxable_allowances": 40000 })).await;

    assert_eq!(without["irt"], with["irt"]);
    assert_eq!(without["inss_employee"], with["inss_employee"]);
    assert_eq!(
        with["net_salary"].as_i64().unwrap() - without["net_salary"].as_i64().unwrap(),
        40_000
    );
}

#[tokio::test]
async fn test_gross_mode_withholds_more_than_gross_minus_inss() {
    let gross = preview(json!({ "gross_salary": 400000, "irt_base_mode": "gross" })).await;
    let net_of_inss = preview(json!({ "gross_salary": 400000 })).await;

    assert!(gross["irt"].as_i64().unwrap() > net_of_inss["irt"].as_i64().unwrap());
    assert_eq!(gross["irt_base"], 400_000);
    assert_eq!(net_of_inss["irt_base"], 388_000);
}

#[tokio::test]
async fn test_negative_net_salary_is_returned() {
    let result = preview(json!({ "gross_salary": 50000, "other_deductions": 60000 })).await;

    assert_amounts(&result, &[("net_salary", -11_500)]);
}

#[tokio::test]
async fn test_calculate_flags_negative_net_salary() {
    let (status, json) = post_json(
        create_router_for_test(),
        "/payroll/calculate",
        json!({ "gross_salary": 50000, "other_deductions": 60000 }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["result"]["net_salary"], -11_500);
    assert_eq!(json["audit_trace"]["warnings"][0]["code"], "NEGATIVE_NET_SALARY");
    assert_eq!(json["audit_trace"]["steps"][4]["rule_id"], "irt_bracket");
    assert!(json["calculation_id"].is_string());
}

// =============================================================================
// Library Entry Points
// =============================================================================

#[test]
fn test_loaded_configuration_matches_builtin_results() {
    let loaded = ConfigLoader::load("./config/angola").unwrap().into_config();
    let builtin = PayrollConfig::angola_default();

    for gross in ["0", "99999.99", "150000", "275000", "1250000", "12000000"] {
        let a = preview_payroll(&loaded, decimal(gross), PayrollOptions::default()).unwrap();
        let b = preview_payroll(&builtin, decimal(gross), PayrollOptions::default()).unwrap();
        assert_eq!(a, b, "gross {}", gross);
    }
}

#[test]
fn test_compute_is_deterministic_across_threads() {
    let table = std::sync::Arc::new(BracketTable::angola_default());
    let input = PayrollInput::new(
        decimal("845000"),
        PayrollOptions {
            taxable_allowances: decimal("12500.50"),
            irt_base_mode: IrtBaseMode::GrossMinusInss,
            ..PayrollOptions::default()
        },
        InssRates::default(),
    )
    .unwrap();
    let expected = compute(&input, &table).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let table = std::sync::Arc::clone(&table);
            let input = input.clone();
            std::thread::spawn(move || compute(&input, &table).unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

// =============================================================================
// Error Cases
// =============================================================================

#[tokio::test]
async fn test_negative_allowance_returns_invalid_input() {
    let (status, json) = post_json(
        create_router_for_test(),
        "/payroll/preview",
        json!({ "gross_salary": 1000, "taxable_allowances": -1 }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_INPUT");
    assert_eq!(json["details"], "taxable_allowances");
}

#[tokio::test]
async fn test_unknown_irt_base_mode_returns_400() {
    let (status, json) = post_json(
        create_router_for_test(),
        "/payroll/preview",
        json!({ "gross_salary": 1000, "irt_base_mode": "net" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "MALFORMED_JSON");
}

#[tokio::test]
async fn test_amounts_past_decimal_max_return_calculation_error() {
    let (status, json) = post_json(
        create_router_for_test(),
        "/payroll/preview",
        json!({
            "gross_salary": 1000000,
            "non_taxable_allowances": Decimal::MAX.to_string()
        }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "CALCULATION_ERROR");
}

#[test]
fn test_preview_past_decimal_max_is_an_error_not_a_panic() {
    let options = PayrollOptions {
        non_taxable_allowances: Decimal::MAX,
        ..PayrollOptions::default()
    };
    let result = preview_payroll(&PayrollConfig::angola_default(), decimal("1000000"), options);

    assert!(matches!(
        result,
        Err(payroll_engine::error::EngineError::CalculationError { .. })
    ));
}

#[tokio::test]
async fn test_missing_content_type_returns_400() {
    let response = create_router_for_test()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/payroll/preview")
                .body(Body::from(r#"{"gross_salary": 1000}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
