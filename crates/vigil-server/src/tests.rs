//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;
use vigil_core::RuleEngine;

fn setup_test_app() -> Router {
    let engine = RuleEngine::new().unwrap();
    let config = ServerConfig {
        allowed_origins: vec![],
        // Explicitly no backend so forwarding routes are deterministic
        backend_url: None,
    };
    create_router(engine, config)
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = setup_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["status"], "ok");
}

// ========== Inventory Expiry (stock report) ==========

fn stock_item(id: &str, name: &str, expiry: &str) -> serde_json::Value {
    json!({
        "item_id": id,
        "item_name": name,
        "quantity": 5,
        "unit": "kg",
        "expiry_date": expiry,
        "purchase_price": 2.0,
    })
}

#[tokio::test]
async fn test_inventory_expiry_annotated_payload() {
    let app = setup_test_app();

    let body = json!({
        "inventory": [
            stock_item("A", "Yoghurt", "2026-08-05"),  // expired
            stock_item("B", "Cheese", "2026-08-09"),   // critical
            stock_item("C", "Flour", "2026-09-20"),    // ok
        ],
        "current_date": "2026-08-06",
    });

    let response = app
        .oneshot(post_json("/run/inventory-expiry", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["status"], "success");
    assert_eq!(json["summary"]["expired_items"], 1);
    assert_eq!(json["summary"]["critical_items"], 1);
    assert_eq!(json["summary"]["ok_items"], 1);
    assert_eq!(json["as_of"], "2026-08-06");
    // 5 x 2.0 at risk in the critical bucket
    assert_eq!(json["summary"]["total_value_at_risk"], 10.0);
}

#[tokio::test]
async fn test_inventory_expiry_bare_list_payload() {
    let app = setup_test_app();

    // A bare list is accepted; the as-of date defaults to today, so pick
    // an expiry far in the past to land deterministically in expired
    let body = json!([stock_item("A", "Old stock", "2000-01-01")]);

    let response = app
        .oneshot(post_json("/run/inventory-expiry", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["summary"]["expired_items"], 1);
}

#[tokio::test]
async fn test_inventory_expiry_skips_malformed_items() {
    let app = setup_test_app();

    let body = json!({
        "inventory": [
            stock_item("A", "Yoghurt", "2026-08-08"),
            {"item_id": "B", "item_name": "Mystery", "unit": "kg", "expiry_date": "2026-08-08"},
            stock_item("C", "Cheese", "2026-08-10"),
            stock_item("D", "Flour", "2026-10-01"),
        ],
        "current_date": "2026-08-06",
    });

    let response = app
        .oneshot(post_json("/run/inventory-expiry", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["summary"]["skipped_items"], 1);
    assert_eq!(json["skipped_items"][0]["item_id"], "B");
    assert_eq!(json["summary"]["critical_items"], 2);
    assert_eq!(json["summary"]["ok_items"], 1);
}

#[tokio::test]
async fn test_inventory_expiry_invalid_date_rejected() {
    let app = setup_test_app();

    let body = json!({
        "inventory": [stock_item("A", "Yoghurt", "2026-08-08")],
        "current_date": "08/06/2026",
    });

    let response = app
        .oneshot(post_json("/run/inventory-expiry", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("Invalid current_date format"));
}

#[tokio::test]
async fn test_inventory_expiry_empty_list_rejected() {
    let app = setup_test_app();

    let body = json!({"inventory": [], "current_date": "2026-08-06"});

    let response = app
        .oneshot(post_json("/run/inventory-expiry", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_inventory_expiry_wrong_shape_rejected() {
    let app = setup_test_app();

    let response = app
        .oneshot(post_json("/run/inventory-expiry", &json!("not a payload")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ========== Expiry Alerts (per-item variant) ==========

#[tokio::test]
async fn test_expiry_alerts_with_injected_date() {
    let app = setup_test_app();

    let body = json!({
        "items": [
            {"id": 1, "name": "Tomatoes", "expiry_date": "2026-08-08"},
            {"id": 2, "name": "Milk", "expiry_date": "2026-08-07"},
            {"id": 3, "name": "Rice", "expiry_date": "2026-08-31"},
            {"id": 4, "name": "Bread", "expiry_date": "2026-08-05"},
        ],
        "current_date": "2026-08-06",
    });

    let response = app
        .oneshot(post_json("/run/expiry-alerts", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["status"], "success");
    assert_eq!(json["count"], 3);

    let alerts = json["alerts"].as_array().unwrap();
    // Input order preserved; SAFE item (Rice) suppressed
    assert_eq!(alerts[0]["related_id"], 1);
    assert_eq!(alerts[0]["severity"], "HIGH");
    assert_eq!(alerts[1]["related_id"], 2);
    assert_eq!(alerts[2]["related_id"], 4);
    assert_eq!(alerts[2]["severity"], "CRITICAL");
    assert_eq!(alerts[2]["extra"]["expiry_label"], "EXPIRED");
    assert_eq!(alerts[2]["status"], "OPEN");
}

// ========== Expense Anomalies (local) ==========

#[tokio::test]
async fn test_anomalies_local_robust_path() {
    let app = setup_test_app();

    let body = json!({
        "expenses": [
            {"id": 1, "amount": 10.0},
            {"id": 2, "amount": 12.0},
            {"id": 3, "amount": 11.0},
            {"id": 4, "amount": 13.0},
            {"id": 5, "amount": 1000.0},
        ]
    });

    let response = app
        .oneshot(post_json("/run/anomalies-local", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["status"], "success");
    assert_eq!(json["summary"]["method"], "robust-mad-zscore");
    assert_eq!(json["summary"]["anomalies"], 1);
    assert_eq!(json["anomalies"][0]["id"], 5);
    assert!(json["anomalies"][0]["anomaly_score"].as_f64().unwrap() > 3.5);
}

#[tokio::test]
async fn test_anomalies_local_nested_payload_and_fallback() {
    let app = setup_test_app();

    let body = json!({
        "data": {"expenses": [{"id": 1, "amount": 5.0}, {"id": 2, "amount": 50.0}]}
    });

    let response = app
        .oneshot(post_json("/run/anomalies-local", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["summary"]["method"], "fallback-max");
    assert_eq!(json["summary"]["anomalies"], 1);
    assert_eq!(json["anomalies"][0]["id"], 2);
    assert!(json["anomalies"][0]["anomaly_score"].is_null());
}

#[tokio::test]
async fn test_anomalies_local_invalid_payload_rejected() {
    let app = setup_test_app();

    let response = app
        .clone()
        .oneshot(post_json("/run/anomalies-local", &json!({"expenses": []})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(post_json(
            "/run/anomalies-local",
            &json!({"expenses": [{"amount": -4.0}]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("must be >= 0"));
}

// ========== Cashflow ==========

fn cashflow_tx(id: &str, tx_type: &str, amount: f64) -> serde_json::Value {
    json!({
        "current_balance": 2000.0,
        "transaction_id": id,
        "date": "2026-08-06",
        "type": tx_type,
        "amount": amount,
        "category": "supplies",
        "description": "row",
    })
}

#[tokio::test]
async fn test_cashflow_summarizes_and_skips_bad_rows() {
    let app = setup_test_app();

    let body = json!({
        "transactions": [
            cashflow_tx("T1", "income", 1000.0),
            cashflow_tx("T2", "expense", 400.0),
            {"transaction_id": "T3", "type": "expense"},
        ]
    });

    let response = app.oneshot(post_json("/run/cashflow", &body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    // No backend configured in tests, so nothing was forwarded
    assert_eq!(json["posted_to_backend"], false);
    assert_eq!(json["local_summary"]["transaction_count"], 2);
    assert_eq!(json["local_summary"]["total_income"], 1000.0);
    assert_eq!(json["local_summary"]["total_expense"], 400.0);
    assert_eq!(json["local_summary"]["net_cashflow"], 600.0);
    assert_eq!(json["skipped_transactions"][0]["transaction_id"], "T3");
    assert!(json.get("backend_response").is_none());
}

#[tokio::test]
async fn test_cashflow_all_invalid_rejected() {
    let app = setup_test_app();

    let body = json!({
        "transactions": [
            {"transaction_id": "T1"},
            {"transaction_id": "T2"},
        ]
    });

    let response = app.oneshot(post_json("/run/cashflow", &body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "No valid transactions");
}

// ========== Forwarding routes without a backend ==========

#[tokio::test]
async fn test_forwarding_routes_require_backend() {
    let app = setup_test_app();

    let response = app
        .clone()
        .oneshot(post_json("/run/inventory", &json!({"inventory": []})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let response = app
        .oneshot(post_json(
            "/run/anomalies",
            &json!({"expenses": [{"amount": 1.0}]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_forward_anomalies_validates_before_relay() {
    let app = setup_test_app();

    // Invalid payload fails validation (400) before the missing backend
    // could matter (503)
    let response = app
        .oneshot(post_json("/run/anomalies", &json!({"expenses": []})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
