//! Router tests over the seeded in-memory store.

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use chrono::NaiveDate;
use clinic_db::MemoryStore;
use clinic_server::{AppState, router, router_with_state};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    router(MemoryStore::seeded())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(request.body(body).expect("Failed to build request"))
        .await
        .expect("Request failed");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Invalid JSON")
    };
    (status, json)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

fn ids(json: &Value) -> Vec<i64> {
    json.as_array()
        .expect("expected an array")
        .iter()
        .map(|row| row["id"].as_i64().expect("row without id"))
        .collect()
}

#[tokio::test]
async fn health_check() {
    let (status, body) = get(&app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn patients_list_and_search() {
    let app = app();

    let (status, body) = get(&app, "/api/patients").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![4, 3, 2, 1]);

    let (status, body) = get(&app, "/api/patients/search?term=KAYA").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![3]);

    for uri in ["/api/patients/search", "/api/patients/search?term=", "/api/patients/search?term=%20"] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"], "Search term is required");
    }
}

#[tokio::test]
async fn create_patient_validates_input() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/patients",
        Some(json!({ "first_name": "Deniz" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "First name, last name and phone are required");
    assert_eq!(body["details"].as_array().map(Vec::len), Some(2));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/patients",
        Some(json!({
            "first_name": "Deniz",
            "last_name": "Arslan",
            "phone": "0555 123 45 67",
            "email": "not-an-email"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "email");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/patients",
        Some(json!({
            "first_name": "Deniz",
            "last_name": "Arslan",
            "phone": "0555 123 45 67"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], 5);
    assert_eq!(body["email"], Value::Null);
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let response = app()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/patients")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"first_name\": "))
                .expect("Failed to build request"),
        )
        .await
        .expect("Request failed");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn patient_by_id() {
    let app = app();

    let (status, body) = get(&app, "/api/patients/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["first_name"], "Ayşe");

    let (status, body) = get(&app, "/api/patients/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid ID");

    let (status, body) = get(&app, "/api/patients/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Patient not found");
}

#[tokio::test]
async fn patch_patient() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::PATCH,
        "/api/patients/1",
        Some(json!({ "first_name": "Ayşe Nur", "email": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["first_name"], "Ayşe Nur");
    assert_eq!(body["email"], Value::Null);
    assert_eq!(body["gender"], "female");

    // Nothing recognized to update.
    let (status, body) = send(
        &app,
        Method::PATCH,
        "/api/patients/1",
        Some(json!({ "role": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Nothing to update"));

    let (status, _) = send(
        &app,
        Method::PATCH,
        "/api/patients/1",
        Some(json!({ "last_name": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::PATCH,
        "/api/patients/999",
        Some(json!({ "last_name": "Demir" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_patient_cascades() {
    let app = app();

    let (status, body) = send(&app, Method::DELETE, "/api/patients/3", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "success": true, "message": "Patient deleted successfully" })
    );

    let (_, body) = get(&app, "/api/appointments?patient_id=3").await;
    assert_eq!(ids(&body), Vec::<i64>::new());

    let (status, body) = send(&app, Method::DELETE, "/api/patients/3", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Patient not found or could not be deleted");
}

#[tokio::test]
async fn catalog_lists() {
    let app = app();

    let (status, body) = get(&app, "/api/doctors").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![2, 1]);

    let (status, body) = get(&app, "/api/appointment-types").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![1, 2, 3]);
    assert_eq!(body[1]["name"], "PRP");
}

#[tokio::test]
async fn appointment_filters() {
    let app = app();

    let (status, body) = get(&app, "/api/appointments").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![1, 2, 3, 4, 5, 6, 7, 8]);
    assert_eq!(body[0]["patient_first_name"], "Ayşe");
    assert_eq!(body[0]["appointment_type_name"], "Consultation");

    let (_, body) = get(&app, "/api/appointments?status=completed&doctor_id=1").await;
    assert_eq!(ids(&body), vec![1, 2, 5]);

    let (_, body) = get(&app, "/api/appointments?to_date=2025-02-10&from_date=2025-02-01").await;
    assert_eq!(ids(&body), vec![4, 5]);

    let (status, body) = get(&app, "/api/appointments?from_date=yesterday").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("invalid date"));

    let (status, _) = get(&app, "/api/appointments?doctor_id=one").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_and_update_appointment() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/appointments",
        Some(json!({ "patient_id": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields");

    let mut input = json!({
        "patient_id": 999,
        "doctor_id": 1,
        "appointment_type_id": 2,
        "date": "2025-04-01T10:00:00Z",
        "duration": 45,
        "status": "pending"
    });
    let (status, _) = send(&app, Method::POST, "/api/appointments", Some(input.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    input["patient_id"] = json!(2);
    let (status, body) = send(&app, Method::POST, "/api/appointments", Some(input)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], 9);

    let (status, body) = send(
        &app,
        Method::PATCH,
        "/api/appointments/9",
        Some(json!({ "status": "confirmed", "notes": "first PRP session" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "confirmed");
    assert_eq!(body["notes"], "first PRP session");

    let (status, body) = get(&app, "/api/appointments/9").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["doctor_last_name"], "Demir");

    let (status, body) = send(
        &app,
        Method::PATCH,
        "/api/appointments/9",
        Some(json!({ "status": "done" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "status");

    let (status, _) = get(&app, "/api/appointments/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn prp_treatments_and_report() {
    let state = Arc::new(AppState {
        store: MemoryStore::seeded(),
        today: || NaiveDate::from_ymd_opt(2025, 2, 20).unwrap(),
    });
    let app = router_with_state(state);

    let (status, body) = get(&app, "/api/prp-treatments?doctor_id=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![4, 2]);

    let (status, body) = get(&app, "/api/prp-report?from_date=2025-01-01&to_date=2025-02-28").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_earnings"], 10700);
    assert_eq!(body["treatment_count"], 4);
    assert_eq!(body["days"], 59);
    assert_eq!(body["daily"][0]["date"], "2025-01-13");

    // Default range: the 30 days up to "today".
    let (status, body) = get(&app, "/api/prp-report").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["range"]["from"], "2025-01-22");
    assert_eq!(body["total_earnings"], 5000);

    let (status, _) = get(&app, "/api/prp-report?from_date=2025-03-01&to_date=2025-02-01").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn notifications() {
    let app = app();

    let (_, body) = get(&app, "/api/notifications").await;
    assert_eq!(ids(&body), vec![1]);

    let (_, body) = get(&app, "/api/notifications?user_id=1").await;
    assert_eq!(ids(&body), vec![2, 1, 3]);

    let (_, body) = get(&app, "/api/notifications?user_id=1&unread_only=true").await;
    assert_eq!(ids(&body), vec![2, 1]);

    let (status, _) = get(&app, "/api/notifications?user_id=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/notifications",
        Some(json!({ "title": "Reminder" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Title, message and type are required");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/notifications",
        Some(json!({ "user_id": 1, "title": "Reminder", "message": "Call back", "type": "info" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], 4);
    assert_eq!(body["type"], "info");
    assert_eq!(body["is_read"], false);

    let (status, body) = send(&app, Method::PATCH, "/api/notifications/2/read", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_read"], true);

    let (_, body) = get(&app, "/api/notifications?user_id=1&unread_only=true").await;
    assert_eq!(ids(&body), vec![4, 1]);

    let (status, _) = send(&app, Method::PATCH, "/api/notifications/99/read", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
