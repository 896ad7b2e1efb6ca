//! End-to-end tests over the full router with the in-memory store, plus a
//! permanently-unreachable store to exercise the degraded paths.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use rent_my_trip_be::auth::JwtKeys;
use rent_my_trip_be::model::{LodgeBooking, User, UserType};
use rent_my_trip_be::store::{MemoryStore, Store, StoreError};
use rent_my_trip_be::{app, AppState};

const TEST_SECRET: &str = "test-secret";

fn test_app() -> (Router, Arc<JwtKeys>) {
    let jwt = Arc::new(JwtKeys::new(TEST_SECRET));
    let state = AppState {
        store: Arc::new(MemoryStore::new()),
        jwt: jwt.clone(),
        port: 0,
    };
    (app(state), jwt)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn ann() -> Value {
    json!({
        "name": "Ann",
        "email": "ann@x.com",
        "password": "abc123",
        "phone": "9999999999",
        "userType": "customer",
    })
}

fn lodge_booking(booking_id: &str) -> Value {
    json!({
        "placeId": "pl-77",
        "lodgeName": "Hill View",
        "address": "12 Ridge Rd",
        "lat": 12.97,
        "lng": 77.59,
        "checkIn": "2026-09-01",
        "checkOut": "2026-09-03",
        "roomNumber": "204",
        "bookingId": booking_id,
        "advanceAmount": 500.0,
        "paymentMethod": "upi",
    })
}

#[tokio::test]
async fn register_twice_conflicts_and_leaves_one_record() {
    let (app, _) = test_app();

    let (status, body) = send(&app, "POST", "/api/register", Some(ann())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "User registered successfully");

    let (status, body) = send(&app, "POST", "/api/register", Some(ann())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("already exists"));

    let (status, body) = send(&app, "GET", "/api/users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["users"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn email_uniqueness_ignores_case_and_account_kind() {
    let (app, _) = test_app();
    send(&app, "POST", "/api/register", Some(ann())).await;

    let mut dup = ann();
    dup["email"] = json!("ANN@X.COM");
    dup["userType"] = json!("driver");
    let (status, _) = send(&app, "POST", "/api/register", Some(dup)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_missing_field_names_the_field() {
    let (app, _) = test_app();
    let mut payload = ann();
    payload.as_object_mut().unwrap().remove("phone");
    let (status, body) = send(&app, "POST", "/api/register", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "phone is required");

    let mut payload = ann();
    payload["userType"] = json!("admin");
    let (status, _) = send(&app, "POST", "/api/register", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_round_trips_a_decodable_token() {
    let (app, jwt) = test_app();
    send(&app, "POST", "/api/register", Some(ann())).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/login",
        Some(json!({ "email": "ann@x.com", "password": "abc123", "userType": "customer" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["name"], "Ann");
    assert_eq!(body["user"]["userType"], "customer");

    let claims = jwt.verify(body["token"].as_str().unwrap()).unwrap();
    assert_eq!(claims.email, "ann@x.com");
    assert_eq!(claims.user_type, UserType::Customer);
    assert_eq!(claims.user_id, body["user"]["id"].as_str().unwrap());
}

#[tokio::test]
async fn login_failures_are_opaque() {
    let (app, _) = test_app();
    send(&app, "POST", "/api/register", Some(ann())).await;

    // wrong password, wrong account kind, unknown user: identical shape
    let attempts = [
        json!({ "email": "ann@x.com", "password": "wrong", "userType": "customer" }),
        json!({ "email": "ann@x.com", "password": "abc123", "userType": "driver" }),
        json!({ "email": "ghost@x.com", "password": "abc123", "userType": "customer" }),
    ];
    for attempt in attempts {
        let (status, body) = send(&app, "POST", "/api/login", Some(attempt)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Invalid credentials");
    }
}

#[tokio::test]
async fn user_listing_never_exposes_passwords_and_keeps_driver_fields() {
    let (app, _) = test_app();
    send(&app, "POST", "/api/register", Some(ann())).await;
    send(
        &app,
        "POST",
        "/api/register",
        Some(json!({
            "name": "Raj",
            "email": "raj@x.com",
            "password": "secret1",
            "phone": "8888888888",
            "userType": "driver",
            "licenseNumber": "DL-42",
            "carName": "Swift",
            "numberOfSeats": "4",
        })),
    )
    .await;

    let (status, body) = send(&app, "GET", "/api/users", None).await;
    assert_eq!(status, StatusCode::OK);
    let users = body["users"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    for user in users {
        assert!(user.get("password").is_none());
        assert!(user.get("passwordHash").is_none());
    }

    let driver = users.iter().find(|u| u["userType"] == "driver").unwrap();
    assert_eq!(driver["licenseNumber"], "DL-42");
    assert_eq!(driver["carName"], "Swift");
    let customer = users.iter().find(|u| u["userType"] == "customer").unwrap();
    assert!(customer.get("carName").is_none());
}

#[tokio::test]
async fn driver_fields_sent_by_a_customer_are_dropped() {
    let (app, _) = test_app();
    let mut payload = ann();
    payload["carName"] = json!("Swift");
    send(&app, "POST", "/api/register", Some(payload)).await;

    let (_, body) = send(&app, "GET", "/api/users", None).await;
    assert!(body["users"][0].get("carName").is_none());
}

#[tokio::test]
async fn booking_rejects_duplicate_booking_id() {
    let (app, _) = test_app();

    let (status, body) = send(&app, "POST", "/api/lodge-bookings", Some(lodge_booking("LODG-1"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Lodge booking confirmed");
    assert_eq!(body["booking"]["bookingId"], "LODG-1");
    assert_eq!(body["booking"]["roomNumber"], "204");

    let (status, body) = send(&app, "POST", "/api/lodge-bookings", Some(lodge_booking("LODG-1"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Booking ID already exists");

    let (_, body) = send(&app, "GET", "/api/lodge-bookings", None).await;
    assert_eq!(body["bookings"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn booking_validates_fields_and_date_order() {
    let (app, _) = test_app();

    let mut payload = lodge_booking("LODG-2");
    payload.as_object_mut().unwrap().remove("roomNumber");
    let (status, body) = send(&app, "POST", "/api/lodge-bookings", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "roomNumber is required");

    let mut payload = lodge_booking("LODG-2");
    payload["checkOut"] = json!("2026-09-01");
    let (status, body) = send(&app, "POST", "/api/lodge-bookings", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "checkOut must be after checkIn");

    let mut payload = lodge_booking("LODG-2");
    payload["checkIn"] = json!("someday");
    let (status, _) = send(&app, "POST", "/api/lodge-bookings", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut payload = lodge_booking("LODG-2");
    payload["userId"] = json!("not-a-uuid");
    let (status, body) = send(&app, "POST", "/api/lodge-bookings", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid userId");
}

#[tokio::test]
async fn booking_listing_filters_by_owner_newest_first() {
    let (app, _) = test_app();
    let ann_id = Uuid::new_v4().to_string();
    let bob_id = Uuid::new_v4().to_string();

    for (i, owner) in [&ann_id, &bob_id, &ann_id].iter().enumerate() {
        let mut payload = lodge_booking(&format!("LODG-{}", i));
        payload["userId"] = json!(owner);
        let (status, _) = send(&app, "POST", "/api/lodge-bookings", Some(payload)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/lodge-bookings?userId={}", ann_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let bookings = body["bookings"].as_array().unwrap();
    assert_eq!(bookings.len(), 2);
    assert_eq!(bookings[0]["bookingId"], "LODG-2");
    assert_eq!(bookings[1]["bookingId"], "LODG-0");
    for booking in bookings {
        assert_eq!(booking["userId"], json!(ann_id));
    }

    let (status, body) = send(&app, "GET", "/api/lodge-bookings?userId=nope", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid userId");
}

#[tokio::test]
async fn status_reports_memory_backend_and_counts() {
    let (app, _) = test_app();
    send(&app, "POST", "/api/register", Some(ann())).await;

    let (status, body) = send(&app, "GET", "/api/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["database"]["state"], "memory");
    assert_eq!(body["database"]["connected"], true);
    assert_eq!(body["users"]["total"], 1);
    assert_eq!(body["users"]["customers"], 1);
    assert_eq!(body["users"]["drivers"], 0);
    assert_eq!(body["server"]["status"], "running");
}

/// Store whose backing service is permanently down.
struct DownStore;

#[async_trait]
impl Store for DownStore {
    async fn insert_user(&self, _user: User) -> Result<User, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
    async fn find_user_by_email(&self, _email: &str) -> Result<Option<User>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
    async fn find_user_for_login(
        &self,
        _email: &str,
        _user_type: UserType,
    ) -> Result<Option<User>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
    async fn count_users(&self, _user_type: Option<UserType>) -> Result<i64, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
    async fn insert_booking(&self, _booking: LodgeBooking) -> Result<LodgeBooking, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
    async fn list_bookings(
        &self,
        _user_id: Option<Uuid>,
        _limit: i64,
    ) -> Result<Vec<LodgeBooking>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
    async fn ping(&self) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

fn down_app() -> Router {
    app(AppState {
        store: Arc::new(DownStore),
        jwt: Arc::new(JwtKeys::new(TEST_SECRET)),
        port: 0,
    })
}

#[tokio::test]
async fn unreachable_store_returns_503_for_writes() {
    let app = down_app();
    let (status, body) = send(&app, "POST", "/api/register", Some(ann())).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);

    let (status, _) = send(&app, "POST", "/api/lodge-bookings", Some(lodge_booking("LODG-9"))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn status_stays_200_when_store_is_down() {
    let app = down_app();
    let (status, body) = send(&app, "GET", "/api/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["database"]["state"], "disconnected");
    assert_eq!(body["database"]["connected"], false);
    assert_eq!(body["users"]["total"], 0);
}
