//! Registration and login. Passwords are bcrypt-hashed before they touch the
//! store; login failures are opaque so callers cannot probe which emails are
//! registered.

use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::Json as RespJson,
    routing::post,
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::AppError;
use crate::model::{DriverProfile, User, UserType};
use crate::store::StoreError;
use crate::AppState;

use super::{clean, require};

/// Fixed cost matching the account base created by earlier deployments.
const BCRYPT_COST: u32 = 10;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub user_type: Option<String>,
    pub license_number: Option<String>,
    pub drive_type: Option<String>,
    pub car_name: Option<String>,
    pub car_model: Option<String>,
    pub number_of_seats: Option<String>,
    pub car_type: Option<String>,
    pub location: Option<String>,
    pub car_photo: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub user_type: Option<String>,
}

pub fn auth_router() -> Router {
    Router::new()
        .route("/api/register", post(register))
        .route("/api/login", post(login))
}

pub async fn register(
    Extension(state): Extension<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, RespJson<Value>), AppError> {
    let name = require(&payload.name, "name")?.to_string();
    let email = require(&payload.email, "email")?.to_ascii_lowercase();
    let password = require(&payload.password, "password")?;
    let phone = require(&payload.phone, "phone")?.to_string();
    let kind = require(&payload.user_type, "userType")?;
    let user_type = UserType::parse(kind)
        .ok_or_else(|| AppError::validation("userType must be customer or driver"))?;

    println!("📝 Registration request: {} ({})", email, user_type.as_str());

    if state.store.find_user_by_email(&email).await?.is_some() {
        println!("⚠️ User already exists: {}", email);
        return Err(AppError::conflict("User already exists"));
    }

    let password_hash =
        bcrypt::hash(password, BCRYPT_COST).map_err(|e| AppError::Internal(e.to_string()))?;

    // Driver-only fields are dropped for customers rather than stored blank.
    let driver = match user_type {
        UserType::Driver => Some(DriverProfile {
            license_number: clean(payload.license_number),
            drive_type: clean(payload.drive_type),
            car_name: clean(payload.car_name),
            car_model: clean(payload.car_model),
            number_of_seats: clean(payload.number_of_seats),
            car_type: clean(payload.car_type),
            location: clean(payload.location),
            car_photo: clean(payload.car_photo),
        }),
        UserType::Customer => None,
    };

    let user = User {
        id: Uuid::new_v4(),
        name,
        email,
        password_hash,
        phone,
        user_type,
        driver,
        created_at: Utc::now(),
    };

    match state.store.insert_user(user).await {
        Ok(user) => {
            println!("✅ User registered: {} ({})", user.email, user.user_type.as_str());
            Ok((
                StatusCode::CREATED,
                RespJson(json!({ "success": true, "message": "User registered successfully" })),
            ))
        }
        // Lost a race with a concurrent registration for the same email.
        Err(StoreError::Duplicate(field)) => Err(AppError::conflict(format!(
            "An account with that {} already exists.",
            field
        ))),
        Err(e) => Err(e.into()),
    }
}

pub async fn login(
    Extension(state): Extension<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<RespJson<Value>, AppError> {
    let email = require(&payload.email, "email")?.to_ascii_lowercase();
    let password = require(&payload.password, "password")?;
    let kind = require(&payload.user_type, "userType")?;
    // An unknown kind matches no user; same opaque failure as a bad password.
    let user_type = UserType::parse(kind).ok_or(AppError::InvalidCredentials)?;

    println!("🔑 Login request: {} ({})", email, kind);

    let user = state
        .store
        .find_user_for_login(&email, user_type)
        .await?
        .ok_or_else(|| {
            println!("⚠️ No user for: {} ({})", email, kind);
            AppError::InvalidCredentials
        })?;

    let matches = bcrypt::verify(password, &user.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    if !matches {
        println!("⚠️ Password mismatch for: {}", email);
        return Err(AppError::InvalidCredentials);
    }

    let token = state
        .jwt
        .sign(&user)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    println!("✅ Login successful: {} ({})", user.email, user.user_type.as_str());

    Ok(RespJson(json!({
        "success": true,
        "token": token,
        "user": user.public(),
    })))
}
