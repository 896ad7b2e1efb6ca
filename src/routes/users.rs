use axum::{extract::Extension, response::Json as RespJson, routing::get, Router};
use serde_json::{json, Value};

use crate::error::AppError;
use crate::AppState;

pub fn users_router() -> Router {
    Router::new().route("/api/users", get(list_users))
}

/// All accounts. Password hashes are excluded by the `User` serializer.
async fn list_users(
    Extension(state): Extension<AppState>,
) -> Result<RespJson<Value>, AppError> {
    let users = state.store.list_users().await?;
    Ok(RespJson(json!({ "success": true, "users": users })))
}
