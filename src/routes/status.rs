//! Operational status. Always answers 200, even with the store down, so the
//! front end and operators can tell "backend up, database down" apart from
//! "backend down".

use axum::{extract::Extension, response::Json as RespJson, routing::get, Router};
use chrono::Utc;
use serde_json::{json, Value};

use crate::model::UserType;
use crate::store::SharedStore;
use crate::AppState;

pub fn status_router() -> Router {
    Router::new().route("/api/status", get(status))
}

async fn count_or_zero(store: &SharedStore, kind: Option<UserType>) -> i64 {
    store.count_users(kind).await.unwrap_or(0)
}

async fn status(Extension(state): Extension<AppState>) -> RespJson<Value> {
    let reachable = state.store.ping().await.is_ok();
    let backend = state.store.backend_name();
    let db_state = if !reachable {
        "disconnected"
    } else if backend == "memory" {
        "memory"
    } else {
        "connected"
    };

    let (total, customers, drivers) = if reachable {
        (
            count_or_zero(&state.store, None).await,
            count_or_zero(&state.store, Some(UserType::Customer)).await,
            count_or_zero(&state.store, Some(UserType::Driver)).await,
        )
    } else {
        (0, 0, 0)
    };

    RespJson(json!({
        "success": true,
        "database": {
            "state": db_state,
            "connected": reachable,
            "name": backend,
        },
        "users": {
            "total": total,
            "customers": customers,
            "drivers": drivers,
        },
        "server": {
            "status": "running",
            "port": state.port,
            "timestamp": Utc::now().to_rfc3339(),
        },
    }))
}
