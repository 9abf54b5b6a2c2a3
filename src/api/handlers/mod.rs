use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::error::WhatsNewError;
use crate::ledger::AckRecord;
use crate::models::*;
use crate::registry::modules_of_interest;

type AppResult<T> = Result<T, (StatusCode, String)>;

// ============================================================
// Error Handling
// ============================================================

/// Log an internal error and return a sanitized response to the client.
///
/// Validation errors (bad user name, bad version, module without a ladder)
/// are caused by the request and are returned as-is with BAD_REQUEST.
fn internal_error(e: WhatsNewError) -> (StatusCode, String) {
    if e.is_validation() {
        tracing::warn!("Validation error: {}", e);
        return (StatusCode::BAD_REQUEST, e.to_string());
    }

    tracing::error!("Internal error: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

// ============================================================
// Request / Response Types
// ============================================================

#[derive(Debug, Deserialize)]
pub struct NoticesQuery {
    /// Viewer role: `master`, `reseller` or `owner`.
    pub role: Option<String>,
    /// Entity (domain or server id) links should point at.
    pub target: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AcknowledgeInput {
    pub version: Version,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AcknowledgedVersion {
    pub module: String,
    pub version: Version,
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Notices
// ============================================================

pub async fn list_notices(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
    Query(query): Query<NoticesQuery>,
) -> Json<Vec<Notice>> {
    let role = query.role.as_deref().and_then(Role::from_str);
    let host = state.host_for(&user, role);
    let modules = modules_of_interest(state.registry.as_ref());
    Json(
        state
            .notifier
            .notices(&user, &modules, host.as_ref(), query.target.as_deref()),
    )
}

pub async fn list_pending(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
) -> AppResult<Json<Vec<PendingRelease>>> {
    let modules = modules_of_interest(state.registry.as_ref());
    state
        .notifier
        .resolver()
        .pending_notifications(&user, &modules)
        .map(Json)
        .map_err(internal_error)
}

// ============================================================
// Acknowledgements
// ============================================================

pub async fn get_acknowledgements(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
) -> AppResult<Json<AckRecord>> {
    state
        .notifier
        .resolver()
        .ledger()
        .get_acknowledged(&user)
        .map(Json)
        .map_err(internal_error)
}

/// Mark every module of interest as seen at its current version.
pub async fn acknowledge_all(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
) -> AppResult<Json<AckRecord>> {
    let ledger = state.notifier.resolver().ledger();
    let modules = modules_of_interest(state.registry.as_ref());
    ledger
        .acknowledge_all(&user, &modules)
        .and_then(|_| ledger.get_acknowledged(&user))
        .map(Json)
        .map_err(internal_error)
}

pub async fn acknowledge(
    State(state): State<Arc<AppState>>,
    Path((user, module)): Path<(String, String)>,
    Json(input): Json<AcknowledgeInput>,
) -> AppResult<Json<AcknowledgedVersion>> {
    state
        .notifier
        .resolver()
        .ledger()
        .acknowledge(&user, &module, input.version)
        .map(|_| {
            Json(AcknowledgedVersion {
                module,
                version: input.version,
            })
        })
        .map_err(internal_error)
}

/// Roll the module back one release so its newest features show again.
pub async fn unacknowledge(
    State(state): State<Arc<AppState>>,
    Path((user, module)): Path<(String, String)>,
) -> AppResult<Json<AcknowledgedVersion>> {
    state
        .notifier
        .resolver()
        .ledger()
        .unacknowledge(&user, &module)
        .map(|version| Json(AcknowledgedVersion { module, version }))
        .map_err(internal_error)
}
