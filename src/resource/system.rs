use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::json;

use super::{message_response, AppState, HandlerResult};
use crate::auth::AuthContext;
use crate::error::error_envelope;

/// Report whether the authenticated caller holds `scope`
pub async fn check_scope(
    Extension(auth): Extension<AuthContext>,
    Path(scope): Path<String>,
) -> HandlerResult {
    let granted = auth.has_scope(&scope);
    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": { "scope": scope, "granted": granted }
        })),
    ))
}

pub async fn health(State((services, _)): State<AppState>) -> HandlerResult {
    match services.health_check().await {
        Ok(()) => message_response("OK"),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            Err(error_envelope(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Storage backend unavailable",
            ))
        }
    }
}
