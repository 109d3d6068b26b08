use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use base64::{engine::general_purpose, Engine as _};
use serde_json::Value;
use std::sync::Arc;

use crate::config::{AppConfig, AuthConfig};
use crate::error::error_envelope;

/// Caller identity placed in request extensions by [`auth_middleware`]
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub principal: Option<String>,
    pub scopes: Vec<String>,
}

impl AuthContext {
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == "*" || s == scope)
    }
}

/// Authentication middleware for the guarded routes
pub async fn auth_middleware(
    State(app_config): State<Arc<AppConfig>>,
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<Value>)> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let principal = match authenticate(&app_config.auth, auth_header) {
        Ok(principal) => principal,
        Err(status) => {
            tracing::debug!(uri = %request.uri(), "Rejected unauthenticated request");
            let message = if status == StatusCode::UNAUTHORIZED {
                "Unauthenticated."
            } else {
                "Authentication is misconfigured"
            };
            return Err(error_envelope(status, message));
        }
    };

    request.extensions_mut().insert(AuthContext {
        principal,
        scopes: app_config.auth.scopes.clone(),
    });

    Ok(next.run(request).await)
}

/// Check the Authorization header against the configured scheme.
/// Returns the authenticated principal name, if the scheme has one.
fn authenticate(auth: &AuthConfig, auth_header: Option<&str>) -> Result<Option<String>, StatusCode> {
    match auth.auth_type.as_str() {
        "unauthenticated" => Ok(None),
        "bearer" => {
            let provided_token = auth_header
                .and_then(|h| h.strip_prefix("Bearer "))
                .ok_or(StatusCode::UNAUTHORIZED)?;

            match &auth.token {
                Some(expected_token) if provided_token == expected_token => Ok(None),
                _ => Err(StatusCode::UNAUTHORIZED),
            }
        }
        "basic" => {
            let encoded_credentials = auth_header
                .and_then(|h| h.strip_prefix("Basic "))
                .ok_or(StatusCode::UNAUTHORIZED)?;

            let decoded = general_purpose::STANDARD
                .decode(encoded_credentials)
                .map_err(|_| StatusCode::UNAUTHORIZED)?;
            let credentials = String::from_utf8(decoded).map_err(|_| StatusCode::UNAUTHORIZED)?;

            let (username, password) = credentials
                .split_once(':')
                .ok_or(StatusCode::UNAUTHORIZED)?;

            match &auth.basic {
                Some(basic) if username == basic.username && password == basic.password => {
                    Ok(Some(username.to_string()))
                }
                _ => Err(StatusCode::UNAUTHORIZED),
            }
        }
        _ => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}
