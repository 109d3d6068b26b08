//! HTTP handlers. Every response uses the `{success, ...}` envelope.

use axum::{http::StatusCode, Json};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::backend::{Page, PageRequest};
use crate::config::{AppConfig, PaginationConfig};
use crate::error::{error_envelope, AppError};
use crate::service::{ServiceError, Services};

pub mod department;
pub mod location;
pub mod system;
pub mod unit;
pub mod user;

pub type AppState = (Arc<Services>, Arc<AppConfig>);

pub type ApiResponse = (StatusCode, Json<Value>);
pub type HandlerResult = Result<ApiResponse, ApiResponse>;

fn to_json<T: Serialize>(value: &T) -> Result<Value, ApiResponse> {
    serde_json::to_value(value).map_err(|e| AppError::from(e).to_response())
}

/// `{success: true, data}`
pub fn data_response<T: Serialize>(status: StatusCode, data: &T) -> HandlerResult {
    Ok((status, Json(json!({ "success": true, "data": to_json(data)? }))))
}

/// `{success: true, message}`
pub fn message_response(message: &str) -> HandlerResult {
    Ok((
        StatusCode::OK,
        Json(json!({ "success": true, "message": message })),
    ))
}

/// `{success: true, data, pagination}`
pub fn page_response<T: Serialize>(page: &Page<T>) -> HandlerResult {
    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": to_json(&page.items)?,
            "pagination": {
                "current_page": page.page,
                "per_page": page.per_page,
                "total": page.total,
                "last_page": page.last_page(),
            }
        })),
    ))
}

/// Render a service failure; `not_found` is the message for a missing record
pub fn service_error(err: ServiceError, not_found: &str) -> ApiResponse {
    match err {
        ServiceError::Validation(errors) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "success": false, "error": errors })),
        ),
        ServiceError::NotFound => error_envelope(StatusCode::NOT_FOUND, not_found),
        ServiceError::Conflict(message) => error_envelope(StatusCode::CONFLICT, &message),
        ServiceError::Backend(e) => e.to_response(),
    }
}

/// Show endpoints report a missing record under `error`
pub fn show_error(err: ServiceError, not_found: &str) -> ApiResponse {
    match err {
        ServiceError::NotFound => (
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "error": not_found })),
        ),
        other => service_error(other, not_found),
    }
}

/// `page` / `per_page` query parameters; unparsable values are ignored
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ListParams {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl ListParams {
    pub fn from_query(params: &HashMap<String, String>) -> Self {
        let number = |key: &str| params.get(key).and_then(|v| v.trim().parse::<i64>().ok());
        Self {
            page: number("page"),
            per_page: number("per_page"),
        }
    }

    /// Page request when `page` was given
    pub fn page_request(&self, pagination: &PaginationConfig) -> Option<PageRequest> {
        self.page.map(|page| self.with_default_page(page, pagination))
    }

    /// Page request that falls back to the first page
    pub fn page_request_or_first(&self, pagination: &PaginationConfig) -> PageRequest {
        self.with_default_page(self.page.unwrap_or(1), pagination)
    }

    fn with_default_page(&self, page: i64, pagination: &PaginationConfig) -> PageRequest {
        PageRequest::new(page, pagination.resolve_per_page(self.per_page))
    }
}

/// Path segment as a JSON value for rule-based validation
pub(crate) fn path_value(raw: &str) -> Value {
    raw.parse::<i64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(raw))
}
