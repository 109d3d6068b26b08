use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::{Map, Value};
use std::collections::HashMap;

use super::{
    data_response, message_response, page_response, path_value, service_error, show_error,
    AppState, HandlerResult, ListParams,
};
use crate::extractors::{ApiJson, ResourceId};

const NOT_FOUND: &str = "User not found";

pub async fn create_user(
    State((services, _)): State<AppState>,
    ApiJson(input): ApiJson<Map<String, Value>>,
) -> HandlerResult {
    match services.users.create(input).await {
        Ok(user) => data_response(StatusCode::CREATED, &user),
        Err(e) => Err(service_error(e, NOT_FOUND)),
    }
}

/// Always paginated
pub async fn list_users(
    State((services, app_config)): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> HandlerResult {
    let page = ListParams::from_query(&params).page_request_or_first(&app_config.pagination);

    match services.users.get_users_for_page(page).await {
        Ok(page) => page_response(&page),
        Err(e) => Err(service_error(e, NOT_FOUND)),
    }
}

pub async fn get_user(
    State((services, _)): State<AppState>,
    ResourceId(id): ResourceId,
) -> HandlerResult {
    match services.users.get_user(id).await {
        Ok(user) => data_response(StatusCode::OK, &user),
        Err(e) => Err(show_error(e, NOT_FOUND)),
    }
}

pub async fn update_user_credentials(
    State((services, _)): State<AppState>,
    ResourceId(id): ResourceId,
    ApiJson(input): ApiJson<Map<String, Value>>,
) -> HandlerResult {
    match services.users.update_user_credentials(id, input).await {
        Ok(user) => data_response(StatusCode::OK, &user),
        Err(e) => Err(service_error(e, NOT_FOUND)),
    }
}

pub async fn assign_department(
    State((services, _)): State<AppState>,
    Path(user_id): Path<String>,
    ApiJson(mut input): ApiJson<Map<String, Value>>,
) -> HandlerResult {
    let department_id = input.remove("department_id").unwrap_or(Value::Null);

    match services
        .users
        .assign_user_to_department(path_value(&user_id), department_id)
        .await
    {
        Ok(user) => data_response(StatusCode::OK, &user),
        Err(e) => Err(service_error(e, NOT_FOUND)),
    }
}

/// Body `{id}`; mounted behind the auth middleware
pub async fn delete_user(
    State((services, _)): State<AppState>,
    ApiJson(input): ApiJson<Map<String, Value>>,
) -> HandlerResult {
    match services.users.delete_user(input).await {
        Ok(()) => message_response("User deleted successfully"),
        Err(e) => Err(service_error(e, NOT_FOUND)),
    }
}
