use axum::{
    extract::{Query, State},
    http::StatusCode,
};
use serde_json::{Map, Value};
use std::collections::HashMap;

use super::{
    data_response, message_response, page_response, service_error, show_error, AppState,
    HandlerResult, ListParams,
};
use crate::extractors::{ApiJson, ResourceId};

const NOT_FOUND: &str = "Department not found";

pub async fn create_department(
    State((services, _)): State<AppState>,
    ApiJson(input): ApiJson<Map<String, Value>>,
) -> HandlerResult {
    match services.departments.create(input).await {
        Ok(department) => data_response(StatusCode::CREATED, &department),
        Err(e) => Err(service_error(e, NOT_FOUND)),
    }
}

pub async fn update_department(
    State((services, _)): State<AppState>,
    ResourceId(id): ResourceId,
    ApiJson(input): ApiJson<Map<String, Value>>,
) -> HandlerResult {
    match services.departments.update(id, input).await {
        Ok(department) => data_response(StatusCode::OK, &department),
        Err(e) => Err(service_error(e, NOT_FOUND)),
    }
}

pub async fn list_departments(
    State((services, app_config)): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> HandlerResult {
    let params = ListParams::from_query(&params);

    let result = match params.page_request(&app_config.pagination) {
        Some(page) => services
            .departments
            .get_page(page)
            .await
            .map(|page| page_response(&page)),
        None => services
            .departments
            .get_all()
            .await
            .map(|all| data_response(StatusCode::OK, &all)),
    };

    result.unwrap_or_else(|e| Err(service_error(e, NOT_FOUND)))
}

pub async fn get_department(
    State((services, _)): State<AppState>,
    ResourceId(id): ResourceId,
) -> HandlerResult {
    match services.departments.get_department(id).await {
        Ok(department) => data_response(StatusCode::OK, &department),
        Err(e) => Err(show_error(e, NOT_FOUND)),
    }
}

pub async fn delete_department(
    State((services, _)): State<AppState>,
    ResourceId(id): ResourceId,
) -> HandlerResult {
    match services.departments.delete(id).await {
        Ok(()) => message_response("Department deleted successfully"),
        Err(e) => Err(service_error(e, NOT_FOUND)),
    }
}
