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

const NOT_FOUND: &str = "Location not found";

pub async fn create_location(
    State((services, _)): State<AppState>,
    ApiJson(input): ApiJson<Map<String, Value>>,
) -> HandlerResult {
    match services.locations.create(input).await {
        Ok(location) => data_response(StatusCode::CREATED, &location),
        Err(e) => Err(service_error(e, NOT_FOUND)),
    }
}

pub async fn update_location(
    State((services, _)): State<AppState>,
    ResourceId(id): ResourceId,
    ApiJson(input): ApiJson<Map<String, Value>>,
) -> HandlerResult {
    match services.locations.update_location(id, input).await {
        Ok(location) => data_response(StatusCode::OK, &location),
        Err(e) => Err(service_error(e, NOT_FOUND)),
    }
}

pub async fn list_locations(
    State((services, app_config)): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> HandlerResult {
    let params = ListParams::from_query(&params);

    let result = match params.page_request(&app_config.pagination) {
        Some(page) => services
            .locations
            .get_page(page)
            .await
            .map(|page| page_response(&page)),
        None => services
            .locations
            .get_all()
            .await
            .map(|all| data_response(StatusCode::OK, &all)),
    };

    result.unwrap_or_else(|e| Err(service_error(e, NOT_FOUND)))
}

pub async fn get_location(
    State((services, _)): State<AppState>,
    ResourceId(id): ResourceId,
) -> HandlerResult {
    match services.locations.get_location(id).await {
        Ok(location) => data_response(StatusCode::OK, &location),
        Err(e) => Err(show_error(e, NOT_FOUND)),
    }
}

pub async fn delete_location(
    State((services, _)): State<AppState>,
    ResourceId(id): ResourceId,
) -> HandlerResult {
    match services.locations.delete(id).await {
        Ok(()) => message_response("Location deleted successfully"),
        Err(e) => Err(service_error(e, NOT_FOUND)),
    }
}
