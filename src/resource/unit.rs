use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Map, Value};
use std::collections::HashMap;

use super::{
    data_response, message_response, page_response, path_value, service_error, show_error,
    to_json, AppState, HandlerResult, ListParams,
};
use crate::extractors::{ApiJson, ResourceId};

const NOT_FOUND: &str = "Unit not found";

pub async fn create_unit(
    State((services, _)): State<AppState>,
    ApiJson(input): ApiJson<Map<String, Value>>,
) -> HandlerResult {
    match services.units.create(input).await {
        Ok(unit) => Ok((
            StatusCode::CREATED,
            Json(json!({
                "success": true,
                "message": "Unit created successfully",
                "data": to_json(&unit)?,
            })),
        )),
        Err(e) => Err(service_error(e, NOT_FOUND)),
    }
}

pub async fn update_unit(
    State((services, _)): State<AppState>,
    ResourceId(id): ResourceId,
    ApiJson(input): ApiJson<Map<String, Value>>,
) -> HandlerResult {
    match services.units.update(id, input).await {
        Ok(unit) => data_response(StatusCode::OK, &unit),
        Err(e) => Err(service_error(e, NOT_FOUND)),
    }
}

pub async fn list_units(
    State((services, app_config)): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> HandlerResult {
    let params = ListParams::from_query(&params);

    let result = match params.page_request(&app_config.pagination) {
        Some(page) => services
            .units
            .get_page(page)
            .await
            .map(|page| page_response(&page)),
        None => services
            .units
            .get_all()
            .await
            .map(|all| data_response(StatusCode::OK, &all)),
    };

    result.unwrap_or_else(|e| Err(service_error(e, NOT_FOUND)))
}

pub async fn get_units_in_department(
    State((services, _)): State<AppState>,
    Path(department_id): Path<String>,
) -> HandlerResult {
    match services
        .units
        .get_units_in_department(path_value(&department_id))
        .await
    {
        Ok(units) => Ok((
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": to_json(&units)?,
                "message": "Units successfully retrieved.",
            })),
        )),
        Err(e) => Err(service_error(e, NOT_FOUND)),
    }
}

pub async fn get_unit(
    State((services, _)): State<AppState>,
    ResourceId(id): ResourceId,
) -> HandlerResult {
    match services.units.get_unit(id).await {
        Ok(unit) => data_response(StatusCode::OK, &unit),
        Err(e) => Err(show_error(e, NOT_FOUND)),
    }
}

pub async fn delete_unit(
    State((services, _)): State<AppState>,
    ResourceId(id): ResourceId,
) -> HandlerResult {
    match services.units.delete(id).await {
        Ok(()) => message_response("Unit successfully deleted"),
        Err(e) => Err(service_error(e, NOT_FOUND)),
    }
}
