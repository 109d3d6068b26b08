use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;

use crate::error::error_envelope;

/// JSON body extractor for the directory API.
///
/// Accepts a missing Content-Type, treats an empty body as `{}` and renders
/// every rejection in the `{success:false, message}` envelope.
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(content_type) = req.headers().get(header::CONTENT_TYPE) {
            let content_type_str = content_type
                .to_str()
                .map_err(|_| ApiRejection::InvalidContentType)?;

            // Extract the media type without parameters (e.g., charset)
            let media_type = content_type_str
                .split(';')
                .next()
                .unwrap_or("")
                .trim()
                .to_lowercase();

            if media_type != "application/json" {
                return Err(ApiRejection::InvalidContentType);
            }
        }

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiRejection::InvalidJson(e.body_text()))?;

        let parsed = if body.iter().all(u8::is_ascii_whitespace) {
            serde_json::from_slice(b"{}")
        } else {
            serde_json::from_slice(&body)
        };

        parsed
            .map(ApiJson)
            .map_err(|e| ApiRejection::InvalidJson(e.to_string()))
    }
}

/// Numeric `{id}` path segment
pub struct ResourceId(pub i64);

impl<S> FromRequestParts<S> for ResourceId
where
    S: Send + Sync,
{
    type Rejection = ApiRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiRejection::InvalidId(e.body_text()))?;

        raw.parse::<i64>()
            .map(ResourceId)
            .map_err(|_| ApiRejection::InvalidId(raw))
    }
}

#[derive(Debug)]
pub enum ApiRejection {
    InvalidContentType,
    InvalidJson(String),
    InvalidId(String),
}

impl IntoResponse for ApiRejection {
    fn into_response(self) -> Response {
        let message = match self {
            ApiRejection::InvalidContentType => {
                "Content-Type must be application/json".to_string()
            }
            ApiRejection::InvalidJson(detail) => format!("Invalid JSON: {}", detail),
            ApiRejection::InvalidId(raw) => format!("Invalid id: {}", raw),
        };
        error_envelope(StatusCode::BAD_REQUEST, &message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::get, routing::post, Json, Router};
    use axum_test::TestServer;
    use serde_json::{json, Map, Value};

    async fn echo(ApiJson(body): ApiJson<Map<String, Value>>) -> Json<Value> {
        Json(Value::Object(body))
    }

    async fn show(ResourceId(id): ResourceId) -> Json<Value> {
        Json(json!({ "id": id }))
    }

    fn server() -> TestServer {
        let app = Router::new()
            .route("/echo", post(echo))
            .route("/items/{id}", get(show));
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn test_json_body() {
        let response = server().post("/echo").json(&json!({"name": "HR"})).await;
        response.assert_status_ok();
        response.assert_json(&json!({"name": "HR"}));
    }

    #[tokio::test]
    async fn test_empty_body_is_empty_object() {
        let response = server().post("/echo").await;
        response.assert_status_ok();
        response.assert_json(&json!({}));
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let response = server()
            .post("/echo")
            .text("{not json")
            .content_type("application/json")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["success"], false);
    }

    #[tokio::test]
    async fn test_wrong_content_type() {
        let response = server().post("/echo").text("name=HR").await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_resource_id() {
        let server = server();
        server.get("/items/42").await.assert_json(&json!({"id": 42}));

        let response = server.get("/items/abc").await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["message"], "Invalid id: abc");
    }
}
