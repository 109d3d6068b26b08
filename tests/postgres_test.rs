//! Runs the core flows against PostgreSQL. Needs Docker:
//! `cargo test --test postgres_test -- --ignored`

use axum_test::TestServer;
use http::StatusCode;
use serde_json::{json, Value};

mod common;

#[tokio::test]
#[ignore]
async fn test_postgres_directory_flow() {
    let (app, _container) = common::setup_postgres_test_app(common::create_test_app_config())
        .await
        .unwrap();
    let server = TestServer::new(app).unwrap();

    let response = server
        .post("/v1/create_department")
        .json(&json!({"name": "Engineering"}))
        .await;
    response.assert_status(StatusCode::CREATED);
    let department_id = response.json::<Value>()["data"]["id"].as_i64().unwrap();

    let response = server
        .post("/v1/create_user")
        .json(&json!({
            "email": "jane@example.com",
            "name": "Jane",
            "password": "password123",
            "department_id": department_id
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let user_id = response.json::<Value>()["data"]["id"].as_i64().unwrap();

    server
        .post("/v1/create_user")
        .json(&common::create_test_user_json("JANE@example.com", "Dup"))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    server
        .post("/v1/create_unit")
        .json(&json!({"name": "Platform", "department_id": department_id}))
        .await
        .assert_status(StatusCode::CREATED);

    let body: Value = server
        .get(&format!("/v1/units/{}", department_id))
        .await
        .json();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let response = server
        .put(&format!("/v1/users/{}", user_id))
        .json(&json!({"name": "Jane Smith"}))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"]["name"], "Jane Smith");

    server
        .delete(&format!("/v1/department/{}", department_id))
        .await
        .assert_status_ok();

    let body: Value = server.get(&format!("/v1/users/{}", user_id)).await.json();
    assert!(body["data"]["department_id"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_postgres_locations() {
    let (app, _container) = common::setup_postgres_test_app(common::create_test_app_config())
        .await
        .unwrap();
    let server = TestServer::new(app).unwrap();

    server
        .get("/v1/locations")
        .await
        .assert_json(&json!({"success": true, "data": []}));

    let response = server
        .post("/v1/create_location")
        .json(&common::create_test_location_json("Downtown", "Commercial", "Active"))
        .await;
    response.assert_status(StatusCode::CREATED);
    let id = response.json::<Value>()["data"]["id"].as_i64().unwrap();

    let body: Value = server.get("/v1/locations?page=1").await.json();
    assert_eq!(body["pagination"]["total"], 1);

    server
        .delete(&format!("/v1/locations/{}", id))
        .await
        .assert_status_ok();
    server
        .delete(&format!("/v1/locations/{}", id))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
