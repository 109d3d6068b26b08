use axum_test::TestServer;
use http::StatusCode;
use serde_json::{json, Value};

mod common;

async fn server() -> TestServer {
    let app = common::setup_test_app(common::create_test_app_config())
        .await
        .unwrap();
    TestServer::new(app).unwrap()
}

async fn create_user(server: &TestServer, email: &str, name: &str) -> i64 {
    let response = server
        .post("/v1/create_user")
        .json(&common::create_test_user_json(email, name))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["data"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_create_user() {
    let server = server().await;

    let response = server
        .post("/v1/create_user")
        .json(&common::create_test_user_json("jane@example.com", "Jane Doe"))
        .await;
    response.assert_status(StatusCode::CREATED);

    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["email"], "jane@example.com");
    assert_eq!(body["data"]["name"], "Jane Doe");
    assert!(body["data"]["department_id"].is_null());
    assert!(body["data"].get("password").is_none());
}

#[tokio::test]
async fn test_create_user_duplicate_email() {
    let server = server().await;
    create_user(&server, "jane@example.com", "Jane").await;

    let response = server
        .post("/v1/create_user")
        .json(&common::create_test_user_json("Jane@Example.com", "Other Jane"))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    response.assert_json(&json!({
        "success": false,
        "error": {"email": ["The email has already been taken."]}
    }));
}

#[tokio::test]
async fn test_create_user_validation_messages() {
    let server = server().await;

    let response = server
        .post("/v1/create_user")
        .json(&json!({"email": "not-an-email", "password": "short"}))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = response.json();
    assert_eq!(
        body["error"]["email"],
        json!(["The email must be a valid email address."])
    );
    assert_eq!(body["error"]["name"], json!(["The name field is required."]));
    assert_eq!(
        body["error"]["password"],
        json!(["The password must be at least 8 characters."])
    );
}

#[tokio::test]
async fn test_get_user() {
    let server = server().await;
    let id = create_user(&server, "jane@example.com", "Jane").await;

    let response = server.get(&format!("/v1/users/{}", id)).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"]["email"], "jane@example.com");

    let response = server.get("/v1/users/999").await;
    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_json(&json!({"success": false, "error": "User not found"}));
}

#[tokio::test]
async fn test_list_users_is_paginated() {
    let server = server().await;
    for i in 0..3 {
        create_user(&server, &format!("user{}@example.com", i), "User").await;
    }

    let response = server.get("/v1/users").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
    assert_eq!(
        body["pagination"],
        json!({"current_page": 1, "per_page": 15, "total": 3, "last_page": 1})
    );

    let response = server.get("/v1/users?page=2&per_page=2").await;
    let body: Value = response.json();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["email"], "user2@example.com");
    assert_eq!(body["pagination"]["last_page"], 2);
}

#[tokio::test]
async fn test_users_page_past_the_end_is_empty() {
    let server = server().await;
    create_user(&server, "jane@example.com", "Jane").await;

    let response = server
        .get(&format!("/v1/users?page={}&per_page=100", i64::MAX))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["data"], json!([]));
    assert_eq!(
        body["pagination"],
        json!({"current_page": i64::MAX, "per_page": 100, "total": 1, "last_page": 1})
    );
}

#[tokio::test]
async fn test_update_credentials_applies_supplied_fields() {
    let server = server().await;
    let id = create_user(&server, "jane@example.com", "Jane").await;

    let change = json!({"name": "Jane Smith"});
    let first = server.put(&format!("/v1/users/{}", id)).json(&change).await;
    first.assert_status_ok();
    let second = server.put(&format!("/v1/users/{}", id)).json(&change).await;
    second.assert_status_ok();

    let first: Value = first.json();
    let second: Value = second.json();
    assert_eq!(first["data"]["name"], "Jane Smith");
    assert_eq!(first["data"]["email"], "jane@example.com");
    assert_eq!(first["data"]["name"], second["data"]["name"]);
    assert_eq!(first["data"]["email"], second["data"]["email"]);
}

#[tokio::test]
async fn test_update_credentials_errors() {
    let server = server().await;
    let jane = create_user(&server, "jane@example.com", "Jane").await;
    create_user(&server, "john@example.com", "John").await;

    // Email owned by another user
    let response = server
        .put(&format!("/v1/users/{}", jane))
        .json(&json!({"email": "john@example.com"}))
        .await;
    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["success"], false);

    // Unknown user
    server
        .put("/v1/users/999")
        .json(&json!({"name": "Ghost"}))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    // Invalid input
    let response = server
        .put(&format!("/v1/users/{}", jane))
        .json(&json!({"email": "nope"}))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.json::<Value>()["error"]["email"].is_array());
}

#[tokio::test]
async fn test_assign_user_to_department() {
    let server = server().await;
    let user_id = create_user(&server, "jane@example.com", "Jane").await;

    let response = server
        .post("/v1/create_department")
        .json(&json!({"name": "Engineering"}))
        .await;
    let department_id = response.json::<Value>()["data"]["id"].as_i64().unwrap();

    let response = server
        .put(&format!("/v1/users/{}/department", user_id))
        .json(&json!({"department_id": department_id}))
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>()["data"]["department_id"],
        department_id
    );

    let response = server
        .put("/v1/users/999/department")
        .json(&json!({"department_id": department_id}))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.json::<Value>()["error"]["user_id"][0],
        "The selected user id is invalid."
    );
}

#[tokio::test]
async fn test_delete_user() {
    let server = server().await;
    let id = create_user(&server, "jane@example.com", "Jane").await;

    let response = server
        .delete("/v1/delete_user")
        .add_header(http::header::AUTHORIZATION, common::bearer())
        .json(&json!({"id": id}))
        .await;
    response.assert_status_ok();
    response.assert_json(&json!({"success": true, "message": "User deleted successfully"}));

    let response = server
        .delete("/v1/delete_user")
        .add_header(http::header::AUTHORIZATION, common::bearer())
        .json(&json!({"id": id}))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_json(&json!({"success": false, "message": "User not found"}));

    server
        .delete("/v1/delete_user")
        .add_header(http::header::AUTHORIZATION, common::bearer())
        .json(&json!({}))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}
