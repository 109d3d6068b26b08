use axum_test::TestServer;
use http::StatusCode;
use serde_json::{json, Value};

mod common;

async fn setup() -> (TestServer, i64) {
    let app = common::setup_test_app(common::create_test_app_config())
        .await
        .unwrap();
    let server = TestServer::new(app).unwrap();

    let response = server
        .post("/v1/create_department")
        .json(&json!({"name": "Operations"}))
        .await;
    let department_id = response.json::<Value>()["data"]["id"].as_i64().unwrap();

    (server, department_id)
}

#[tokio::test]
async fn test_create_unit() {
    let (server, department_id) = setup().await;

    let response = server
        .post("/v1/create_unit")
        .json(&json!({"name": "Dispatch", "department_id": department_id}))
        .await;
    response.assert_status(StatusCode::CREATED);

    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Unit created successfully");
    assert_eq!(body["data"]["name"], "Dispatch");
    assert_eq!(body["data"]["department_id"], department_id);
}

#[tokio::test]
async fn test_create_unit_unknown_department() {
    let (server, _) = setup().await;

    let response = server
        .post("/v1/create_unit")
        .json(&json!({"name": "Dispatch", "department_id": 999}))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    response.assert_json(&json!({
        "success": false,
        "error": {"department_id": ["The selected department id is invalid."]}
    }));
}

#[tokio::test]
async fn test_units_in_department() {
    let (server, department_id) = setup().await;

    let response = server.get(&format!("/v1/units/{}", department_id)).await;
    response.assert_status_ok();
    response.assert_json(&json!({
        "success": true,
        "data": [],
        "message": "Units successfully retrieved."
    }));

    server
        .post("/v1/create_unit")
        .json(&json!({"name": "Dispatch", "department_id": department_id}))
        .await
        .assert_status(StatusCode::CREATED);

    let body: Value = server
        .get(&format!("/v1/units/{}", department_id))
        .await
        .json();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let response = server.get("/v1/units/999").await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.json::<Value>()["error"]["department_id"][0],
        "The selected department id is invalid."
    );

    let response = server.get("/v1/units/abc").await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.json::<Value>()["error"]["department_id"][0],
        "The department id must be an integer."
    );
}

#[tokio::test]
async fn test_unit_show_update_delete() {
    let (server, department_id) = setup().await;

    let response = server
        .post("/v1/create_unit")
        .json(&json!({"name": "Dispatch", "department_id": department_id}))
        .await;
    let id = response.json::<Value>()["data"]["id"].as_i64().unwrap();

    let response = server.get(&format!("/v1/unit/{}", id)).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"]["name"], "Dispatch");

    let response = server
        .put(&format!("/v1/update_unit/{}", id))
        .json(&json!({"name": "Logistics"}))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"]["name"], "Logistics");

    let response = server.delete(&format!("/v1/unit/{}", id)).await;
    response.assert_status_ok();
    response.assert_json(&json!({"success": true, "message": "Unit successfully deleted"}));

    let response = server.delete(&format!("/v1/unit/{}", id)).await;
    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_json(&json!({"success": false, "message": "Unit not found"}));

    let response = server.get(&format!("/v1/unit/{}", id)).await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["error"], "Unit not found");
}

#[tokio::test]
async fn test_list_units() {
    let (server, department_id) = setup().await;
    for name in ["A", "B"] {
        server
            .post("/v1/create_unit")
            .json(&json!({"name": name, "department_id": department_id}))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let body: Value = server.get("/v1/units").await.json();
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert!(body.get("pagination").is_none());

    let body: Value = server.get("/v1/units?page=1").await.json();
    assert_eq!(body["pagination"]["total"], 2);
}
