use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use crate::auth;
use crate::backend::{BackendFactory, DirectoryBackend};
use crate::config::AppConfig;
use crate::error::AppResult;
use crate::logging::logging_middleware;
use crate::resource::{department, location, system, unit, user};
use crate::service::Services;

/// Connect the configured backend and make sure the schema exists
pub async fn setup_backend(app_config: &AppConfig) -> AppResult<Arc<dyn DirectoryBackend>> {
    let backend_config = app_config.database_backend_config()?;

    tracing::info!(
        database_type = ?backend_config.database_type,
        max_connections = backend_config.max_connections,
        "Setting up database backend"
    );

    let backend = BackendFactory::create(&backend_config).await?;
    backend.init_schema().await?;

    tracing::info!("Database schema initialized");
    Ok(backend)
}

/// Build the router with every directory route.
///
/// `/v1/delete_user` and `/scope/{scope}` sit behind the auth middleware;
/// all other routes are open.
pub fn build_app(
    backend: Arc<dyn DirectoryBackend>,
    app_config: Arc<AppConfig>,
) -> AppResult<Router> {
    let services = Arc::new(Services::new(backend, &app_config)?);

    let guarded = Router::new()
        .route("/v1/delete_user", delete(user::delete_user))
        .route("/scope/{scope}", get(system::check_scope))
        .route_layer(middleware::from_fn_with_state(
            app_config.clone(),
            auth::auth_middleware,
        ));

    let app = Router::new()
        // Users
        .route("/v1/create_user", post(user::create_user))
        .route("/v1/users", get(user::list_users))
        .route(
            "/v1/users/{id}",
            get(user::get_user).put(user::update_user_credentials),
        )
        .route("/v1/users/{id}/department", put(user::assign_department))
        // Departments
        .route(
            "/v1/create_department",
            post(department::create_department),
        )
        .route(
            "/v1/update_department/{id}",
            put(department::update_department),
        )
        .route("/v1/department", get(department::list_departments))
        .route(
            "/v1/department/{id}",
            get(department::get_department).delete(department::delete_department),
        )
        // Locations
        .route("/v1/create_location", post(location::create_location))
        .route("/v1/locations", get(location::list_locations))
        .route(
            "/v1/locations/{id}",
            get(location::get_location)
                .patch(location::update_location)
                .delete(location::delete_location),
        )
        // Units
        .route("/v1/create_unit", post(unit::create_unit))
        .route("/v1/update_unit/{id}", put(unit::update_unit))
        .route("/v1/units", get(unit::list_units))
        .route(
            "/v1/units/{department_id}",
            get(unit::get_units_in_department),
        )
        .route(
            "/v1/unit/{id}",
            get(unit::get_unit).delete(unit::delete_unit),
        )
        .route("/health", get(system::health))
        .merge(guarded)
        .layer(middleware::from_fn(logging_middleware))
        .with_state((services, app_config));

    Ok(app)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_test::TestServer;
    use serde_json::Value;

    #[tokio::test]
    async fn test_setup_and_health() {
        let config = AppConfig::default_config();
        let backend = setup_backend(&config).await.unwrap();
        let app = build_app(backend, Arc::new(config)).unwrap();

        let server = TestServer::new(app).unwrap();
        let response = server.get("/health").await;

        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["success"], true);
    }

    #[tokio::test]
    async fn test_unknown_backend_type() {
        let mut config = AppConfig::default_config();
        config.backend.backend_type = "ldap".to_string();

        assert!(setup_backend(&config).await.is_err());
    }
}
