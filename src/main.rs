use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use org_directory::config::AppConfig;
use org_directory::logging::init_tracing;
use org_directory::startup::{build_app, setup_backend};

#[derive(Parser, Debug)]
#[command(name = "org-directory")]
#[command(about = "Organization directory REST service: users, departments, units and locations")]
struct Args {
    /// Configuration file path (default: config.yaml)
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Port to listen on (overrides config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Host to bind to (overrides config file)
    #[arg(long)]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration from specified file or use defaults
    let (mut app_config, using_defaults) =
        if args.config == "config.yaml" && !std::path::Path::new("config.yaml").exists() {
            (AppConfig::default_config(), true)
        } else {
            let config = AppConfig::load_from_file(&args.config)
                .map_err(|e| format!("Failed to load configuration: {}", e))?;
            (config, false)
        };

    init_tracing(&app_config.logging.level);

    if using_defaults {
        tracing::warn!(
            "No config.yaml found, using defaults: in-memory SQLite, unauthenticated access"
        );
    }

    // Override with command line arguments if provided
    if let Some(port) = args.port {
        app_config.server.port = port;
    }
    if let Some(host) = args.host {
        app_config.server.host = host;
    }

    let backend = setup_backend(&app_config).await?;

    let host: std::net::IpAddr = match app_config.server.host.parse() {
        Ok(host) => host,
        Err(_) => {
            tracing::warn!(
                "Invalid host address: {}, using 127.0.0.1",
                app_config.server.host
            );
            [127, 0, 0, 1].into()
        }
    };
    let addr = SocketAddr::from((host, app_config.server.port));

    match app_config.auth.auth_type.as_str() {
        "bearer" => tracing::info!("Protected routes require a Bearer token"),
        "basic" => {
            if let Some(basic) = &app_config.auth.basic {
                tracing::info!(user = %basic.username, "Protected routes require HTTP Basic");
            }
        }
        _ => tracing::info!("Protected routes allow anonymous access"),
    }

    let app = build_app(backend.clone(), Arc::new(app_config))?;

    tracing::info!("Directory server listening on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    backend.cleanup().await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
