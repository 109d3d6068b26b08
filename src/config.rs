use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::backend::database::DatabaseBackendConfig;
use crate::backend::DatabaseType;
use crate::error::{AppError, AppResult};
use crate::password::PasswordAlgorithm;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub password: PasswordConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BackendConfig {
    #[serde(rename = "type")]
    pub backend_type: String,
    pub database: Option<DatabaseConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    #[serde(rename = "type")]
    pub db_type: String,
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

/// Credentials guarding the protected routes (`/v1/delete_user`, `/scope/{scope}`)
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuthConfig {
    #[serde(rename = "type")]
    pub auth_type: String,
    pub token: Option<String>,
    pub basic: Option<BasicAuthConfig>,
    /// Scopes granted to an authenticated caller; `*` grants every scope
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            auth_type: "unauthenticated".to_string(),
            token: None,
            basic: None,
            scopes: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BasicAuthConfig {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PasswordConfig {
    #[serde(default)]
    pub algorithm: PasswordAlgorithm,
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            algorithm: PasswordAlgorithm::default(),
            bcrypt_cost: default_bcrypt_cost(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PaginationConfig {
    #[serde(default = "default_per_page")]
    pub per_page: i64,
    #[serde(default = "default_max_per_page")]
    pub max_per_page: i64,
}

fn default_per_page() -> i64 {
    15
}

fn default_max_per_page() -> i64 {
    100
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            per_page: default_per_page(),
            max_per_page: default_max_per_page(),
        }
    }
}

impl PaginationConfig {
    /// Requested page size, falling back to the default and capped at the maximum
    pub fn resolve_per_page(&self, requested: Option<i64>) -> i64 {
        match requested {
            Some(per_page) if per_page > 0 => per_page.min(self.max_per_page),
            _ => self.per_page,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Load configuration from YAML file
    pub fn load_from_file<P: AsRef<Path>>(config_path: P) -> Result<Self, String> {
        let path = config_path.as_ref();

        if !path.exists() {
            return Err(format!("Configuration file not found: {}", path.display()));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;

        // Expand environment variables in YAML content
        let expanded_content = Self::expand_env_vars(&content)?;

        let app_config: AppConfig = serde_yaml::from_str(&expanded_content)
            .map_err(|e| format!("Failed to parse config file {}: {}", path.display(), e))?;

        app_config.auth.validate()?;

        Ok(app_config)
    }

    /// Create default configuration for in-memory SQLite with anonymous access
    pub fn default_config() -> Self {
        AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            backend: BackendConfig {
                backend_type: "database".to_string(),
                database: Some(DatabaseConfig {
                    db_type: "sqlite".to_string(),
                    url: ":memory:".to_string(),
                    max_connections: 1,
                }),
            },
            auth: AuthConfig::default(),
            password: PasswordConfig::default(),
            pagination: PaginationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Translate the `backend` section into a connection configuration
    pub fn database_backend_config(&self) -> AppResult<DatabaseBackendConfig> {
        if self.backend.backend_type != "database" {
            return Err(AppError::Configuration(format!(
                "Unsupported backend type: {}",
                self.backend.backend_type
            )));
        }

        let database_config = self.backend.database.as_ref().ok_or_else(|| {
            AppError::Configuration(
                "Database configuration is required when backend type is 'database'".to_string(),
            )
        })?;

        let database_type = match database_config.db_type.as_str() {
            "postgresql" | "postgres" => DatabaseType::PostgreSQL,
            "sqlite" => DatabaseType::SQLite,
            other => {
                return Err(AppError::Configuration(format!(
                    "Unsupported database type: {}",
                    other
                )))
            }
        };

        Ok(DatabaseBackendConfig::new(
            database_type,
            database_config.url.clone(),
            database_config.max_connections,
        ))
    }

    /// Expand environment variables in format ${VAR_NAME} or ${VAR_NAME:-default}
    fn expand_env_vars(content: &str) -> Result<String, String> {
        let chars: Vec<char> = content.chars().collect();
        let mut expanded = String::new();
        let mut i = 0;

        while i < chars.len() {
            if i + 1 < chars.len() && chars[i] == '$' && chars[i + 1] == '{' {
                // Find the closing brace
                let mut j = i + 2;
                while j < chars.len() && chars[j] != '}' {
                    j += 1;
                }

                if j < chars.len() {
                    let var_expr: String = chars[i + 2..j].iter().collect();

                    let (var_name, default_value) = match var_expr.find(":-") {
                        Some(pos) => (
                            var_expr[..pos].to_string(),
                            Some(var_expr[pos + 2..].to_string()),
                        ),
                        None => (var_expr, None),
                    };

                    let value = match std::env::var(&var_name) {
                        Ok(val) => val,
                        Err(_) => default_value.ok_or_else(|| {
                            format!(
                                "Environment variable {} not found and no default provided",
                                var_name
                            )
                        })?,
                    };

                    expanded.push_str(&value);
                    i = j + 1;
                } else {
                    expanded.push(chars[i]);
                    i += 1;
                }
            } else {
                expanded.push(chars[i]);
                i += 1;
            }
        }

        Ok(expanded)
    }
}

impl AuthConfig {
    /// Reject auth sections whose type is missing the credentials it needs
    pub fn validate(&self) -> Result<(), String> {
        match self.auth_type.as_str() {
            "unauthenticated" => Ok(()),
            "bearer" => match &self.token {
                Some(token) if !token.is_empty() => Ok(()),
                _ => Err("Bearer authentication requires a token".to_string()),
            },
            "basic" => match &self.basic {
                Some(basic) if !basic.username.is_empty() => Ok(()),
                _ => Err("Basic authentication requires a username and password".to_string()),
            },
            other => Err(format!("Unsupported auth type: {}", other)),
        }
    }
}
