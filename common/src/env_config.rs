use std::{env, path::PathBuf, sync::Arc};

use crate::error::{AppError, Res};

#[derive(Clone, Debug)]
/// Configuration struct for the server.
///
/// Holds everything needed to start the account service: database and JWT
/// settings, bind address and worker count, CORS origin, logging switches,
/// and where uploaded media is written and served from.
pub struct Config {
    // environment
    pub environment: String, // development or production
    /// The URL of the database to connect to.
    pub database_url: String,
    /// Configuration for JWT (JSON Web Token) authentication.
    pub jwt_config: JwtConfig,
    /// The hostname or IP address the server will bind to.
    pub server_host: String,
    /// The port number the server will listen on.
    pub server_port: u16,
    /// The number of worker threads to spawn for handling requests.
    pub num_workers: usize,
    /// The allowed origin for CORS (Cross-Origin Resource Sharing).
    pub cors_allowed_origin: String,
    /// A boolean indicating whether console logging is enabled.
    pub console_logging_enabled: bool,
    /// File the logger mirrors console output into.
    pub log_file: String,
    /// Directory uploaded documents and profile pictures are written under.
    pub media_root: PathBuf,
    /// Public URL prefix the media root is served from.
    pub media_url: String,
    /// Staff account created at startup when both values are present.
    pub superuser: Option<SuperuserConfig>,
}

#[derive(Clone, Debug)]
/// Configuration for JSON Web Token (JWT) authentication.
///
/// This struct contains the secret key used to sign JWTs and
/// the expiration time in hours for issued tokens.
pub struct JwtConfig {
    /// The secret key used to sign and verify JWTs.
    pub secret: String,
    /// The expiration time for JWTs in hours.
    pub expiration_hours: i64,
}

#[derive(Clone, Debug)]
pub struct SuperuserConfig {
    pub email: String,
    pub password: String,
}

impl JwtConfig {
    /// Reads the JWT configuration from environment variables:
    /// - `JWT_SECRET`: Required. The secret key for JWT signing.
    /// - `JWT_EXPIRATION_HOURS`: Optional. Defaults to 24 hours if not provided.
    pub fn from_env() -> Res<Self> {
        dotenvy::dotenv().ok();

        let expiration_hours = env::var("JWT_EXPIRATION_HOURS")
            .unwrap_or_else(|_| "24".to_string())
            .parse()
            .map_err(|_| {
                AppError::Internal("JWT_EXPIRATION_HOURS must be a valid number".to_string())
            })?;

        Ok(JwtConfig {
            secret: required("JWT_SECRET")?,
            expiration_hours,
        })
    }
}

impl Config {
    /// Creates a new `Config` instance from environment variables.
    ///
    /// # Environment Variables
    ///
    /// Required:
    /// - `DATABASE_URL`: Connection string for the database
    /// - `JWT_SECRET`: Secret key for JWT signing (via `JwtConfig::from_env()`)
    ///
    /// Optional (with defaults):
    /// - `ENVIRONMENT`: "development" or "production" (default: "development")
    /// - `IP`: Server host (default: "127.0.0.1")
    /// - `PORT`: Server port (default: 8080)
    /// - `WORKERS`: Number of worker threads (default: 4)
    /// - `CORS_ALLOWED_ORIGIN`: Allowed CORS origin (default: "http://localhost:3000")
    /// - `ENABLE_CONSOLE_LOGGING`: Whether to enable console logging (default: true)
    /// - `LOG_FILE`: Log file path (default: "accounts.log")
    /// - `MEDIA_ROOT`: Upload directory (default: "media")
    /// - `MEDIA_URL`: Public media prefix (default: "/media")
    /// - `SUPERUSER_EMAIL` / `SUPERUSER_PASSWORD`: Bootstrap staff account
    pub fn from_env() -> Res<Arc<Self>> {
        dotenvy::dotenv().ok();

        let superuser = match (env::var("SUPERUSER_EMAIL"), env::var("SUPERUSER_PASSWORD")) {
            (Ok(email), Ok(password)) if !email.is_empty() && !password.is_empty() => {
                Some(SuperuserConfig { email, password })
            }
            _ => None,
        };

        Ok(Arc::new(Config {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            database_url: required("DATABASE_URL")?,
            jwt_config: JwtConfig::from_env()?,
            server_host: env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            num_workers: env::var("WORKERS")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .unwrap_or(4),
            cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            console_logging_enabled: parse_flag(
                &env::var("ENABLE_CONSOLE_LOGGING").unwrap_or_else(|_| "true".to_string()),
            ),
            log_file: env::var("LOG_FILE").unwrap_or_else(|_| "accounts.log".to_string()),
            media_root: PathBuf::from(env::var("MEDIA_ROOT").unwrap_or_else(|_| "media".to_string())),
            media_url: env::var("MEDIA_URL").unwrap_or_else(|_| "/media".to_string()),
            superuser,
        }))
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn required(name: &str) -> Res<String> {
    env::var(name).map_err(|_| AppError::Internal(format!("{} must be set", name)))
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "yes")
}
