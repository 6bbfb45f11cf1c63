// src/config.rs

use std::env;
use std::time::Duration;

use dotenvy::dotenv;

/// Identity used by the one-shot admin seeding endpoint.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub mongo_uri: String,
    /// Overrides the database named in the URI path.
    pub mongo_database: Option<String>,
    /// HS256 signing secret. Checked per request, not at startup.
    pub jwt_secret: Option<String>,
    pub admin_seed: Option<AdminSeed>,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_timeout: Duration,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub rust_log: String,
}

/// Reads a variable, treating an empty value as unset.
fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenv().ok();

        let mongo_uri = non_empty("MONGO_URI")
            .ok_or_else(|| "MONGO_URI must be set".to_string())?;

        let admin_seed = match (
            non_empty("ADMIN_SEED_FULLNAME"),
            non_empty("ADMIN_SEED_EMAIL"),
            non_empty("ADMIN_SEED_PASSWORD"),
        ) {
            (Some(full_name), Some(email), Some(password)) => Some(AdminSeed {
                full_name,
                email,
                password,
            }),
            _ => None,
        };

        let openai_timeout = non_empty("OPENAI_TIMEOUT_SECS")
            .map(|raw| {
                raw.parse::<u64>()
                    .map_err(|_| format!("OPENAI_TIMEOUT_SECS is not a number: {raw}"))
            })
            .transpose()?
            .unwrap_or(60);

        let port = non_empty("PORT")
            .map(|raw| raw.parse::<u16>().map_err(|_| format!("PORT is not a valid port: {raw}")))
            .transpose()?
            .unwrap_or(8080);

        let cors_origins = non_empty("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000,http://localhost:3001".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Self {
            mongo_uri,
            mongo_database: non_empty("MONGO_DATABASE"),
            jwt_secret: non_empty("JWT_SECRET"),
            admin_seed,
            openai_api_key: non_empty("OPENAI_API_KEY"),
            openai_base_url: non_empty("OPENAI_BASE_URL")
                .unwrap_or_else(|| "https://api.openai.com".to_string()),
            openai_timeout: Duration::from_secs(openai_timeout),
            port,
            cors_origins,
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}
