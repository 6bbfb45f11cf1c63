// src/db/mod.rs

pub mod articles;
pub mod users;

use std::fmt;
use std::future::{Future, IntoFuture};
use std::time::Duration;

use mongodb::{
    Client, Database, IndexModel,
    bson::doc,
    options::{ClientOptions, IndexOptions},
};

use crate::error::AppError;

/// Deadline applied to every single store operation.
pub const DB_OP_TIMEOUT: Duration = Duration::from_secs(10);

pub const USERS: &str = "users";
pub const ARTICLE_CATEGORIES: &str = "article_category";
pub const ARTICLE_CONTENTS: &str = "article_content";

const CATEGORY_NAME_INDEX: &str = "name_text";

#[derive(Debug)]
pub enum DbError {
    /// The URI or options could not be turned into a client.
    Config(String),
    /// Every attempt failed; carries the last error seen.
    Unreachable { attempts: u32, last_error: String },
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbError::Config(msg) => write!(f, "invalid MongoDB configuration: {}", msg),
            DbError::Unreachable {
                attempts,
                last_error,
            } => write!(
                f,
                "failed to connect to MongoDB after {} attempts: {}",
                attempts, last_error
            ),
        }
    }
}

impl std::error::Error for DbError {}

/// Startup connection retry schedule.
/// After failed attempt `n` the loop sleeps `n * backoff_step`.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub attempt_timeout: Duration,
    pub backoff_step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            attempt_timeout: Duration::from_secs(10),
            backoff_step: Duration::from_secs(2),
        }
    }
}

/// Runs `op` until it succeeds or the policy is exhausted.
/// `op` receives the 1-based attempt number.
pub async fn retry<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, DbError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, String>>,
{
    let mut last_error = String::from("no attempt was made");

    for attempt in 1..=policy.attempts {
        match tokio::time::timeout(policy.attempt_timeout, op(attempt)).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(err)) => last_error = err,
            Err(_) => {
                last_error = format!("attempt timed out after {:?}", policy.attempt_timeout)
            }
        }

        if attempt < policy.attempts {
            let delay = policy.backoff_step * attempt;
            tracing::warn!(
                "Database not ready: {}, retrying in {:?}... (Attempt {})",
                last_error,
                delay,
                attempt
            );
            tokio::time::sleep(delay).await;
        }
    }

    Err(DbError::Unreachable {
        attempts: policy.attempts,
        last_error,
    })
}

/// Opens a client and pings the server until it answers.
///
/// The database name comes from `database` when given, otherwise from the
/// URI path (`mongodb://host/<name>`).
pub async fn connect(
    uri: &str,
    database: Option<&str>,
    policy: &RetryPolicy,
) -> Result<Database, DbError> {
    let mut options = ClientOptions::parse(uri)
        .await
        .map_err(|e| DbError::Config(e.to_string()))?;
    options.server_selection_timeout = Some(policy.attempt_timeout);
    options.app_name = Some(env!("CARGO_PKG_NAME").to_string());

    let name = database
        .map(str::to_owned)
        .or_else(|| options.default_database.clone())
        .ok_or_else(|| DbError::Config("MONGO_URI must include a database name".to_string()))?;

    let client = Client::with_options(options).map_err(|e| DbError::Config(e.to_string()))?;
    let db = client.database(&name);

    tracing::info!("Attempting to connect to MongoDB database '{}'...", name);
    retry(policy, |_| {
        let db = db.clone();
        async move {
            db.run_command(doc! { "ping": 1 })
                .await
                .map(|_| ())
                .map_err(|e| e.to_string())
        }
    })
    .await?;

    Ok(db)
}

/// Text index on category names. Keys and name are fixed so every startup
/// requests the same index.
fn category_index_model() -> IndexModel {
    IndexModel::builder()
        .keys(doc! { "name": "text" })
        .options(
            IndexOptions::builder()
                .name(CATEGORY_NAME_INDEX.to_string())
                .build(),
        )
        .build()
}

/// Creates the text index on category names.
/// MongoDB treats re-creating an identical index as a no-op.
pub async fn create_category_index(db: &Database) -> Result<String, AppError> {
    let model = category_index_model();

    let created = bounded(
        db.collection::<mongodb::bson::Document>(ARTICLE_CATEGORIES)
            .create_index(model),
    )
    .await?;

    Ok(created.index_name)
}

/// Ensures startup indexes. Failures are logged and do not stop the server.
pub async fn ensure_indexes(db: &Database) {
    match create_category_index(db).await {
        Ok(name) => tracing::info!(
            "Text index '{}' on {} created or verified",
            name,
            ARTICLE_CATEGORIES
        ),
        Err(e) => tracing::error!(
            "Failed to create text index on {} collection: {}",
            ARTICLE_CATEGORIES,
            e
        ),
    }
}

/// Applies `DB_OP_TIMEOUT` to a driver operation.
pub(crate) async fn bounded<F, T>(op: F) -> Result<T, AppError>
where
    F: IntoFuture<Output = mongodb::error::Result<T>>,
{
    match tokio::time::timeout(DB_OP_TIMEOUT, op.into_future()).await {
        Ok(result) => result.map_err(|e| {
            tracing::error!("Database error: {:?}", e);
            AppError::from(e)
        }),
        Err(_) => Err(AppError::InternalServerError(format!(
            "database operation exceeded {:?}",
            DB_OP_TIMEOUT
        ))),
    }
}
