// tests/common/mod.rs
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use article_hub::{
    ai::{AiError, ContentAssistant},
    config::{AdminSeed, Config},
    db::{
        articles::{CategoryStore, ContentStore},
        users::{UserChanges, UserFilter, UserStore},
    },
    error::AppError,
    models::{
        article::{ArticleCategory, ArticleContent},
        user::{Role, Status, User},
    },
    routes,
    state::AppState,
    utils::{
        hash::hash_password,
        jwt::{SESSION_TOKEN_TTL, sign_jwt},
    },
};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

pub const JWT_SECRET: &str = "test_secret_for_integration_tests";

#[derive(Default)]
pub struct MemoryUserStore {
    pub users: Mutex<Vec<User>>,
}

impl MemoryUserStore {
    pub fn by_email(&self, email: &str) -> Option<User> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: ObjectId) -> Result<Option<User>, AppError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_one(&self, filter: UserFilter) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| filter.matches(u))
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        Ok(self.users.lock().unwrap().clone())
    }

    async fn insert(&self, user: &User) -> Result<(), AppError> {
        self.users.lock().unwrap().push(user.clone());
        Ok(())
    }

    async fn update(&self, id: ObjectId, changes: UserChanges) -> Result<bool, AppError> {
        let mut users = self.users.lock().unwrap();
        match users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                changes.apply_to(user);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: ObjectId) -> Result<bool, AppError> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() < before)
    }
}

#[derive(Default)]
pub struct MemoryCategoryStore {
    pub categories: Mutex<Vec<ArticleCategory>>,
}

#[async_trait]
impl CategoryStore for MemoryCategoryStore {
    async fn insert(&self, category: &ArticleCategory) -> Result<(), AppError> {
        self.categories.lock().unwrap().push(category.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ArticleCategory>, AppError> {
        Ok(self.categories.lock().unwrap().clone())
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<ArticleCategory>, AppError> {
        Ok(self
            .categories
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn delete(&self, id: ObjectId) -> Result<bool, AppError> {
        let mut categories = self.categories.lock().unwrap();
        let before = categories.len();
        categories.retain(|c| c.id != id);
        Ok(categories.len() < before)
    }
}

#[derive(Default)]
pub struct MemoryContentStore {
    pub contents: Mutex<Vec<ArticleContent>>,
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn insert(&self, content: &ArticleContent) -> Result<(), AppError> {
        self.contents.lock().unwrap().push(content.clone());
        Ok(())
    }
}

/// Scripted assistant. `None` makes the call fail.
pub struct FakeAssistant {
    pub categories: Option<Vec<String>>,
    pub image_url: Option<String>,
    /// Category names the last recommendation call received.
    pub seen_categories: Mutex<Vec<String>>,
    /// Article text the last recommendation call received.
    pub seen_content: Mutex<String>,
}

impl FakeAssistant {
    pub fn working() -> Self {
        Self {
            categories: Some(vec!["Science".to_string()]),
            image_url: Some("https://images.example.com/generated.png".to_string()),
            seen_categories: Mutex::new(Vec::new()),
            seen_content: Mutex::new(String::new()),
        }
    }
}

#[async_trait]
impl ContentAssistant for FakeAssistant {
    async fn recommend_categories(
        &self,
        content: &str,
        categories: &[String],
    ) -> Result<Vec<String>, AiError> {
        *self.seen_content.lock().unwrap() = content.to_string();
        *self.seen_categories.lock().unwrap() = categories.to_vec();
        self.categories
            .clone()
            .ok_or_else(|| AiError::Transport("connection reset".to_string()))
    }

    async fn generate_image(&self, _content: &str) -> Result<String, AiError> {
        self.image_url.clone().ok_or(AiError::Api {
            status: 500,
            body: "upstream failure".to_string(),
        })
    }
}

pub fn test_config() -> Config {
    Config {
        mongo_uri: "mongodb://localhost:27017/article_hub_test".to_string(),
        mongo_database: None,
        jwt_secret: Some(JWT_SECRET.to_string()),
        admin_seed: Some(AdminSeed {
            full_name: "Seed Admin".to_string(),
            email: "seed-admin@example.com".to_string(),
            password: "seed-password".to_string(),
        }),
        openai_api_key: None,
        openai_base_url: "http://127.0.0.1:9".to_string(),
        openai_timeout: Duration::from_secs(5),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        rust_log: "error".to_string(),
    }
}

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub users: Arc<MemoryUserStore>,
    pub categories: Arc<MemoryCategoryStore>,
    pub contents: Arc<MemoryContentStore>,
    pub assistant: Arc<FakeAssistant>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Inserts a user directly and returns it.
    pub fn add_user(&self, email: &str, password: &str, role: Role, status: Status) -> User {
        let user = User::new(
            "Test User".to_string(),
            email.to_string(),
            hash_password(password).unwrap(),
            role,
            status,
            true,
        );
        self.users.users.lock().unwrap().push(user.clone());
        user
    }

    pub fn token_for(role: Role, status: Status) -> String {
        sign_jwt(
            &ObjectId::new().to_hex(),
            role,
            status,
            Some(SESSION_TOKEN_TTL),
            Some(JWT_SECRET),
        )
        .unwrap()
    }

    pub fn admin_token() -> String {
        Self::token_for(Role::Administrator, Status::Approved)
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(test_config(), FakeAssistant::working()).await
}

/// Spawns the router on a random port with in-memory stores.
pub async fn spawn_app_with(config: Config, assistant: FakeAssistant) -> TestApp {
    let users = Arc::new(MemoryUserStore::default());
    let categories = Arc::new(MemoryCategoryStore::default());
    let contents = Arc::new(MemoryContentStore::default());
    let assistant = Arc::new(assistant);

    let state = AppState {
        users: users.clone(),
        categories: categories.clone(),
        contents: contents.clone(),
        assistant: assistant.clone(),
        config,
    };

    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address,
        client: reqwest::Client::new(),
        users,
        categories,
        contents,
        assistant,
    }
}
