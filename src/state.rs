use std::sync::Arc;

use axum::extract::FromRef;
use mongodb::Database;

use crate::{
    ai::{ContentAssistant, OpenAiClient},
    config::Config,
    db::{
        articles::{CategoryStore, ContentStore, MongoCategoryStore, MongoContentStore},
        users::{MongoUserStore, UserStore},
    },
};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub categories: Arc<dyn CategoryStore>,
    pub contents: Arc<dyn ContentStore>,
    pub assistant: Arc<dyn ContentAssistant>,
    pub config: Config,
}

impl AppState {
    /// Wires the Mongo-backed stores and the OpenAI client.
    pub fn from_database(db: &Database, assistant: OpenAiClient, config: Config) -> Self {
        Self {
            users: Arc::new(MongoUserStore::new(db)),
            categories: Arc::new(MongoCategoryStore::new(db)),
            contents: Arc::new(MongoContentStore::new(db)),
            assistant: Arc::new(assistant),
            config,
        }
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for Arc<dyn UserStore> {
    fn from_ref(state: &AppState) -> Self {
        state.users.clone()
    }
}

impl FromRef<AppState> for Arc<dyn CategoryStore> {
    fn from_ref(state: &AppState) -> Self {
        state.categories.clone()
    }
}
