// src/db/articles.rs

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database,
    bson::{doc, oid::ObjectId},
};

use super::{ARTICLE_CATEGORIES, ARTICLE_CONTENTS, bounded};
use crate::{
    error::AppError,
    models::article::{ArticleCategory, ArticleContent},
};

#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn insert(&self, category: &ArticleCategory) -> Result<(), AppError>;

    async fn list(&self) -> Result<Vec<ArticleCategory>, AppError>;

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<ArticleCategory>, AppError>;

    /// Returns false when no category has this id.
    async fn delete(&self, id: ObjectId) -> Result<bool, AppError>;
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn insert(&self, content: &ArticleContent) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct MongoCategoryStore {
    categories: Collection<ArticleCategory>,
}

impl MongoCategoryStore {
    pub fn new(db: &Database) -> Self {
        Self {
            categories: db.collection(ARTICLE_CATEGORIES),
        }
    }
}

#[async_trait]
impl CategoryStore for MongoCategoryStore {
    async fn insert(&self, category: &ArticleCategory) -> Result<(), AppError> {
        bounded(self.categories.insert_one(category)).await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ArticleCategory>, AppError> {
        bounded(async {
            let cursor = self.categories.find(doc! {}).await?;
            let categories: Vec<ArticleCategory> = cursor.try_collect().await?;
            Ok::<_, mongodb::error::Error>(categories)
        })
        .await
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<ArticleCategory>, AppError> {
        bounded(self.categories.find_one(doc! { "_id": id })).await
    }

    async fn delete(&self, id: ObjectId) -> Result<bool, AppError> {
        let result = bounded(self.categories.delete_one(doc! { "_id": id })).await?;
        Ok(result.deleted_count > 0)
    }
}

#[derive(Clone)]
pub struct MongoContentStore {
    contents: Collection<ArticleContent>,
}

impl MongoContentStore {
    pub fn new(db: &Database) -> Self {
        Self {
            contents: db.collection(ARTICLE_CONTENTS),
        }
    }
}

#[async_trait]
impl ContentStore for MongoContentStore {
    async fn insert(&self, content: &ArticleContent) -> Result<(), AppError> {
        bounded(self.contents.insert_one(content)).await?;
        Ok(())
    }
}
