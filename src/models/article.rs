// src/models/article.rs

use chrono::{DateTime, Utc};
use mongodb::bson::{oid::ObjectId, serde_helpers::chrono_datetime_as_bson_datetime};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Represents a document in the 'article_category' collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleCategory {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    /// Category name. Covered by a text index.
    pub name: String,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl ArticleCategory {
    pub fn new(name: String) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            name,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ArticleCategory> for CategoryResponse {
    fn from(category: ArticleCategory) -> Self {
        Self {
            id: category.id.to_hex(),
            name: category.name,
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }
}

/// DTO for creating a new category.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 200, message = "Name is required."))]
    pub name: String,
}

/// Represents a document in the 'article_content' collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleContent {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    /// Sanitized article body.
    pub content: String,

    /// URL of the generated illustration.
    pub image: String,

    /// Category names suggested by the assistant. May be empty.
    pub recommended_categories: Vec<String>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl ArticleContent {
    pub fn new(content: String, image: String, recommended_categories: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            content,
            image,
            recommended_categories,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentResponse {
    pub id: String,
    pub content: String,
    pub image: String,
    pub recommended_categories: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ArticleContent> for ContentResponse {
    fn from(article: ArticleContent) -> Self {
        Self {
            id: article.id.to_hex(),
            content: article.content,
            image: article.image,
            recommended_categories: article.recommended_categories,
            created_at: article.created_at,
            updated_at: article.updated_at,
        }
    }
}

/// DTO for creating article content.
///
/// `content` is treated as HTML: it is sanitized before storage, so plain text
/// characters such as `&` and `<` come back entity-encoded.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateContentRequest {
    #[validate(length(min = 1, max = 100000, message = "Content is required."))]
    pub content: String,
}
