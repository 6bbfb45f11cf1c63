// src/handlers/articles.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use validator::Validate;

use crate::{
    db::articles::CategoryStore,
    error::{AppError, AppJson, parse_object_id},
    models::article::{
        ArticleCategory, ArticleContent, CategoryResponse, ContentResponse, CreateCategoryRequest,
        CreateContentRequest,
    },
    state::AppState,
    utils::html::clean_html,
};

/// Creates a new article category.
/// Admin only.
pub async fn create_category(
    State(categories): State<Arc<dyn CategoryStore>>,
    AppJson(payload): AppJson<CreateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let category = ArticleCategory::new(payload.name.trim().to_string());
    categories.insert(&category).await?;

    Ok((StatusCode::CREATED, Json(CategoryResponse::from(category))))
}

/// Lists all article categories.
pub async fn list_categories(
    State(categories): State<Arc<dyn CategoryStore>>,
) -> Result<impl IntoResponse, AppError> {
    let all: Vec<CategoryResponse> = categories
        .list()
        .await?
        .into_iter()
        .map(CategoryResponse::from)
        .collect();

    Ok(Json(all))
}

/// Retrieves a single category by ID.
pub async fn get_category(
    State(categories): State<Arc<dyn CategoryStore>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_object_id(&id, "category")?;

    let category = categories
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Category not found".to_string()))?;

    Ok(Json(CategoryResponse::from(category)))
}

/// Deletes a category by ID.
/// Admin only.
pub async fn delete_category(
    State(categories): State<Arc<dyn CategoryStore>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_object_id(&id, "category")?;

    if !categories.delete(id).await? {
        return Err(AppError::NotFound("Category not found".to_string()));
    }

    Ok(Json(json!({ "message": "Category deleted successfully" })))
}

/// Creates article content with an AI illustration and category hints.
///
/// The body is stored as sanitized HTML. The assistant receives the submitted
/// text so plain-text bodies reach the prompt without entity encoding.
///
/// Category recommendation is best effort: a failure is logged and leaves the
/// list empty. Image generation failure aborts the request.
pub async fn create_content(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateContentRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let content = clean_html(&payload.content);
    if content.trim().is_empty() {
        return Err(AppError::BadRequest("Content is required.".to_string()));
    }

    let names: Vec<String> = state
        .categories
        .list()
        .await?
        .into_iter()
        .map(|category| category.name)
        .collect();

    let prompt_text = payload.content.trim();
    let recommended = match state.assistant.recommend_categories(prompt_text, &names).await {
        Ok(recommended) => recommended,
        Err(e) => {
            tracing::warn!("Failed to generate category recommendations: {}", e);
            Vec::new()
        }
    };

    let image = state
        .assistant
        .generate_image(prompt_text)
        .await
        .map_err(|e| AppError::InternalServerError(format!("Failed to generate image: {}", e)))?;

    let article = ArticleContent::new(content, image, recommended);
    state.contents.insert(&article).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Article content created successfully",
            "data": ContentResponse::from(article),
        })),
    ))
}
