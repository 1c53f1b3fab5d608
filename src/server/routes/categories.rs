use std::collections::BTreeMap;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{
            categories::{get_all_categories, get_category},
            questions::get_questions_for_category,
        },
        Category, Question,
    },
    pagination::{paginate, PageQuery},
    server::{
        app::AppState,
        extractors::{ApiPath, ApiQuery},
    },
};

use super::{ApiError, ApiResponse, ResultExt};

#[derive(Serialize)]
struct CategoriesResponse {
    success: bool,
    categories: BTreeMap<i64, String>,
    total_categories: usize,
}

#[derive(Serialize)]
struct CategoryQuestionsResponse {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
    current_category: String,
}

/// Categories keyed by id, the shape the quiz client renders its category list from.
pub(super) fn categories_by_id(categories: Vec<Category>) -> BTreeMap<i64, String> {
    categories.into_iter().map(|c| (c.id, c.kind)).collect()
}

async fn get_categories(State(pool): State<SqlitePool>) -> ApiResponse<Json<CategoriesResponse>> {
    let mut tx = pool.begin().await.or_not_found()?;
    let categories = get_all_categories(&mut tx).await.or_not_found()?;
    tx.commit().await.or_not_found()?;

    Ok(Json(CategoriesResponse {
        success: true,
        total_categories: categories.len(),
        categories: categories_by_id(categories),
    }))
}

async fn category_questions(
    State(pool): State<SqlitePool>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(PageQuery { page }): ApiQuery<PageQuery>,
) -> ApiResponse<Json<CategoryQuestionsResponse>> {
    let mut tx = pool.begin().await.or_not_found()?;
    let category = get_category(&mut tx, id)
        .await
        .or_not_found()?
        .ok_or(ApiError::NotFound)?;
    let questions = get_questions_for_category(&mut tx, id)
        .await
        .or_not_found()?;
    tx.commit().await.or_not_found()?;

    Ok(Json(CategoryQuestionsResponse {
        success: true,
        total_questions: questions.len(),
        questions: paginate(questions, page),
        current_category: category.kind,
    }))
}

pub fn category_router(state: AppState) -> Router {
    Router::new()
        .route("/categories", get(get_categories))
        .route("/categories/{id}/questions", get(category_questions))
        .with_state(state)
}
