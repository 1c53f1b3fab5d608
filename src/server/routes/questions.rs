use std::collections::BTreeMap;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_option_number_from_string;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{
            categories::get_all_categories,
            questions::{self, get_all_questions, search_questions},
        },
        NewQuestion, Question,
    },
    pagination::{paginate, Page, PageQuery},
    server::{
        app::AppState,
        extractors::{ApiJson, ApiPath, ApiQuery},
    },
    telemetry::{QUESTIONS_CREATED, QUESTIONS_DELETED},
};

use super::{
    categories::categories_by_id, reject_unknown_fields, ApiError, ApiResponse, ExtraFields,
    ResultExt,
};

/// Body of `POST /questions`, which either creates a question or searches by text.
#[derive(Deserialize, Debug)]
struct QuestionsBody {
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    answer: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    category: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    difficulty: Option<i64>,
    #[serde(default, rename = "searchTerm")]
    search_term: Option<String>,
    #[serde(flatten)]
    extra: ExtraFields,
}

#[derive(Debug, PartialEq, Eq)]
enum QuestionsRequest {
    Create(NewQuestion),
    Search(String),
}

impl TryFrom<QuestionsBody> for QuestionsRequest {
    type Error = &'static str;

    fn try_from(body: QuestionsBody) -> Result<Self, Self::Error> {
        if let Some(term) = body.search_term.filter(|t| !t.is_empty()) {
            return Ok(QuestionsRequest::Search(term));
        }
        let question = body
            .question
            .filter(|q| !q.trim().is_empty())
            .ok_or("question text is required")?;
        let answer = body
            .answer
            .filter(|a| !a.trim().is_empty())
            .ok_or("answer text is required")?;
        let category = body.category.ok_or("category is required")?;
        let difficulty = body.difficulty.ok_or("difficulty is required")?;
        Ok(QuestionsRequest::Create(NewQuestion {
            question,
            answer,
            category,
            difficulty,
        }))
    }
}

#[derive(Serialize)]
struct QuestionsPage {
    success: bool,
    questions: Vec<Question>,
    categories: BTreeMap<i64, String>,
    total_questions: usize,
    current_category: Option<String>,
}

#[derive(Serialize)]
struct DeletedQuestion {
    success: bool,
    deleted: i64,
    questions: Vec<Question>,
    total_questions: usize,
}

#[derive(Serialize)]
struct CreatedQuestion {
    success: bool,
    created: i64,
    questions: Vec<Question>,
    total_questions: usize,
}

#[derive(Serialize)]
struct SearchResults {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
}

async fn list_questions(
    State(pool): State<SqlitePool>,
    ApiQuery(PageQuery { page }): ApiQuery<PageQuery>,
) -> ApiResponse<Json<QuestionsPage>> {
    let mut tx = pool.begin().await.or_not_found()?;
    let questions = get_all_questions(&mut tx).await.or_not_found()?;
    let categories = get_all_categories(&mut tx).await.or_not_found()?;
    tx.commit().await.or_not_found()?;

    let total_questions = questions.len();
    let questions = paginate(questions, page);
    if questions.is_empty() {
        tracing::info!(page = page.number(), "No questions on requested page");
        return Err(ApiError::NotFound);
    }

    Ok(Json(QuestionsPage {
        success: true,
        questions,
        current_category: categories.first().map(|c| c.kind.clone()),
        categories: categories_by_id(categories),
        total_questions,
    }))
}

async fn delete_question(
    State(pool): State<SqlitePool>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(PageQuery { page }): ApiQuery<PageQuery>,
) -> ApiResponse<Json<DeletedQuestion>> {
    let mut tx = pool.begin().await.or_not_found()?;
    if questions::delete_question(&mut tx, id).await.or_not_found()? == 0 {
        tracing::info!(id, "Question to delete does not exist");
        return Err(ApiError::NotFound);
    }
    let questions = get_all_questions(&mut tx).await.or_not_found()?;
    tx.commit().await.or_not_found()?;

    QUESTIONS_DELETED.inc();
    tracing::info!(id, "Deleted question");
    Ok(Json(DeletedQuestion {
        success: true,
        deleted: id,
        total_questions: questions.len(),
        questions: paginate(questions, page),
    }))
}

async fn create_question(
    pool: &SqlitePool,
    new_question: NewQuestion,
    page: Page,
) -> ApiResponse<CreatedQuestion> {
    let mut tx = pool.begin().await.or_unprocessable()?;
    let id = questions::create_question(&mut tx, &new_question)
        .await
        .or_unprocessable()?;
    let questions = get_all_questions(&mut tx).await.or_unprocessable()?;
    tx.commit().await.or_unprocessable()?;

    QUESTIONS_CREATED.inc();
    tracing::info!(id, category = new_question.category, "Created question");
    Ok(CreatedQuestion {
        success: true,
        created: id,
        total_questions: questions.len(),
        questions: paginate(questions, page),
    })
}

async fn search(pool: &SqlitePool, term: &str, page: Page) -> ApiResponse<SearchResults> {
    let mut tx = pool.begin().await.or_unprocessable()?;
    let questions = search_questions(&mut tx, term).await.or_unprocessable()?;
    tx.commit().await.or_unprocessable()?;

    Ok(SearchResults {
        success: true,
        total_questions: questions.len(),
        questions: paginate(questions, page),
    })
}

async fn create_or_search(
    State(pool): State<SqlitePool>,
    ApiQuery(PageQuery { page }): ApiQuery<PageQuery>,
    ApiJson(body): ApiJson<QuestionsBody>,
) -> ApiResponse<Response> {
    reject_unknown_fields(&body.extra)?;
    match QuestionsRequest::try_from(body) {
        Ok(QuestionsRequest::Search(term)) => {
            let results = search(&pool, &term, page).await?;
            Ok(Json(results).into_response())
        }
        Ok(QuestionsRequest::Create(new_question)) => {
            let created = create_question(&pool, new_question, page).await?;
            Ok((StatusCode::CREATED, Json(created)).into_response())
        }
        Err(reason) => {
            tracing::info!(reason, "Rejected question");
            Err(ApiError::Unprocessable)
        }
    }
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route("/questions", get(list_questions).post(create_or_search))
        .route("/questions/{id}", delete(delete_question))
        .with_state(state)
}
