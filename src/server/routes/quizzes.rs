use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{
            categories::get_category,
            questions::{get_all_questions, get_questions_for_category},
        },
        Question,
    },
    quiz::{QuizRng, ALL_CATEGORIES},
    server::{app::AppState, extractors::ApiJson},
    telemetry::QUIZ_QUESTIONS_SERVED,
};

use super::{reject_unknown_fields, ApiResponse, ExtraFields, ResultExt};

#[derive(Deserialize, Debug)]
struct QuizCategory {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    id: i64,
}

#[derive(Deserialize, Debug)]
struct QuizRequest {
    #[serde(default)]
    quiz_category: Option<QuizCategory>,
    #[serde(default)]
    previous_questions: Vec<i64>,
    #[serde(flatten)]
    extra: ExtraFields,
}

impl QuizRequest {
    /// `None` when questions from every category are eligible.
    fn category_filter(&self) -> Option<i64> {
        self.quiz_category
            .as_ref()
            .map(|c| c.id)
            .filter(|&id| id != ALL_CATEGORIES)
    }
}

#[derive(Serialize)]
struct QuizResponse {
    success: bool,
    question: Option<Question>,
    previous_questions: Vec<i64>,
}

async fn next_quiz_question(
    State(pool): State<SqlitePool>,
    State(rng): State<QuizRng>,
    ApiJson(request): ApiJson<QuizRequest>,
) -> ApiResponse<Json<QuizResponse>> {
    reject_unknown_fields(&request.extra)?;
    let mut tx = pool.begin().await.or_unprocessable()?;
    let (candidates, label) = match request.category_filter() {
        Some(id) => {
            let label = get_category(&mut tx, id)
                .await
                .or_unprocessable()?
                .map(|c| c.kind);
            let candidates = get_questions_for_category(&mut tx, id)
                .await
                .or_unprocessable()?;
            (candidates, label)
        }
        None => (
            get_all_questions(&mut tx).await.or_unprocessable()?,
            Some("All".to_owned()),
        ),
    };
    tx.commit().await.or_unprocessable()?;

    let question = rng.next_question(candidates, &request.previous_questions);
    match &question {
        Some(q) => {
            if let Some(label) = &label {
                QUIZ_QUESTIONS_SERVED.with_label_values(&[label.as_str()]).inc();
            }
            tracing::debug!(id = q.id, "Serving quiz question");
        }
        None => tracing::debug!(
            seen = request.previous_questions.len(),
            "No quiz questions left"
        ),
    }

    Ok(Json(QuizResponse {
        success: true,
        question,
        previous_questions: request.previous_questions,
    }))
}

pub fn quizzes_router(state: AppState) -> Router {
    Router::new()
        .route("/quizzes", post(next_quiz_question))
        .with_state(state)
}
