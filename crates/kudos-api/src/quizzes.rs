//! Handlers for quiz attempt endpoints.
//!
//! Grading runs server-side: the client submits answer indices, never a
//! score. An omitted or out-of-range index scores nothing for that question.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/learners/:id/attempts` | Body: `{"quiz_id":"…","answers":[1,null,0]}` |
//! | `GET`  | `/learners/:id/quizzes/:quiz_id/attempts` | Newest first |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use kudos_core::{
  Error,
  quiz::{self, QuizAttempt},
  store::RewardStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct SubmitBody {
  pub quiz_id: Uuid,
  pub answers: Vec<Option<usize>>,
}

/// `POST /learners/:id/attempts`
pub async fn submit<S: RewardStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<SubmitBody>,
) -> Result<impl IntoResponse, ApiError> {
  let quiz = state
    .catalog
    .quiz(body.quiz_id)
    .ok_or(Error::QuizNotFound(body.quiz_id))?;
  let questions = state
    .catalog
    .questions(body.quiz_id)
    .ok_or(Error::QuizNotFound(body.quiz_id))?;

  let score = quiz::grade(&questions, &body.answers, quiz.max_score);
  let outcome = state
    .store
    .record_attempt(id, quiz, score, Utc::now())
    .await?;

  tracing::info!(
    learner_id = %id,
    quiz_id = %body.quiz_id,
    score = outcome.score,
    passed = outcome.passed,
    "quiz attempt recorded"
  );
  Ok((StatusCode::CREATED, Json(outcome)))
}

/// `GET /learners/:id/quizzes/:quiz_id/attempts`
pub async fn list_attempts<S: RewardStore>(
  State(state): State<AppState<S>>,
  Path((id, quiz_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Vec<QuizAttempt>>, ApiError> {
  Ok(Json(state.store.list_attempts(id, quiz_id).await?))
}
