//! Handlers for enrollment endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/learners/:id/enrollments` | Body: `{"course_id":"…"}`; idempotent |
//! | `GET`    | `/learners/:id/enrollments` | |
//! | `DELETE` | `/learners/:id/enrollments/:course_id` | Silent if absent |
//! | `POST`   | `/learners/:id/enrollments/:course_id/complete` | Grants the course reward once |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use kudos_core::{
  Error,
  enrollment::{CompletionOutcome, Enrollment},
  store::RewardStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub course_id: Uuid,
}

/// `POST /learners/:id/enrollments` — body: `{"course_id":"…"}`
pub async fn create<S: RewardStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  // The course must exist in the catalog; the store does not know content.
  if state.catalog.course(body.course_id).is_none() {
    return Err(Error::CourseNotFound(body.course_id).into());
  }
  let enrollment = state.store.enrol(id, body.course_id).await?;
  Ok((StatusCode::CREATED, Json(enrollment)))
}

/// `GET /learners/:id/enrollments`
pub async fn list<S: RewardStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Enrollment>>, ApiError> {
  Ok(Json(state.store.list_enrollments(id).await?))
}

/// `DELETE /learners/:id/enrollments/:course_id`
pub async fn remove<S: RewardStore>(
  State(state): State<AppState<S>>,
  Path((id, course_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
  state.store.unenrol(id, course_id).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /learners/:id/enrollments/:course_id/complete`
pub async fn complete<S: RewardStore>(
  State(state): State<AppState<S>>,
  Path((id, course_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<CompletionOutcome>, ApiError> {
  let course = state
    .catalog
    .course(course_id)
    .ok_or(Error::CourseNotFound(course_id))?;

  let outcome = state
    .store
    .complete(id, course_id, course.tokens_awarded, Utc::now())
    .await?;

  if outcome.newly_completed() {
    tracing::info!(
      learner_id = %id,
      course_id = %course_id,
      tokens = course.tokens_awarded,
      "course completed"
    );
  }
  Ok(Json(outcome))
}
