//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every [`kudos_core::Error`] variant has a fixed HTTP status so clients can
//! branch on the code alone. `CooldownActive` additionally carries
//! `retry_after_secs` in the body.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub kudos_core::Error);

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    use kudos_core::Error as E;

    let status = match &self.0 {
      E::LearnerNotFound(_)
      | E::CourseNotFound(_)
      | E::QuizNotFound(_)
      | E::ItemNotFound(_)
      | E::NotEnrolled { .. } => StatusCode::NOT_FOUND,
      E::CourseIncomplete { .. } | E::InsufficientBalance { .. } => {
        StatusCode::CONFLICT
      }
      E::CooldownActive { .. } => StatusCode::TOO_MANY_REQUESTS,
      E::InvalidInput(_) | E::Serialization(_) => StatusCode::BAD_REQUEST,
      E::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let body = match &self.0 {
      E::CooldownActive { remaining } => json!({
        "error": self.0.to_string(),
        "retry_after_secs": remaining.num_seconds().max(0),
      }),
      other => json!({ "error": other.to_string() }),
    };

    (status, Json(body)).into_response()
  }
}
