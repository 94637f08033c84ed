//! Handlers for the course catalog endpoints. Read-only; content comes from
//! the injected [`Catalog`](kudos_core::catalog::Catalog).

use axum::{
  Json,
  extract::{Path, State},
};
use kudos_core::{Error, catalog::Course, store::RewardStore};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// `GET /courses`
pub async fn list<S: RewardStore>(
  State(state): State<AppState<S>>,
) -> Json<Vec<Course>> {
  Json(state.catalog.courses())
}

/// `GET /courses/:id`
pub async fn get_one<S: RewardStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Course>, ApiError> {
  let course = state.catalog.course(id).ok_or(Error::CourseNotFound(id))?;
  Ok(Json(course))
}
