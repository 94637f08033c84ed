//! Handler for the activity log endpoint.

use axum::{
  Json,
  extract::{Path, State},
};
use kudos_core::{activity::ActivityStatement, store::RewardStore};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// `GET /learners/:id/activity` — the full audit trail, oldest first.
pub async fn list<S: RewardStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<ActivityStatement>>, ApiError> {
  Ok(Json(state.store.list_statements(id).await?))
}
