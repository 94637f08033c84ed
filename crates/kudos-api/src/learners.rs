//! Handlers for learner and ledger endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/learners` | Body: `{"guardian_id":"…","name":"Ada"}` |
//! | `GET`  | `/learners/:id` | 404 if not found |
//! | `GET`  | `/guardians/:id/learners` | Oldest first |
//! | `GET`  | `/learners/:id/ledger` | |
//! | `GET`  | `/learners/:id/balance` | `{"balance":n}` |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use kudos_core::{Error, learner::Learner, ledger::TokenLedger, store::RewardStore};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub guardian_id: Uuid,
  pub name:        Option<String>,
}

/// `POST /learners`
pub async fn create<S: RewardStore>(
  State(state): State<AppState<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  let learner = state.store.add_learner(body.guardian_id, body.name).await?;
  Ok((StatusCode::CREATED, Json(learner)))
}

/// `GET /learners/:id`
pub async fn get_one<S: RewardStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Learner>, ApiError> {
  let learner = state
    .store
    .get_learner(id)
    .await?
    .ok_or(Error::LearnerNotFound(id))?;
  Ok(Json(learner))
}

/// `GET /guardians/:id/learners`
pub async fn list<S: RewardStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Learner>>, ApiError> {
  Ok(Json(state.store.list_learners(id).await?))
}

/// `GET /learners/:id/ledger`
pub async fn ledger<S: RewardStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<TokenLedger>, ApiError> {
  Ok(Json(state.store.ledger(id).await?))
}

/// `GET /learners/:id/balance`
pub async fn balance<S: RewardStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
  let balance = state.store.balance(id).await?;
  Ok(Json(json!({ "balance": balance })))
}
