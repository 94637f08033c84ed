//! Handlers for the prize shop and order endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/guardians/:id/prizes` | Body: `{"name":"…","description":"…","cost":n}` |
//! | `GET`    | `/guardians/:id/prizes` | Sorted by name |
//! | `DELETE` | `/guardians/:id/prizes/:item_id` | Owner-scoped; orders survive |
//! | `POST`   | `/learners/:id/orders` | Body: `{"item_id":"…"}` |
//! | `GET`    | `/learners/:id/orders` | Newest first |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use kudos_core::{
  prize::{NewPrizeItem, PrizeItem, PrizeOrder},
  store::RewardStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

// ─── Shop items ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateItemBody {
  pub name:        String,
  #[serde(default)]
  pub description: String,
  pub cost:        u32,
}

/// `POST /guardians/:id/prizes`
pub async fn create_item<S: RewardStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<CreateItemBody>,
) -> Result<impl IntoResponse, ApiError> {
  let item = state
    .store
    .add_prize_item(NewPrizeItem {
      guardian_id: id,
      name:        body.name,
      description: body.description,
      cost:        body.cost,
    })
    .await?;
  Ok((StatusCode::CREATED, Json(item)))
}

/// `GET /guardians/:id/prizes`
pub async fn list_items<S: RewardStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<PrizeItem>>, ApiError> {
  Ok(Json(state.store.list_prize_items(id).await?))
}

/// `DELETE /guardians/:id/prizes/:item_id`
pub async fn delete_item<S: RewardStore>(
  State(state): State<AppState<S>>,
  Path((id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
  state.store.delete_prize_item(id, item_id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Orders ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PurchaseBody {
  pub item_id: Uuid,
}

/// `POST /learners/:id/orders`
pub async fn purchase<S: RewardStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<PurchaseBody>,
) -> Result<impl IntoResponse, ApiError> {
  let order = state.store.purchase(id, body.item_id).await?;
  tracing::info!(
    learner_id = %id,
    item_id = %body.item_id,
    cost = order.cost,
    "prize redeemed"
  );
  Ok((StatusCode::CREATED, Json(order)))
}

/// `GET /learners/:id/orders`
pub async fn list_orders<S: RewardStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<PrizeOrder>>, ApiError> {
  Ok(Json(state.store.list_orders(id).await?))
}
