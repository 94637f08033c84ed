//! Prize shop types — guardian-curated items and the append-only order log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// A redeemable item in a guardian's prize shop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrizeItem {
  pub item_id:     Uuid,
  pub guardian_id: Uuid,
  pub name:        String,
  pub description: String,
  /// Token cost; always positive.
  pub cost:        u32,
}

/// Input to [`RewardStore::add_prize_item`](crate::store::RewardStore::add_prize_item).
/// The id is always assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPrizeItem {
  pub guardian_id: Uuid,
  pub name:        String,
  #[serde(default)]
  pub description: String,
  pub cost:        u32,
}

impl NewPrizeItem {
  /// Reject empty names and non-positive costs before anything is stored.
  pub fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(Error::InvalidInput("prize name must not be empty".into()));
    }
    if self.cost == 0 {
      return Err(Error::InvalidInput("prize cost must be positive".into()));
    }
    Ok(())
  }
}

/// An append-only record of a redeemed prize. `cost` is snapshotted at
/// purchase time so later catalog edits cannot rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrizeOrder {
  pub order_id:   Uuid,
  pub learner_id: Uuid,
  pub item_id:    Uuid,
  pub cost:       u32,
  pub ordered_at: DateTime<Utc>,
}
