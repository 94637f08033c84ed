//! Learner — the reward-earning identity.
//!
//! Authentication lives outside this core; callers pass learner and guardian
//! ids explicitly into every operation. The learner row only records the
//! ownership edge to its guardian.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A learner account, owned by a guardian (parent or teacher).
///
/// Registering a learner also creates their zeroed
/// [`TokenLedger`](crate::ledger::TokenLedger) row in the same transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Learner {
  pub learner_id:  Uuid,
  pub guardian_id: Uuid,
  /// Optional display name; identity is the id, not the name.
  pub name:        Option<String>,
  pub created_at:  DateTime<Utc>,
}
