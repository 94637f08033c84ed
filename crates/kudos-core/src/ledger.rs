//! Token ledger — two monotonically increasing counters per learner.
//!
//! The spendable balance is always derived, never stored. Neither counter is
//! ever decremented, so the full earn/spend history stays auditable. The
//! `balance >= 0` invariant is enforced where tokens are charged (inside the
//! purchase transaction), not by clamping.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-learner earned/spent counters. Created zeroed when the learner is
/// registered; mutated only by the completion, attempt, and purchase paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenLedger {
  pub learner_id: Uuid,
  pub earned:     u64,
  pub spent:      u64,
}

impl TokenLedger {
  /// Spendable balance: `earned - spent`. Non-negative at all observable
  /// times because charges are pre-checked under the same transaction.
  pub fn balance(&self) -> i64 {
    self.earned as i64 - self.spent as i64
  }
}
