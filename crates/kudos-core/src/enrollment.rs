//! Enrollment — the record linking a learner to a course.
//!
//! At most one enrollment exists per (learner, course). Completion is
//! monotonic: once `completed` is set it never reverts. Unenrolling deletes
//! the row only; quiz attempts and prize orders are never cascaded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A (learner, course) enrollment with its completion state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
  pub learner_id:   Uuid,
  pub course_id:    Uuid,
  pub enrolled_at:  DateTime<Utc>,
  pub completed:    bool,
  pub completed_at: Option<DateTime<Utc>>,
}

/// Result of [`RewardStore::complete`](crate::store::RewardStore::complete).
///
/// Completing an already-completed course is a success no-op, not an error,
/// and grants nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CompletionOutcome {
  /// The enrollment transitioned to completed and the reward was granted.
  Completed { tokens_awarded: u32 },
  /// Already completed; nothing changed and nothing was granted.
  AlreadyCompleted,
}

impl CompletionOutcome {
  pub fn newly_completed(&self) -> bool {
    matches!(self, Self::Completed { .. })
  }
}
