//! Error types for `kudos-core`.
//!
//! Every business-rule failure has its own variant so callers (and the HTTP
//! layer) can match on it. Infrastructure faults are collapsed into
//! [`Error::Storage`] and must never be confused with a business outcome.

use chrono::Duration;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("learner not found: {0}")]
  LearnerNotFound(Uuid),

  #[error("course not found: {0}")]
  CourseNotFound(Uuid),

  #[error("quiz not found: {0}")]
  QuizNotFound(Uuid),

  #[error("prize item not found: {0}")]
  ItemNotFound(Uuid),

  #[error("learner {learner_id} is not enrolled in course {course_id}")]
  NotEnrolled { learner_id: Uuid, course_id: Uuid },

  #[error("learner {learner_id} has not completed course {course_id}")]
  CourseIncomplete { learner_id: Uuid, course_id: Uuid },

  /// The quiz was attempted again before its cooldown elapsed.
  /// Carries the remaining wait so callers can display it.
  #[error("quiz can be attempted again in {}", format_remaining(remaining))]
  CooldownActive { remaining: Duration },

  #[error("insufficient balance: have {balance}, need {cost}")]
  InsufficientBalance { balance: i64, cost: i64 },

  #[error("invalid input: {0}")]
  InvalidInput(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  /// The underlying store failed. Distinct from every business error;
  /// callers must not interpret this as (e.g.) an insufficient balance.
  #[error("storage error: {0}")]
  Storage(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Render a wait duration as `"Xd Yh Zm"`, rounding minutes up so a
/// displayed wait of zero never hides an active cooldown.
fn format_remaining(remaining: &Duration) -> String {
  let total_mins = (remaining.num_seconds() + 59) / 60;
  let days  = total_mins / (24 * 60);
  let hours = (total_mins / 60) % 24;
  let mins  = total_mins % 60;
  format!("{days}d {hours}h {mins}m")
}
