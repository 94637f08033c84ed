//! The `RewardStore` trait.
//!
//! Implemented by storage backends (e.g. `kudos-store-sqlite`). The API layer
//! depends on this abstraction, not on any concrete backend.
//!
//! Two operations require atomicity stronger than independent reads/writes:
//! [`complete`](RewardStore::complete) (check-completed, set, grant) and
//! [`purchase`](RewardStore::purchase) (balance check, charge). Backends must
//! execute each as a single atomic unit per learner so concurrent calls can
//! neither double-award a completion nor overdraw a balance.
//!
//! All methods return `Send` futures so the trait can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`). Errors use
//! [`crate::Error`] throughout: business failures stay typed across the
//! store boundary, infrastructure faults surface as
//! [`Error::Storage`](crate::Error::Storage).

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  Result,
  activity::ActivityStatement,
  catalog::Quiz,
  enrollment::{CompletionOutcome, Enrollment},
  learner::Learner,
  ledger::TokenLedger,
  prize::{NewPrizeItem, PrizeItem, PrizeOrder},
  quiz::{AttemptOutcome, QuizAttempt},
};

/// Abstraction over a kudos progress & reward backend.
pub trait RewardStore: Send + Sync {
  // ── Learners ──────────────────────────────────────────────────────────

  /// Register a learner under a guardian. The learner's zeroed token
  /// ledger is created in the same atomic unit.
  fn add_learner(
    &self,
    guardian_id: Uuid,
    name: Option<String>,
  ) -> impl Future<Output = Result<Learner>> + Send + '_;

  /// Retrieve a learner by id. Returns `None` if not found.
  fn get_learner(
    &self,
    learner_id: Uuid,
  ) -> impl Future<Output = Result<Option<Learner>>> + Send + '_;

  /// All learners owned by a guardian, oldest first.
  fn list_learners(
    &self,
    guardian_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Learner>>> + Send + '_;

  // ── Enrollment tracker ────────────────────────────────────────────────

  /// Enrol a learner in a course. Idempotent: if the enrollment already
  /// exists it is returned unchanged, whatever its completion state.
  fn enrol(
    &self,
    learner_id: Uuid,
    course_id: Uuid,
  ) -> impl Future<Output = Result<Enrollment>> + Send + '_;

  /// Delete the enrollment row if present; no error if absent. Quiz
  /// attempts and prize orders are never cascaded.
  fn unenrol(
    &self,
    learner_id: Uuid,
    course_id: Uuid,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  fn get_enrollment(
    &self,
    learner_id: Uuid,
    course_id: Uuid,
  ) -> impl Future<Output = Result<Option<Enrollment>>> + Send + '_;

  fn list_enrollments(
    &self,
    learner_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Enrollment>>> + Send + '_;

  /// Mark a course completed and grant its reward, atomically.
  ///
  /// Fails with [`Error::NotEnrolled`](crate::Error::NotEnrolled) if no
  /// enrollment exists. An already-completed enrollment yields
  /// [`CompletionOutcome::AlreadyCompleted`] and grants nothing. Otherwise
  /// the completion flag, the ledger grant, and the `completed` activity
  /// statement commit as one unit.
  fn complete(
    &self,
    learner_id: Uuid,
    course_id: Uuid,
    tokens_awarded: u32,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<CompletionOutcome>> + Send + '_;

  // ── Quiz scheduler ────────────────────────────────────────────────────

  /// Record a graded quiz attempt, atomically.
  ///
  /// Requires the quiz's course to be completed
  /// ([`Error::CourseIncomplete`](crate::Error::CourseIncomplete) otherwise
  /// — an absent enrollment gates identically) and the cooldown to have
  /// elapsed ([`Error::CooldownActive`](crate::Error::CooldownActive)).
  /// Every allowed attempt is appended, pass or fail; a perfect score also
  /// grants `quiz.tokens_perfect`. The `attempted` statement is appended
  /// regardless of outcome.
  fn record_attempt(
    &self,
    learner_id: Uuid,
    quiz: Quiz,
    score: u32,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<AttemptOutcome>> + Send + '_;

  /// The most recent attempt for (learner, quiz), if any.
  fn last_attempt(
    &self,
    learner_id: Uuid,
    quiz_id: Uuid,
  ) -> impl Future<Output = Result<Option<QuizAttempt>>> + Send + '_;

  /// Full attempt history for (learner, quiz), newest first.
  fn list_attempts(
    &self,
    learner_id: Uuid,
    quiz_id: Uuid,
  ) -> impl Future<Output = Result<Vec<QuizAttempt>>> + Send + '_;

  // ── Token ledger ──────────────────────────────────────────────────────
  //
  // Reads only. Grants and charges happen exclusively inside the
  // completion, attempt, and purchase transactions above, so no caller can
  // mutate a ledger outside those paths.

  fn ledger(
    &self,
    learner_id: Uuid,
  ) -> impl Future<Output = Result<TokenLedger>> + Send + '_;

  /// Spendable balance; consistent with the last committed grant/charge.
  fn balance(
    &self,
    learner_id: Uuid,
  ) -> impl Future<Output = Result<i64>> + Send + '_;

  // ── Redemption service ────────────────────────────────────────────────

  /// Add a prize item to a guardian's shop. Validates the input
  /// ([`Error::InvalidInput`](crate::Error::InvalidInput) on empty name or
  /// zero cost).
  fn add_prize_item(
    &self,
    input: NewPrizeItem,
  ) -> impl Future<Output = Result<PrizeItem>> + Send + '_;

  fn get_prize_item(
    &self,
    item_id: Uuid,
  ) -> impl Future<Output = Result<Option<PrizeItem>>> + Send + '_;

  fn list_prize_items(
    &self,
    guardian_id: Uuid,
  ) -> impl Future<Output = Result<Vec<PrizeItem>>> + Send + '_;

  /// Remove an item from a guardian's shop; scoped to the owner, silent if
  /// absent. Existing orders for the item are preserved.
  fn delete_prize_item(
    &self,
    guardian_id: Uuid,
    item_id: Uuid,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  /// Exchange tokens for a prize item, atomically.
  ///
  /// Fails with [`Error::ItemNotFound`](crate::Error::ItemNotFound) or
  /// [`Error::InsufficientBalance`](crate::Error::InsufficientBalance);
  /// the balance check, the charge, the order row, and the `redeemed`
  /// statement commit as one unit, so no partial effects are observable on
  /// failure and concurrent purchases can never overdraw.
  fn purchase(
    &self,
    learner_id: Uuid,
    item_id: Uuid,
  ) -> impl Future<Output = Result<PrizeOrder>> + Send + '_;

  /// Purchase history for a learner, newest first.
  fn list_orders(
    &self,
    learner_id: Uuid,
  ) -> impl Future<Output = Result<Vec<PrizeOrder>>> + Send + '_;

  // ── Activity recorder ─────────────────────────────────────────────────

  /// The audit trail for an actor, oldest first. Statements are written by
  /// the operations above and are immutable once recorded.
  fn list_statements(
    &self,
    actor_id: Uuid,
  ) -> impl Future<Output = Result<Vec<ActivityStatement>>> + Send + '_;
}
