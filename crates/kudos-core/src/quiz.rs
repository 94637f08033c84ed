//! Quiz rules — grading, pass threshold, and attempt cooldown.
//!
//! These are pure functions so the scoring and scheduling semantics can be
//! tested without a store. The store calls them from inside its attempt
//! transaction; the API layer calls [`grade`] before submitting a score.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::Question;

// ─── Records ─────────────────────────────────────────────────────────────────

/// One attempt at a quiz. Append-only; history is preserved indefinitely,
/// including across unenrol/re-enrol cycles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizAttempt {
  pub attempt_id:   Uuid,
  pub learner_id:   Uuid,
  pub quiz_id:      Uuid,
  pub attempted_at: DateTime<Utc>,
  pub score:        u32,
  pub passed:       bool,
}

/// Result of [`RewardStore::record_attempt`](crate::store::RewardStore::record_attempt).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptOutcome {
  pub score:          u32,
  pub max_score:      u32,
  pub passed:         bool,
  /// The perfect-score bonus, or 0. The course-completion reward is never
  /// granted here.
  pub tokens_awarded: u32,
}

// ─── Grading ─────────────────────────────────────────────────────────────────

/// Score a set of answers against the question bank.
///
/// Each correct answer is worth `max_score / question_count`, integer
/// truncated. When the count does not divide `max_score` evenly the total
/// falls short of `max_score`; that truncation is deliberate and must not be
/// rounded away. `None`, out-of-range, and missing trailing answers all
/// score nothing.
pub fn grade(
  questions: &[Question],
  answers: &[Option<usize>],
  max_score: u32,
) -> u32 {
  if questions.is_empty() {
    return 0;
  }
  let per_question = max_score / questions.len() as u32;

  questions
    .iter()
    .enumerate()
    .filter(|(idx, q)| answers.get(*idx).copied().flatten() == Some(q.answer))
    .count() as u32
    * per_question
}

/// Pass threshold: at least half of `max_score`, inclusive. Compared exactly
/// (`2 * score >= max`), not against a truncated half.
pub fn passed(score: u32, max_score: u32) -> bool {
  2 * score >= max_score
}

/// A perfect score earns the quiz's bonus tokens.
pub fn is_perfect(score: u32, max_score: u32) -> bool {
  score >= max_score
}

// ─── Cooldown ────────────────────────────────────────────────────────────────

/// Time left before the quiz may be attempted again, or `None` if it can be
/// attempted now.
///
/// The gate is a fixed-duration offset from the last attempt instant
/// (`last + cooldown_days`), deliberately timezone-agnostic: no wall-clock
/// date arithmetic is involved.
pub fn cooldown_remaining(
  last: DateTime<Utc>,
  cooldown_days: u32,
  now: DateTime<Utc>,
) -> Option<Duration> {
  let next_allowed = last + Duration::days(i64::from(cooldown_days));
  (now < next_allowed).then(|| next_allowed - now)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn bank(n: usize) -> Vec<Question> {
    (0..n)
      .map(|i| Question {
        prompt:  format!("question {i}"),
        options: vec!["a".into(), "b".into(), "c".into()],
        answer:  1,
      })
      .collect()
  }

  // ── Grading ───────────────────────────────────────────────────────────────

  #[test]
  fn per_question_weight_is_truncated() {
    // 3 questions, max 10 => each correct answer is worth floor(10/3) = 3.
    let questions = bank(3);
    let answers = vec![Some(1), Some(1), Some(0)];
    let score = grade(&questions, &answers, 10);
    assert_eq!(score, 6);
    assert!(passed(score, 10));
    assert!(!is_perfect(score, 10));
  }

  #[test]
  fn all_correct_can_still_fall_short_of_max() {
    // Truncation means a flawless run tops out at 9 of 10.
    let questions = bank(3);
    let answers = vec![Some(1), Some(1), Some(1)];
    let score = grade(&questions, &answers, 10);
    assert_eq!(score, 9);
    assert!(!is_perfect(score, 10));
  }

  #[test]
  fn missing_and_out_of_range_answers_score_nothing() {
    let questions = bank(3);
    // Unanswered, wildly out of range, and a short answer list.
    assert_eq!(grade(&questions, &[None, Some(7)], 9), 0);
    assert_eq!(grade(&questions, &[], 9), 0);
  }

  #[test]
  fn empty_question_bank_scores_zero() {
    assert_eq!(grade(&[], &[Some(0)], 10), 0);
  }

  // ── Pass threshold ────────────────────────────────────────────────────────

  #[test]
  fn pass_threshold_is_inclusive_and_exact() {
    // Exactly half passes.
    assert!(passed(5, 10));
    assert!(!passed(4, 10));
    // Odd max: 2*4 >= 9 passes, 2*3 >= 9 does not — no truncated half.
    assert!(passed(5, 9));
    assert!(!passed(4, 9));
  }

  // ── Cooldown ──────────────────────────────────────────────────────────────

  #[test]
  fn cooldown_blocks_before_the_boundary() {
    let last = Utc::now();
    let remaining =
      cooldown_remaining(last, 1, last + Duration::hours(23)).unwrap();
    assert_eq!(remaining, Duration::hours(1));
  }

  #[test]
  fn cooldown_opens_exactly_at_the_boundary() {
    let last = Utc::now();
    assert!(cooldown_remaining(last, 1, last + Duration::hours(24)).is_none());
    assert!(cooldown_remaining(last, 1, last + Duration::hours(25)).is_none());
  }

  #[test]
  fn zero_day_cooldown_never_blocks() {
    let last = Utc::now();
    assert!(cooldown_remaining(last, 0, last).is_none());
  }
}
