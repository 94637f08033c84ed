use chrono::{Duration, Utc};
use uuid::Uuid;

use kudos_core::{
  Error,
  activity::{ObjectType, Verb},
  catalog::Quiz,
  enrollment::CompletionOutcome,
  prize::NewPrizeItem,
  store::RewardStore,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory().await.unwrap()
}

fn quiz(course_id: Uuid, cooldown_days: u32) -> Quiz {
  Quiz {
    quiz_id: Uuid::new_v4(),
    course_id,
    title: "Algebra Quiz".into(),
    max_score: 10,
    tokens_perfect: 5,
    cooldown_days,
  }
}

fn prize(guardian_id: Uuid, name: &str, cost: u32) -> NewPrizeItem {
  NewPrizeItem {
    guardian_id,
    name: name.into(),
    description: String::new(),
    cost,
  }
}

/// A learner enrolled in a fresh course, with the course already completed
/// for `tokens` tokens. Returns (learner_id, course_id).
async fn completed_course(store: &SqliteStore, tokens: u32) -> (Uuid, Uuid) {
  let learner = store.add_learner(Uuid::new_v4(), None).await.unwrap();
  let course_id = Uuid::new_v4();
  store.enrol(learner.learner_id, course_id).await.unwrap();
  store
    .complete(learner.learner_id, course_id, tokens, Utc::now())
    .await
    .unwrap();
  (learner.learner_id, course_id)
}

// ─── Learners ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn new_learner_starts_with_a_zeroed_ledger() {
  let store = store().await;
  let guardian_id = Uuid::new_v4();

  let learner = store
    .add_learner(guardian_id, Some("Ada".into()))
    .await
    .unwrap();

  let ledger = store.ledger(learner.learner_id).await.unwrap();
  assert_eq!(ledger.earned, 0);
  assert_eq!(ledger.spent, 0);
  assert_eq!(ledger.balance(), 0);

  let fetched = store.get_learner(learner.learner_id).await.unwrap().unwrap();
  assert_eq!(fetched.guardian_id, guardian_id);
  assert_eq!(fetched.name.as_deref(), Some("Ada"));
}

#[tokio::test]
async fn learners_list_per_guardian() {
  let store = store().await;
  let guardian_id = Uuid::new_v4();

  store.add_learner(guardian_id, Some("Ada".into())).await.unwrap();
  store.add_learner(guardian_id, Some("Grace".into())).await.unwrap();
  store.add_learner(Uuid::new_v4(), Some("Other".into())).await.unwrap();

  let mine = store.list_learners(guardian_id).await.unwrap();
  assert_eq!(mine.len(), 2);
}

#[tokio::test]
async fn ledger_for_unknown_learner_is_an_error() {
  let store = store().await;
  assert!(matches!(
    store.ledger(Uuid::new_v4()).await,
    Err(Error::LearnerNotFound(_))
  ));
}

// ─── Enrollment ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn enrol_is_idempotent() {
  let store = store().await;
  let learner = store.add_learner(Uuid::new_v4(), None).await.unwrap();
  let course_id = Uuid::new_v4();

  let first = store.enrol(learner.learner_id, course_id).await.unwrap();
  let second = store.enrol(learner.learner_id, course_id).await.unwrap();

  assert_eq!(first.enrolled_at, second.enrolled_at);
  assert_eq!(store.list_enrollments(learner.learner_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn enrol_requires_a_known_learner() {
  let store = store().await;
  assert!(matches!(
    store.enrol(Uuid::new_v4(), Uuid::new_v4()).await,
    Err(Error::LearnerNotFound(_))
  ));
}

#[tokio::test]
async fn completion_grants_tokens_exactly_once() {
  let store = store().await;
  let learner = store.add_learner(Uuid::new_v4(), None).await.unwrap();
  let course_id = Uuid::new_v4();
  store.enrol(learner.learner_id, course_id).await.unwrap();

  let first = store
    .complete(learner.learner_id, course_id, 10, Utc::now())
    .await
    .unwrap();
  assert_eq!(first, CompletionOutcome::Completed { tokens_awarded: 10 });

  // Repeat completion is a success no-op; the ledger does not move.
  let second = store
    .complete(learner.learner_id, course_id, 10, Utc::now())
    .await
    .unwrap();
  assert_eq!(second, CompletionOutcome::AlreadyCompleted);

  assert_eq!(store.balance(learner.learner_id).await.unwrap(), 10);

  let enrollment = store
    .get_enrollment(learner.learner_id, course_id)
    .await
    .unwrap()
    .unwrap();
  assert!(enrollment.completed);
  assert!(enrollment.completed_at.is_some());
}

#[tokio::test]
async fn completion_without_an_enrollment_fails() {
  let store = store().await;
  let learner = store.add_learner(Uuid::new_v4(), None).await.unwrap();

  assert!(matches!(
    store
      .complete(learner.learner_id, Uuid::new_v4(), 10, Utc::now())
      .await,
    Err(Error::NotEnrolled { .. })
  ));
}

#[tokio::test]
async fn concurrent_completions_grant_exactly_once() {
  let store = store().await;
  let learner = store.add_learner(Uuid::new_v4(), None).await.unwrap();
  let course_id = Uuid::new_v4();
  store.enrol(learner.learner_id, course_id).await.unwrap();

  let mut handles = Vec::new();
  for _ in 0..8 {
    let store = store.clone();
    let learner_id = learner.learner_id;
    handles.push(tokio::spawn(async move {
      store.complete(learner_id, course_id, 10, Utc::now()).await
    }));
  }

  let mut fresh = 0;
  for handle in handles {
    match handle.await.unwrap().unwrap() {
      CompletionOutcome::Completed { tokens_awarded } => {
        assert_eq!(tokens_awarded, 10);
        fresh += 1;
      }
      CompletionOutcome::AlreadyCompleted => {}
    }
  }

  assert_eq!(fresh, 1);
  assert_eq!(store.balance(learner.learner_id).await.unwrap(), 10);
}

#[tokio::test]
async fn unenrol_preserves_attempt_history() {
  let store = store().await;
  let (learner_id, course_id) = completed_course(&store, 10).await;
  let quiz = quiz(course_id, 0);

  store
    .record_attempt(learner_id, quiz.clone(), 7, Utc::now())
    .await
    .unwrap();

  store.unenrol(learner_id, course_id).await.unwrap();
  assert!(store.get_enrollment(learner_id, course_id).await.unwrap().is_none());

  // History survives; a fresh enrollment starts incomplete again.
  assert_eq!(store.list_attempts(learner_id, quiz.quiz_id).await.unwrap().len(), 1);
  let again = store.enrol(learner_id, course_id).await.unwrap();
  assert!(!again.completed);
}

// ─── Quiz attempts ───────────────────────────────────────────────────────────

#[tokio::test]
async fn attempts_require_a_completed_course() {
  let store = store().await;
  let learner = store.add_learner(Uuid::new_v4(), None).await.unwrap();
  let course_id = Uuid::new_v4();
  let quiz = quiz(course_id, 0);

  // Not enrolled at all.
  assert!(matches!(
    store.record_attempt(learner.learner_id, quiz.clone(), 5, Utc::now()).await,
    Err(Error::CourseIncomplete { .. })
  ));

  // Enrolled but not completed gates identically.
  store.enrol(learner.learner_id, course_id).await.unwrap();
  assert!(matches!(
    store.record_attempt(learner.learner_id, quiz.clone(), 5, Utc::now()).await,
    Err(Error::CourseIncomplete { .. })
  ));
}

#[tokio::test]
async fn cooldown_blocks_until_the_full_interval_has_passed() {
  let store = store().await;
  let (learner_id, course_id) = completed_course(&store, 10).await;
  let quiz = quiz(course_id, 1);

  let t0 = Utc::now();
  store.record_attempt(learner_id, quiz.clone(), 7, t0).await.unwrap();

  // 23 hours later the gate still holds, with an hour left on it.
  let blocked = store
    .record_attempt(learner_id, quiz.clone(), 7, t0 + Duration::hours(23))
    .await;
  match blocked {
    Err(Error::CooldownActive { remaining }) => {
      assert_eq!(remaining, Duration::hours(1));
    }
    other => panic!("expected CooldownActive, got {other:?}"),
  }

  // At exactly 24 hours the attempt goes through.
  store
    .record_attempt(learner_id, quiz.clone(), 7, t0 + Duration::hours(24))
    .await
    .unwrap();
  assert_eq!(store.list_attempts(learner_id, quiz.quiz_id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn perfect_score_grants_the_bonus() {
  let store = store().await;
  let (learner_id, course_id) = completed_course(&store, 10).await;
  let quiz = quiz(course_id, 0);

  let outcome = store
    .record_attempt(learner_id, quiz.clone(), 10, Utc::now())
    .await
    .unwrap();
  assert!(outcome.passed);
  assert_eq!(outcome.tokens_awarded, 5);

  // 10 from the course, 5 from the perfect bonus.
  assert_eq!(store.balance(learner_id).await.unwrap(), 15);
}

#[tokio::test]
async fn failed_attempts_are_recorded_but_grant_nothing() {
  let store = store().await;
  let (learner_id, course_id) = completed_course(&store, 10).await;
  let quiz = quiz(course_id, 0);

  let outcome = store
    .record_attempt(learner_id, quiz.clone(), 3, Utc::now())
    .await
    .unwrap();
  assert!(!outcome.passed);
  assert_eq!(outcome.tokens_awarded, 0);
  assert_eq!(store.balance(learner_id).await.unwrap(), 10);

  let last = store.last_attempt(learner_id, quiz.quiz_id).await.unwrap().unwrap();
  assert_eq!(last.score, 3);
  assert!(!last.passed);
}

#[tokio::test]
async fn score_above_max_is_rejected_before_anything_is_written() {
  let store = store().await;
  let (learner_id, course_id) = completed_course(&store, 10).await;
  let quiz = quiz(course_id, 0);

  assert!(matches!(
    store.record_attempt(learner_id, quiz.clone(), 11, Utc::now()).await,
    Err(Error::InvalidInput(_))
  ));
  assert!(store.last_attempt(learner_id, quiz.quiz_id).await.unwrap().is_none());
}

// ─── Prize shop ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn purchase_charges_the_ledger_and_logs_an_order() {
  let store = store().await;
  let guardian_id = Uuid::new_v4();
  let (learner_id, _) = completed_course(&store, 100).await;
  let item = store
    .add_prize_item(prize(guardian_id, "Movie night", 70))
    .await
    .unwrap();

  let order = store.purchase(learner_id, item.item_id).await.unwrap();
  assert_eq!(order.cost, 70);
  assert_eq!(store.balance(learner_id).await.unwrap(), 30);

  let orders = store.list_orders(learner_id).await.unwrap();
  assert_eq!(orders.len(), 1);
  assert_eq!(orders[0].item_id, item.item_id);
}

#[tokio::test]
async fn purchase_fails_on_insufficient_balance_without_side_effects() {
  let store = store().await;
  let guardian_id = Uuid::new_v4();
  let (learner_id, _) = completed_course(&store, 100).await;
  let sticker = store
    .add_prize_item(prize(guardian_id, "Sticker", 30))
    .await
    .unwrap();
  let bicycle = store
    .add_prize_item(prize(guardian_id, "Bicycle", 70))
    .await
    .unwrap();
  let candy = store
    .add_prize_item(prize(guardian_id, "Candy", 1))
    .await
    .unwrap();

  // earned 100, spent 30, then spend the remaining 70.
  store.purchase(learner_id, sticker.item_id).await.unwrap();
  store.purchase(learner_id, bicycle.item_id).await.unwrap();
  assert_eq!(store.balance(learner_id).await.unwrap(), 0);

  // Even a 1-token item is now out of reach, and nothing moves.
  match store.purchase(learner_id, candy.item_id).await {
    Err(Error::InsufficientBalance { balance, cost }) => {
      assert_eq!(balance, 0);
      assert_eq!(cost, 1);
    }
    other => panic!("expected InsufficientBalance, got {other:?}"),
  }

  assert_eq!(store.balance(learner_id).await.unwrap(), 0);
  assert_eq!(store.list_orders(learner_id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn purchase_of_an_unknown_item_fails() {
  let store = store().await;
  let (learner_id, _) = completed_course(&store, 100).await;

  assert!(matches!(
    store.purchase(learner_id, Uuid::new_v4()).await,
    Err(Error::ItemNotFound(_))
  ));
}

#[tokio::test]
async fn invalid_prize_items_are_rejected() {
  let store = store().await;
  assert!(matches!(
    store.add_prize_item(prize(Uuid::new_v4(), "  ", 5)).await,
    Err(Error::InvalidInput(_))
  ));
  assert!(matches!(
    store.add_prize_item(prize(Uuid::new_v4(), "Sticker", 0)).await,
    Err(Error::InvalidInput(_))
  ));
}

#[tokio::test]
async fn deleting_an_item_is_owner_scoped_and_keeps_orders() {
  let store = store().await;
  let guardian_id = Uuid::new_v4();
  let (learner_id, _) = completed_course(&store, 100).await;
  let item = store
    .add_prize_item(prize(guardian_id, "Movie night", 50))
    .await
    .unwrap();
  store.purchase(learner_id, item.item_id).await.unwrap();

  // A different guardian cannot delete it.
  store.delete_prize_item(Uuid::new_v4(), item.item_id).await.unwrap();
  assert!(store.get_prize_item(item.item_id).await.unwrap().is_some());

  store.delete_prize_item(guardian_id, item.item_id).await.unwrap();
  assert!(store.get_prize_item(item.item_id).await.unwrap().is_none());

  // The order outlives the item, cost snapshot intact.
  let orders = store.list_orders(learner_id).await.unwrap();
  assert_eq!(orders.len(), 1);
  assert_eq!(orders[0].cost, 50);
}

#[tokio::test]
async fn concurrent_purchases_cannot_overdraw() {
  let store = store().await;
  let guardian_id = Uuid::new_v4();
  let (learner_id, _) = completed_course(&store, 100).await;
  let item = store
    .add_prize_item(prize(guardian_id, "Movie night", 60))
    .await
    .unwrap();

  // Two purchases of a 60-token item against a 100-token balance: exactly
  // one can win.
  let mut handles = Vec::new();
  for _ in 0..2 {
    let store = store.clone();
    let item_id = item.item_id;
    handles.push(tokio::spawn(async move {
      store.purchase(learner_id, item_id).await
    }));
  }

  let mut won = 0;
  for handle in handles {
    match handle.await.unwrap() {
      Ok(_) => won += 1,
      Err(Error::InsufficientBalance { .. }) => {}
      Err(other) => panic!("unexpected error: {other:?}"),
    }
  }

  assert_eq!(won, 1);
  assert_eq!(store.balance(learner_id).await.unwrap(), 40);
}

// ─── Activity log ────────────────────────────────────────────────────────────

#[tokio::test]
async fn operations_append_matching_statements() {
  let store = store().await;
  let guardian_id = Uuid::new_v4();
  let (learner_id, course_id) = completed_course(&store, 10).await;
  let quiz = quiz(course_id, 0);
  store.record_attempt(learner_id, quiz.clone(), 10, Utc::now()).await.unwrap();
  let item = store
    .add_prize_item(prize(guardian_id, "Sticker", 5))
    .await
    .unwrap();
  store.purchase(learner_id, item.item_id).await.unwrap();

  let statements = store.list_statements(learner_id).await.unwrap();
  assert_eq!(statements.len(), 3);

  assert_eq!(statements[0].verb, Verb::Completed);
  assert_eq!(statements[0].object_type, ObjectType::Course);
  assert_eq!(statements[0].object_id, course_id);
  assert_eq!(statements[0].result["success"], true);

  assert_eq!(statements[1].verb, Verb::Attempted);
  assert_eq!(statements[1].object_id, quiz.quiz_id);
  assert_eq!(statements[1].result["score"], 10);
  assert_eq!(statements[1].result["passed"], true);

  assert_eq!(statements[2].verb, Verb::Redeemed);
  assert_eq!(statements[2].object_type, ObjectType::Prize);
  assert_eq!(statements[2].object_id, item.item_id);
  assert_eq!(statements[2].result["cost"], 5);
}

#[tokio::test]
async fn failed_operations_leave_no_statements() {
  let store = store().await;
  let learner = store.add_learner(Uuid::new_v4(), None).await.unwrap();
  let course_id = Uuid::new_v4();
  store.enrol(learner.learner_id, course_id).await.unwrap();

  let quiz = quiz(course_id, 0);
  let _ = store.record_attempt(learner.learner_id, quiz.clone(), 5, Utc::now()).await;
  let _ = store.purchase(learner.learner_id, Uuid::new_v4()).await;

  assert!(store.list_statements(learner.learner_id).await.unwrap().is_empty());
}
