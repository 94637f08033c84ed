//! [`SqliteStore`] — the SQLite implementation of [`RewardStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use uuid::Uuid;

use kudos_core::{
  Error, Result,
  activity::{ActivityStatement, ObjectType, Verb},
  catalog::Quiz,
  enrollment::{CompletionOutcome, Enrollment},
  learner::Learner,
  ledger::TokenLedger,
  prize::{NewPrizeItem, PrizeItem, PrizeOrder},
  quiz::{self, AttemptOutcome, QuizAttempt},
  store::RewardStore,
};

use crate::{
  encode::{
    RawAttempt, RawEnrollment, RawItem, RawLearner, RawOrder, RawStatement,
    encode_dt, encode_uuid,
  },
  error::{domain, to_core},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A kudos reward store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All access
/// is serialized on the connection's worker thread; the check-then-act
/// operations additionally run in immediate transactions so their effects
/// commit or roll back as one unit.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path)
      .await
      .map_err(to_core)?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory()
      .await
      .map_err(to_core)?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await
      .map_err(to_core)
  }
}

// ─── Transaction helpers ─────────────────────────────────────────────────────

/// Whether a learner row exists; used to gate operations that would
/// otherwise silently write rows for an unknown learner.
fn learner_exists(
  tx: &rusqlite::Transaction<'_>,
  learner_id: &str,
) -> rusqlite::Result<bool> {
  Ok(
    tx.query_row(
      "SELECT 1 FROM learners WHERE learner_id = ?1",
      rusqlite::params![learner_id],
      |_| Ok(true),
    )
    .optional()?
    .unwrap_or(false),
  )
}

/// Append one audit statement. Runs inside the caller's transaction so a
/// statement exists exactly when its operation committed.
fn append_statement(
  tx: &rusqlite::Transaction<'_>,
  actor_id: &str,
  verb: Verb,
  object_type: ObjectType,
  object_id: &str,
  result: serde_json::Value,
  recorded_at: &str,
) -> rusqlite::Result<()> {
  tx.execute(
    "INSERT INTO statements
       (statement_id, actor_id, verb, object_type, object_id, result_json, recorded_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    rusqlite::params![
      encode_uuid(Uuid::new_v4()),
      actor_id,
      verb.discriminant(),
      object_type.discriminant(),
      object_id,
      result.to_string(),
      recorded_at,
    ],
  )?;
  Ok(())
}

/// Increment a learner's `earned` counter.
fn grant(
  tx: &rusqlite::Transaction<'_>,
  learner_id: &str,
  amount: u32,
) -> rusqlite::Result<()> {
  tx.execute(
    "UPDATE ledgers SET earned = earned + ?2 WHERE learner_id = ?1",
    rusqlite::params![learner_id, amount],
  )?;
  Ok(())
}

/// Increment a learner's `spent` counter. Callers must have verified the
/// balance under the same transaction.
fn charge(
  tx: &rusqlite::Transaction<'_>,
  learner_id: &str,
  amount: u32,
) -> rusqlite::Result<()> {
  tx.execute(
    "UPDATE ledgers SET spent = spent + ?2 WHERE learner_id = ?1",
    rusqlite::params![learner_id, amount],
  )?;
  Ok(())
}

// ─── RewardStore impl ────────────────────────────────────────────────────────

impl RewardStore for SqliteStore {
  // ── Learners ──────────────────────────────────────────────────────────────

  async fn add_learner(
    &self,
    guardian_id: Uuid,
    name: Option<String>,
  ) -> Result<Learner> {
    let learner = Learner {
      learner_id: Uuid::new_v4(),
      guardian_id,
      name,
      created_at: Utc::now(),
    };

    let id_str       = encode_uuid(learner.learner_id);
    let guardian_str = encode_uuid(guardian_id);
    let name_val     = learner.name.clone();
    let at_str       = encode_dt(learner.created_at);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
          "INSERT INTO learners (learner_id, guardian_id, name, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, guardian_str, name_val, at_str],
        )?;
        tx.execute(
          "INSERT INTO ledgers (learner_id, earned, spent) VALUES (?1, 0, 0)",
          rusqlite::params![id_str],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await
      .map_err(to_core)?;

    Ok(learner)
  }

  async fn get_learner(&self, learner_id: Uuid) -> Result<Option<Learner>> {
    let id_str = encode_uuid(learner_id);

    let raw: Option<RawLearner> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT learner_id, guardian_id, name, created_at
               FROM learners WHERE learner_id = ?1",
              rusqlite::params![id_str],
              RawLearner::from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(to_core)?;

    raw.map(RawLearner::into_learner).transpose()
  }

  async fn list_learners(&self, guardian_id: Uuid) -> Result<Vec<Learner>> {
    let guardian_str = encode_uuid(guardian_id);

    let raws: Vec<RawLearner> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT learner_id, guardian_id, name, created_at
           FROM learners WHERE guardian_id = ?1 ORDER BY created_at",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![guardian_str], RawLearner::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(to_core)?;

    raws.into_iter().map(RawLearner::into_learner).collect()
  }

  // ── Enrollment tracker ────────────────────────────────────────────────────

  async fn enrol(&self, learner_id: Uuid, course_id: Uuid) -> Result<Enrollment> {
    let learner_str = encode_uuid(learner_id);
    let course_str  = encode_uuid(course_id);
    let now_str     = encode_dt(Utc::now());

    let raw: RawEnrollment = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if !learner_exists(&tx, &learner_str)? {
          return Err(domain(Error::LearnerNotFound(learner_id)));
        }

        let existing = tx
          .query_row(
            "SELECT learner_id, course_id, enrolled_at, completed, completed_at
             FROM enrollments WHERE learner_id = ?1 AND course_id = ?2",
            rusqlite::params![learner_str, course_str],
            RawEnrollment::from_row,
          )
          .optional()?;

        // Idempotent: an existing enrollment is returned untouched,
        // whatever its completion state.
        let raw = match existing {
          Some(raw) => raw,
          None => {
            tx.execute(
              "INSERT INTO enrollments (learner_id, course_id, enrolled_at, completed)
               VALUES (?1, ?2, ?3, 0)",
              rusqlite::params![learner_str, course_str, now_str],
            )?;
            RawEnrollment {
              learner_id:   learner_str,
              course_id:    course_str,
              enrolled_at:  now_str,
              completed:    false,
              completed_at: None,
            }
          }
        };

        tx.commit()?;
        Ok(raw)
      })
      .await
      .map_err(to_core)?;

    raw.into_enrollment()
  }

  async fn unenrol(&self, learner_id: Uuid, course_id: Uuid) -> Result<()> {
    let learner_str = encode_uuid(learner_id);
    let course_str  = encode_uuid(course_id);

    // Deletes the enrollment row only; attempt and order history stays.
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM enrollments WHERE learner_id = ?1 AND course_id = ?2",
          rusqlite::params![learner_str, course_str],
        )?;
        Ok(())
      })
      .await
      .map_err(to_core)
  }

  async fn get_enrollment(
    &self,
    learner_id: Uuid,
    course_id: Uuid,
  ) -> Result<Option<Enrollment>> {
    let learner_str = encode_uuid(learner_id);
    let course_str  = encode_uuid(course_id);

    let raw: Option<RawEnrollment> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT learner_id, course_id, enrolled_at, completed, completed_at
               FROM enrollments WHERE learner_id = ?1 AND course_id = ?2",
              rusqlite::params![learner_str, course_str],
              RawEnrollment::from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(to_core)?;

    raw.map(RawEnrollment::into_enrollment).transpose()
  }

  async fn list_enrollments(&self, learner_id: Uuid) -> Result<Vec<Enrollment>> {
    let learner_str = encode_uuid(learner_id);

    let raws: Vec<RawEnrollment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT learner_id, course_id, enrolled_at, completed, completed_at
           FROM enrollments WHERE learner_id = ?1 ORDER BY enrolled_at",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![learner_str], RawEnrollment::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(to_core)?;

    raws
      .into_iter()
      .map(RawEnrollment::into_enrollment)
      .collect()
  }

  async fn complete(
    &self,
    learner_id: Uuid,
    course_id: Uuid,
    tokens_awarded: u32,
    now: DateTime<Utc>,
  ) -> Result<CompletionOutcome> {
    let learner_str = encode_uuid(learner_id);
    let course_str  = encode_uuid(course_id);
    let now_str     = encode_dt(now);

    // Check-completed, set, grant, and the audit statement commit as one
    // unit: two racing calls serialize on the connection and the second
    // observes completed = 1.
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let completed: Option<bool> = tx
          .query_row(
            "SELECT completed FROM enrollments
             WHERE learner_id = ?1 AND course_id = ?2",
            rusqlite::params![learner_str, course_str],
            |row| row.get(0),
          )
          .optional()?;

        match completed {
          None => {
            return Err(domain(Error::NotEnrolled { learner_id, course_id }));
          }
          Some(true) => {
            // Success no-op: no second grant, no second statement.
            return Ok(CompletionOutcome::AlreadyCompleted);
          }
          Some(false) => {}
        }

        tx.execute(
          "UPDATE enrollments SET completed = 1, completed_at = ?3
           WHERE learner_id = ?1 AND course_id = ?2",
          rusqlite::params![learner_str, course_str, now_str],
        )?;
        grant(&tx, &learner_str, tokens_awarded)?;
        append_statement(
          &tx,
          &learner_str,
          Verb::Completed,
          ObjectType::Course,
          &course_str,
          serde_json::json!({ "success": true }),
          &now_str,
        )?;

        tx.commit()?;
        Ok(CompletionOutcome::Completed { tokens_awarded })
      })
      .await
      .map_err(to_core)
  }

  // ── Quiz scheduler ────────────────────────────────────────────────────────

  async fn record_attempt(
    &self,
    learner_id: Uuid,
    quiz: Quiz,
    score: u32,
    now: DateTime<Utc>,
  ) -> Result<AttemptOutcome> {
    if score > quiz.max_score {
      return Err(Error::InvalidInput(format!(
        "score {score} exceeds max score {}",
        quiz.max_score
      )));
    }

    let learner_str    = encode_uuid(learner_id);
    let quiz_str       = encode_uuid(quiz.quiz_id);
    let course_id      = quiz.course_id;
    let course_str     = encode_uuid(quiz.course_id);
    let now_str        = encode_dt(now);
    let max_score      = quiz.max_score;
    let tokens_perfect = quiz.tokens_perfect;
    let cooldown_days  = quiz.cooldown_days;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        // The quiz is gated on course completion; a missing enrollment
        // gates identically to an incomplete one.
        let completed: Option<bool> = tx
          .query_row(
            "SELECT completed FROM enrollments
             WHERE learner_id = ?1 AND course_id = ?2",
            rusqlite::params![learner_str, course_str],
            |row| row.get(0),
          )
          .optional()?;
        if completed != Some(true) {
          return Err(domain(Error::CourseIncomplete { learner_id, course_id }));
        }

        let last_str: Option<String> = tx
          .query_row(
            "SELECT attempted_at FROM quiz_attempts
             WHERE learner_id = ?1 AND quiz_id = ?2
             ORDER BY attempted_at DESC LIMIT 1",
            rusqlite::params![learner_str, quiz_str],
            |row| row.get(0),
          )
          .optional()?;
        if let Some(last_str) = last_str {
          let last = crate::encode::decode_dt(&last_str).map_err(domain)?;
          if let Some(remaining) =
            quiz::cooldown_remaining(last, cooldown_days, now)
          {
            return Err(domain(Error::CooldownActive { remaining }));
          }
        }

        // Every allowed attempt is recorded, pass or fail.
        let passed = quiz::passed(score, max_score);
        tx.execute(
          "INSERT INTO quiz_attempts
             (attempt_id, learner_id, quiz_id, attempted_at, score, passed)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            encode_uuid(Uuid::new_v4()),
            learner_str,
            quiz_str,
            now_str,
            score,
            passed,
          ],
        )?;

        let tokens_awarded = if quiz::is_perfect(score, max_score) {
          grant(&tx, &learner_str, tokens_perfect)?;
          tokens_perfect
        } else {
          0
        };

        append_statement(
          &tx,
          &learner_str,
          Verb::Attempted,
          ObjectType::Quiz,
          &quiz_str,
          serde_json::json!({ "score": score, "max": max_score, "passed": passed }),
          &now_str,
        )?;

        tx.commit()?;
        Ok(AttemptOutcome { score, max_score, passed, tokens_awarded })
      })
      .await
      .map_err(to_core)
  }

  async fn last_attempt(
    &self,
    learner_id: Uuid,
    quiz_id: Uuid,
  ) -> Result<Option<QuizAttempt>> {
    let learner_str = encode_uuid(learner_id);
    let quiz_str    = encode_uuid(quiz_id);

    let raw: Option<RawAttempt> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT attempt_id, learner_id, quiz_id, attempted_at, score, passed
               FROM quiz_attempts WHERE learner_id = ?1 AND quiz_id = ?2
               ORDER BY attempted_at DESC LIMIT 1",
              rusqlite::params![learner_str, quiz_str],
              RawAttempt::from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(to_core)?;

    raw.map(RawAttempt::into_attempt).transpose()
  }

  async fn list_attempts(
    &self,
    learner_id: Uuid,
    quiz_id: Uuid,
  ) -> Result<Vec<QuizAttempt>> {
    let learner_str = encode_uuid(learner_id);
    let quiz_str    = encode_uuid(quiz_id);

    let raws: Vec<RawAttempt> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT attempt_id, learner_id, quiz_id, attempted_at, score, passed
           FROM quiz_attempts WHERE learner_id = ?1 AND quiz_id = ?2
           ORDER BY attempted_at DESC",
        )?;
        let rows = stmt
          .query_map(
            rusqlite::params![learner_str, quiz_str],
            RawAttempt::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(to_core)?;

    raws.into_iter().map(RawAttempt::into_attempt).collect()
  }

  // ── Token ledger ──────────────────────────────────────────────────────────

  async fn ledger(&self, learner_id: Uuid) -> Result<TokenLedger> {
    let id_str = encode_uuid(learner_id);

    let counters: Option<(u64, u64)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT earned, spent FROM ledgers WHERE learner_id = ?1",
              rusqlite::params![id_str],
              |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?,
        )
      })
      .await
      .map_err(to_core)?;

    let (earned, spent) =
      counters.ok_or(Error::LearnerNotFound(learner_id))?;
    Ok(TokenLedger { learner_id, earned, spent })
  }

  async fn balance(&self, learner_id: Uuid) -> Result<i64> {
    Ok(self.ledger(learner_id).await?.balance())
  }

  // ── Redemption service ────────────────────────────────────────────────────

  async fn add_prize_item(&self, input: NewPrizeItem) -> Result<PrizeItem> {
    input.validate()?;

    let item = PrizeItem {
      item_id:     Uuid::new_v4(),
      guardian_id: input.guardian_id,
      name:        input.name,
      description: input.description,
      cost:        input.cost,
    };

    let id_str       = encode_uuid(item.item_id);
    let guardian_str = encode_uuid(item.guardian_id);
    let name         = item.name.clone();
    let description  = item.description.clone();
    let cost         = item.cost;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO prize_items (item_id, guardian_id, name, description, cost)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, guardian_str, name, description, cost],
        )?;
        Ok(())
      })
      .await
      .map_err(to_core)?;

    Ok(item)
  }

  async fn get_prize_item(&self, item_id: Uuid) -> Result<Option<PrizeItem>> {
    let id_str = encode_uuid(item_id);

    let raw: Option<RawItem> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT item_id, guardian_id, name, description, cost
               FROM prize_items WHERE item_id = ?1",
              rusqlite::params![id_str],
              RawItem::from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(to_core)?;

    raw.map(RawItem::into_item).transpose()
  }

  async fn list_prize_items(&self, guardian_id: Uuid) -> Result<Vec<PrizeItem>> {
    let guardian_str = encode_uuid(guardian_id);

    let raws: Vec<RawItem> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT item_id, guardian_id, name, description, cost
           FROM prize_items WHERE guardian_id = ?1 ORDER BY name",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![guardian_str], RawItem::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(to_core)?;

    raws.into_iter().map(RawItem::into_item).collect()
  }

  async fn delete_prize_item(
    &self,
    guardian_id: Uuid,
    item_id: Uuid,
  ) -> Result<()> {
    let guardian_str = encode_uuid(guardian_id);
    let id_str       = encode_uuid(item_id);

    // Owner-scoped; silently a no-op for someone else's (or a missing)
    // item. Past orders for the item are untouched.
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM prize_items WHERE item_id = ?1 AND guardian_id = ?2",
          rusqlite::params![id_str, guardian_str],
        )?;
        Ok(())
      })
      .await
      .map_err(to_core)
  }

  async fn purchase(&self, learner_id: Uuid, item_id: Uuid) -> Result<PrizeOrder> {
    let order_id   = Uuid::new_v4();
    let ordered_at = Utc::now();

    let learner_str = encode_uuid(learner_id);
    let item_str    = encode_uuid(item_id);
    let order_str   = encode_uuid(order_id);
    let at_str      = encode_dt(ordered_at);

    // Balance check and charge evaluate under one immediate transaction:
    // two racing purchases serialize, and the loser sees the updated
    // balance. On any failure nothing is observable.
    let cost: u32 = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let cost: Option<u32> = tx
          .query_row(
            "SELECT cost FROM prize_items WHERE item_id = ?1",
            rusqlite::params![item_str],
            |row| row.get(0),
          )
          .optional()?;
        let cost = match cost {
          Some(cost) => cost,
          None => return Err(domain(Error::ItemNotFound(item_id))),
        };

        let counters: Option<(u64, u64)> = tx
          .query_row(
            "SELECT earned, spent FROM ledgers WHERE learner_id = ?1",
            rusqlite::params![learner_str],
            |row| Ok((row.get(0)?, row.get(1)?)),
          )
          .optional()?;
        let (earned, spent) = match counters {
          Some(counters) => counters,
          None => return Err(domain(Error::LearnerNotFound(learner_id))),
        };

        let balance = earned as i64 - spent as i64;
        if balance < i64::from(cost) {
          return Err(domain(Error::InsufficientBalance {
            balance,
            cost: i64::from(cost),
          }));
        }

        charge(&tx, &learner_str, cost)?;
        tx.execute(
          "INSERT INTO prize_orders (order_id, learner_id, item_id, cost, ordered_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![order_str, learner_str, item_str, cost, at_str],
        )?;
        append_statement(
          &tx,
          &learner_str,
          Verb::Redeemed,
          ObjectType::Prize,
          &item_str,
          serde_json::json!({ "cost": cost }),
          &at_str,
        )?;

        tx.commit()?;
        Ok(cost)
      })
      .await
      .map_err(to_core)?;

    Ok(PrizeOrder { order_id, learner_id, item_id, cost, ordered_at })
  }

  async fn list_orders(&self, learner_id: Uuid) -> Result<Vec<PrizeOrder>> {
    let learner_str = encode_uuid(learner_id);

    let raws: Vec<RawOrder> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT order_id, learner_id, item_id, cost, ordered_at
           FROM prize_orders WHERE learner_id = ?1 ORDER BY ordered_at DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![learner_str], RawOrder::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(to_core)?;

    raws.into_iter().map(RawOrder::into_order).collect()
  }

  // ── Activity recorder ─────────────────────────────────────────────────────

  async fn list_statements(&self, actor_id: Uuid) -> Result<Vec<ActivityStatement>> {
    let actor_str = encode_uuid(actor_id);

    let raws: Vec<RawStatement> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT statement_id, actor_id, verb, object_type, object_id,
                  result_json, recorded_at
           FROM statements WHERE actor_id = ?1 ORDER BY recorded_at",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![actor_str], RawStatement::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(to_core)?;

    raws
      .into_iter()
      .map(RawStatement::into_statement)
      .collect()
  }
}
