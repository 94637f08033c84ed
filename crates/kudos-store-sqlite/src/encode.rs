//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings, UUIDs as hyphenated
//! lowercase strings, statement payloads as compact JSON. Decode failures
//! mean the database itself is damaged, so they surface as
//! [`Error::Storage`].

use chrono::{DateTime, Utc};
use kudos_core::{
  Error, Result,
  activity::{ActivityStatement, ObjectType, Verb},
  enrollment::Enrollment,
  learner::Learner,
  prize::{PrizeItem, PrizeOrder},
  quiz::QuizAttempt,
};
use uuid::Uuid;

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> {
  Uuid::parse_str(s).map_err(|e| Error::Storage(format!("bad uuid {s:?}: {e}")))
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Storage(format!("bad timestamp {s:?}: {e}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `learners` row.
pub struct RawLearner {
  pub learner_id:  String,
  pub guardian_id: String,
  pub name:        Option<String>,
  pub created_at:  String,
}

impl RawLearner {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      learner_id:  row.get(0)?,
      guardian_id: row.get(1)?,
      name:        row.get(2)?,
      created_at:  row.get(3)?,
    })
  }

  pub fn into_learner(self) -> Result<Learner> {
    Ok(Learner {
      learner_id:  decode_uuid(&self.learner_id)?,
      guardian_id: decode_uuid(&self.guardian_id)?,
      name:        self.name,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from an `enrollments` row.
pub struct RawEnrollment {
  pub learner_id:   String,
  pub course_id:    String,
  pub enrolled_at:  String,
  pub completed:    bool,
  pub completed_at: Option<String>,
}

impl RawEnrollment {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      learner_id:   row.get(0)?,
      course_id:    row.get(1)?,
      enrolled_at:  row.get(2)?,
      completed:    row.get(3)?,
      completed_at: row.get(4)?,
    })
  }

  pub fn into_enrollment(self) -> Result<Enrollment> {
    Ok(Enrollment {
      learner_id:   decode_uuid(&self.learner_id)?,
      course_id:    decode_uuid(&self.course_id)?,
      enrolled_at:  decode_dt(&self.enrolled_at)?,
      completed:    self.completed,
      completed_at: self
        .completed_at
        .as_deref()
        .map(decode_dt)
        .transpose()?,
    })
  }
}

/// Raw strings read directly from a `quiz_attempts` row.
pub struct RawAttempt {
  pub attempt_id:   String,
  pub learner_id:   String,
  pub quiz_id:      String,
  pub attempted_at: String,
  pub score:        u32,
  pub passed:       bool,
}

impl RawAttempt {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      attempt_id:   row.get(0)?,
      learner_id:   row.get(1)?,
      quiz_id:      row.get(2)?,
      attempted_at: row.get(3)?,
      score:        row.get(4)?,
      passed:       row.get(5)?,
    })
  }

  pub fn into_attempt(self) -> Result<QuizAttempt> {
    Ok(QuizAttempt {
      attempt_id:   decode_uuid(&self.attempt_id)?,
      learner_id:   decode_uuid(&self.learner_id)?,
      quiz_id:      decode_uuid(&self.quiz_id)?,
      attempted_at: decode_dt(&self.attempted_at)?,
      score:        self.score,
      passed:       self.passed,
    })
  }
}

/// Raw strings read directly from a `prize_items` row.
pub struct RawItem {
  pub item_id:     String,
  pub guardian_id: String,
  pub name:        String,
  pub description: String,
  pub cost:        u32,
}

impl RawItem {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      item_id:     row.get(0)?,
      guardian_id: row.get(1)?,
      name:        row.get(2)?,
      description: row.get(3)?,
      cost:        row.get(4)?,
    })
  }

  pub fn into_item(self) -> Result<PrizeItem> {
    Ok(PrizeItem {
      item_id:     decode_uuid(&self.item_id)?,
      guardian_id: decode_uuid(&self.guardian_id)?,
      name:        self.name,
      description: self.description,
      cost:        self.cost,
    })
  }
}

/// Raw strings read directly from a `prize_orders` row.
pub struct RawOrder {
  pub order_id:   String,
  pub learner_id: String,
  pub item_id:    String,
  pub cost:       u32,
  pub ordered_at: String,
}

impl RawOrder {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      order_id:   row.get(0)?,
      learner_id: row.get(1)?,
      item_id:    row.get(2)?,
      cost:       row.get(3)?,
      ordered_at: row.get(4)?,
    })
  }

  pub fn into_order(self) -> Result<PrizeOrder> {
    Ok(PrizeOrder {
      order_id:   decode_uuid(&self.order_id)?,
      learner_id: decode_uuid(&self.learner_id)?,
      item_id:    decode_uuid(&self.item_id)?,
      cost:       self.cost,
      ordered_at: decode_dt(&self.ordered_at)?,
    })
  }
}

/// Raw strings read directly from a `statements` row.
pub struct RawStatement {
  pub statement_id: String,
  pub actor_id:     String,
  pub verb:         String,
  pub object_type:  String,
  pub object_id:    String,
  pub result_json:  String,
  pub recorded_at:  String,
}

impl RawStatement {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      statement_id: row.get(0)?,
      actor_id:     row.get(1)?,
      verb:         row.get(2)?,
      object_type:  row.get(3)?,
      object_id:    row.get(4)?,
      result_json:  row.get(5)?,
      recorded_at:  row.get(6)?,
    })
  }

  pub fn into_statement(self) -> Result<ActivityStatement> {
    Ok(ActivityStatement {
      statement_id: decode_uuid(&self.statement_id)?,
      actor_id:     decode_uuid(&self.actor_id)?,
      verb:         Verb::from_discriminant(&self.verb)
        .map_err(|e| Error::Storage(e.to_string()))?,
      object_type:  ObjectType::from_discriminant(&self.object_type)
        .map_err(|e| Error::Storage(e.to_string()))?,
      object_id:    decode_uuid(&self.object_id)?,
      result:       serde_json::from_str(&self.result_json)
        .map_err(|e| Error::Storage(format!("bad statement payload: {e}")))?,
      recorded_at:  decode_dt(&self.recorded_at)?,
    })
  }
}
