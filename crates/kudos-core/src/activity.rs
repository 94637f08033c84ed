//! Activity statements — the xAPI-style audit trail.
//!
//! A statement is an immutable record of a learning event (completion,
//! attempt, redemption). Statements are appended inside the same transaction
//! as the operation that produced them and are never updated or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// What the actor did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
  Completed,
  Attempted,
  Redeemed,
}

/// What the verb acted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
  Course,
  Quiz,
  Prize,
}

impl Verb {
  /// The string stored in the `verb` column.
  /// Must match the `rename_all = "lowercase"` serde tags above.
  pub fn discriminant(&self) -> &'static str {
    match self {
      Self::Completed => "completed",
      Self::Attempted => "attempted",
      Self::Redeemed => "redeemed",
    }
  }

  pub fn from_discriminant(s: &str) -> Result<Self> {
    match s {
      "completed" => Ok(Self::Completed),
      "attempted" => Ok(Self::Attempted),
      "redeemed" => Ok(Self::Redeemed),
      other => Err(Error::InvalidInput(format!("unknown verb: {other:?}"))),
    }
  }
}

impl ObjectType {
  /// The string stored in the `object_type` column.
  pub fn discriminant(&self) -> &'static str {
    match self {
      Self::Course => "course",
      Self::Quiz => "quiz",
      Self::Prize => "prize",
    }
  }

  pub fn from_discriminant(s: &str) -> Result<Self> {
    match s {
      "course" => Ok(Self::Course),
      "quiz" => Ok(Self::Quiz),
      "prize" => Ok(Self::Prize),
      other => {
        Err(Error::InvalidInput(format!("unknown object type: {other:?}")))
      }
    }
  }
}

/// An immutable audit record: actor, verb, object, result payload.
///
/// The `result` payload shape depends on the verb:
/// `completed` carries `{"success":true}`, `attempted` carries
/// `{"score","max","passed"}`, `redeemed` carries `{"cost"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityStatement {
  pub statement_id: Uuid,
  pub actor_id:     Uuid,
  pub verb:         Verb,
  pub object_type:  ObjectType,
  pub object_id:    Uuid,
  pub result:       serde_json::Value,
  pub recorded_at:  DateTime<Utc>,
}
