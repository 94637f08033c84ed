//! Course and quiz catalog — the content this core consumes but never owns.
//!
//! Courses, quizzes, and question banks are immutable from the engine's
//! perspective. The engine depends on the [`Catalog`] trait only, so content
//! can move to durable storage later without touching the core contract.
//! [`StaticCatalog`] is the shipped implementation: a versionable JSON file
//! loaded at startup.

use std::{collections::HashMap, path::Path};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Content types ───────────────────────────────────────────────────────────

/// A course; completing it awards `tokens_awarded` once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
  pub course_id:      Uuid,
  pub title:          String,
  pub description:    String,
  pub tokens_awarded: u32,
}

/// A quiz attached to a course. Attemptable only after the course is
/// completed, at most once per `cooldown_days`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
  pub quiz_id:        Uuid,
  pub course_id:      Uuid,
  pub title:          String,
  pub max_score:      u32,
  /// Bonus granted for a perfect score, on top of the course reward.
  pub tokens_perfect: u32,
  /// Minimum interval between attempts, as whole days.
  pub cooldown_days:  u32,
}

/// A multiple-choice question. `answer` is the 0-based index into `options`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
  pub prompt:  String,
  pub options: Vec<String>,
  pub answer:  usize,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Read-only content lookups the engine depends on.
///
/// Object-safe so the API layer can hold an `Arc<dyn Catalog>`.
pub trait Catalog: Send + Sync {
  fn course(&self, course_id: Uuid) -> Option<Course>;
  fn courses(&self) -> Vec<Course>;
  fn quiz(&self, quiz_id: Uuid) -> Option<Quiz>;
  /// The quiz attached to a course, if any. A course has at most one quiz.
  fn quiz_for_course(&self, course_id: Uuid) -> Option<Quiz>;
  /// The ordered question bank for a quiz.
  fn questions(&self, quiz_id: Uuid) -> Option<Vec<Question>>;
}

// ─── Static implementation ───────────────────────────────────────────────────

/// On-file quiz entry: the quiz definition with its question bank inline.
#[derive(Debug, Clone, Deserialize)]
struct QuizEntry {
  #[serde(flatten)]
  quiz:      Quiz,
  #[serde(default)]
  questions: Vec<Question>,
}

/// On-file catalog document.
#[derive(Debug, Clone, Deserialize)]
struct CatalogFile {
  #[serde(default)]
  courses: Vec<Course>,
  #[serde(default)]
  quizzes: Vec<QuizEntry>,
}

/// An in-memory catalog deserialized from a JSON document.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
  courses:   HashMap<Uuid, Course>,
  quizzes:   HashMap<Uuid, Quiz>,
  by_course: HashMap<Uuid, Uuid>,
  questions: HashMap<Uuid, Vec<Question>>,
}

impl StaticCatalog {
  /// Parse a catalog from a JSON document and validate its cross-references.
  pub fn from_json(json: &str) -> Result<Self> {
    let file: CatalogFile = serde_json::from_str(json)?;

    let mut catalog = StaticCatalog::default();
    for course in file.courses {
      catalog.courses.insert(course.course_id, course);
    }

    for entry in file.quizzes {
      let quiz = entry.quiz;
      if !catalog.courses.contains_key(&quiz.course_id) {
        return Err(Error::InvalidInput(format!(
          "quiz {} references unknown course {}",
          quiz.quiz_id, quiz.course_id
        )));
      }
      for (idx, q) in entry.questions.iter().enumerate() {
        if q.answer >= q.options.len() {
          return Err(Error::InvalidInput(format!(
            "quiz {} question {idx}: answer index {} out of range",
            quiz.quiz_id, q.answer
          )));
        }
      }
      catalog.by_course.insert(quiz.course_id, quiz.quiz_id);
      catalog.questions.insert(quiz.quiz_id, entry.questions);
      catalog.quizzes.insert(quiz.quiz_id, quiz);
    }

    Ok(catalog)
  }

  /// Load a catalog from a JSON file on disk.
  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let json = std::fs::read_to_string(path)
      .map_err(|e| Error::Storage(format!("cannot read catalog file: {e}")))?;
    Self::from_json(&json)
  }
}

impl Catalog for StaticCatalog {
  fn course(&self, course_id: Uuid) -> Option<Course> {
    self.courses.get(&course_id).cloned()
  }

  fn courses(&self) -> Vec<Course> {
    let mut all: Vec<_> = self.courses.values().cloned().collect();
    all.sort_by(|a, b| a.title.cmp(&b.title));
    all
  }

  fn quiz(&self, quiz_id: Uuid) -> Option<Quiz> {
    self.quizzes.get(&quiz_id).cloned()
  }

  fn quiz_for_course(&self, course_id: Uuid) -> Option<Quiz> {
    let quiz_id = self.by_course.get(&course_id)?;
    self.quizzes.get(quiz_id).cloned()
  }

  fn questions(&self, quiz_id: Uuid) -> Option<Vec<Question>> {
    self.questions.get(&quiz_id).cloned()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const SAMPLE: &str = r#"{
    "courses": [
      {
        "course_id": "00000000-0000-0000-0000-000000000001",
        "title": "Basic Algebra",
        "description": "Variables and simple equations.",
        "tokens_awarded": 10
      }
    ],
    "quizzes": [
      {
        "quiz_id": "00000000-0000-0000-0000-00000000000a",
        "course_id": "00000000-0000-0000-0000-000000000001",
        "title": "Algebra Quiz",
        "max_score": 10,
        "tokens_perfect": 5,
        "cooldown_days": 1,
        "questions": [
          { "prompt": "What is 2 + 2?", "options": ["3", "4", "5"], "answer": 1 },
          { "prompt": "Solve x - 3 = 2", "options": ["1", "5", "-1"], "answer": 1 }
        ]
      }
    ]
  }"#;

  #[test]
  fn parses_and_indexes_content() {
    let catalog = StaticCatalog::from_json(SAMPLE).unwrap();
    let course_id: Uuid =
      "00000000-0000-0000-0000-000000000001".parse().unwrap();
    let quiz_id: Uuid = "00000000-0000-0000-0000-00000000000a".parse().unwrap();

    assert_eq!(catalog.course(course_id).unwrap().tokens_awarded, 10);
    assert_eq!(catalog.quiz(quiz_id).unwrap().cooldown_days, 1);
    assert_eq!(catalog.quiz_for_course(course_id).unwrap().quiz_id, quiz_id);
    assert_eq!(catalog.questions(quiz_id).unwrap().len(), 2);
  }

  #[test]
  fn quiz_referencing_unknown_course_is_rejected() {
    let json = SAMPLE.replace(
      "\"course_id\": \"00000000-0000-0000-0000-000000000001\",\n        \"title\": \"Algebra Quiz\"",
      "\"course_id\": \"00000000-0000-0000-0000-0000000000ff\",\n        \"title\": \"Algebra Quiz\"",
    );
    assert!(matches!(
      StaticCatalog::from_json(&json),
      Err(Error::InvalidInput(_))
    ));
  }

  #[test]
  fn out_of_range_answer_index_is_rejected() {
    let json = SAMPLE.replace("\"answer\": 1 }\n        ]", "\"answer\": 3 }\n        ]");
    assert!(matches!(
      StaticCatalog::from_json(&json),
      Err(Error::InvalidInput(_))
    ));
  }
}
