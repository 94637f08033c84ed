//! JSON REST API for Kudos.
//!
//! Exposes an axum [`Router`] backed by any [`kudos_core::store::RewardStore`]
//! plus a [`Catalog`] for course and quiz content. Auth, TLS, and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", kudos_api::api_router(state))
//! ```

pub mod activity;
pub mod courses;
pub mod enrollments;
pub mod error;
pub mod learners;
pub mod prizes;
pub mod quizzes;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{delete, get, post},
};
use kudos_core::{catalog::Catalog, store::RewardStore};
use serde::Deserialize;

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:         String,
  pub port:         u16,
  pub store_path:   PathBuf,
  pub catalog_path: PathBuf,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S: RewardStore> {
  pub store:   Arc<S>,
  pub catalog: Arc<dyn Catalog>,
}

impl<S: RewardStore> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), catalog: self.catalog.clone() }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: RewardStore + 'static,
{
  Router::new()
    // Learners
    .route("/learners", post(learners::create::<S>))
    .route("/learners/{id}", get(learners::get_one::<S>))
    .route("/guardians/{id}/learners", get(learners::list::<S>))
    // Catalog
    .route("/courses", get(courses::list::<S>))
    .route("/courses/{id}", get(courses::get_one::<S>))
    // Enrollments
    .route(
      "/learners/{id}/enrollments",
      get(enrollments::list::<S>).post(enrollments::create::<S>),
    )
    .route(
      "/learners/{id}/enrollments/{course_id}",
      delete(enrollments::remove::<S>),
    )
    .route(
      "/learners/{id}/enrollments/{course_id}/complete",
      post(enrollments::complete::<S>),
    )
    // Quiz attempts
    .route("/learners/{id}/attempts", post(quizzes::submit::<S>))
    .route(
      "/learners/{id}/quizzes/{quiz_id}/attempts",
      get(quizzes::list_attempts::<S>),
    )
    // Ledger
    .route("/learners/{id}/ledger", get(learners::ledger::<S>))
    .route("/learners/{id}/balance", get(learners::balance::<S>))
    // Prize shop
    .route(
      "/guardians/{id}/prizes",
      get(prizes::list_items::<S>).post(prizes::create_item::<S>),
    )
    .route(
      "/guardians/{id}/prizes/{item_id}",
      delete(prizes::delete_item::<S>),
    )
    // Orders
    .route(
      "/learners/{id}/orders",
      get(prizes::list_orders::<S>).post(prizes::purchase::<S>),
    )
    // Activity log
    .route("/learners/{id}/activity", get(activity::list::<S>))
    .with_state(state)
}
