//! Core types and trait definitions for the kudos reward ledger.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod activity;
pub mod catalog;
pub mod enrollment;
pub mod error;
pub mod learner;
pub mod ledger;
pub mod prize;
pub mod quiz;
pub mod store;

pub use error::{Error, Result};
