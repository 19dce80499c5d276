//! markgrade-core — answer keys, identities, and grading.
//!
//! This crate defines the data model, the answer-key parser, the student
//! identity resolver, the grading comparison, and the collaborator traits
//! that the rest of markgrade builds on.

pub mod engine;
pub mod error;
pub mod grading;
pub mod identity;
pub mod model;
pub mod parser;
pub mod report;
pub mod statistics;
pub mod store;
pub mod traits;

pub use error::GradingError;
