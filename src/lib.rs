//! Semantic LLM response cache
//!
//! Sits between a caller and a completion model and returns a previously
//! generated answer when a new prompt is semantically close to one already
//! seen under the same generation parameters:
//! - Fingerprints partition entries by model and generation parameters
//! - Prompts are compared by embedding similarity against a fixed threshold
//! - Entries live in an in-memory or Redis store
//! - An exact-match cache is kept as a baseline

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::{DomainError, GenerationResult, ModelParams};
pub use infrastructure::services::SemanticCacheEngine;
