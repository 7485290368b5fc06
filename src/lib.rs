//! AI enrichment and semantic search over an organization catalog.
//!
//! The pipeline enriches each record with a structured Hebrew analysis and
//! an embedding vector, degrading per record instead of aborting; search
//! ranks the enriched catalog by cosine similarity.

pub mod config;
pub mod dataset;
pub mod error;
pub mod services;

pub use error::{AppError, AppResult};
