//! Artifact models and table loading for rag-mcp.
//!
//! This crate defines the read-only GraphRAG index outputs (entities,
//! communities, community reports) and loads them from parquet files produced
//! by the indexing pipeline.

pub mod models;
pub mod schema;
pub mod tables;

pub use models::*;
pub use tables::{StoreError, StoreResult, load_artifacts, read_table};
