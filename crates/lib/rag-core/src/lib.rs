//! Core services for rag-mcp.
//!
//! This crate loads project settings, talks to an OpenAI-compatible chat
//! endpoint, and answers questions with a map/reduce global search over
//! GraphRAG community reports.

pub mod config;
pub mod llm;
pub mod search;
pub mod services;
