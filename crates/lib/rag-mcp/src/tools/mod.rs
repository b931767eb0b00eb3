//! MCP tool modules.
//!
//! The retrieval tool is the only one exposed; it forwards a question to the
//! configured query engine.

pub mod retrieval;
