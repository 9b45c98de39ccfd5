//! Tool framework for the research assistant
//!
//! Tools are the functions an external orchestrator (an LLM agent loop) can
//! call. Every tool answers with a JSON string, including on failure, where
//! the answer is the uniform `{"error": ...}` payload.

pub mod error;
pub mod registry;
pub mod tool;

pub use error::{Error, ErrorPayload, Result};
pub use registry::ToolRegistry;
pub use tool::Tool;
