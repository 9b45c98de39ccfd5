//! LLM provider abstraction for the research assistant
//!
//! This crate provides provider-agnostic types for talking to a Large
//! Language Model:
//!
//! - Message types for LLM communication
//! - Completion request/response types
//! - Provider trait for LLM implementations
//! - A retry policy for transient provider failures
//! - Concrete provider implementations (behind feature flags)

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;
pub mod retry;

// Re-export main types
pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{ContentBlock, Message, MessageContent, Role};
pub use provider::LLMProvider;
pub use retry::RetryPolicy;

// Provider implementations (feature-gated)
#[cfg(feature = "anthropic")]
pub mod providers;
