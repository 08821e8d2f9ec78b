//! Chat-completion abstraction for the stock intelligence dashboard
//!
//! This crate provides provider-agnostic types for asking a hosted language
//! model for a single completion. It includes:
//!
//! - Message types (system / user / assistant text)
//! - Completion request/response types with a builder
//! - The `LLMProvider` trait
//! - An OpenAI-compatible provider that also serves Groq and local servers

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;
pub mod providers;

// Re-export main types
pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{Message, Role};
pub use provider::LLMProvider;
