//! Concrete LLM provider implementations
//!
//! Groq, OpenAI and most local inference servers share the OpenAI chat
//! completion wire format, so one client covers all of them.

pub mod openai;

pub use openai::{GROQ_API_BASE, OpenAIConfig, OpenAIProvider};
