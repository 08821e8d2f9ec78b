//! Shared utilities for the stock intelligence dashboard
//!
//! This crate provides common functionality used across the workspace:
//! tracing setup and typed access to environment configuration.

pub mod config;
pub mod logging;

pub use config::{EnvError, env_opt, env_or, env_parse, load_dotenv};
pub use logging::{LogFormat, init_tracing, init_tracing_with};
