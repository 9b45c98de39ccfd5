//! Shared utilities for the research assistant workspace
//!
//! Logging setup and small helpers for reading configuration from the
//! process environment.

pub mod config;
pub mod logging;

pub use config::{env_opt, env_or, load_dotenv};
pub use logging::init_tracing;
