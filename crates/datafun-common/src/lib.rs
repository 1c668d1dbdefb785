//! datafun-common — Shared types and errors used across all datafun crates.

pub mod error;
pub mod entities;

// Re-export commonly used types
pub use entities::{Record, Region};
pub use error::{DatafunError, Result};
