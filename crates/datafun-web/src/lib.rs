//! datafun-web — Web dashboard for datafun
//! Serves the five dashboard pages:
//!   - Data overview with headline metrics
//!   - Sales analysis with region and date filters
//!   - Number guessing game
//!   - CSV upload with summary statistics
//!   - Contact form

pub mod config;
pub mod error;
pub mod handlers;
pub mod render;
pub mod router;
pub mod session;
pub mod state;
