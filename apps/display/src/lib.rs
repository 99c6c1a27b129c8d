//! Kiosk-side runtime: receives results over the push channel, falls back
//! to polling while it is down, and sequences them onto the screen.

pub mod config;
pub mod error;
pub mod pull;
pub mod push;
pub mod render;
pub mod runner;

pub use config::DisplayConfig;
pub use error::{DisplayError, Result};
