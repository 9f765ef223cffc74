//! Browser automation module
//!
//! Handles launching and controlling individual Chrome/Chromium instances,
//! one isolated session per scenario or stress worker.

mod errors;
mod session;

pub use errors::BrowserError;
pub use session::{with_session, BrowserSession, BrowserSessionConfig};
