//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `SessionPhase` / `SessionState`: where the login exchange stands and how many
//!   attempts it has used
//! - `DownloadState`: what happened to an item handed to the storage stage

mod download_state;
mod session_state;

// Re-export main types
pub use download_state::DownloadState;
pub use session_state::{SessionPhase, SessionState, MAX_LOGIN_ATTEMPTS};
