//! Session module: logging into the site before anything is crawled
//!
//! The `Authenticator` owns the session state machine. The coordinator drives
//! it sequentially: submit the login form, evaluate the response, retry or give
//! up. Only an authenticated session yields the first content request.

mod authenticator;

pub use authenticator::Authenticator;

use crate::crawler::Request;
use crate::state::SessionPhase;
use thiserror::Error;

/// Login errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// The site rejected the login but attempts remain
    #[error("Login attempt {attempt} of {max} failed: {reason}")]
    Retryable {
        attempt: u32,
        max: u32,
        reason: String,
    },

    /// The attempt budget is spent; the crawl must stop
    #[error("Login failed after {attempts} attempts: {reason}")]
    Exhausted { attempts: u32, reason: String },

    /// A login step was requested in a phase that does not allow it
    #[error("Login step not allowed while {phase}")]
    InvalidPhase { phase: SessionPhase },
}

impl AuthError {
    /// Returns true if the crawl can continue after this error
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Retryable { .. })
    }
}

/// Result of evaluating one login exchange that did not end the session
#[derive(Debug)]
pub enum LoginOutcome {
    /// Logged in; the request fetches the authenticated home page
    Authenticated(Request),

    /// Login rejected; `request` resubmits the form
    Retry { request: Request, error: AuthError },
}
