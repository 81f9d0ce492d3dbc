//! Session state definitions for the login exchange

use std::fmt;

/// Number of failed login evaluations after which the run is abandoned
pub const MAX_LOGIN_ATTEMPTS: u32 = 5;

/// Represents where the login exchange stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    /// No login submission has been issued yet
    NotAuthenticated,

    /// A login submission is in flight or being retried
    Authenticating,

    /// The site accepted the credentials; content may be crawled
    Authenticated,

    /// The attempt budget is spent; nothing else may be requested
    Failed,
}

impl SessionPhase {
    /// Returns true if no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Authenticated | Self::Failed)
    }

    /// Checks whether moving to `next` is a legal transition
    ///
    /// # Valid Transitions
    ///
    /// - NotAuthenticated -> Authenticating
    /// - Authenticating -> Authenticating (retry)
    /// - Authenticating -> Authenticated
    /// - Authenticating -> Failed
    pub fn can_transition_to(&self, next: SessionPhase) -> bool {
        matches!(
            (self, next),
            (Self::NotAuthenticated, Self::Authenticating)
                | (Self::Authenticating, Self::Authenticating)
                | (Self::Authenticating, Self::Authenticated)
                | (Self::Authenticating, Self::Failed)
        )
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotAuthenticated => "not authenticated",
            Self::Authenticating => "authenticating",
            Self::Authenticated => "authenticated",
            Self::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Phase plus the number of failed login evaluations so far
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    phase: SessionPhase,
    attempt_count: u32,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::NotAuthenticated,
            attempt_count: 0,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    pub fn max_attempts(&self) -> u32 {
        MAX_LOGIN_ATTEMPTS
    }

    pub fn is_authenticated(&self) -> bool {
        self.phase == SessionPhase::Authenticated
    }

    /// Attempts left before the session gives up
    pub fn remaining_attempts(&self) -> u32 {
        MAX_LOGIN_ATTEMPTS.saturating_sub(self.attempt_count)
    }

    /// Moves to `next`, returning the rejected pair if the transition is illegal
    pub(crate) fn transition(
        &mut self,
        next: SessionPhase,
    ) -> Result<(), (SessionPhase, SessionPhase)> {
        if self.phase.can_transition_to(next) {
            self.phase = next;
            Ok(())
        } else {
            Err((self.phase, next))
        }
    }

    /// Counts one failed evaluation and returns the new total
    pub(crate) fn record_failure(&mut self) -> u32 {
        self.attempt_count += 1;
        self.attempt_count
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
