//! Login state machine
//!
//! ```text
//!   NotAuthenticated --start--> Authenticating --success--> Authenticated
//!                                 |    ^
//!                        failure  |    | attempts < 5
//!                                 v    |
//!                               (retry)--attempts == 5--> Failed
//! ```

use crate::config::{Credentials, LoginConfig};
use crate::crawler::{Request, Response};
use crate::session::{AuthError, LoginOutcome};
use crate::state::{SessionPhase, SessionState, MAX_LOGIN_ATTEMPTS};
use crate::ConfigError;
use url::Url;

/// Drives the login exchange and owns the session state
pub struct Authenticator {
    credentials: Credentials,
    login: LoginConfig,
    home_url: Url,
    state: SessionState,
}

impl Authenticator {
    /// Creates an authenticator in the `NotAuthenticated` phase
    ///
    /// # Arguments
    ///
    /// * `credentials` - Login URL and account
    /// * `login` - Form field names and the success marker
    /// * `home_path` - Site-absolute path requested once logged in
    pub fn new(
        credentials: Credentials,
        login: LoginConfig,
        home_path: &str,
    ) -> Result<Self, ConfigError> {
        let home_url = credentials.site_url(home_path)?;

        Ok(Self {
            credentials,
            login,
            home_url,
            state: SessionState::new(),
        })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase()
    }

    pub fn home_url(&self) -> &Url {
        &self.home_url
    }

    /// Issues the first login submission
    ///
    /// Moves `NotAuthenticated -> Authenticating`. Calling it in any other
    /// phase is an `InvalidPhase` error, which in particular means a `Failed`
    /// session can never produce another request.
    pub fn start(&mut self) -> Result<Request, AuthError> {
        self.state
            .transition(SessionPhase::Authenticating)
            .map_err(|(phase, _)| AuthError::InvalidPhase { phase })?;

        tracing::info!("Logging in: {}", self.credentials.login_url());
        Ok(self.login_request())
    }

    /// Evaluates the response to a login submission
    ///
    /// Success requires a status below 400 and the success marker in the body.
    /// On success the returned request fetches the home page with duplicate
    /// detection bypassed, since the home page may already have been seen
    /// during the unauthenticated exchange.
    ///
    /// # Returns
    ///
    /// * `Ok(LoginOutcome::Authenticated)` - Logged in
    /// * `Ok(LoginOutcome::Retry)` - Rejected, attempts remain
    /// * `Err(AuthError::Exhausted)` - Rejected for the fifth time
    /// * `Err(AuthError::InvalidPhase)` - Not currently authenticating
    pub fn evaluate(&mut self, response: &Response) -> Result<LoginOutcome, AuthError> {
        self.ensure_authenticating()?;

        if self.is_login_success(response) {
            self.state
                .transition(SessionPhase::Authenticated)
                .map_err(|(phase, _)| AuthError::InvalidPhase { phase })?;

            tracing::info!("Login succeeded: {}", response.status);

            let home = Request::get(self.home_url.clone())
                .with_referrer(response.url.as_str())
                .following(true)
                .bypassing_dedup();
            return Ok(LoginOutcome::Authenticated(home));
        }

        let reason = if response.status >= 400 {
            format!("HTTP {}", response.status)
        } else {
            format!(
                "HTTP {} without success marker '{}'",
                response.status, self.login.success_marker
            )
        };

        self.fail_attempt(reason)
    }

    /// Counts a failed attempt that produced no evaluable response
    ///
    /// Used for transport errors; the attempt budget is shared with rejected
    /// logins.
    pub fn fail_attempt(&mut self, reason: impl Into<String>) -> Result<LoginOutcome, AuthError> {
        self.ensure_authenticating()?;

        let reason = reason.into();
        let attempt = self.state.record_failure();

        if attempt < MAX_LOGIN_ATTEMPTS {
            tracing::warn!(
                "Login failed: {} (attempt {} of {}), reattempting login",
                reason,
                attempt,
                MAX_LOGIN_ATTEMPTS
            );
            return Ok(LoginOutcome::Retry {
                request: self.login_request(),
                error: AuthError::Retryable {
                    attempt,
                    max: MAX_LOGIN_ATTEMPTS,
                    reason,
                },
            });
        }

        self.state
            .transition(SessionPhase::Failed)
            .map_err(|(phase, _)| AuthError::InvalidPhase { phase })?;

        tracing::error!("{} login attempts failed, giving up", attempt);
        Err(AuthError::Exhausted {
            attempts: attempt,
            reason,
        })
    }

    /// Whether a login response shows a logged-in session
    pub fn is_login_success(&self, response: &Response) -> bool {
        response.status < 400 && response.text().contains(&self.login.success_marker)
    }

    fn ensure_authenticating(&self) -> Result<(), AuthError> {
        match self.state.phase() {
            SessionPhase::Authenticating => Ok(()),
            phase => Err(AuthError::InvalidPhase { phase }),
        }
    }

    /// Builds the login form submission; identical for every attempt
    fn login_request(&self) -> Request {
        let mut fields = vec![
            (
                self.login.username_field.clone(),
                self.credentials.username().to_string(),
            ),
            (
                self.login.password_field.clone(),
                self.credentials.password().to_string(),
            ),
        ];
        fields.extend(
            self.login
                .extra_fields
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );

        Request::post_form(self.credentials.login_url().clone(), fields).bypassing_dedup()
    }
}
