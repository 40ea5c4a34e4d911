use thiserror::Error;

use crate::selectors::Page;

/// Startup configuration problems. Always fatal, never retried.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("duplicate selector key '{key}' in {page} scope")]
    DuplicateSelector { page: Page, key: String },

    #[error("empty locator for key '{key}' in {page} scope")]
    EmptyLocator { page: Page, key: String },

    #[error("invalid run option: {0}")]
    InvalidOption(String),
}

/// Fixture loading and lookup failures. Fatal to the run (load) or to the
/// requesting scenario (lookup); never retried.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to parse {source_name}: {reason}")]
    Parse { source_name: String, reason: String },

    #[error("fixture schema violation in {source_name}: {detail}")]
    Schema { source_name: String, detail: String },

    #[error("no fixture registered for {what}")]
    NotFound { what: String },
}

impl FixtureError {
    pub fn parse(source_name: &str, reason: impl ToString) -> Self {
        FixtureError::Parse {
            source_name: source_name.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn schema(source_name: &str, detail: impl ToString) -> Self {
        FixtureError::Schema {
            source_name: source_name.to_string(),
            detail: detail.to_string(),
        }
    }

    pub fn not_found(what: impl ToString) -> Self {
        FixtureError::NotFound {
            what: what.to_string(),
        }
    }
}

/// Failures of the underlying browser capability. These are the
/// infrastructure class: the page never rendered what we asked about,
/// within budget, and a clean re-run may succeed.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("timed out after {timeout_ms}ms waiting on {locator}")]
    Timeout { locator: String, timeout_ms: u64 },

    #[error("browser backend error: {0}")]
    Backend(String),

    #[error("{0} is not supported by this driver")]
    Unsupported(&'static str),

    #[error("artifact io: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome classification for a single action invocation.
///
/// `Assertion` means the UI rendered something, just not what the scenario
/// expected; `Infrastructure` means the UI never got far enough to judge.
/// Callers decide which are fatal; the runner retries both classes once.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("{check}: expected {expected:?}, observed {observed:?}")]
    Assertion {
        check: String,
        expected: String,
        observed: String,
    },

    #[error("no selector registered for key '{key}' in {page} scope")]
    UnknownSelector { page: Page, key: String },

    #[error(transparent)]
    Infrastructure(#[from] DriverError),

    #[error(transparent)]
    Fixture(#[from] FixtureError),
}

impl ActionError {
    pub fn assertion(
        check: impl ToString,
        expected: impl ToString,
        observed: impl ToString,
    ) -> Self {
        ActionError::Assertion {
            check: check.to_string(),
            expected: expected.to_string(),
            observed: observed.to_string(),
        }
    }

    /// Whether a scenario failing with this error earns its single retry.
    /// Unknown selectors and missing fixtures are authoring mistakes that
    /// no re-run can fix.
    pub fn is_retryable(&self) -> bool {
        match self {
            ActionError::Assertion { .. } => true,
            ActionError::Infrastructure(DriverError::Unsupported(_)) => false,
            ActionError::Infrastructure(_) => true,
            ActionError::UnknownSelector { .. } => false,
            ActionError::Fixture(_) => false,
        }
    }

    /// Whether there is anything rendered worth capturing when a scenario
    /// dies with this error. Startup-class failures abort before the page
    /// shows anything useful.
    pub fn captures_artifacts(&self) -> bool {
        matches!(
            self,
            ActionError::Assertion { .. } | ActionError::Infrastructure(_)
        )
    }
}

/// Classified login outcome, distinguished by the rendered error banner.
#[derive(Debug, Error)]
pub enum LoginError {
    #[error("account is locked out: {message}")]
    Locked { message: String },

    #[error("credentials rejected: {message}")]
    InvalidCredentials { message: String },

    #[error("required field missing: {message}")]
    MissingField { message: String },

    #[error(transparent)]
    Action(#[from] ActionError),
}

/// Session lifecycle failures.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("selective reset requires an authenticated session")]
    ResetPrecondition,

    #[error(transparent)]
    Action(#[from] ActionError),

    #[error("login failed: {0}")]
    Login(#[from] LoginError),
}

impl SessionError {
    pub fn is_retryable(&self) -> bool {
        match self {
            // Framework misuse, not flakiness.
            SessionError::ResetPrecondition => false,
            SessionError::Action(e) => e.is_retryable(),
            // A classified login failure is the UI behaving observably
            // wrong for the scenario's expectation: assertion class.
            SessionError::Login(LoginError::Action(e)) => e.is_retryable(),
            SessionError::Login(_) => true,
        }
    }

    pub fn captures_artifacts(&self) -> bool {
        match self {
            SessionError::ResetPrecondition => false,
            SessionError::Action(e) => e.captures_artifacts(),
            SessionError::Login(LoginError::Action(e)) => e.captures_artifacts(),
            SessionError::Login(_) => true,
        }
    }
}
