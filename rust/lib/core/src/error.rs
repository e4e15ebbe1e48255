use thiserror::Error;

// ── Error codes ─────────────────────────────────────────────────────
//
// Stable, machine-readable identifiers. Views match on these,
// never on the human-readable message string.

/// Stable error code constants.
pub mod error_code {
    pub const AUTH_EXPIRED: &str = "AUTH_EXPIRED";
    pub const FORBIDDEN: &str = "FORBIDDEN";
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    pub const EMPTY_RESULT: &str = "EMPTY_RESULT";
    pub const MUTATION_FAILED: &str = "MUTATION_FAILED";
    pub const REQUEST_FAILED: &str = "REQUEST_FAILED";
}

/// Where the view layer should send the user after an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect {
    /// Authentication entry point.
    Login,
    /// "You may not view this page."
    Forbidden,
}

impl Redirect {
    pub fn path(&self) -> &'static str {
        match self {
            Redirect::Login => "/",
            Redirect::Forbidden => "/forbidden",
        }
    }
}

/// How an error is presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// Leave the current page.
    Redirect(Redirect),
    /// Page-level error with a manual retry action.
    Blocking,
    /// Inline message next to the control that triggered it.
    Inline,
    /// Transient notification; the page stays interactive.
    Notification,
}

// ── CatalogError ────────────────────────────────────────────────────

/// Unified error type for every catalog operation.
///
/// Transport failures are converted into one of these variants at the
/// operation boundary. None of them is fatal: every variant maps to a
/// [`Surface`] that returns the UI to a stable, interactive state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Credential missing or rejected (HTTP 401).
    #[error("{0}")]
    AuthExpired(String),

    /// Authenticated, but no role grants access to the page.
    #[error("{0}")]
    Forbidden(String),

    /// Response shape mismatch, or a form that failed local checks.
    #[error("{0}")]
    Validation(String),

    /// Breadcrumb resolution found no leaf.
    #[error("{0}")]
    EmptyResult(String),

    /// Create / update / delete failed. State is left untouched.
    #[error("{0}")]
    Mutation(String),

    /// Network or server failure while loading a page.
    #[error("{0}")]
    Request(String),
}

impl CatalogError {
    /// Stable, machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            CatalogError::AuthExpired(_) => error_code::AUTH_EXPIRED,
            CatalogError::Forbidden(_) => error_code::FORBIDDEN,
            CatalogError::Validation(_) => error_code::VALIDATION_FAILED,
            CatalogError::EmptyResult(_) => error_code::EMPTY_RESULT,
            CatalogError::Mutation(_) => error_code::MUTATION_FAILED,
            CatalogError::Request(_) => error_code::REQUEST_FAILED,
        }
    }

    /// How the view should present this error.
    pub fn surface(&self) -> Surface {
        match self {
            CatalogError::AuthExpired(_) => Surface::Redirect(Redirect::Login),
            CatalogError::Forbidden(_) => Surface::Redirect(Redirect::Forbidden),
            CatalogError::Validation(_) => Surface::Blocking,
            CatalogError::Request(_) => Surface::Blocking,
            CatalogError::EmptyResult(_) => Surface::Inline,
            CatalogError::Mutation(_) => Surface::Notification,
        }
    }

    pub fn is_auth_expired(&self) -> bool {
        matches!(self, CatalogError::AuthExpired(_))
    }
}
