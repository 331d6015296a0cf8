//! Error types for prerender
//!
//! All modules use `PrerenderResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for prerender operations
pub type PrerenderResult<T> = Result<T, PrerenderError>;

/// Extension code GraphQL servers attach to authentication failures
pub const UNAUTHENTICATED_CODE: &str = "UNAUTHENTICATED";

/// All errors that can occur while prerendering
#[derive(Error, Debug)]
pub enum PrerenderError {
    // Handler errors
    #[error("GraphQL handler not available at {entrypoint}: {reason}")]
    HandlerMissing { entrypoint: String, reason: String },

    #[error("GraphQL handler {handler} failed: {reason}")]
    HandlerFailed { handler: String, reason: String },

    // Response classification errors
    #[error("Response to operation {operation} was not valid JSON: {reason}\n  query: {query}\n  variables: {variables}\n  response: {response}")]
    MalformedResponse {
        operation: String,
        query: String,
        variables: String,
        response: String,
        reason: String,
    },

    #[error("GraphQL error in operation {operation}: {message}")]
    GraphQLExecution {
        operation: String,
        message: String,
        code: Option<String>,
    },

    // Render loop errors
    #[error("Prerendering {path} did not settle after {passes} passes ({pending} queries still pending)")]
    PassLimitExceeded {
        path: String,
        passes: usize,
        pending: usize,
    },

    #[error("Render failed for {path}: {reason}")]
    Render { path: String, reason: String },

    // Routing errors
    #[error("Invalid route pattern {pattern}: {reason}")]
    RoutePattern { pattern: String, reason: String },

    #[error("Route {pattern} does not match path {path}")]
    RouteNotMatched { pattern: String, path: String },

    #[error("Invalid route manifest at {path}: {reason}")]
    ManifestInvalid { path: PathBuf, reason: String },

    // Template errors
    #[error("Document template not found in {0}")]
    TemplateNotFound(PathBuf),

    #[error("Template must contain the marker {marker} exactly once (found {found})")]
    TemplateMarker { marker: String, found: usize },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid path: {path}: {reason}")]
    PathInvalid { path: PathBuf, reason: String },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // Run summary
    #[error("Prerendering failed for {failed} of {total} paths")]
    PrerenderFailed { failed: usize, total: usize },

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl PrerenderError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a handler failure error
    pub fn handler_failed(handler: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::HandlerFailed {
            handler: handler.into(),
            reason: reason.into(),
        }
    }

    /// Create a handler missing error
    pub fn handler_missing(entrypoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::HandlerMissing {
            entrypoint: entrypoint.into(),
            reason: reason.into(),
        }
    }

    /// Whether the render loop absorbs this error into cache state
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::HandlerMissing { .. })
    }

    /// Whether this is a GraphQL authentication failure
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::GraphQLExecution { code: Some(code), .. } if code == UNAUTHENTICATED_CODE
        )
    }

    /// Operation name attached to GraphQL failures
    pub fn operation(&self) -> Option<&str> {
        match self {
            Self::MalformedResponse { operation, .. } | Self::GraphQLExecution { operation, .. } => {
                Some(operation)
            }
            _ => None,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::HandlerMissing { .. } => {
                Some("Set [api] handler in prerender.toml to a command, url or fixtures file")
            }
            Self::MalformedResponse { .. } => {
                Some("The API layer returned something other than JSON; check the handler output")
            }
            Self::GraphQLExecution { .. } if self.is_auth_failure() => Some(
                "This query requires authentication. Guard the route or exclude it from prerendering",
            ),
            Self::PassLimitExceeded { .. } => Some(
                "A component declares a new query key on every render; make query keys stable or raise render.max_passes",
            ),
            Self::TemplateMarker { .. } => {
                Some("Add the marker element exactly once inside the template body")
            }
            Self::TemplateNotFound(_) => Some("Build the web side first, or set build.dist_dir"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = PrerenderError::GraphQLExecution {
            operation: "GetPost".to_string(),
            message: "Cannot query field X".to_string(),
            code: None,
        };
        let text = err.to_string();
        assert!(text.contains("GetPost"));
        assert!(text.contains("Cannot query field X"));
    }

    #[test]
    fn only_handler_missing_is_recoverable() {
        assert!(PrerenderError::handler_missing("api", "not found").is_recoverable());
        assert!(!PrerenderError::handler_failed("api", "boom").is_recoverable());
        assert!(!PrerenderError::Internal("x".to_string()).is_recoverable());
    }

    #[test]
    fn auth_failure_detection() {
        let err = PrerenderError::GraphQLExecution {
            operation: "Me".to_string(),
            message: "Not logged in".to_string(),
            code: Some(UNAUTHENTICATED_CODE.to_string()),
        };
        assert!(err.is_auth_failure());
        assert!(err.hint().is_some());
        assert_eq!(err.operation(), Some("Me"));

        let other = PrerenderError::GraphQLExecution {
            operation: "Me".to_string(),
            message: "Forbidden".to_string(),
            code: Some("FORBIDDEN".to_string()),
        };
        assert!(!other.is_auth_failure());
        assert!(other.hint().is_none());
    }
}
