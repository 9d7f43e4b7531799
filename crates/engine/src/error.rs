//! Engine error taxonomy.

use std::fmt;

use warden_github::GithubError;

/// Errors raised while loading configuration, resolving components, or
/// talking to the remote repository service.
///
/// Configuration and registration errors abort the whole event's
/// processing; a single validator's runtime failure is captured into an
/// error-status result instead and never reaches the caller directly.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Malformed configuration (missing root node, bad rule shape, …).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Explicit but unrecognized `version` discriminator.
    #[error("unknown configuration version: {0}")]
    UnknownVersion(String),

    /// YAML deserialization failure.
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A validator or action name failed to resolve to an instance.
    #[error("failed to resolve {kind} '{name}'")]
    Resolution { kind: ComponentKind, name: String },

    /// A validator or action blew up mid-run. For validators the
    /// orchestrator captures this into an error verdict for the owning
    /// rule.
    #[error("execution failed: {0}")]
    Execution(String),

    /// Remote repository service failure.
    #[error("remote service error: {0}")]
    Remote(#[from] GithubError),
}

/// Which registry a failed resolution came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Validator,
    Action,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentKind::Validator => write!(f, "validator"),
            ComponentKind::Action => write!(f, "action"),
        }
    }
}

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
