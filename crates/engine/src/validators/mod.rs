//! Validator capability trait, result types, and verdict aggregation.

mod approvals;
mod description;
mod label;
mod options;
mod stale;
mod title;

pub use approvals::Approvals;
pub use description::Description;
pub use label::LabelCheck;
pub use stale::Stale;
pub use title::Title;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use warden_github::{EventContext, RepoClient};

use crate::config::Spec;
use crate::error::Result;
use crate::matcher;

// ── Result types ────────────────────────────────────────────────────

/// Outcome status of one validator run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pass,
    Fail,
    Error,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Pass => write!(f, "pass"),
            Status::Fail => write!(f, "fail"),
            Status::Error => write!(f, "error"),
        }
    }
}

/// Result of one validator run against one event.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    pub status: Status,
    pub name: String,
    pub message: String,
    /// Validator-specific supporting data (e.g. the stale item partition).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ValidationResult {
    pub fn pass(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_status(Status::Pass, name, message)
    }

    pub fn fail(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_status(Status::Fail, name, message)
    }

    pub fn error(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_status(Status::Error, name, message)
    }

    fn with_status(status: Status, name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            name: name.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Aggregated verdict of one rule's validator runs. Selects which action
/// list is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
    Error,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => write!(f, "pass"),
            Verdict::Fail => write!(f, "fail"),
            Verdict::Error => write!(f, "error"),
        }
    }
}

/// Reduce individual results into one rule verdict: any error wins, then
/// any failure; no results at all is a vacuous pass.
pub fn aggregate(results: &[ValidationResult]) -> Verdict {
    let mut verdict = Verdict::Pass;
    for result in results {
        match result.status {
            Status::Error => return Verdict::Error,
            Status::Fail => verdict = Verdict::Fail,
            Status::Pass => {}
        }
    }
    verdict
}

/// Aggregate outcome of one rule's evaluation, handed to the dispatched
/// actions.
#[derive(Debug, Clone)]
pub struct RuleOutcome {
    pub rule_index: usize,
    pub verdict: Verdict,
    pub results: Vec<ValidationResult>,
}

// ── Capability trait ────────────────────────────────────────────────

/// Validator capability: inspects event/repository state and returns a
/// pass/fail/error result.
#[async_trait]
pub trait Validator: Send + Sync {
    /// Registry name of this validator.
    fn name(&self) -> &'static str;

    /// Event keys this validator knows how to handle (`*` verb allowed).
    fn supported_events(&self) -> &'static [&'static str];

    /// Whether this validator handles the given `event.action` key.
    fn is_event_supported(&self, event_key: &str) -> bool {
        matcher::supports_event_key(self.supported_events(), event_key)
    }

    async fn validate(
        &self,
        ctx: &EventContext,
        client: &dyn RepoClient,
        spec: &Spec,
    ) -> Result<ValidationResult>;
}

/// Builtin validator factory table.
pub(crate) fn build(name: &str) -> Option<Arc<dyn Validator>> {
    match name {
        "approvals" => Some(Arc::new(Approvals)),
        "description" => Some(Arc::new(Description)),
        "label" => Some(Arc::new(LabelCheck)),
        "stale" => Some(Arc::new(Stale)),
        "title" => Some(Arc::new(Title)),
        _ => None,
    }
}
