//! Option shapes shared by the pattern-based validators.

use regex::{Regex, RegexBuilder};
use serde::Deserialize;

use crate::error::{EngineError, Result};

/// A user-authored pattern constraint (`must_include` / `must_exclude`).
#[derive(Debug, Clone, Deserialize)]
pub(super) struct PatternOption {
    pub regex: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl PatternOption {
    /// Compile the pattern case-insensitively, the way user-authored WIP
    /// patterns expect to be read.
    pub fn compile(&self, validator: &str) -> Result<Regex> {
        RegexBuilder::new(&self.regex)
            .case_insensitive(true)
            .build()
            .map_err(|e| {
                EngineError::Execution(format!(
                    "invalid '{validator}' regex '{}': {e}",
                    self.regex
                ))
            })
    }
}

/// Wrap an options-deserialization failure for `validator`.
pub(super) fn bad_options(validator: &'static str) -> impl FnOnce(serde_yaml::Error) -> EngineError {
    move |e| EngineError::Execution(format!("invalid '{validator}' options: {e}"))
}
