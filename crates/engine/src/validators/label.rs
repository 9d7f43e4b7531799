//! Label validator: regex constraints on the subject's label set.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use warden_github::{EventContext, RepoClient};

use crate::config::Spec;
use crate::error::{EngineError, Result};

use super::options::{bad_options, PatternOption};
use super::{ValidationResult, Validator};

pub struct LabelCheck;

#[derive(Debug, Deserialize)]
struct LabelOptions {
    #[serde(default)]
    must_include: Option<PatternOption>,
    #[serde(default)]
    must_exclude: Option<PatternOption>,
}

#[async_trait]
impl Validator for LabelCheck {
    fn name(&self) -> &'static str {
        "label"
    }

    fn supported_events(&self) -> &'static [&'static str] {
        &["pull_request.*", "issues.*"]
    }

    async fn validate(
        &self,
        ctx: &EventContext,
        client: &dyn RepoClient,
        spec: &Spec,
    ) -> Result<ValidationResult> {
        let options: LabelOptions = spec.parse_params().map_err(bad_options("label"))?;
        let number = ctx.subject_number().ok_or_else(|| {
            EngineError::Execution("event carries no issue or pull request subject".to_string())
        })?;
        let labels: Vec<String> = client
            .list_labels(number)
            .await?
            .into_iter()
            .map(|label| label.name)
            .collect();

        if let Some(option) = &options.must_exclude {
            let pattern = option.compile("label")?;
            if let Some(matched) = labels.iter().find(|label| pattern.is_match(label)) {
                let message = option.message.clone().unwrap_or_else(|| {
                    format!("Label '{matched}' matches the excluded pattern '{}'", option.regex)
                });
                return Ok(ValidationResult::fail("label", message)
                    .with_details(json!({ "labels": labels })));
            }
        }
        if let Some(option) = &options.must_include {
            let pattern = option.compile("label")?;
            if !labels.iter().any(|label| pattern.is_match(label)) {
                let message = option.message.clone().unwrap_or_else(|| {
                    format!("No label matches the required pattern '{}'", option.regex)
                });
                return Ok(ValidationResult::fail("label", message)
                    .with_details(json!({ "labels": labels })));
            }
        }
        Ok(ValidationResult::pass("label", "Labels are acceptable")
            .with_details(json!({ "labels": labels })))
    }
}
