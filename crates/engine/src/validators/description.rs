//! Description validator: `no_empty` constraint on the subject body.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use warden_github::{EventContext, RepoClient};

use crate::config::Spec;
use crate::error::{EngineError, Result};

use super::options::bad_options;
use super::{ValidationResult, Validator};

pub struct Description;

#[derive(Debug, Deserialize)]
struct DescriptionOptions {
    #[serde(default)]
    no_empty: Option<NoEmptyOption>,
}

#[derive(Debug, Deserialize)]
struct NoEmptyOption {
    #[serde(default)]
    enabled: Option<bool>,
    #[serde(default)]
    message: Option<String>,
}

#[async_trait]
impl Validator for Description {
    fn name(&self) -> &'static str {
        "description"
    }

    fn supported_events(&self) -> &'static [&'static str] {
        &["pull_request.*", "issues.*"]
    }

    async fn validate(
        &self,
        ctx: &EventContext,
        _client: &dyn RepoClient,
        spec: &Spec,
    ) -> Result<ValidationResult> {
        let options: DescriptionOptions =
            spec.parse_params().map_err(bad_options("description"))?;
        let Some(no_empty) = options.no_empty else {
            return Err(EngineError::Execution(
                "'no_empty' option missing for 'description'".to_string(),
            ));
        };
        if no_empty.enabled != Some(true) {
            return Err(EngineError::Execution(
                "'enabled' is not provided for the 'no_empty' option".to_string(),
            ));
        }

        let body = ["/pull_request/body", "/issue/body"]
            .iter()
            .find_map(|pointer| ctx.payload.pointer(pointer))
            .and_then(Value::as_str)
            .unwrap_or_default();

        if body.trim().is_empty() {
            let message = no_empty
                .message
                .unwrap_or_else(|| "The description can't be empty".to_string());
            return Ok(ValidationResult::fail("description", message));
        }
        Ok(ValidationResult::pass("description", "The description is not empty"))
    }
}

#[cfg(test)]
mod tests {
    use super::super::Status;
    use super::*;
    use crate::testutil::MockClient;
    use serde_json::json;

    fn ctx(body: Value) -> EventContext {
        EventContext::new(
            "pull_request",
            "opened",
            json!({"pull_request": {"number": 1, "body": body}}),
            "octo",
            "repo",
        )
    }

    #[tokio::test]
    async fn empty_body_fails() {
        let spec: Spec = serde_yaml::from_str("do: description\nno_empty:\n  enabled: true\n").unwrap();
        let result = Description
            .validate(&ctx(json!("   ")), &MockClient::new(), &spec)
            .await
            .unwrap();
        assert_eq!(result.status, Status::Fail);
    }

    #[tokio::test]
    async fn null_body_counts_as_empty() {
        let spec: Spec = serde_yaml::from_str("do: description\nno_empty:\n  enabled: true\n").unwrap();
        let result = Description
            .validate(&ctx(json!(null)), &MockClient::new(), &spec)
            .await
            .unwrap();
        assert_eq!(result.status, Status::Fail);
    }

    #[tokio::test]
    async fn present_body_passes() {
        let spec: Spec = serde_yaml::from_str("do: description\nno_empty:\n  enabled: true\n").unwrap();
        let result = Description
            .validate(&ctx(json!("a real description")), &MockClient::new(), &spec)
            .await
            .unwrap();
        assert_eq!(result.status, Status::Pass);
    }

    #[tokio::test]
    async fn missing_enabled_flag_is_an_execution_error() {
        let spec: Spec = serde_yaml::from_str("do: description\nno_empty: {}\n").unwrap();
        let result = Description
            .validate(&ctx(json!("body")), &MockClient::new(), &spec)
            .await;
        assert!(result.is_err());
    }
}
