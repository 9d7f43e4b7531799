//! Title validator: regex constraints on the pull-request title.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use warden_github::{EventContext, RepoClient};

use crate::config::Spec;
use crate::error::{EngineError, Result};

use super::options::{bad_options, PatternOption};
use super::{ValidationResult, Validator};

pub struct Title;

#[derive(Debug, Deserialize)]
struct TitleOptions {
    #[serde(default)]
    must_include: Option<PatternOption>,
    #[serde(default)]
    must_exclude: Option<PatternOption>,
}

#[async_trait]
impl Validator for Title {
    fn name(&self) -> &'static str {
        "title"
    }

    fn supported_events(&self) -> &'static [&'static str] {
        &["pull_request.*"]
    }

    async fn validate(
        &self,
        ctx: &EventContext,
        _client: &dyn RepoClient,
        spec: &Spec,
    ) -> Result<ValidationResult> {
        let options: TitleOptions = spec.parse_params().map_err(bad_options("title"))?;
        let title = ctx
            .payload
            .pointer("/pull_request/title")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                EngineError::Execution("payload carries no pull_request.title".to_string())
            })?;

        if let Some(option) = &options.must_exclude {
            if option.compile("title")?.is_match(title) {
                let message = option.message.clone().unwrap_or_else(|| {
                    format!("Title matches the excluded pattern '{}'", option.regex)
                });
                return Ok(ValidationResult::fail("title", message));
            }
        }
        if let Some(option) = &options.must_include {
            if !option.compile("title")?.is_match(title) {
                let message = option
                    .message
                    .clone()
                    .unwrap_or_else(|| format!("Title must match '{}'", option.regex));
                return Ok(ValidationResult::fail("title", message));
            }
        }
        Ok(ValidationResult::pass("title", "Title is acceptable"))
    }
}

#[cfg(test)]
mod tests {
    use super::super::Status;
    use super::*;
    use crate::testutil::MockClient;
    use serde_json::json;

    fn pr_ctx(title: &str) -> EventContext {
        EventContext::new(
            "pull_request",
            "opened",
            json!({"pull_request": {"number": 1, "title": title}}),
            "octo",
            "repo",
        )
    }

    fn spec(yaml: &str) -> Spec {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[tokio::test]
    async fn excluded_pattern_fails_case_insensitively() {
        let client = MockClient::new();
        let spec = spec("do: title\nmust_exclude:\n  regex: wip|dnm\n");
        let result = Title
            .validate(&pr_ctx("WIP: new feature"), &client, &spec)
            .await
            .unwrap();
        assert_eq!(result.status, Status::Fail);
    }

    #[tokio::test]
    async fn clean_title_passes() {
        let client = MockClient::new();
        let spec = spec("do: title\nmust_exclude:\n  regex: wip\n");
        let result = Title
            .validate(&pr_ctx("Add feature"), &client, &spec)
            .await
            .unwrap();
        assert_eq!(result.status, Status::Pass);
    }

    #[tokio::test]
    async fn must_include_requires_a_match() {
        let client = MockClient::new();
        let spec = spec("do: title\nmust_include:\n  regex: '^(feat|fix):'\n  message: use conventional titles\n");
        let result = Title
            .validate(&pr_ctx("random title"), &client, &spec)
            .await
            .unwrap();
        assert_eq!(result.status, Status::Fail);
        assert_eq!(result.message, "use conventional titles");
    }

    #[tokio::test]
    async fn missing_title_is_an_execution_error() {
        let client = MockClient::new();
        let ctx = EventContext::new("pull_request", "opened", json!({}), "octo", "repo");
        let spec = spec("do: title\nmust_exclude:\n  regex: wip\n");
        assert!(Title.validate(&ctx, &client, &spec).await.is_err());
    }
}
