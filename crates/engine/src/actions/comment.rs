//! Comment action: posts a summary comment in response to a verdict.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use warden_github::{EventContext, RepoClient};

use crate::config::Spec;
use crate::error::{EngineError, Result};
use crate::validators::{RuleOutcome, Status};

use super::Action;

pub struct Comment;

#[derive(Debug, Deserialize)]
struct CommentOptions {
    #[serde(default)]
    payload: Option<CommentPayload>,
}

#[derive(Debug, Deserialize)]
struct CommentPayload {
    body: String,
}

impl Comment {
    /// The configured body, or a summary of the non-passing validations.
    fn body(options: &CommentOptions, outcome: &RuleOutcome) -> String {
        if let Some(payload) = &options.payload {
            return payload.body.clone();
        }
        let mut lines = vec![format!("Policy checks returned `{}`:", outcome.verdict)];
        for result in &outcome.results {
            if result.status != Status::Pass {
                lines.push(format!("- **{}**: {}", result.name, result.message));
            }
        }
        lines.join("\n")
    }

    /// Items to comment on: the event subject, or for scheduled runs the
    /// flagged items carried in the validation details.
    fn targets(ctx: &EventContext, outcome: &RuleOutcome) -> Vec<u64> {
        if let Some(number) = ctx.subject_number() {
            return vec![number];
        }
        let mut numbers = Vec::new();
        for result in &outcome.results {
            let Some(details) = &result.details else { continue };
            for key in ["issues", "pulls"] {
                if let Some(items) = details.get(key).and_then(|v| v.as_array()) {
                    numbers.extend(
                        items
                            .iter()
                            .filter_map(|item| item.get("number").and_then(|n| n.as_u64())),
                    );
                }
            }
        }
        numbers
    }
}

#[async_trait]
impl Action for Comment {
    fn name(&self) -> &'static str {
        "comment"
    }

    fn supported_events(&self) -> &'static [&'static str] {
        &["pull_request.*", "issues.*", "schedule.repository"]
    }

    async fn after_validate(
        &self,
        ctx: &EventContext,
        client: &dyn RepoClient,
        spec: &Spec,
        outcome: &RuleOutcome,
    ) -> Result<()> {
        let options: CommentOptions = spec
            .parse_params()
            .map_err(|e| EngineError::Execution(format!("invalid 'comment' options: {e}")))?;
        let body = Self::body(&options, outcome);
        let targets = Self::targets(ctx, outcome);
        if targets.is_empty() {
            debug!("comment action has no target, skipping");
            return Ok(());
        }
        for number in targets {
            client.create_comment(number, &body).await?;
        }
        Ok(())
    }
}
