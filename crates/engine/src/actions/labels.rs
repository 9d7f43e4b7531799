//! Labels action: applies configured labels to the event subject.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use warden_github::{EventContext, RepoClient};

use crate::config::Spec;
use crate::error::{EngineError, Result};
use crate::validators::RuleOutcome;

use super::Action;

pub struct Labels;

#[derive(Debug, Deserialize)]
struct LabelsOptions {
    #[serde(default)]
    add: Vec<String>,
}

#[async_trait]
impl Action for Labels {
    fn name(&self) -> &'static str {
        "labels"
    }

    fn supported_events(&self) -> &'static [&'static str] {
        &["pull_request.*", "issues.*"]
    }

    async fn after_validate(
        &self,
        ctx: &EventContext,
        client: &dyn RepoClient,
        spec: &Spec,
        _outcome: &RuleOutcome,
    ) -> Result<()> {
        let options: LabelsOptions = spec
            .parse_params()
            .map_err(|e| EngineError::Execution(format!("invalid 'labels' options: {e}")))?;
        if options.add.is_empty() {
            debug!("labels action has nothing to add, skipping");
            return Ok(());
        }
        let Some(number) = ctx.subject_number() else {
            debug!("labels action has no target, skipping");
            return Ok(());
        };
        client.add_labels(number, &options.add).await?;
        Ok(())
    }
}
