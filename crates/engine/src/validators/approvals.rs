//! Approvals validator: minimum approving reviews and required owners.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use warden_github::{EventContext, RepoClient};

use crate::config::Spec;
use crate::error::{EngineError, Result};
use crate::owners::OwnerFile;

use super::options::bad_options;
use super::{ValidationResult, Validator};

pub struct Approvals;

#[derive(Debug, Deserialize)]
struct ApprovalOptions {
    #[serde(default)]
    min: Option<MinOption>,
    #[serde(default)]
    required: Option<RequiredOption>,
}

#[derive(Debug, Deserialize)]
struct MinOption {
    count: usize,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RequiredOption {
    /// Require an approval from every owner resolved for the changed
    /// files.
    #[serde(default)]
    owners: bool,
}

#[async_trait]
impl Validator for Approvals {
    fn name(&self) -> &'static str {
        "approvals"
    }

    fn supported_events(&self) -> &'static [&'static str] {
        &["pull_request.*"]
    }

    async fn validate(
        &self,
        ctx: &EventContext,
        client: &dyn RepoClient,
        spec: &Spec,
    ) -> Result<ValidationResult> {
        let options: ApprovalOptions = spec.parse_params().map_err(bad_options("approvals"))?;
        let number = ctx.subject_number().ok_or_else(|| {
            EngineError::Execution("event carries no pull request subject".to_string())
        })?;

        let approvers: HashSet<String> = client
            .list_reviews(number)
            .await?
            .into_iter()
            .filter(|review| review.is_approval())
            .map(|review| review.user.login)
            .collect();

        if let Some(min) = &options.min {
            if approvers.len() < min.count {
                let message = min.message.clone().unwrap_or_else(|| {
                    format!("{} of {} required approvals", approvers.len(), min.count)
                });
                return Ok(ValidationResult::fail("approvals", message));
            }
        }

        if options.required.as_ref().is_some_and(|required| required.owners) {
            let owner_file = OwnerFile::fetch(client).await?;
            let paths: Vec<String> = client
                .list_changed_files(number)
                .await?
                .into_iter()
                .map(|file| file.filename)
                .collect();
            let mut missing: Vec<String> = owner_file
                .resolve_owners(&paths)
                .into_iter()
                .filter(|owner| !approvers.contains(owner))
                .collect();
            if !missing.is_empty() {
                missing.sort();
                return Ok(ValidationResult::fail(
                    "approvals",
                    format!("approval is still required from: {}", missing.join(", ")),
                )
                .with_details(json!({ "missing_owners": missing })));
            }
        }

        Ok(ValidationResult::pass("approvals", "Approvals are sufficient"))
    }
}
