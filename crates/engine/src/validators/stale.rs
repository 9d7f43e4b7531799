//! Staleness detection for scheduled runs.
//!
//! Queries the remote repository for open items last updated before a
//! time-window cutoff, partitions them into issues vs pull requests, and
//! fails when anything needs flagging. The failing verdict is what drives
//! a configured reminder action.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::json;

use warden_github::{EventContext, RepoClient, SearchItem};

use crate::config::Spec;
use crate::error::Result;

use super::options::bad_options;
use super::{ValidationResult, Validator};

/// Max items retrieved per search call.
const MAX_ITEMS: u32 = 20;

const DEFAULT_DAYS: i64 = 20;

pub struct Stale;

#[derive(Debug, Deserialize)]
struct StaleOptions {
    #[serde(default = "default_days")]
    days: i64,
    #[serde(default, rename = "type")]
    types: Option<TypeFilter>,
}

fn default_days() -> i64 {
    DEFAULT_DAYS
}

/// `type:` accepts a single kind or a list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TypeFilter {
    One(String),
    Many(Vec<String>),
}

impl StaleOptions {
    /// Requested item types, narrowed to the two known kinds; anything
    /// unrecognized falls back to both.
    fn item_types(&self) -> Vec<String> {
        let all = || vec!["issues".to_string(), "pull_request".to_string()];
        match &self.types {
            None => all(),
            Some(TypeFilter::One(kind)) => vec![kind.clone()],
            Some(TypeFilter::Many(kinds)) => {
                let known: Vec<String> = kinds
                    .iter()
                    .filter(|kind| *kind == "issues" || *kind == "pull_request")
                    .cloned()
                    .collect();
                if known.is_empty() {
                    all()
                } else {
                    known
                }
            }
        }
    }
}

/// Cutoff instant: `now - days * 86 400` seconds.
fn cutoff(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    now - Duration::seconds(days * 86_400)
}

/// Search qualifier for open items idle since the cutoff. The type
/// qualifier is added only when exactly one kind is requested.
fn build_query(repo_slug: &str, cutoff: DateTime<Utc>, types: &[String]) -> String {
    let type_qualifier = if types.len() == 1 {
        format!(" type:{}", types[0])
    } else {
        String::new()
    };
    format!(
        "repo:{} is:open updated:<{}{}",
        repo_slug,
        cutoff.format("%Y-%m-%dT%H:%M:%S"),
        type_qualifier
    )
}

#[async_trait]
impl Validator for Stale {
    fn name(&self) -> &'static str {
        "stale"
    }

    fn supported_events(&self) -> &'static [&'static str] {
        &["schedule.repository"]
    }

    async fn validate(
        &self,
        ctx: &EventContext,
        client: &dyn RepoClient,
        spec: &Spec,
    ) -> Result<ValidationResult> {
        let options: StaleOptions = spec.parse_params().map_err(bad_options("stale"))?;
        let types = options.item_types();
        let cutoff = cutoff(Utc::now(), options.days);
        let query = build_query(&ctx.repo_slug(), cutoff, &types);

        let items = client
            .search_open_items(&query, "updated", "desc", MAX_ITEMS)
            .await?;
        let (pulls, issues): (Vec<SearchItem>, Vec<SearchItem>) =
            items.into_iter().partition(|item| item.is_pull_request());

        let stale_count = issues.len() + pulls.len();
        let details = json!({
            "days": options.days,
            "types": types,
            "issues": issues,
            "pulls": pulls,
        });
        let result = if stale_count == 0 {
            ValidationResult::pass(
                "stale",
                format!("no open items idle for more than {} days", options.days),
            )
        } else {
            ValidationResult::fail(
                "stale",
                format!(
                    "{stale_count} open items idle for more than {} days",
                    options.days
                ),
            )
        };
        Ok(result.with_details(details))
    }
}

#[cfg(test)]
mod tests {
    use super::super::Status;
    use super::*;
    use crate::testutil::MockClient;

    #[test]
    fn cutoff_is_exactly_days_times_86400_seconds() {
        let now: DateTime<Utc> = "2024-06-01T12:00:00Z".parse().unwrap();
        let cut = cutoff(now, 20);
        assert_eq!((now - cut).num_seconds(), 20 * 86_400);
    }

    #[test]
    fn single_type_narrows_the_query() {
        let now: DateTime<Utc> = "2024-06-01T12:00:00Z".parse().unwrap();
        let cut = cutoff(now, 20);
        let query = build_query("octo/repo", cut, &["pull_request".to_string()]);
        assert_eq!(
            query,
            "repo:octo/repo is:open updated:<2024-05-12T12:00:00 type:pull_request"
        );
    }

    #[test]
    fn both_types_omit_the_qualifier() {
        let now: DateTime<Utc> = "2024-06-01T12:00:00Z".parse().unwrap();
        let query = build_query(
            "octo/repo",
            cutoff(now, 1),
            &["issues".to_string(), "pull_request".to_string()],
        );
        assert!(!query.contains("type:"));
    }

    #[test]
    fn type_option_accepts_string_or_list() {
        let single: StaleOptions = serde_yaml::from_str("type: pull_request\n").unwrap();
        assert_eq!(single.item_types(), vec!["pull_request"]);

        let many: StaleOptions =
            serde_yaml::from_str("type:\n  - issues\n  - pull_request\n").unwrap();
        assert_eq!(many.item_types().len(), 2);

        let unknown: StaleOptions = serde_yaml::from_str("type:\n  - milestones\n").unwrap();
        assert_eq!(unknown.item_types().len(), 2);
    }

    fn schedule_ctx() -> EventContext {
        EventContext::new(
            "schedule",
            "repository",
            serde_json::json!({}),
            "octo",
            "repo",
        )
    }

    #[tokio::test]
    async fn idle_items_fail_and_are_partitioned() {
        let client = MockClient::new()
            .with_search_item(11, "old issue", false)
            .with_search_item(12, "old pr", true);
        let spec: Spec = serde_yaml::from_str("do: stale\ndays: 30\n").unwrap();
        let result = Stale.validate(&schedule_ctx(), &client, &spec).await.unwrap();

        assert_eq!(result.status, Status::Fail);
        let details = result.details.unwrap();
        assert_eq!(details["issues"][0]["number"], 11);
        assert_eq!(details["pulls"][0]["number"], 12);
        assert_eq!(details["days"], 30);
    }

    #[tokio::test]
    async fn nothing_idle_passes() {
        let client = MockClient::new();
        let spec: Spec = serde_yaml::from_str("do: stale\n").unwrap();
        let result = Stale.validate(&schedule_ctx(), &client, &spec).await.unwrap();
        assert_eq!(result.status, Status::Pass);
    }
}
