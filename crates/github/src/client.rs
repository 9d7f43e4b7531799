//! `RepoClient`: the remote repository calls the engine depends on.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::types::{ChangedFile, Label, Review, SearchItem};

/// Async boundary to the remote repository service.
///
/// All calls may fail with [`crate::GithubError::NotFound`]; callers decide
/// per operation whether that means "use defaults/empty" or a real failure.
#[async_trait]
pub trait RepoClient: Send + Sync {
    /// Fetch a file's raw contents, optionally at a specific git ref.
    async fn get_file_contents(&self, path: &str, git_ref: Option<&str>) -> Result<String>;

    /// List the files touched by a pull request.
    async fn list_changed_files(&self, pr_number: u64) -> Result<Vec<ChangedFile>>;

    /// Search open issues/pull requests with a qualifier string, bounded
    /// to `per_page` results.
    async fn search_open_items(
        &self,
        query: &str,
        sort: &str,
        order: &str,
        per_page: u32,
    ) -> Result<Vec<SearchItem>>;

    /// Fetch a pull request's full payload.
    async fn get_pull_request(&self, pr_number: u64) -> Result<Value>;

    /// List the labels currently on an issue or pull request.
    async fn list_labels(&self, issue_number: u64) -> Result<Vec<Label>>;

    /// List the reviews on a pull request.
    async fn list_reviews(&self, pr_number: u64) -> Result<Vec<Review>>;

    /// Post a comment on an issue or pull request.
    async fn create_comment(&self, issue_number: u64, body: &str) -> Result<()>;

    /// Add labels to an issue or pull request.
    async fn add_labels(&self, issue_number: u64, labels: &[String]) -> Result<()>;
}
