//! Test support: a configurable in-memory `RepoClient`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};

use warden_github::{
    ChangedFile, GithubError, Label, RepoClient, Review, Reviewer, SearchItem,
};

/// In-memory `RepoClient` with canned responses and call recording.
#[derive(Default)]
pub(crate) struct MockClient {
    files: HashMap<(String, Option<String>), String>,
    changed_files: Vec<ChangedFile>,
    labels: Vec<Label>,
    reviews: Vec<Review>,
    search_items: Vec<SearchItem>,
    pull_request: Value,
    comments: Mutex<Vec<(u64, String)>>,
    added_labels: Mutex<Vec<(u64, Vec<String>)>>,
    pub file_fetches: AtomicUsize,
    pub pull_request_fetches: AtomicUsize,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, git_ref: Option<&str>, contents: &str) -> Self {
        self.files.insert(
            (path.to_string(), git_ref.map(String::from)),
            contents.to_string(),
        );
        self
    }

    pub fn with_changed_file(mut self, filename: &str, status: &str) -> Self {
        self.changed_files.push(ChangedFile {
            filename: filename.to_string(),
            status: status.to_string(),
        });
        self
    }

    pub fn with_labels(mut self, names: &[&str]) -> Self {
        self.labels = names
            .iter()
            .map(|name| Label {
                name: name.to_string(),
            })
            .collect();
        self
    }

    pub fn with_approvals(mut self, logins: &[&str]) -> Self {
        self.reviews = logins
            .iter()
            .map(|login| Review {
                user: Reviewer {
                    login: login.to_string(),
                },
                state: "APPROVED".to_string(),
            })
            .collect();
        self
    }

    pub fn with_search_item(mut self, number: u64, title: &str, is_pull_request: bool) -> Self {
        self.search_items.push(SearchItem {
            number,
            title: title.to_string(),
            updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            pull_request: is_pull_request.then(|| json!({"url": "https://example.invalid"})),
        });
        self
    }

    pub fn with_pull_request(mut self, payload: Value) -> Self {
        self.pull_request = payload;
        self
    }

    pub fn comments(&self) -> Vec<(u64, String)> {
        self.comments.lock().unwrap().clone()
    }

    pub fn added_labels(&self) -> Vec<(u64, Vec<String>)> {
        self.added_labels.lock().unwrap().clone()
    }
}

#[async_trait]
impl RepoClient for MockClient {
    async fn get_file_contents(
        &self,
        path: &str,
        git_ref: Option<&str>,
    ) -> Result<String, GithubError> {
        self.file_fetches.fetch_add(1, Ordering::SeqCst);
        let key = (path.to_string(), git_ref.map(String::from));
        self.files.get(&key).cloned().ok_or(GithubError::NotFound)
    }

    async fn list_changed_files(&self, _pr_number: u64) -> Result<Vec<ChangedFile>, GithubError> {
        Ok(self.changed_files.clone())
    }

    async fn search_open_items(
        &self,
        _query: &str,
        _sort: &str,
        _order: &str,
        per_page: u32,
    ) -> Result<Vec<SearchItem>, GithubError> {
        Ok(self
            .search_items
            .iter()
            .take(per_page as usize)
            .cloned()
            .collect())
    }

    async fn get_pull_request(&self, _pr_number: u64) -> Result<Value, GithubError> {
        self.pull_request_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.pull_request.clone())
    }

    async fn list_labels(&self, _issue_number: u64) -> Result<Vec<Label>, GithubError> {
        Ok(self.labels.clone())
    }

    async fn list_reviews(&self, _pr_number: u64) -> Result<Vec<Review>, GithubError> {
        Ok(self.reviews.clone())
    }

    async fn create_comment(&self, issue_number: u64, body: &str) -> Result<(), GithubError> {
        self.comments
            .lock()
            .unwrap()
            .push((issue_number, body.to_string()));
        Ok(())
    }

    async fn add_labels(&self, issue_number: u64, labels: &[String]) -> Result<(), GithubError> {
        self.added_labels
            .lock()
            .unwrap()
            .push((issue_number, labels.to_vec()));
        Ok(())
    }
}
