//! reqwest-backed [`RepoClient`] against the GitHub REST v3 API.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::client::RepoClient;
use crate::error::{GithubError, Result};
use crate::types::{ChangedFile, Label, Review, SearchItem};

const DEFAULT_BASE_URL: &str = "https://api.github.com";
/// Raw media type: file contents come back as plain text, not a base64
/// envelope.
const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw";
const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";

/// REST client bound to a single repository.
///
/// Holds one shared `reqwest::Client` for connection pooling. The base
/// URL is overridable for tests and GitHub Enterprise deployments.
#[derive(Debug, Clone)]
pub struct RestClient {
    base_url: String,
    owner: String,
    repo: String,
    client: reqwest::Client,
}

impl RestClient {
    /// Build a client authenticating with `token` against `owner/repo`.
    pub fn new(token: &str, owner: impl Into<String>, repo: impl Into<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| GithubError::Config(format!("invalid token: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(USER_AGENT, HeaderValue::from_static("warden"));

        let client = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            owner: owner.into(),
            repo: repo.into(),
            client,
        })
    }

    /// Point the client at a non-default API host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn repo_url(&self, tail: &str) -> String {
        format!("{}/repos/{}/{}/{}", self.base_url, self.owner, self.repo, tail)
    }

    /// Map non-2xx responses into [`GithubError`], distinguishing 404.
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(GithubError::NotFound);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GithubError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T> {
        debug!(%url, "GET");
        let response = self
            .client
            .get(url)
            .header(ACCEPT, JSON_MEDIA_TYPE)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResults {
    items: Vec<SearchItem>,
}

#[async_trait]
impl RepoClient for RestClient {
    async fn get_file_contents(&self, path: &str, git_ref: Option<&str>) -> Result<String> {
        let url = self.repo_url(&format!("contents/{path}"));
        debug!(%url, ?git_ref, "GET raw contents");
        let mut request = self.client.get(&url).header(ACCEPT, RAW_MEDIA_TYPE);
        if let Some(git_ref) = git_ref {
            request = request.query(&[("ref", git_ref)]);
        }
        let response = request.send().await?;
        Ok(Self::check(response).await?.text().await?)
    }

    async fn list_changed_files(&self, pr_number: u64) -> Result<Vec<ChangedFile>> {
        self.get_json(&self.repo_url(&format!("pulls/{pr_number}/files?per_page=100")))
            .await
    }

    async fn search_open_items(
        &self,
        query: &str,
        sort: &str,
        order: &str,
        per_page: u32,
    ) -> Result<Vec<SearchItem>> {
        let url = format!("{}/search/issues", self.base_url);
        debug!(%query, "GET search");
        let response = self
            .client
            .get(&url)
            .header(ACCEPT, JSON_MEDIA_TYPE)
            .query(&[
                ("q", query),
                ("sort", sort),
                ("order", order),
                ("per_page", &per_page.to_string()),
            ])
            .send()
            .await?;
        let results: SearchResults = Self::check(response).await?.json().await?;
        Ok(results.items)
    }

    async fn get_pull_request(&self, pr_number: u64) -> Result<Value> {
        self.get_json(&self.repo_url(&format!("pulls/{pr_number}"))).await
    }

    async fn list_labels(&self, issue_number: u64) -> Result<Vec<Label>> {
        self.get_json(&self.repo_url(&format!("issues/{issue_number}/labels?per_page=100")))
            .await
    }

    async fn list_reviews(&self, pr_number: u64) -> Result<Vec<Review>> {
        self.get_json(&self.repo_url(&format!("pulls/{pr_number}/reviews?per_page=100")))
            .await
    }

    async fn create_comment(&self, issue_number: u64, body: &str) -> Result<()> {
        let url = self.repo_url(&format!("issues/{issue_number}/comments"));
        debug!(%url, "POST comment");
        let response = self
            .client
            .post(&url)
            .header(ACCEPT, JSON_MEDIA_TYPE)
            .json(&json!({ "body": body }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn add_labels(&self, issue_number: u64, labels: &[String]) -> Result<()> {
        let url = self.repo_url(&format!("issues/{issue_number}/labels"));
        debug!(%url, ?labels, "POST labels");
        let response = self
            .client
            .post(&url)
            .header(ACCEPT, JSON_MEDIA_TYPE)
            .json(&json!({ "labels": labels }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}
