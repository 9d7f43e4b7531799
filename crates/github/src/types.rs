//! Typed models for the REST surface the engine consumes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A file touched by a pull request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChangedFile {
    pub filename: String,
    /// `added`, `modified`, `removed`, `renamed`.
    pub status: String,
}

/// An open issue or pull request returned by the search API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchItem {
    pub number: u64,
    pub title: String,
    pub updated_at: DateTime<Utc>,
    /// Present (with link sub-fields) when the item is a pull request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<serde_json::Value>,
}

impl SearchItem {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

/// An issue or pull request label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Label {
    pub name: String,
}

/// A pull request review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub user: Reviewer,
    /// `APPROVED`, `CHANGES_REQUESTED`, `COMMENTED`, `DISMISSED`.
    pub state: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reviewer {
    pub login: String,
}

impl Review {
    pub fn is_approval(&self) -> bool {
        self.state.eq_ignore_ascii_case("approved")
    }
}
