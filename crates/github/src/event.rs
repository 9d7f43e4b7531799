//! Incoming webhook event context.

use serde_json::Value;

/// One incoming repository event: the webhook event name, its action verb,
/// the raw payload, and the repository the delivery belongs to.
///
/// The payload stays untyped; validators and actions pull out the pieces
/// they understand.
#[derive(Debug, Clone)]
pub struct EventContext {
    pub event: String,
    pub action: String,
    pub payload: Value,
    pub owner: String,
    pub repo: String,
}

impl EventContext {
    pub fn new(
        event: impl Into<String>,
        action: impl Into<String>,
        payload: Value,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        Self {
            event: event.into(),
            action: action.into(),
            payload,
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// `"{event}.{action}"` key used for trigger matching and component
    /// event-support checks.
    pub fn event_key(&self) -> String {
        format!("{}.{}", self.event, self.action)
    }

    /// `owner/repo` slug, as used in search qualifiers.
    pub fn repo_slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// Number of the pull request or issue this event is about, if any.
    pub fn subject_number(&self) -> Option<u64> {
        for key in ["pull_request", "issue"] {
            if let Some(number) = self
                .payload
                .get(key)
                .and_then(|subject| subject.get("number"))
                .and_then(Value::as_u64)
            {
                return Some(number);
            }
        }
        None
    }

    /// Pull-request sub-payload, when present.
    pub fn pull_request(&self) -> Option<&Value> {
        self.payload.get("pull_request")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_key_joins_event_and_action() {
        let ctx = EventContext::new("pull_request", "opened", json!({}), "octo", "repo");
        assert_eq!(ctx.event_key(), "pull_request.opened");
        assert_eq!(ctx.repo_slug(), "octo/repo");
    }

    #[test]
    fn subject_number_prefers_pull_request() {
        let ctx = EventContext::new(
            "pull_request",
            "opened",
            json!({"pull_request": {"number": 7}, "issue": {"number": 9}}),
            "octo",
            "repo",
        );
        assert_eq!(ctx.subject_number(), Some(7));
    }

    #[test]
    fn subject_number_falls_back_to_issue() {
        let ctx = EventContext::new(
            "issues",
            "opened",
            json!({"issue": {"number": 9}}),
            "octo",
            "repo",
        );
        assert_eq!(ctx.subject_number(), Some(9));
    }

    #[test]
    fn subject_number_absent_for_schedule() {
        let ctx = EventContext::new("schedule", "repository", json!({}), "octo", "repo");
        assert_eq!(ctx.subject_number(), None);
    }
}
