//! Action capability trait and builtin factory table.

mod comment;
mod labels;

pub use comment::Comment;
pub use labels::Labels;

use std::sync::Arc;

use async_trait::async_trait;

use warden_github::{EventContext, RepoClient};

use crate::config::Spec;
use crate::error::Result;
use crate::matcher;
use crate::validators::RuleOutcome;

/// Action capability: performs a side effect in response to a rule
/// verdict.
#[async_trait]
pub trait Action: Send + Sync {
    /// Registry name of this action.
    fn name(&self) -> &'static str;

    /// Event keys this action knows how to handle (`*` verb allowed).
    fn supported_events(&self) -> &'static [&'static str];

    fn is_event_supported(&self, event_key: &str) -> bool {
        matcher::supports_event_key(self.supported_events(), event_key)
    }

    /// Pre-action hook: runs before any rule evaluation for every
    /// registered action supporting the event, giving the action a chance
    /// to prepare state.
    async fn before_validate(&self, ctx: &EventContext, client: &dyn RepoClient) -> Result<()> {
        let _ = (ctx, client);
        Ok(())
    }

    /// Verdict dispatch: runs when this action's list was selected by the
    /// rule's aggregated outcome.
    async fn after_validate(
        &self,
        ctx: &EventContext,
        client: &dyn RepoClient,
        spec: &Spec,
        outcome: &RuleOutcome,
    ) -> Result<()>;
}

/// Builtin action factory table.
pub(crate) fn build(name: &str) -> Option<Arc<dyn Action>> {
    match name {
        "comment" => Some(Arc::new(Comment)),
        "labels" => Some(Arc::new(Labels)),
        _ => None,
    }
}
