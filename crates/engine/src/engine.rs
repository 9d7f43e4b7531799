//! Rule engine orchestrator: one pass over a single incoming event.

use futures::future::join_all;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use warden_github::{EventContext, RepoClient};

use crate::config::{ConfigMode, Configuration, Rule};
use crate::error::Result;
use crate::matcher;
use crate::registry::Registry;
use crate::validators::{aggregate, RuleOutcome, ValidationResult, Verdict};

/// Labels marking trusted automated changes; validators are skipped and
/// matching rules pass unconditionally.
const EXEMPT_LABELS: &[&str] = &["dependencies", "renovate"];

/// Process one incoming event against the repository's policy
/// configuration.
///
/// Steps: special-case normalization, configuration fetch, component
/// registration, pre-action fan-out, then per matching rule a concurrent
/// validator pass, verdict aggregation, and concurrent dispatch of the
/// selected action list. One future is collected per matching rule and
/// all are awaited before this call returns, so completion is a
/// determinate signal that every dispatched side effect has finished.
/// Rules are independent: a validator or action failure in one rule never
/// affects another.
///
/// Configuration and registration errors abort the event; everything past
/// registration is contained per rule.
pub async fn execute(
    ctx: EventContext,
    client: &dyn RepoClient,
    registry: &mut Registry,
    mode: ConfigMode,
) -> Result<Vec<RuleOutcome>> {
    let ctx = normalize_special_cases(ctx, client).await?;
    info!(event = %ctx.event_key(), repo = %ctx.repo_slug(), "processing event");

    let config = Configuration::fetch(client, &ctx, mode).await?;
    config.register(registry)?;
    let registry = &*registry;

    run_pre_actions(&ctx, client, registry).await;

    let skip_validation = has_exempt_label(&ctx, client).await?;
    if skip_validation {
        info!("exempt label present, skipping validators");
    }

    let evaluations = config
        .rules()
        .iter()
        .enumerate()
        .filter(|(_, rule)| matcher::matches(&rule.when, &ctx.event, &ctx.action))
        .map(|(index, rule)| evaluate_rule(index, rule, &ctx, client, registry, skip_validation));
    Ok(join_all(evaluations).await)
}

/// An `issues` milestoned/demilestoned event whose subject is actually a
/// pull request is promoted to a synthetic `pull_request` event carrying
/// the fetched pull-request payload, so rules written against
/// `pull_request.*` still fire.
async fn normalize_special_cases(
    mut ctx: EventContext,
    client: &dyn RepoClient,
) -> Result<EventContext> {
    let milestone_change =
        ctx.event == "issues" && matches!(ctx.action.as_str(), "milestoned" | "demilestoned");
    if !milestone_change {
        return Ok(ctx);
    }
    let is_pull_request = ctx.payload.pointer("/issue/pull_request").is_some();
    let number = ctx.payload.pointer("/issue/number").and_then(Value::as_u64);
    if let (true, Some(number)) = (is_pull_request, number) {
        let mut pull_request = client.get_pull_request(number).await?;
        if let Some(fields) = pull_request.as_object_mut() {
            fields.insert("action".to_string(), json!(ctx.action));
        }
        debug!(number, "issues event promoted to pull_request");
        ctx.event = "pull_request".to_string();
        if let Some(payload) = ctx.payload.as_object_mut() {
            payload.insert("pull_request".to_string(), pull_request);
        }
    }
    Ok(ctx)
}

/// Give every registered action supporting this event a chance to prepare
/// state before validators run. All hooks run concurrently and are fully
/// awaited.
async fn run_pre_actions(ctx: &EventContext, client: &dyn RepoClient, registry: &Registry) {
    let event_key = ctx.event_key();
    let actions = registry.registered_actions();
    let hooks = actions
        .iter()
        .filter(|action| action.is_event_supported(&event_key))
        .map(|action| async move {
            if let Err(e) = action.before_validate(ctx, client).await {
                warn!(action = action.name(), error = %e, "pre-action failed");
            }
        });
    join_all(hooks).await;
}

/// Cheap short-circuit for trusted automated changes: a pull request
/// carrying an exemption label skips the API-bound validators entirely.
async fn has_exempt_label(ctx: &EventContext, client: &dyn RepoClient) -> Result<bool> {
    if ctx.pull_request().is_none() {
        return Ok(false);
    }
    let Some(number) = ctx.subject_number() else {
        return Ok(false);
    };
    let labels = client.list_labels(number).await?;
    Ok(labels
        .iter()
        .any(|label| EXEMPT_LABELS.contains(&label.name.as_str())))
}

async fn evaluate_rule(
    index: usize,
    rule: &Rule,
    ctx: &EventContext,
    client: &dyn RepoClient,
    registry: &Registry,
    skip_validation: bool,
) -> RuleOutcome {
    let results = if skip_validation {
        Vec::new()
    } else {
        run_validators(rule, ctx, client, registry).await
    };
    let verdict = aggregate(&results);
    let outcome = RuleOutcome {
        rule_index: index,
        verdict,
        results,
    };
    dispatch_actions(rule, ctx, client, registry, &outcome).await;
    info!(rule = index, verdict = %outcome.verdict, "rule evaluated");
    outcome
}

/// Run a rule's validators concurrently. Validators that don't support
/// the event are skipped silently; a validator's runtime failure becomes
/// an error-status result rather than aborting the rule.
async fn run_validators(
    rule: &Rule,
    ctx: &EventContext,
    client: &dyn RepoClient,
    registry: &Registry,
) -> Vec<ValidationResult> {
    let event_key = ctx.event_key();
    let mut results = Vec::new();
    let mut pending = Vec::new();
    for spec in &rule.validate {
        let Some(validator) = registry.lookup_validator(&spec.name) else {
            results.push(ValidationResult::error(
                spec.name.clone(),
                "validator is not registered",
            ));
            continue;
        };
        if !validator.is_event_supported(&event_key) {
            debug!(validator = %spec.name, event = %event_key, "validator skipped");
            continue;
        }
        pending.push(async move {
            match validator.validate(ctx, client, spec).await {
                Ok(result) => result,
                Err(e) => {
                    warn!(validator = %spec.name, error = %e, "validator failed");
                    ValidationResult::error(spec.name.clone(), e.to_string())
                }
            }
        });
    }
    results.extend(join_all(pending).await);
    results
}

/// Dispatch the action list selected by the verdict, concurrently. Action
/// failures are contained and logged.
async fn dispatch_actions(
    rule: &Rule,
    ctx: &EventContext,
    client: &dyn RepoClient,
    registry: &Registry,
    outcome: &RuleOutcome,
) {
    let specs = match outcome.verdict {
        Verdict::Pass => &rule.pass,
        Verdict::Fail => &rule.fail,
        Verdict::Error => &rule.error,
    };
    let event_key = ctx.event_key();
    let dispatches = specs.iter().filter_map(|spec| {
        let action = match registry.lookup_action(&spec.name) {
            Some(action) => action,
            None => {
                warn!(action = %spec.name, "action is not registered, skipping");
                return None;
            }
        };
        if !action.is_event_supported(&event_key) {
            debug!(action = %spec.name, event = %event_key, "action skipped");
            return None;
        }
        Some(async move {
            if let Err(e) = action.after_validate(ctx, client, spec, outcome).await {
                warn!(action = %spec.name, error = %e, "action dispatch failed");
            }
        })
    });
    join_all(dispatches).await;
}
