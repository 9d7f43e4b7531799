//! Version 1 transform: legacy flat or nested option maps rewritten into
//! the canonical rule list.
//!
//! The flat shape (`mergeable:` carrying `title`, `label`, `approvals`,
//! `stale` options directly) gets built-in defaults for unset options and
//! produces one pull-request rule plus a scheduled stale rule. Explicit
//! `pull_requests` / `issues` nesting opts out of defaulting, and each
//! sub-scope produces its own rule set.

use serde_yaml::{Mapping, Value};

use crate::config::{defaults, ROOT_KEY};
use crate::error::{EngineError, Result};

pub(super) fn transform(doc: Value) -> Result<Value> {
    let Some(scope) = doc.get(ROOT_KEY) else {
        return Err(EngineError::InvalidConfig(
            "root 'mergeable' node is missing".to_string(),
        ));
    };
    let mut scope = match scope {
        Value::Mapping(mapping) => mapping.clone(),
        Value::Null => Mapping::new(),
        _ => {
            return Err(EngineError::InvalidConfig(
                "'mergeable' must be a mapping".to_string(),
            ))
        }
    };

    let nested = scope.contains_key("pull_requests") || scope.contains_key("issues");
    if !nested {
        for (key, value) in defaults::flat_defaults() {
            scope.entry(key).or_insert(value);
        }
    }

    let mut rules = Vec::new();
    if nested {
        if let Some(options) = scope.get("pull_requests").and_then(Value::as_mapping) {
            append_rules("pull_request.*", options, Some("pull_request"), &mut rules);
        }
        if let Some(options) = scope.get("issues").and_then(Value::as_mapping) {
            append_rules("issues.*", options, Some("issues"), &mut rules);
        }
    } else {
        append_rules("pull_request.*", &scope, None, &mut rules);
    }

    let mut root = Mapping::new();
    root.insert(Value::from(ROOT_KEY), Value::Sequence(rules));
    Ok(Value::Mapping(root))
}

fn append_rules(when: &str, options: &Mapping, item_type: Option<&str>, rules: &mut Vec<Value>) {
    let mut validate = Vec::new();
    if let Some(pattern) = options.get("title") {
        validate.push(must_exclude_spec("title", pattern.clone()));
    }
    if let Some(pattern) = options.get("label") {
        validate.push(must_exclude_spec("label", pattern.clone()));
    }
    if let Some(count) = options.get("approvals") {
        validate.push(min_count_spec("approvals", count.clone()));
    }
    if !validate.is_empty() {
        rules.push(rule(when, validate, vec![named_spec("comment")]));
    }

    // stale becomes its own scheduled rule; the reminder is posted when
    // the staleness check fails
    if let Some(option) = options.get("stale") {
        rules.push(stale_rule(option, item_type));
    }
}

fn stale_rule(option: &Value, item_type: Option<&str>) -> Value {
    let days = match option {
        Value::Number(_) => Some(option.clone()),
        _ => option.get("days").cloned(),
    };
    let message = option
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or(defaults::DEFAULT_STALE_MESSAGE);

    let mut stale = Mapping::new();
    stale.insert(Value::from("do"), Value::from("stale"));
    if let Some(days) = days {
        stale.insert(Value::from("days"), days);
    }
    if let Some(item_type) = item_type {
        stale.insert(Value::from("type"), Value::from(item_type));
    }

    let mut payload = Mapping::new();
    payload.insert(Value::from("body"), Value::from(message));
    let mut comment = Mapping::new();
    comment.insert(Value::from("do"), Value::from("comment"));
    comment.insert(Value::from("payload"), Value::Mapping(payload));

    rule(
        "schedule.repository",
        vec![Value::Mapping(stale)],
        vec![Value::Mapping(comment)],
    )
}

fn named_spec(name: &str) -> Value {
    let mut spec = Mapping::new();
    spec.insert(Value::from("do"), Value::from(name));
    Value::Mapping(spec)
}

fn must_exclude_spec(name: &str, pattern: Value) -> Value {
    let mut constraint = Mapping::new();
    constraint.insert(Value::from("regex"), pattern);
    let mut spec = Mapping::new();
    spec.insert(Value::from("do"), Value::from(name));
    spec.insert(Value::from("must_exclude"), Value::Mapping(constraint));
    Value::Mapping(spec)
}

fn min_count_spec(name: &str, count: Value) -> Value {
    let mut min = Mapping::new();
    min.insert(Value::from("count"), count);
    let mut spec = Mapping::new();
    spec.insert(Value::from("do"), Value::from(name));
    spec.insert(Value::from("min"), Value::Mapping(min));
    Value::Mapping(spec)
}

fn rule(when: &str, validate: Vec<Value>, fail: Vec<Value>) -> Value {
    let mut rule = Mapping::new();
    rule.insert(Value::from("when"), Value::from(when));
    rule.insert(Value::from("validate"), Value::Sequence(validate));
    rule.insert(Value::from("fail"), Value::Sequence(fail));
    Value::Mapping(rule)
}
