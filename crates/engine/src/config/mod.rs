//! Versioned policy configuration model.
//!
//! The raw document is deserialized, a version discriminator is detected,
//! and a version-indexed transform rewrites the document into the
//! canonical `mergeable:` rule list. Construction enforces the rule
//! invariant: a non-empty `validate` list and at least one of
//! `pass`/`fail`/`error`.

mod defaults;
mod transform;

pub use defaults::{DEFAULT_LABEL_PATTERN, DEFAULT_STALE_MESSAGE, DEFAULT_TITLE_PATTERN};

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use tracing::debug;

use warden_github::{EventContext, RepoClient};

use crate::error::{EngineError, Result};
use crate::registry::Registry;

/// Repository path of the policy document.
pub const CONFIG_PATH: &str = ".github/mergeable.yml";

/// Top-level namespace key of the canonical configuration shape.
pub const ROOT_KEY: &str = "mergeable";

/// How to interpret the raw configuration document.
///
/// Replaces the ambient environment flag historically consulted for this
/// decision: callers state explicitly whether the repository still uses
/// the legacy flat shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigMode {
    /// Legacy flat option map (implicit version 0).
    Legacy,
    /// Versioned document; a missing `version` key means version 1.
    #[default]
    Versioned,
}

/// A named validator or action reference plus its component-specific
/// parameters. The parameters are opaque to the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Spec {
    #[serde(rename = "do")]
    pub name: String,
    #[serde(flatten)]
    pub params: Mapping,
}

impl Spec {
    /// Reference a component by name, with no parameters.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Mapping::new(),
        }
    }

    /// Deserialize the parameters into a typed options struct.
    pub fn parse_params<T: serde::de::DeserializeOwned>(
        &self,
    ) -> std::result::Result<T, serde_yaml::Error> {
        serde_yaml::from_value(Value::Mapping(self.params.clone()))
    }
}

/// One policy rule: a trigger pattern, the validators to run, and the
/// action lists keyed by the aggregated verdict.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rule {
    pub when: String,
    pub validate: Vec<Spec>,
    #[serde(default)]
    pub pass: Vec<Spec>,
    #[serde(default)]
    pub fail: Vec<Spec>,
    #[serde(default)]
    pub error: Vec<Spec>,
}

/// Ordered rule list, the canonical internal configuration shape.
///
/// Order is significant only for deterministic iteration, not priority;
/// all matching rules run. Constructed once per processed event and
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    rules: Vec<Rule>,
}

impl Configuration {
    /// Parse and normalize a raw configuration document.
    pub fn parse(raw: &str, mode: ConfigMode) -> Result<Self> {
        let doc: Value = serde_yaml::from_str(raw)?;
        let version = detect_version(&doc, mode)?;
        let canonical = transform::apply(version, doc)?;
        let rules = canonical.get(ROOT_KEY).cloned().ok_or_else(|| {
            EngineError::InvalidConfig("root 'mergeable' node is missing".to_string())
        })?;
        let rules: Vec<Rule> = serde_yaml::from_value(rules)?;
        for (index, rule) in rules.iter().enumerate() {
            check_rule(index, rule)?;
        }
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// The zero-document fallback: one rule covering every pull-request
    /// sub-event, enforcing the built-in WIP title/label patterns.
    pub fn builtin_default() -> Self {
        let rule = Rule {
            when: "pull_request.*".to_string(),
            validate: vec![
                must_exclude("title", DEFAULT_TITLE_PATTERN),
                must_exclude("label", DEFAULT_LABEL_PATTERN),
            ],
            pass: Vec::new(),
            fail: vec![Spec::named("comment")],
            error: Vec::new(),
        };
        Self { rules: vec![rule] }
    }

    /// Fetch the policy document and build the configuration.
    ///
    /// For pull-request events that modify the policy document itself, the
    /// version at the pull request's head ref is read instead of the
    /// default branch, so a PR can test its own proposed configuration
    /// changes. A missing document yields [`Configuration::builtin_default`].
    pub async fn fetch(
        client: &dyn RepoClient,
        ctx: &EventContext,
        mode: ConfigMode,
    ) -> Result<Self> {
        match fetch_document(client, ctx).await {
            Ok(raw) => Self::parse(&raw, mode),
            Err(e) if e.is_not_found() => {
                debug!(path = CONFIG_PATH, "no configuration file, using built-in default");
                Ok(Self::builtin_default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Resolve every referenced validator/action name through the
    /// registry, instantiating on demand. Fails fast per list; an
    /// unresolvable name aborts the event's processing.
    ///
    /// The `error` lists are covered as well: evaluation never mutates the
    /// registry, so everything dispatch can touch must resolve here.
    pub fn register(&self, registry: &mut Registry) -> Result<()> {
        for rule in &self.rules {
            for spec in &rule.validate {
                registry.validator(&spec.name)?;
            }
            for spec in rule.pass.iter().chain(&rule.fail).chain(&rule.error) {
                registry.action(&spec.name)?;
            }
        }
        Ok(())
    }
}

fn must_exclude(name: &str, pattern: &str) -> Spec {
    let mut constraint = Mapping::new();
    constraint.insert(Value::from("regex"), Value::from(pattern));
    let mut params = Mapping::new();
    params.insert(Value::from("must_exclude"), Value::Mapping(constraint));
    Spec {
        name: name.to_string(),
        params,
    }
}

fn detect_version(doc: &Value, mode: ConfigMode) -> Result<u64> {
    match mode {
        ConfigMode::Legacy => Ok(0),
        ConfigMode::Versioned => match doc.get("version") {
            None => Ok(1),
            Some(value) => value.as_u64().ok_or_else(|| {
                EngineError::UnknownVersion(
                    serde_yaml::to_string(value)
                        .unwrap_or_default()
                        .trim()
                        .to_string(),
                )
            }),
        },
    }
}

fn check_rule(index: usize, rule: &Rule) -> Result<()> {
    if rule.validate.is_empty() {
        return Err(EngineError::InvalidConfig(format!(
            "rule {index} ('{}') has an empty 'validate' list",
            rule.when
        )));
    }
    if rule.pass.is_empty() && rule.fail.is_empty() && rule.error.is_empty() {
        return Err(EngineError::InvalidConfig(format!(
            "rule {index} ('{}') declares no 'pass', 'fail', or 'error' actions",
            rule.when
        )));
    }
    Ok(())
}

async fn fetch_document(
    client: &dyn RepoClient,
    ctx: &EventContext,
) -> warden_github::Result<String> {
    if ctx.event == "pull_request" {
        if let Some(number) = ctx.subject_number() {
            let files = client.list_changed_files(number).await?;
            let modifies_config = files
                .iter()
                .any(|f| f.status == "modified" && f.filename == CONFIG_PATH);
            let head_ref = ctx
                .payload
                .pointer("/pull_request/head/ref")
                .and_then(serde_json::Value::as_str);
            if modifies_config {
                if let Some(head_ref) = head_ref {
                    debug!(
                        head = head_ref,
                        "configuration modified by this pull request, reading head version"
                    );
                    return client.get_file_contents(CONFIG_PATH, Some(head_ref)).await;
                }
            }
        }
    }
    client.get_file_contents(CONFIG_PATH, None).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title_regex(rule: &Rule) -> Option<String> {
        rule.validate.iter().find(|s| s.name == "title").map(|s| {
            s.params
                .get("must_exclude")
                .and_then(|m| m.get("regex"))
                .and_then(Value::as_str)
                .unwrap()
                .to_string()
        })
    }

    #[test]
    fn flat_shape_injects_every_default() {
        let config = Configuration::parse("mergeable:\n", ConfigMode::Versioned).unwrap();
        let rules = config.rules();

        assert_eq!(rules.len(), 2);
        assert_eq!(title_regex(&rules[0]).unwrap(), DEFAULT_TITLE_PATTERN);
        assert!(rules[0].validate.iter().any(|s| s.name == "label"));

        let stale = &rules[1];
        assert_eq!(stale.when, "schedule.repository");
        let body = stale.fail[0]
            .params
            .get("payload")
            .and_then(|p| p.get("body"))
            .and_then(Value::as_str)
            .unwrap();
        assert_eq!(body, DEFAULT_STALE_MESSAGE);
    }

    #[test]
    fn explicit_values_are_never_overwritten() {
        let config =
            Configuration::parse("mergeable:\n  title: 'custom'\n", ConfigMode::Versioned)
                .unwrap();
        assert_eq!(title_regex(&config.rules()[0]).unwrap(), "custom");
        // label still defaulted alongside
        assert!(config.rules()[0].validate.iter().any(|s| s.name == "label"));
    }

    #[test]
    fn nested_sub_scope_opts_out_of_defaults() {
        let config = Configuration::parse(
            "mergeable:\n  pull_requests:\n    title: 'wip'\n",
            ConfigMode::Versioned,
        )
        .unwrap();
        let rules = config.rules();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].validate.len(), 1);
        assert_eq!(title_regex(&rules[0]).unwrap(), "wip");
    }

    #[test]
    fn legacy_mode_takes_the_version_zero_path() {
        let config = Configuration::parse("mergeable:\n", ConfigMode::Legacy).unwrap();
        assert_eq!(config.rules().len(), 2);
    }

    #[test]
    fn missing_root_node_fails() {
        let err = Configuration::parse("something_else: {}", ConfigMode::Versioned).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
    }

    #[test]
    fn unrecognized_version_fails() {
        let raw = "version: 99\nmergeable: []\n";
        let err = Configuration::parse(raw, ConfigMode::Versioned).unwrap_err();
        assert!(matches!(err, EngineError::UnknownVersion(_)));
    }

    #[test]
    fn non_numeric_version_fails() {
        let raw = "version: two\nmergeable: []\n";
        let err = Configuration::parse(raw, ConfigMode::Versioned).unwrap_err();
        assert!(matches!(err, EngineError::UnknownVersion(_)));
    }

    #[test]
    fn version_two_rules_pass_through() {
        let raw = r#"
version: 2
mergeable:
  - when: pull_request.opened
    validate:
      - do: title
        must_exclude:
          regex: wip
    fail:
      - do: comment
"#;
        let config = Configuration::parse(raw, ConfigMode::Versioned).unwrap();
        assert_eq!(config.rules().len(), 1);
        assert_eq!(config.rules()[0].when, "pull_request.opened");
        assert_eq!(title_regex(&config.rules()[0]).unwrap(), "wip");
    }

    #[test]
    fn rule_without_validators_is_rejected() {
        let raw = r#"
version: 2
mergeable:
  - when: pull_request.*
    validate: []
    fail:
      - do: comment
"#;
        let err = Configuration::parse(raw, ConfigMode::Versioned).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
    }

    #[test]
    fn rule_without_any_action_list_is_rejected() {
        let raw = r#"
version: 2
mergeable:
  - when: pull_request.*
    validate:
      - do: title
        must_exclude:
          regex: wip
"#;
        let err = Configuration::parse(raw, ConfigMode::Versioned).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
    }

    #[test]
    fn builtin_default_is_one_pull_request_rule() {
        let config = Configuration::builtin_default();
        assert_eq!(config.rules().len(), 1);
        assert_eq!(config.rules()[0].when, "pull_request.*");
        assert!(!config.rules()[0].validate.is_empty());
    }
}
