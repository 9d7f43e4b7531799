//! Memoizing name-to-component registry.

use std::collections::HashMap;
use std::sync::Arc;

use crate::actions::{self, Action};
use crate::error::{ComponentKind, EngineError, Result};
use crate::validators::{self, Validator};

/// Lazily-populated registry mapping validator/action names to singleton
/// instances.
///
/// First resolution of a name instantiates the component through the
/// builtin factory table and caches it; later resolutions return the same
/// instance. Entries are never evicted. The registry is owned by the
/// caller of the engine: create one per event, or deliberately reuse one
/// across events to amortize instantiation.
///
/// The memoization maps are only mutated during registration, which the
/// orchestrator awaits fully before any concurrent evaluation begins;
/// evaluation uses the non-mutating lookups.
#[derive(Default)]
pub struct Registry {
    validators: HashMap<String, Arc<dyn Validator>>,
    actions: HashMap<String, Arc<dyn Action>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a validator by name, instantiating on first reference.
    pub fn validator(&mut self, name: &str) -> Result<Arc<dyn Validator>> {
        if let Some(validator) = self.validators.get(name) {
            return Ok(Arc::clone(validator));
        }
        let built = validators::build(name).ok_or_else(|| EngineError::Resolution {
            kind: ComponentKind::Validator,
            name: name.to_string(),
        })?;
        self.validators.insert(name.to_string(), Arc::clone(&built));
        Ok(built)
    }

    /// Resolve an action by name, instantiating on first reference.
    pub fn action(&mut self, name: &str) -> Result<Arc<dyn Action>> {
        if let Some(action) = self.actions.get(name) {
            return Ok(Arc::clone(action));
        }
        let built = actions::build(name).ok_or_else(|| EngineError::Resolution {
            kind: ComponentKind::Action,
            name: name.to_string(),
        })?;
        self.actions.insert(name.to_string(), Arc::clone(&built));
        Ok(built)
    }

    /// Pre-populate a validator under `name`, e.g. a caller-provided
    /// custom component; later resolutions return this instance.
    pub fn insert_validator(&mut self, name: impl Into<String>, validator: Arc<dyn Validator>) {
        self.validators.insert(name.into(), validator);
    }

    /// Pre-populate an action under `name`.
    pub fn insert_action(&mut self, name: impl Into<String>, action: Arc<dyn Action>) {
        self.actions.insert(name.into(), action);
    }

    /// Non-mutating lookup of an already-registered validator.
    pub fn lookup_validator(&self, name: &str) -> Option<Arc<dyn Validator>> {
        self.validators.get(name).map(Arc::clone)
    }

    /// Non-mutating lookup of an already-registered action.
    pub fn lookup_action(&self, name: &str) -> Option<Arc<dyn Action>> {
        self.actions.get(name).map(Arc::clone)
    }

    /// Snapshot of every registered action, for the pre-action fan-out.
    pub fn registered_actions(&self) -> Vec<Arc<dyn Action>> {
        self.actions.values().map(Arc::clone).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_is_memoized() {
        let mut registry = Registry::new();
        let first = registry.validator("title").unwrap();
        let second = registry.validator("title").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn actions_are_memoized_too() {
        let mut registry = Registry::new();
        let first = registry.action("comment").unwrap();
        let second = registry.action("comment").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn unknown_names_fail_with_component_kind() {
        let mut registry = Registry::new();
        let err = registry
            .validator("no_such_check")
            .err()
            .expect("resolution must fail");
        match err {
            EngineError::Resolution { kind, name } => {
                assert_eq!(kind, ComponentKind::Validator);
                assert_eq!(name, "no_such_check");
            }
            other => panic!("expected resolution error, got {other}"),
        }
        assert!(registry.lookup_validator("no_such_check").is_none());
    }

    #[test]
    fn lookup_does_not_instantiate() {
        let registry = Registry::new();
        assert!(registry.lookup_validator("title").is_none());
        assert!(registry.registered_actions().is_empty());
    }
}
