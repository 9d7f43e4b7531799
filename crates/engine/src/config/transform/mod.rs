//! Version-indexed configuration transforms.
//!
//! Each transform is a pure `document -> canonical document` rewrite into
//! the `mergeable:` rule-list shape. Version 0 (legacy) and version 1
//! share the flat-option rewrite; version 2 documents already carry the
//! rule list.

mod v1;
mod v2;

use serde_yaml::Value;

use crate::error::{EngineError, Result};

/// Rewrite `doc` into the canonical rule-list shape for `version`.
pub(super) fn apply(version: u64, doc: Value) -> Result<Value> {
    match version {
        0 | 1 => v1::transform(doc),
        2 => v2::transform(doc),
        other => Err(EngineError::UnknownVersion(other.to_string())),
    }
}
