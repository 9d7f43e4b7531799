//! Version 2 transform: the document already carries the canonical
//! `mergeable:` rule list and passes through unchanged. The post-transform
//! root-node check and rule invariants are enforced by the caller.

use serde_yaml::Value;

use crate::error::Result;

pub(super) fn transform(doc: Value) -> Result<Value> {
    Ok(doc)
}
