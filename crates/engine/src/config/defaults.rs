//! Built-in defaults injected into legacy flat-shape configurations.

use serde_yaml::{Mapping, Value};

/// Label pattern marking a change as not ready to merge.
pub const DEFAULT_LABEL_PATTERN: &str =
    "work in progress|do not merge|experimental|proof of concept";

/// Title pattern marking a change as not ready to merge.
pub const DEFAULT_TITLE_PATTERN: &str = "wip|dnm|exp|poc";

/// Reminder posted on items flagged by the staleness check.
pub const DEFAULT_STALE_MESSAGE: &str = "There haven't been much activity here. \
    This is stale. Is it still relevant? This is a friendly reminder to \
    please resolve it. :-)";

/// Defaults for the flat legacy shape, keyed by option name.
pub(super) fn flat_defaults() -> Vec<(Value, Value)> {
    let mut stale = Mapping::new();
    stale.insert(Value::from("message"), Value::from(DEFAULT_STALE_MESSAGE));
    vec![
        (Value::from("label"), Value::from(DEFAULT_LABEL_PATTERN)),
        (Value::from("title"), Value::from(DEFAULT_TITLE_PATTERN)),
        (Value::from("stale"), Value::Mapping(stale)),
    ]
}
