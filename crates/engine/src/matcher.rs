//! Event-pattern matching for rule triggers and component support lists.

/// Whether a rule's `when` pattern matches the `(event, action)` pair.
///
/// `when` is one or more `", "`-separated alternatives of the form
/// `eventType.actionVerb`. An alternative matches when its verb is the
/// wildcard `*` and its event type equals `event`, or when it equals
/// `event.action` exactly. Any alternative matching is a match.
pub fn matches(when: &str, event: &str, action: &str) -> bool {
    when.split(", ").any(|alternative| match alternative.rsplit_once('.') {
        Some((event_type, "*")) => event_type == event,
        _ => {
            alternative
                .split_once('.')
                .is_some_and(|(ty, verb)| ty == event && verb == action)
        }
    })
}

/// Whether a component's supported-event list covers the given
/// `event.action` key. Entries use the same wildcard form as `when`
/// patterns.
pub fn supports_event_key(entries: &[&str], event_key: &str) -> bool {
    let (event, action) = event_key.split_once('.').unwrap_or((event_key, ""));
    entries.iter().any(|entry| matches(entry, event, action))
}
