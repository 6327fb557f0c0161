// TimeTrail - core/actions.rs
//
// Splits an operation into its action labels and routes each label to the
// origin or normal bucket.
// Core layer: pure logic, no I/O.

use crate::core::model::StateSet;
use crate::util::constants::{
    ACTION_SEPARATOR, OTHER_VOLUME, OTHER_VOLUME_SUFFIX, POSSIBLY_OTHER_VOLUME,
    POSSIBLY_OTHER_VOLUME_SUFFIX,
};

/// Split an operation string into its ordered action labels.
///
/// Every label gets the operation's volume qualifier as a suffix, e.g.
/// `(At ...: Copy | Copy with quirk) on other volume` yields
/// `["Copy, on other volume", "Copy with quirk, on other volume"]`.
pub fn split_actions(operation: &str) -> Vec<String> {
    let mut parts: Vec<&str> = operation.split(ACTION_SEPARATOR).collect();

    // The kind and timestamps end at the last ':' of the first part.
    if let Some(first) = parts.first_mut() {
        let part = *first;
        if let Some((_, rest)) = part.rsplit_once(':') {
            *first = rest;
        }
    }

    let possibly = format!("){POSSIBLY_OTHER_VOLUME}");
    let other = format!("){OTHER_VOLUME}");

    let mut suffix = "";
    if let Some(last) = parts.last_mut() {
        let part = *last;
        if let Some(stripped) = part.strip_suffix(possibly.as_str()) {
            *last = stripped;
            suffix = POSSIBLY_OTHER_VOLUME_SUFFIX;
        } else if let Some(stripped) = part.strip_suffix(other.as_str()) {
            *last = stripped;
            suffix = OTHER_VOLUME_SUFFIX;
        } else if let Some(stripped) = part.strip_suffix(')') {
            *last = stripped;
        }
    }

    parts
        .into_iter()
        .map(|part| format!("{}{suffix}", part.trim()))
        .collect()
}

/// Remove a volume qualifier suffix so the label can be compared against
/// plain state labels.
pub fn strip_volume_suffix(action: &str) -> &str {
    action
        .strip_suffix(POSSIBLY_OTHER_VOLUME_SUFFIX)
        .or_else(|| action.strip_suffix(OTHER_VOLUME_SUFFIX))
        .unwrap_or(action)
}

/// Actions of one operation, split by membership in the origin-state set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionBuckets {
    pub origin: Vec<String>,
    pub normal: Vec<String>,
}

/// Route each action to the origin bucket if its plain label is an origin
/// state, otherwise to the normal bucket. Order within a bucket follows
/// the input order.
pub fn classify_actions(actions: Vec<String>, origin_states: &StateSet) -> ActionBuckets {
    let mut buckets = ActionBuckets::default();
    for action in actions {
        if origin_states.contains(strip_volume_suffix(&action)) {
            buckets.origin.push(action);
        } else {
            buckets.normal.push(action);
        }
    }
    buckets
}
