//! Tag-based display labels.
//!
//! A pure string utility: callers (the CLI report, mostly) use it to decide
//! whether a root entity has a human-meaningful name. The assembler never
//! consults labels; root classification is structural.

use crate::entity::Tags;

/// Tag keys consulted for a display label, in preference order.
const LABEL_KEYS: &[&str] = &["name", "name:en", "int_name", "loc_name", "ref"];

/// The display label for a tag map, if one can be derived.
pub fn display_label(tags: &Tags) -> Option<&str> {
    LABEL_KEYS
        .iter()
        .filter_map(|key| tags.get(*key))
        .map(String::as_str)
        .find(|value| !value.trim().is_empty())
}

/// Whether a tag map yields any display label.
pub fn has_label(tags: &Tags) -> bool {
    display_label(tags).is_some()
}
