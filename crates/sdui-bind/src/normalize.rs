//! Normalization of list data sources into element sequences.
//!
//! A list template accepts loosely-typed data sources from the authoring
//! surface: an actual sequence, a repeat count, a delimited string, or a
//! keyed structure. Everything funnels through [`normalize_items`] before
//! iteration so the scope-stack contract only ever sees a `Vec`.

use serde_json::Value;

use crate::scope::DEFAULT_ALIAS;

/// Coerce a resolved data source into the sequence a list iterates.
///
/// - sequence → as-is;
/// - `null` → empty;
/// - finite number `N` → `[1, 2, …, floor(N)]` (never negative);
/// - string → trimmed; empty → empty; a parseable JSON array literal →
///   its elements; otherwise split on newlines/commas, trimmed, empties
///   dropped;
/// - keyed structure → its values;
/// - anything else → empty.
#[must_use]
pub fn normalize_items(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        Value::Null => Vec::new(),
        Value::Number(n) => {
            let count = n.as_f64().map_or(0, |f| {
                if f.is_finite() { f.floor().max(0.0) as u64 } else { 0 }
            });
            (1..=count).map(Value::from).collect()
        }
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Vec::new();
            }
            if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(trimmed) {
                return items;
            }
            trimmed
                .split(['\n', ','])
                .map(|item| item.trim().trim_end_matches('\r'))
                .filter(|item| !item.is_empty())
                .map(|item| Value::String(item.to_owned()))
                .collect()
        }
        Value::Object(map) => map.values().cloned().collect(),
        Value::Bool(_) => Vec::new(),
    }
}

/// Trim an alias, defaulting to `"item"` when unset or blank.
#[must_use]
pub fn normalize_alias(alias: Option<&str>) -> &str {
    match alias.map(str::trim) {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => DEFAULT_ALIAS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    // ── Sequences and null ──────────────────────────────────────────

    #[test]
    fn sequence_passes_through() {
        assert_eq!(normalize_items(&json!([1, "a", null])), vec![json!(1), json!("a"), json!(null)]);
    }

    #[test]
    fn null_is_empty() {
        assert!(normalize_items(&Value::Null).is_empty());
    }

    // ── Counts ──────────────────────────────────────────────────────

    #[test]
    fn count_synthesizes_one_based_sequence() {
        assert_eq!(normalize_items(&json!(3)), vec![json!(1), json!(2), json!(3)]);
    }

    #[test]
    fn fractional_count_floors() {
        assert_eq!(normalize_items(&json!(2.9)), vec![json!(1), json!(2)]);
    }

    #[test]
    fn non_positive_counts_are_empty() {
        assert!(normalize_items(&json!(0)).is_empty());
        assert!(normalize_items(&json!(-4)).is_empty());
    }

    // ── Strings ─────────────────────────────────────────────────────

    #[test]
    fn comma_separated_string_splits_and_trims() {
        assert_eq!(
            normalize_items(&json!("a, b ,c")),
            vec![json!("a"), json!("b"), json!("c")]
        );
    }

    #[test]
    fn newline_separated_string_splits() {
        assert_eq!(
            normalize_items(&json!("first\nsecond\r\nthird")),
            vec![json!("first"), json!("second"), json!("third")]
        );
    }

    #[test]
    fn empty_and_blank_strings_are_empty() {
        assert!(normalize_items(&json!("")).is_empty());
        assert!(normalize_items(&json!("   ")).is_empty());
    }

    #[test]
    fn embedded_json_array_literal_parses() {
        assert_eq!(
            normalize_items(&json!("[{\"id\": 1}, {\"id\": 2}]")),
            vec![json!({"id": 1}), json!({"id": 2})]
        );
    }

    #[test]
    fn invalid_json_falls_back_to_splitting() {
        assert_eq!(
            normalize_items(&json!("[broken, json")),
            vec![json!("[broken"), json!("json")]
        );
    }

    #[test]
    fn empty_segments_are_dropped() {
        assert_eq!(
            normalize_items(&json!("a,,b,")),
            vec![json!("a"), json!("b")]
        );
    }

    // ── Keyed structures and the rest ───────────────────────────────

    #[test]
    fn object_yields_its_values() {
        let items = normalize_items(&json!({"first": 1, "second": 2}));
        assert_eq!(items.len(), 2);
        assert!(items.contains(&json!(1)));
        assert!(items.contains(&json!(2)));
    }

    #[test]
    fn booleans_are_empty() {
        assert!(normalize_items(&json!(true)).is_empty());
    }

    // ── Alias ───────────────────────────────────────────────────────

    #[test]
    fn alias_defaults_and_trims() {
        assert_eq!(normalize_alias(None), "item");
        assert_eq!(normalize_alias(Some("")), "item");
        assert_eq!(normalize_alias(Some("  ")), "item");
        assert_eq!(normalize_alias(Some(" game ")), "game");
    }

    // ── Properties ──────────────────────────────────────────────────

    proptest! {
        /// A numeric source always yields exactly max(0, floor(n)) items,
        /// numbered from 1.
        #[test]
        fn count_normalization_length(n in -100.0f64..1000.0) {
            let items = normalize_items(&json!(n));
            let expected = n.floor().max(0.0) as usize;
            prop_assert_eq!(items.len(), expected);
            if expected > 0 {
                prop_assert_eq!(&items[0], &json!(1));
                prop_assert_eq!(&items[expected - 1], &json!(expected as u64));
            }
        }
    }
}
