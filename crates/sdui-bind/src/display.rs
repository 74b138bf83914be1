//! Projection of resolved values into displayable text.
//!
//! A screen widget ultimately needs a string. The formatter accepts any
//! resolved value — including nested structures and unresolved references —
//! and always produces text: data-shape surprises degrade to `""` or a
//! placeholder token, never an error.
//!
//! # Rules
//!
//! - An optional display path extracts a sub-value from keyed structures
//!   first (binding-aware traversal); the path is not re-applied below the
//!   extraction point.
//! - References are resolved before formatting.
//! - `null` → `""`; strings verbatim; numbers without a trailing `.0` when
//!   integral; booleans as `true`/`false`.
//! - Sequences join their recursively formatted elements with `", "`.
//! - Keyed structures try the preferred label keys first, then best-effort
//!   JSON serialization, then the `"[object]"` token.

use serde_json::Value;

use crate::resolve::{as_binding, resolve_reference, traverse_resolving};
use crate::scope::ScopeStack;

/// Label-like keys tried, in order, when formatting a keyed structure.
pub const PREFERRED_KEYS: [&str; 7] =
    ["display", "label", "title", "name", "text", "content", "value"];

/// Token emitted when a structure cannot even be serialized.
pub const OPAQUE_OBJECT: &str = "[object]";

/// Format `candidate` for display, optionally extracting `display_path`
/// from keyed structures first.
#[must_use]
pub fn format_for_display(
    candidate: &Value,
    display_path: Option<&str>,
    context: &Value,
    scope: &ScopeStack,
) -> String {
    if let Some(path) = display_path {
        if !path.is_empty() && (candidate.is_object() || candidate.is_array()) {
            if let Some(sub) = traverse_resolving(candidate, path, context, scope, 0) {
                return format_for_display(&sub, None, context, scope);
            }
        }
    }

    if as_binding(candidate).is_some() {
        let resolved = resolve_reference(candidate, context, None, scope);
        return format_for_display(&resolved, display_path, context, scope);
    }

    match candidate {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => format_number(n),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .map(|item| format_for_display(item, display_path, context, scope))
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(map) => {
            for key in PREFERRED_KEYS {
                let Some(field) = map.get(key) else { continue };
                if field.is_null() {
                    continue;
                }
                return format_for_display(field, display_path, context, scope);
            }
            serde_json::to_string(candidate).unwrap_or_else(|_| OPAQUE_OBJECT.to_owned())
        }
    }
}

/// Natural text form of a number: integral floats drop the `.0`.
fn format_number(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.is_finite() && f.abs() < 1e15 => {
            format!("{}", f as i64)
        }
        _ => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::IterationFrame;
    use serde_json::json;

    fn fmt(candidate: &Value) -> String {
        format_for_display(candidate, None, &json!({}), &ScopeStack::new())
    }

    // ── Primitives ──────────────────────────────────────────────────

    #[test]
    fn null_formats_to_empty_string() {
        assert_eq!(fmt(&Value::Null), "");
    }

    #[test]
    fn primitives_use_natural_text() {
        assert_eq!(fmt(&json!("hello")), "hello");
        assert_eq!(fmt(&json!(42)), "42");
        assert_eq!(fmt(&json!(true)), "true");
        assert_eq!(fmt(&json!(3.5)), "3.5");
    }

    #[test]
    fn integral_float_drops_decimal_point() {
        let n: Value = serde_json::from_str("3.0").unwrap();
        assert_eq!(fmt(&n), "3");
    }

    // ── Sequences ───────────────────────────────────────────────────

    #[test]
    fn sequence_joins_with_comma_space() {
        assert_eq!(fmt(&json!([1, 2, 3])), "1, 2, 3");
        assert_eq!(fmt(&json!(["a", "b"])), "a, b");
    }

    #[test]
    fn nested_sequence_elements_are_formatted_recursively() {
        assert_eq!(
            fmt(&json!([{"title": "First"}, {"title": "Second"}])),
            "First, Second"
        );
    }

    #[test]
    fn empty_sequence_formats_to_empty_string() {
        assert_eq!(fmt(&json!([])), "");
    }

    // ── Keyed structures ────────────────────────────────────────────

    #[test]
    fn preferred_keys_checked_in_order() {
        assert_eq!(fmt(&json!({"title": "T", "name": "N"})), "T");
        assert_eq!(fmt(&json!({"name": "N", "value": "V"})), "N");
        assert_eq!(fmt(&json!({"display": "D", "label": "L"})), "D");
    }

    #[test]
    fn null_preferred_key_is_skipped() {
        assert_eq!(fmt(&json!({"title": null, "name": "N"})), "N");
    }

    #[test]
    fn nested_preferred_value_is_formatted_recursively() {
        assert_eq!(fmt(&json!({"label": {"text": "deep"}})), "deep");
    }

    #[test]
    fn unlabeled_structure_serializes() {
        assert_eq!(fmt(&json!({"id": 7})), "{\"id\":7}");
    }

    // ── Display path ────────────────────────────────────────────────

    #[test]
    fn display_path_extracts_sub_value() {
        let candidate = json!({"profile": {"email": "a@b.c"}, "title": "ignored"});
        assert_eq!(
            format_for_display(
                &candidate,
                Some("profile.email"),
                &json!({}),
                &ScopeStack::new()
            ),
            "a@b.c"
        );
    }

    #[test]
    fn missing_display_path_falls_back_to_normal_formatting() {
        let candidate = json!({"title": "Widget"});
        assert_eq!(
            format_for_display(&candidate, Some("nope.deep"), &json!({}), &ScopeStack::new()),
            "Widget"
        );
    }

    #[test]
    fn display_path_applies_to_sequence_elements() {
        let candidate = json!([{"profile": {"name": "Ada"}}, {"profile": {"name": "Grace"}}]);
        assert_eq!(
            format_for_display(&candidate, Some("profile.name"), &json!({}), &ScopeStack::new()),
            "Ada, Grace"
        );
    }

    // ── Binding indirection ─────────────────────────────────────────

    #[test]
    fn binding_is_resolved_before_formatting() {
        let ctx = json!({"user": {"name": "Ada"}});
        let candidate = json!({"reference": "${user.name}"});
        assert_eq!(
            format_for_display(&candidate, None, &ctx, &ScopeStack::new()),
            "Ada"
        );
    }

    #[test]
    fn unresolvable_binding_formats_to_empty_string() {
        let candidate = json!({"reference": "${missing}"});
        assert_eq!(
            format_for_display(&candidate, None, &json!({}), &ScopeStack::new()),
            ""
        );
    }

    #[test]
    fn scope_alias_formats_through_frame() {
        let scope = ScopeStack::new().push(IterationFrame::new(
            "game",
            json!({"title": "Go"}),
            0,
            1,
        ));
        let candidate = json!({"reference": "${game.title}"});
        assert_eq!(format_for_display(&candidate, None, &json!({}), &scope), "Go");
    }
}
