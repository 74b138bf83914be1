//! Variable type tags and the inference applied at the mutation boundary.
//!
//! Variable values are dynamic JSON ([`serde_json::Value`]); the store pairs
//! each value with an explicit [`VarType`] tag so nothing deeper in the
//! resolver has to duck-type. Inference runs exactly once, when a value
//! enters the store.
//!
//! # Invariants
//!
//! 1. A stored variable's tag agrees with the runtime shape of its value,
//!    except during the controlled empty-placeholder states handled by the
//!    reducer (see [`store`](crate::store)).
//! 2. Inference never downgrades: an explicit non-`string` request wins, and
//!    a `string` request over a structural value is upgraded to the inferred
//!    structural tag.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Type tag for a stored variable.
///
/// Serialized lowercase (`"string"`, `"list"`, …) to match the wire shape
/// consumed by the authoring layer and screen exports.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarType {
    /// Text, and the default for anything without a better shape (incl. null).
    #[default]
    String,
    /// A sequence of values.
    List,
    /// A keyed structure.
    Object,
    /// A numeric value.
    Number,
    /// A boolean flag.
    Boolean,
}

impl VarType {
    /// Infer a tag from the runtime shape of `value`.
    #[must_use]
    pub fn infer(value: &Value) -> Self {
        match value {
            Value::Array(_) => Self::List,
            Value::Object(_) => Self::Object,
            Value::Number(_) => Self::Number,
            Value::Bool(_) => Self::Boolean,
            Value::String(_) | Value::Null => Self::String,
        }
    }

    /// Whether this tag is structural (`list` or `object`).
    ///
    /// Structural variables are subject to empty-placeholder preservation:
    /// an empty incoming payload does not clobber an existing collection.
    #[must_use]
    pub fn is_structural(self) -> bool {
        matches!(self, Self::List | Self::Object)
    }

    /// The empty shell of this tag, used when a placeholder write is allowed
    /// to land on a structural variable (action-over-binding override).
    #[must_use]
    pub fn empty_value(self) -> Value {
        match self {
            Self::List => Value::Array(Vec::new()),
            Self::Object => Value::Object(serde_json::Map::new()),
            Self::String => Value::String(String::new()),
            Self::Number | Self::Boolean => Value::Null,
        }
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::List => "list",
            Self::Object => "object",
            Self::Number => "number",
            Self::Boolean => "boolean",
        };
        f.write_str(name)
    }
}

/// Resolve the tag a mutation should store.
///
/// A missing request means full inference. A request of the default `string`
/// is treated as "unspecified" when the value is structural, so callers that
/// blindly pass the default cannot flatten a list or object variable.
#[must_use]
pub fn resolve_type(requested: Option<VarType>, value: &Value) -> VarType {
    let inferred = VarType::infer(value);
    match requested {
        None => inferred,
        Some(VarType::String) if inferred.is_structural() => inferred,
        Some(ty) => ty,
    }
}

/// Whether `value` is an empty placeholder: empty text or null.
///
/// Placeholders commonly arrive while a binding editor initializes; the
/// reducer refuses to let them overwrite structural data.
#[must_use]
pub fn is_empty_placeholder(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ── Inference ───────────────────────────────────────────────────

    #[test]
    fn infers_list_from_array() {
        assert_eq!(VarType::infer(&json!([1, 2, 3])), VarType::List);
    }

    #[test]
    fn infers_object_from_map() {
        assert_eq!(VarType::infer(&json!({"a": 1})), VarType::Object);
    }

    #[test]
    fn infers_number_and_boolean() {
        assert_eq!(VarType::infer(&json!(42)), VarType::Number);
        assert_eq!(VarType::infer(&json!(true)), VarType::Boolean);
    }

    #[test]
    fn null_and_text_default_to_string() {
        assert_eq!(VarType::infer(&Value::Null), VarType::String);
        assert_eq!(VarType::infer(&json!("hi")), VarType::String);
    }

    // ── resolve_type ────────────────────────────────────────────────

    #[test]
    fn missing_request_uses_inference() {
        assert_eq!(resolve_type(None, &json!([1])), VarType::List);
        assert_eq!(resolve_type(None, &json!("x")), VarType::String);
    }

    #[test]
    fn string_request_upgraded_over_structural_value() {
        assert_eq!(
            resolve_type(Some(VarType::String), &json!([1])),
            VarType::List
        );
        assert_eq!(
            resolve_type(Some(VarType::String), &json!({"k": 1})),
            VarType::Object
        );
    }

    #[test]
    fn explicit_non_string_request_wins() {
        // Callers may declare a list before data arrives.
        assert_eq!(resolve_type(Some(VarType::List), &json!("")), VarType::List);
        assert_eq!(
            resolve_type(Some(VarType::Number), &json!("3")),
            VarType::Number
        );
    }

    #[test]
    fn string_request_over_plain_value_stays_string() {
        assert_eq!(
            resolve_type(Some(VarType::String), &json!("text")),
            VarType::String
        );
    }

    // ── Placeholders ────────────────────────────────────────────────

    #[test]
    fn empty_string_and_null_are_placeholders() {
        assert!(is_empty_placeholder(&json!("")));
        assert!(is_empty_placeholder(&Value::Null));
    }

    #[test]
    fn populated_values_are_not_placeholders() {
        assert!(!is_empty_placeholder(&json!("x")));
        assert!(!is_empty_placeholder(&json!(0)));
        assert!(!is_empty_placeholder(&json!([])));
        assert!(!is_empty_placeholder(&json!({})));
    }

    // ── Display / serde ─────────────────────────────────────────────

    #[test]
    fn display_matches_wire_form() {
        assert_eq!(VarType::List.to_string(), "list");
        assert_eq!(VarType::Boolean.to_string(), "boolean");
    }

    #[test]
    fn serde_round_trip_lowercase() {
        let tag: VarType = serde_json::from_str("\"object\"").unwrap();
        assert_eq!(tag, VarType::Object);
        assert_eq!(serde_json::to_string(&VarType::List).unwrap(), "\"list\"");
    }

    #[test]
    fn empty_value_matches_tag() {
        assert_eq!(VarType::List.empty_value(), json!([]));
        assert_eq!(VarType::Object.empty_value(), json!({}));
        assert_eq!(VarType::String.empty_value(), json!(""));
    }
}
