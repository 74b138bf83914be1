//! Binding resolution: raw property values to resolved JSON values.
//!
//! A property arriving from a screen tree is either a literal, a
//! reference-shaped string (`"${path}"`), or a structured reference — a
//! JSON object carrying a `reference` path plus an optional `value`
//! fallback for properties that can be manually overridden and data-bound
//! at the same time.
//!
//! # Resolution order
//!
//! 1. Structured reference → extract path and embedded fallback (the
//!    embedded fallback beats the caller's default when both exist).
//! 2. Reference-shaped string → the remainder is the path.
//! 3. Anything else is a literal; `null` defers to the fallback.
//! 4. Paths first search the iteration scope stack innermost-first (inner
//!    aliases shadow outer ones), then traverse the context root.
//! 5. A cursor that is itself a reference is resolved in place, so
//!    indirection chains work; a successful result that is a reference is
//!    resolved once more before returning.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Missing key / bad index | Sparse data | Fallback value |
//! | Null intermediate | Half-populated context | Fallback value |
//! | Alias matches, field missing | Template ahead of data | Fallback value (context is *not* consulted) |
//! | Indirection deeper than 32 | Reference cycle | Fallback value |

use serde_json::Value;
use tracing::trace;

use crate::path::{is_index_segment, is_reference_literal, normalize_reference};
use crate::scope::ScopeStack;

/// Hard cap on reference-to-reference hops; cycles degrade to the fallback
/// instead of recursing forever.
const MAX_INDIRECTION: usize = 32;

/// Borrowed view of a structured binding reference.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BindingRef<'a> {
    /// The raw reference string, wrapper included.
    pub reference: &'a str,
    /// The embedded fallback (`value` member), if present.
    pub fallback: Option<&'a Value>,
}

/// Interpret a JSON value as a structured binding reference.
///
/// Any object with a string `reference` member qualifies; an optional
/// `value` member is its embedded fallback.
#[must_use]
pub fn as_binding(value: &Value) -> Option<BindingRef<'_>> {
    let map = value.as_object()?;
    let reference = map.get("reference")?.as_str()?;
    Some(BindingRef {
        reference,
        fallback: map.get("value"),
    })
}

/// The fallback a structured reference would produce if its path never
/// resolves: its embedded `value` if present, else the supplied default.
/// Non-references return themselves (null deferring to the default).
#[must_use]
pub fn binding_fallback_value(raw: &Value, default: Option<&Value>) -> Value {
    match as_binding(raw) {
        Some(binding) => binding
            .fallback
            .or(default)
            .cloned()
            .unwrap_or(Value::Null),
        None if raw.is_null() => default.cloned().unwrap_or(Value::Null),
        None => raw.clone(),
    }
}

/// Resolve a raw property value against `context` and the active iteration
/// scope. Missing data degrades to `fallback` (or null); this never fails.
#[must_use]
pub fn resolve_reference(
    raw: &Value,
    context: &Value,
    fallback: Option<&Value>,
    scope: &ScopeStack,
) -> Value {
    resolve_depth(raw, context, fallback, scope, 0)
}

/// Look up `props[key]` and resolve it. A missing bag entry yields the
/// fallback; a structured reference's embedded fallback still wins over it.
#[must_use]
pub fn resolve_prop(
    props: &serde_json::Map<String, Value>,
    key: &str,
    context: &Value,
    fallback: Option<&Value>,
    scope: &ScopeStack,
) -> Value {
    match props.get(key) {
        Some(candidate) => resolve_reference(candidate, context, fallback, scope),
        None => fallback.cloned().unwrap_or(Value::Null),
    }
}

fn resolve_depth(
    raw: &Value,
    context: &Value,
    fallback: Option<&Value>,
    scope: &ScopeStack,
    depth: usize,
) -> Value {
    if depth > MAX_INDIRECTION {
        trace!(depth, "indirection limit reached, using fallback");
        return fallback.cloned().unwrap_or(Value::Null);
    }
    if let Some(binding) = as_binding(raw) {
        return resolve_path_binding(
            binding.reference,
            binding.fallback,
            fallback,
            context,
            scope,
            depth,
        );
    }
    if let Value::String(s) = raw {
        if is_reference_literal(s) {
            return resolve_path_binding(s, None, fallback, context, scope, depth);
        }
    }
    if raw.is_null() {
        return fallback.cloned().unwrap_or(Value::Null);
    }
    raw.clone()
}

fn resolve_path_binding(
    reference: &str,
    embedded: Option<&Value>,
    caller_fallback: Option<&Value>,
    context: &Value,
    scope: &ScopeStack,
    depth: usize,
) -> Value {
    if let Some(resolved) = follow_reference(reference, embedded, context, scope, depth) {
        return resolved;
    }
    if let Some(fb) = embedded {
        return fb.clone();
    }
    caller_fallback.cloned().unwrap_or(Value::Null)
}

/// Follow a reference path to a value. `None` on any miss, including
/// indirection exhaustion, so the caller can apply its fallback.
fn follow_reference(
    reference: &str,
    embedded: Option<&Value>,
    context: &Value,
    scope: &ScopeStack,
    depth: usize,
) -> Option<Value> {
    let path = normalize_reference(reference);

    if path.is_empty() {
        // An empty reference inside a loop means "the current element".
        return scope.innermost().map(|frame| frame.item().clone());
    }
    match scope_lookup(path, scope, context, depth) {
        Some(ScopeHit::Value(value)) => {
            trace!(reference, path, "resolved from iteration scope");
            finish(value, context, scope, depth)
        }
        Some(ScopeHit::MissingField) => {
            // The alias matched but the item lacks the field; the context
            // root is deliberately not consulted.
            None
        }
        None => {
            let resolved = traverse_resolving(context, path, context, scope, depth)?;
            // A context slot may still hold an "" placeholder from before
            // its list/object data arrived; a structural embedded fallback
            // is the better answer then.
            if resolved.as_str() == Some("") {
                if let Some(fb) = embedded {
                    if fb.is_array() || fb.is_object() {
                        trace!(reference, path, "preferring structural fallback");
                        return Some(fb.clone());
                    }
                }
            }
            trace!(reference, path, "resolved from context");
            Some(resolved)
        }
    }
}

/// Apply the "resolve once more" rule to a successful result. Exhausting
/// the indirection limit turns the hit into a miss.
fn finish(value: Value, context: &Value, scope: &ScopeStack, depth: usize) -> Option<Value> {
    let Some(binding) = as_binding(&value) else {
        return Some(value);
    };
    if depth >= MAX_INDIRECTION {
        trace!(depth, "indirection limit reached inside reference chain");
        return None;
    }
    follow_reference(binding.reference, binding.fallback, context, scope, depth + 1)
        .or_else(|| binding.fallback.cloned())
}

enum ScopeHit {
    Value(Value),
    MissingField,
}

/// Innermost-first alias search. For a frame aliased `a`, the reserved
/// spellings `a`, `a.rest`, `a.index` / `aIndex` / bare `index`, and
/// `a.total` / `a.length` / `aTotal` / `aLength` / bare `total` / bare
/// `length` all resolve against that frame.
fn scope_lookup(
    path: &str,
    scope: &ScopeStack,
    context: &Value,
    depth: usize,
) -> Option<ScopeHit> {
    for frame in scope.iter_innermost() {
        let alias = frame.alias();

        if let Some(rest) = path.strip_prefix(alias) {
            if rest.is_empty() {
                return Some(ScopeHit::Value(frame.item().clone()));
            }
            if let Some(field) = rest.strip_prefix('.') {
                return Some(match field {
                    "index" => ScopeHit::Value(Value::from(frame.index() as u64)),
                    "total" | "length" => ScopeHit::Value(Value::from(frame.total() as u64)),
                    _ => match traverse_resolving(frame.item(), field, context, scope, depth) {
                        Some(value) => ScopeHit::Value(value),
                        None => ScopeHit::MissingField,
                    },
                });
            }
            if rest == "Index" {
                return Some(ScopeHit::Value(Value::from(frame.index() as u64)));
            }
            if rest == "Total" || rest == "Length" {
                return Some(ScopeHit::Value(Value::from(frame.total() as u64)));
            }
        }

        if path == "index" {
            return Some(ScopeHit::Value(Value::from(frame.index() as u64)));
        }
        if path == "total" || path == "length" {
            return Some(ScopeHit::Value(Value::from(frame.total() as u64)));
        }
    }
    None
}

/// Binding-aware traversal: like [`crate::path::get_value`], but a cursor
/// that is itself a reference is resolved in place before continuing, and
/// a terminal reference is resolved once more.
#[must_use]
pub fn traverse_resolving(
    root: &Value,
    path: &str,
    context: &Value,
    scope: &ScopeStack,
    depth: usize,
) -> Option<Value> {
    if path.is_empty() || depth > MAX_INDIRECTION {
        return None;
    }
    let mut cursor = root.clone();
    for segment in path.split('.') {
        if as_binding(&cursor).is_some() {
            cursor = resolve_depth(&cursor, context, None, scope, depth + 1);
        }
        cursor = match &cursor {
            Value::Array(items) if is_index_segment(segment) => {
                items.get(segment.parse::<usize>().ok()?)?.clone()
            }
            Value::Object(map) => map.get(segment)?.clone(),
            _ => return None,
        };
    }
    finish(cursor, context, scope, depth)
}
