//! Reference syntax and plain path traversal.
//!
//! A reference names a dot-separated path, wrapped as `${path}` or prefixed
//! with a single `$` sigil. All-digit segments index sequences; everything
//! else is a key lookup. Traversal here is *plain* — it never resolves
//! embedded bindings. The resolver layers binding-aware traversal on top
//! (see [`resolve`](crate::resolve)).

use serde_json::Value;

/// Strip the reference wrapper from a raw reference string.
///
/// `${a.b}` → `a.b`; a single leading `$` sigil is also accepted
/// (`$a.b` → `a.b`); anything else passes through unchanged.
#[must_use]
pub fn normalize_reference(raw: &str) -> &str {
    if let Some(rest) = raw.strip_prefix("${") {
        return rest.strip_suffix('}').unwrap_or(rest);
    }
    if let Some(rest) = raw.strip_prefix('$') {
        return rest;
    }
    raw
}

/// Whether a raw string is reference-shaped (starts with the sigil).
#[must_use]
pub fn is_reference_literal(raw: &str) -> bool {
    raw.starts_with('$')
}

/// Whether a path segment addresses a sequence index (non-empty, all
/// ASCII digits).
#[must_use]
pub fn is_index_segment(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

/// Follow `path` from `root` without resolving embedded bindings.
///
/// Returns `None` on any missing key, out-of-range index, or non-container
/// intermediate. A terminal `null` is a found value, not a miss.
#[must_use]
pub fn get_value<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }
    let mut cursor = root;
    for segment in path.split('.') {
        cursor = step(cursor, segment)?;
    }
    Some(cursor)
}

/// One traversal step: index into a sequence or look up a key.
#[must_use]
pub fn step<'a>(cursor: &'a Value, segment: &str) -> Option<&'a Value> {
    match cursor {
        Value::Array(items) if is_index_segment(segment) => {
            items.get(segment.parse::<usize>().ok()?)
        }
        Value::Object(map) => map.get(segment),
        _ => None,
    }
}
