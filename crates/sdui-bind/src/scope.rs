//! Iteration frames and the persistent scope stack threaded through list
//! templates.
//!
//! Each list construct extends the stack by one frame per element before
//! recursing into its template. Extension always produces a *new* stack —
//! the parent is never mutated — so sibling branches of a screen tree can
//! never observe each other's frames. Frames are shared behind `Rc`, which
//! makes extension a cheap pointer-vector copy.
//!
//! # Invariants
//!
//! 1. Frames are immutable once created.
//! 2. `push` leaves the receiver untouched; the returned stack holds one
//!    more frame.
//! 3. Alias search is innermost-first: an inner loop reusing an outer
//!    alias shadows it.
//! 4. A blank alias normalizes to `"item"` at frame construction.

use serde_json::Value;
use std::rc::Rc;

/// Alias used when a list template does not name its loop variable.
pub const DEFAULT_ALIAS: &str = "item";

/// One loop frame: the local alias, the current element, and its position.
#[derive(Clone, Debug, PartialEq)]
pub struct IterationFrame {
    alias: String,
    item: Value,
    index: usize,
    total: usize,
}

impl IterationFrame {
    /// Build a frame. A blank or whitespace-only alias becomes
    /// [`DEFAULT_ALIAS`].
    #[must_use]
    pub fn new(alias: impl Into<String>, item: Value, index: usize, total: usize) -> Self {
        let alias = alias.into();
        let trimmed = alias.trim();
        let alias = if trimmed.is_empty() {
            DEFAULT_ALIAS.to_owned()
        } else {
            trimmed.to_owned()
        };
        Self {
            alias,
            item,
            index,
            total,
        }
    }

    /// The loop alias (never blank).
    #[must_use]
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// The current element.
    #[must_use]
    pub fn item(&self) -> &Value {
        &self.item
    }

    /// Zero-based position of the element.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Total element count of the iteration.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }
}

/// Persistent chain of iteration frames, innermost last.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScopeStack {
    frames: Vec<Rc<IterationFrame>>,
}

impl ScopeStack {
    /// The empty stack (no active iteration).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A new stack with `frame` appended; `self` is left untouched.
    #[must_use]
    pub fn push(&self, frame: IterationFrame) -> Self {
        let mut frames = self.frames.clone();
        frames.push(Rc::new(frame));
        Self { frames }
    }

    /// Whether any iteration is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Nesting depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// The innermost frame, if any.
    #[must_use]
    pub fn innermost(&self) -> Option<&IterationFrame> {
        self.frames.last().map(Rc::as_ref)
    }

    /// Frames from innermost to outermost (shadowing order).
    pub fn iter_innermost(&self) -> impl Iterator<Item = &IterationFrame> {
        self.frames.iter().rev().map(Rc::as_ref)
    }
}
