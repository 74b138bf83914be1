//! The variable record and its provenance tag.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::value::VarType;

/// Where a variable's current value came from.
///
/// Provenance drives one rule: an `action`-sourced write may override a
/// `binding`-sourced placeholder, never the other way around. Action data
/// (e.g. a remote population) always beats a binding editor's empty
/// initialization.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Entered by hand in the authoring surface.
    #[default]
    Manual,
    /// Produced by an action (remote call, event handler).
    Action,
    /// Written by a data binding.
    Binding,
}

/// A named slot in the store: dynamic value plus its resolved tag,
/// provenance, and an author-facing description.
///
/// Records are immutable snapshots; every change goes through the store's
/// reducer, which re-applies inference and preservation rules.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    /// The current value.
    pub value: Value,
    /// Tag resolved at the mutation boundary (see [`crate::value::resolve_type`]).
    #[serde(rename = "type")]
    pub ty: VarType,
    /// Provenance of the current value.
    #[serde(default)]
    pub source: Source,
    /// Author-facing description, free text.
    #[serde(default)]
    pub description: String,
}

impl Variable {
    /// Build a record, inferring the tag from the value.
    #[must_use]
    pub fn new(value: Value) -> Self {
        let ty = VarType::infer(&value);
        Self {
            value,
            ty,
            source: Source::default(),
            description: String::new(),
        }
    }

    /// Whether this record currently holds structural data.
    #[must_use]
    pub fn is_structural(&self) -> bool {
        self.ty.is_structural()
    }
}
