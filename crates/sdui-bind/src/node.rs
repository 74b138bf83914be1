//! Screen-tree node boundary.
//!
//! A screen document is a tree of typed nodes carrying a free-form prop
//! bag. This module deserializes that shape and exposes the handful of
//! props the binding layer cares about: the list data source, the loop
//! alias, and the display path. It also builds the per-element scope
//! stacks a list node hands to its template — one extended stack per
//! element, all sharing the parent stack's frames.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::normalize::{normalize_alias, normalize_items};
use crate::resolve::resolve_reference;
use crate::scope::{IterationFrame, ScopeStack};

/// One node of a screen tree.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenNode {
    /// Widget kind, e.g. `"text"`, `"list"`, `"container"`.
    #[serde(rename = "type")]
    pub node_type: String,
    /// Stable identity, when the document assigns one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Free-form props; bindings live here as embedded reference objects.
    #[serde(default)]
    pub props: Map<String, Value>,
    /// Child nodes, inline or referenced by id.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ChildRef>,
}

/// A child slot: either an id naming a node defined elsewhere in the
/// document, or the node inline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChildRef {
    Id(String),
    Inline(Box<ScreenNode>),
}

impl ScreenNode {
    /// The raw list data source prop: `dataSource`, falling back to the
    /// legacy `items` spelling.
    #[must_use]
    pub fn data_source(&self) -> Option<&Value> {
        self.props.get("dataSource").or_else(|| self.props.get("items"))
    }

    /// The loop alias prop, if it is a string.
    #[must_use]
    pub fn item_alias(&self) -> Option<&str> {
        self.props.get("itemAlias").and_then(Value::as_str)
    }

    /// The display-path prop, if it is a string.
    #[must_use]
    pub fn display_path(&self) -> Option<&str> {
        self.props.get("displayPath").and_then(Value::as_str)
    }

    /// Resolve this node's data source against `context` and `scope`,
    /// then normalize it into the element sequence the template iterates.
    #[must_use]
    pub fn resolved_items(&self, context: &Value, scope: &ScopeStack) -> Vec<Value> {
        match self.data_source() {
            Some(source) => {
                let resolved = resolve_reference(source, context, None, scope);
                normalize_items(&resolved)
            }
            None => Vec::new(),
        }
    }
}

/// Build one extended scope stack per element of `items`, each carrying a
/// frame `{alias, element, index, total}` on top of `parent`.
///
/// A blank alias normalizes to `"item"`; the parent stack is shared, not
/// copied element-by-element beyond the frame pointers.
#[must_use]
pub fn child_scopes(parent: &ScopeStack, alias: Option<&str>, items: &[Value]) -> Vec<ScopeStack> {
    let alias = normalize_alias(alias);
    let total = items.len();
    items
        .iter()
        .enumerate()
        .map(|(index, item)| parent.push(IterationFrame::new(alias, item.clone(), index, total)))
        .collect()
}
