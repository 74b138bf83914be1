//! Binding resolution for server-driven screen trees.
//!
//! `sdui-bind` turns the raw property values of a screen document into
//! concrete JSON values and display text, against a variable context
//! produced by [`sdui-core`](sdui_core):
//!
//! - [`resolve`] follows `${path}` references through the context and the
//!   active iteration scope, with fallbacks and indirection chains;
//! - [`scope`] is the persistent stack of loop frames a list template
//!   threads through its children;
//! - [`normalize`] coerces loose data sources (counts, delimited strings,
//!   keyed structures) into element sequences;
//! - [`display`] projects any resolved value into widget-ready text;
//! - [`node`] is the serde boundary for screen-tree nodes and the place
//!   where per-element scopes are built.
//!
//! Resolution is total: missing data degrades to fallbacks or empty
//! strings, never to an error.

#![forbid(unsafe_code)]

pub mod display;
pub mod node;
pub mod normalize;
pub mod path;
pub mod resolve;
pub mod scope;

pub use display::{format_for_display, OPAQUE_OBJECT, PREFERRED_KEYS};
pub use node::{child_scopes, ChildRef, ScreenNode};
pub use normalize::{normalize_alias, normalize_items};
pub use path::{get_value, normalize_reference};
pub use resolve::{as_binding, resolve_prop, resolve_reference, BindingRef};
pub use scope::{IterationFrame, ScopeStack, DEFAULT_ALIAS};
