#![forbid(unsafe_code)]

//! Reactive variable store for server-driven UI screens.
//!
//! Screens are JSON trees of typed nodes whose properties may be literals
//! or bindings into a shared pool of named variables. This crate is the
//! pool: a single-writer, snapshot-based store with type inference at the
//! mutation boundary, structural-placeholder preservation, dependency
//! propagation, change subscriptions, and an ordered export format.
//!
//! Resolution of bindings against this store lives in the companion
//! `sdui-bind` crate; this crate never looks inside a reference string.
//!
//! # Model
//!
//! - [`Store`] owns an immutable [`StoreState`] snapshot; every mutation is
//!   a [`StoreAction`] applied by a pure reducer.
//! - [`Variable`] pairs a dynamic JSON value with an inferred [`VarType`]
//!   tag, a [`Source`] provenance, and a description.
//! - [`DependencyMap`] records parent → dependent edges; a write to a
//!   parent re-notifies every reachable dependent exactly once, cycles
//!   included.
//!
//! The engine never errors on data-shape problems — a partially-specified
//! screen must still resolve. The only boundary error is a blank variable
//! name ([`StoreError::EmptyName`]).

pub mod deps;
pub mod error;
pub mod export;
pub mod store;
pub mod value;
pub mod variable;

pub use deps::DependencyMap;
pub use error::StoreError;
pub use export::{export_variables, import_variables, VariableRecord};
pub use store::{reduce, Store, StoreAction, StoreEvent, StoreState, Subscription};
pub use value::{is_empty_placeholder, resolve_type, VarType};
pub use variable::{Source, Variable};
