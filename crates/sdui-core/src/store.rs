//! The single-writer reactive variable store.
//!
//! All state lives in an immutable [`StoreState`] snapshot; every mutation
//! flows through one entry point ([`Store::dispatch`]) as a [`StoreAction`],
//! and the reducer is a pure `(state, action) -> state` function. The
//! [`Store`] wrapper owns the current snapshot, applies actions, notifies
//! subscribers, and runs dependency propagation eagerly before the
//! triggering call returns.
//!
//! # Invariants
//!
//! 1. **Single entry point**: nothing mutates a snapshot in place; the
//!    reducer always produces a fresh state.
//! 2. **No-op short-circuit**: an action whose resulting state equals the
//!    current one replaces nothing, emits nothing, and propagates nothing.
//! 3. **Structural preservation**: an empty placeholder never overwrites a
//!    structural (`list`/`object`) variable, unless an `action` write
//!    overrides a `binding` placeholder.
//! 4. **Ordering**: a name is appended to `variables_order` on first
//!    creation and removed only by explicit deletion or reorder.
//! 5. **Eager propagation**: after `set_variable` returns, every reachable
//!    dependent has been re-notified; a reader never observes a
//!    half-propagated store.
//! 6. Subscribers are notified in registration order, after the snapshot
//!    swap.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Blank variable name | Caller bug | `Err(StoreError::EmptyName)` |
//! | Delete of missing variable | Stale caller | No-op, no event |
//! | Dependency edge to missing variable | Deletion does not cascade | Skipped during propagation |
//! | Dependency cycle | Authoring wiring | Single visit per node, terminates |

use ahash::RandomState;
use serde_json::Value;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use tracing::{debug, trace};

use crate::deps::DependencyMap;
use crate::error::StoreError;
use crate::value::{is_empty_placeholder, resolve_type, VarType};
use crate::variable::{Source, Variable};

type Map<V> = HashMap<String, V, RandomState>;

// ---------------------------------------------------------------------------
// State snapshot and actions
// ---------------------------------------------------------------------------

/// Immutable snapshot of the variable store.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StoreState {
    variables: Map<Variable>,
    variables_order: Vec<String>,
    dependencies: DependencyMap,
}

impl StoreState {
    /// Look up a variable by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    /// The unordered name → variable mapping.
    #[must_use]
    pub fn variables(&self) -> &Map<Variable> {
        &self.variables
    }

    /// Declaration order, distinct from the mapping; presentational only.
    #[must_use]
    pub fn variables_order(&self) -> &[String] {
        &self.variables_order
    }

    /// The dependency edges.
    #[must_use]
    pub fn dependency_map(&self) -> &DependencyMap {
        &self.dependencies
    }

    /// Project the store into a plain JSON object (name → value) for the
    /// binding resolver's root context.
    #[must_use]
    pub fn context_value(&self) -> Value {
        let mut map = serde_json::Map::with_capacity(self.variables.len());
        for (name, var) in &self.variables {
            map.insert(name.clone(), var.value.clone());
        }
        Value::Object(map)
    }
}

/// One mutation of the store.
#[derive(Clone, Debug, PartialEq)]
pub enum StoreAction {
    /// Create or update a variable, applying inference and preservation.
    SetVariable {
        name: String,
        value: Value,
        ty: Option<VarType>,
        source: Option<Source>,
        description: Option<String>,
    },
    /// Remove a variable and its ordering entry. Dependency edges pointing
    /// at it are deliberately left in place.
    DeleteVariable { name: String },
    /// Replace the presentation order wholesale.
    ReorderVariables { order: Vec<String> },
    /// Record a parent → child dependency edge.
    RegisterDependency { parent: String, child: String },
    /// Remove a parent → child dependency edge.
    UnregisterDependency { parent: String, child: String },
}

impl StoreAction {
    fn validate(&self) -> Result<(), StoreError> {
        let blank = |s: &str| s.trim().is_empty();
        let ok = match self {
            Self::SetVariable { name, .. } | Self::DeleteVariable { name } => !blank(name),
            Self::ReorderVariables { .. } => true,
            Self::RegisterDependency { parent, child }
            | Self::UnregisterDependency { parent, child } => !blank(parent) && !blank(child),
        };
        if ok { Ok(()) } else { Err(StoreError::EmptyName) }
    }
}

/// Pure reducer: apply `action` to `state`, producing the next snapshot.
#[must_use]
pub fn reduce(state: &StoreState, action: &StoreAction) -> StoreState {
    let mut next = state.clone();
    match action {
        StoreAction::SetVariable {
            name,
            value,
            ty,
            source,
            description,
        } => {
            let record = resolve_record(state.get(name), value, *ty, *source, description.as_deref());
            if state.get(name).is_none() {
                next.variables_order.push(name.clone());
            }
            next.variables.insert(name.clone(), record);
        }
        StoreAction::DeleteVariable { name } => {
            next.variables.remove(name);
            next.variables_order.retain(|n| n != name);
        }
        StoreAction::ReorderVariables { order } => {
            next.variables_order = order.clone();
        }
        StoreAction::RegisterDependency { parent, child } => {
            next.dependencies.register(parent, child);
        }
        StoreAction::UnregisterDependency { parent, child } => {
            next.dependencies.unregister(parent, child);
        }
    }
    next
}

/// Resolve the record a `SetVariable` should store, applying type inference,
/// structural preservation, and the action-over-binding source priority.
fn resolve_record(
    existing: Option<&Variable>,
    value: &Value,
    ty: Option<VarType>,
    source: Option<Source>,
    description: Option<&str>,
) -> Variable {
    let new_source = source.unwrap_or_default();
    let incoming_empty = is_empty_placeholder(value);
    let action_overrides_binding = new_source == Source::Action
        && existing.is_some_and(|v| v.source == Source::Binding);

    let mut resolved_ty = resolve_type(ty, value);
    let stored_value = match existing {
        // Keep the collection a half-initialized binding would clobber.
        Some(kept) if kept.is_structural() && incoming_empty && !action_overrides_binding => {
            resolved_ty = kept.ty;
            kept.value.clone()
        }
        // A placeholder landing on a declared structural type becomes the
        // type's empty shell, keeping tag and shape in agreement.
        _ if incoming_empty && resolved_ty.is_structural() => resolved_ty.empty_value(),
        _ => value.clone(),
    };

    Variable {
        value: stored_value,
        ty: resolved_ty,
        source: new_source,
        description: description.unwrap_or_default().to_owned(),
    }
}

// ---------------------------------------------------------------------------
// Events and subscriptions
// ---------------------------------------------------------------------------

/// Change notification delivered to subscribers.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StoreEvent {
    /// A variable was created or changed by a direct write.
    Set { name: String },
    /// A variable was re-notified by dependency propagation. Emitted even
    /// when the re-issued record is an identical no-op; consumers use it as
    /// an invalidation signal.
    Propagated { name: String },
    /// A variable was removed.
    Deleted { name: String },
    /// The presentation order was replaced.
    Reordered,
}

type Callback = dyn Fn(&StoreEvent);

/// RAII guard for a store subscription; dropping it unsubscribes.
pub struct Subscription {
    _cb: Rc<Callback>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish()
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Owner of the current snapshot plus the subscriber list.
///
/// Single-threaded by design: mutations take `&mut self`, there are no
/// suspension points, and propagation completes before the mutating call
/// returns.
#[derive(Default)]
pub struct Store {
    state: StoreState,
    subscribers: Vec<Weak<Callback>>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("variables", &self.state.variables.len())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl Store {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current snapshot.
    #[must_use]
    pub fn state(&self) -> &StoreState {
        &self.state
    }

    /// Clone the current snapshot (cheap relative to re-resolution; used by
    /// consumers that need a stable view across their own async work).
    #[must_use]
    pub fn snapshot(&self) -> StoreState {
        self.state.clone()
    }

    /// Look up a variable by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.state.get(name)
    }

    /// The unordered name → variable mapping.
    #[must_use]
    pub fn variables(&self) -> &Map<Variable> {
        self.state.variables()
    }

    /// Declaration order of variable names.
    #[must_use]
    pub fn variables_order(&self) -> &[String] {
        self.state.variables_order()
    }

    /// The dependency edges.
    #[must_use]
    pub fn dependency_map(&self) -> &DependencyMap {
        self.state.dependency_map()
    }

    /// Project variables into a JSON object for the binding resolver.
    #[must_use]
    pub fn context_value(&self) -> Value {
        self.state.context_value()
    }

    /// Register an observer. The returned guard must be held; dropping it
    /// unsubscribes before the next notification cycle.
    #[must_use = "dropping the Subscription immediately unsubscribes"]
    pub fn subscribe(&mut self, callback: impl Fn(&StoreEvent) + 'static) -> Subscription {
        let cb: Rc<Callback> = Rc::new(callback);
        self.subscribers.push(Rc::downgrade(&cb));
        Subscription { _cb: cb }
    }

    fn emit(&mut self, event: &StoreEvent) {
        self.subscribers.retain(|weak| weak.strong_count() > 0);
        for weak in &self.subscribers {
            if let Some(cb) = weak.upgrade() {
                cb(event);
            }
        }
    }

    /// The single mutation entry point. Applies the action through the pure
    /// reducer; on an actual change, swaps the snapshot, notifies
    /// subscribers, and (for `SetVariable`) runs a propagation pass.
    pub fn dispatch(&mut self, action: StoreAction) -> Result<(), StoreError> {
        action.validate()?;
        let next = reduce(&self.state, &action);
        if next == self.state {
            trace!(?action, "store no-op short-circuit");
            return Ok(());
        }
        self.state = next;

        match &action {
            StoreAction::SetVariable { name, .. } => {
                debug!(name = %name, "variable set");
                self.emit(&StoreEvent::Set { name: name.clone() });
                self.propagate(name);
            }
            StoreAction::DeleteVariable { name } => {
                debug!(name = %name, "variable deleted");
                self.emit(&StoreEvent::Deleted { name: name.clone() });
            }
            StoreAction::ReorderVariables { .. } => {
                self.emit(&StoreEvent::Reordered);
            }
            StoreAction::RegisterDependency { .. }
            | StoreAction::UnregisterDependency { .. } => {}
        }
        Ok(())
    }

    /// Create or update a variable. `ty`, `source`, and `description` are
    /// optional exactly as at the authoring boundary; omissions mean
    /// inference, `manual`, and an empty description.
    pub fn set_variable(
        &mut self,
        name: impl Into<String>,
        value: Value,
        ty: Option<VarType>,
        source: Option<Source>,
        description: Option<&str>,
    ) -> Result<(), StoreError> {
        self.dispatch(StoreAction::SetVariable {
            name: name.into(),
            value,
            ty,
            source,
            description: description.map(str::to_owned),
        })
    }

    /// Shorthand for a manual write with full inference.
    pub fn set(&mut self, name: impl Into<String>, value: Value) -> Result<(), StoreError> {
        self.set_variable(name, value, None, None, None)
    }

    /// Remove a variable and its ordering entry. Dependency edges are left
    /// in place; propagation skips missing targets.
    pub fn delete_variable(&mut self, name: &str) -> Result<(), StoreError> {
        self.dispatch(StoreAction::DeleteVariable {
            name: name.to_owned(),
        })
    }

    /// Replace the presentation order wholesale. Has no effect on
    /// resolution.
    pub fn reorder_variables(&mut self, order: Vec<String>) -> Result<(), StoreError> {
        self.dispatch(StoreAction::ReorderVariables { order })
    }

    /// Record that `child` should be re-notified when `parent` changes.
    pub fn register_dependency(&mut self, parent: &str, child: &str) -> Result<(), StoreError> {
        self.dispatch(StoreAction::RegisterDependency {
            parent: parent.to_owned(),
            child: child.to_owned(),
        })
    }

    /// Remove a dependency edge; absent edges are a no-op.
    pub fn unregister_dependency(&mut self, parent: &str, child: &str) -> Result<(), StoreError> {
        self.dispatch(StoreAction::UnregisterDependency {
            parent: parent.to_owned(),
            child: child.to_owned(),
        })
    }

    /// Re-notify every dependent reachable from `name`, each exactly once.
    ///
    /// Each visit re-issues the dependent's current record through the
    /// reducer (normally an identical no-op) and force-emits
    /// [`StoreEvent::Propagated`]. Invoked automatically by `set_variable`;
    /// public so consumers can trigger an invalidation sweep by hand.
    pub fn propagate(&mut self, name: &str) {
        let order = self.state.dependencies.reachable_dependents(name);
        if !order.is_empty() {
            trace!(name = %name, dependents = order.len(), "propagating change");
        }
        for dependent in order {
            let Some(var) = self.state.get(&dependent).cloned() else {
                // Stale edge from a deleted variable; tolerated, skipped.
                continue;
            };
            let action = StoreAction::SetVariable {
                name: dependent.clone(),
                value: var.value,
                ty: Some(var.ty),
                source: Some(var.source),
                description: Some(var.description),
            };
            let next = reduce(&self.state, &action);
            if next != self.state {
                self.state = next;
            }
            self.emit(&StoreEvent::Propagated { name: dependent });
        }
    }
}
