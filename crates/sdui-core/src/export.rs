//! Ordered export and replay-based hydration of a variable set.
//!
//! Export walks `variables_order` first (the authoring surface's
//! presentation order), then any stragglers missing from the ordering,
//! alphabetically, so the dump is deterministic. Hydration replays the
//! records through `set_variable` in order, which re-applies inference and
//! structural preservation — a dump that captured an empty-placeholder
//! state over a structural type is normalized on the way back in rather
//! than reproduced byte-for-byte.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StoreError;
use crate::store::Store;
use crate::value::VarType;
use crate::variable::Source;

/// One persisted variable, in wire shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariableRecord {
    /// Unique variable name.
    pub name: String,
    /// The stored value.
    pub value: Value,
    /// Resolved type tag.
    #[serde(rename = "type")]
    pub ty: VarType,
    /// Provenance of the value.
    #[serde(default)]
    pub source: Source,
    /// Author-facing description.
    #[serde(default)]
    pub description: String,
}

/// Dump the store's variables as an ordered record sequence.
#[must_use]
pub fn export_variables(store: &Store) -> Vec<VariableRecord> {
    let mut records = Vec::with_capacity(store.variables().len());
    let mut seen: Vec<&str> = Vec::with_capacity(store.variables().len());

    for name in store.variables_order() {
        if let Some(var) = store.get(name) {
            seen.push(name);
            records.push(VariableRecord {
                name: name.clone(),
                value: var.value.clone(),
                ty: var.ty,
                source: var.source,
                description: var.description.clone(),
            });
        }
    }

    // Variables missing from the ordering (imports from older dumps) come
    // last, alphabetically, to keep the output deterministic.
    let mut stragglers: Vec<&String> = store
        .variables()
        .keys()
        .filter(|name| !seen.contains(&name.as_str()))
        .collect();
    stragglers.sort();
    for name in stragglers {
        let var = &store.variables()[name];
        records.push(VariableRecord {
            name: name.clone(),
            value: var.value.clone(),
            ty: var.ty,
            source: var.source,
            description: var.description.clone(),
        });
    }
    records
}

/// Replay `records` into `store` through the normal mutation entry point.
pub fn import_variables(
    store: &mut Store,
    records: impl IntoIterator<Item = VariableRecord>,
) -> Result<(), StoreError> {
    for record in records {
        store.set_variable(
            record.name,
            record.value,
            Some(record.ty),
            Some(record.source),
            Some(&record.description),
        )?;
    }
    Ok(())
}
