//! The address-scoped storage that one invocation batch works against.

use std::collections::HashMap;
use std::sync::RwLock;

use statefun_proto::request_reply::from_function::persisted_value_mutation::MutationType;
use statefun_proto::request_reply::from_function::{PersistedValueMutation, PersistedValueSpec};
use statefun_proto::request_reply::to_function::{InvocationBatchRequest, PersistedValue};
use statefun_proto::request_reply::TypedValue;

use crate::ValueSpec;

/// One mutable working-set slot, wrapping the typed value of a registered
/// spec plus a flag recording whether the batch wrote to it.
#[derive(Debug)]
struct Cell {
    typename: String,
    has_value: bool,
    bytes: Vec<u8>,
    mutated: bool,
}

impl Cell {
    fn from_persisted(state: &PersistedValue) -> Cell {
        match &state.state_value {
            Some(value) => Cell {
                typename: value.typename.clone(),
                has_value: value.has_value,
                bytes: value.value.clone(),
                mutated: false,
            },
            None => Cell {
                typename: String::new(),
                has_value: false,
                bytes: Vec::new(),
                mutated: false,
            },
        }
    }

    /// The mutation this cell contributes to the response, if any. Unmutated
    /// cells contribute nothing; mutated ones exactly one entry reflecting
    /// their final value.
    fn into_state_mutation(self, name: String) -> Option<PersistedValueMutation> {
        if !self.mutated {
            return None;
        }

        let mutation_type = if self.has_value {
            MutationType::Modify
        } else {
            MutationType::Delete
        };

        Some(PersistedValueMutation {
            mutation_type: mutation_type as i32,
            state_name: name,
            state_value: Some(TypedValue {
                typename: self.typename,
                has_value: self.has_value,
                value: self.bytes,
            }),
        })
    }
}

/// Storage scoped to the address of the function instance under invocation,
/// holding one [Cell] per registered value spec provided by the runtime.
///
/// `get` is a reader, `set` and `remove` are writers; helpers spawned by a
/// handler may use the storage concurrently. Passing a spec that was never
/// registered on the function is a programmer error and panics.
pub struct AddressScopedStorage {
    cells: RwLock<HashMap<String, Cell>>,
}

impl AddressScopedStorage {
    /// Returns the value persisted under the given spec, or `None` if the
    /// cell is currently absent-valued.
    pub fn get<T>(&self, spec: &ValueSpec<T>) -> Option<T> {
        let cells = self.cells.read().unwrap();

        let cell = match cells.get(spec.name()) {
            Some(cell) => cell,
            None => panic!("unregistered ValueSpec {}", spec.name()),
        };

        if !cell.has_value {
            return None;
        }

        match spec.value_type.deserialize(&mut cell.bytes.as_slice()) {
            Ok(value) => Some(value),
            Err(err) => panic!("failed to deserialize state {}: {}", spec.name(), err),
        }
    }

    /// Persists `value` under the given spec.
    pub fn set<T>(&self, spec: &ValueSpec<T>, value: &T) {
        let mut cells = self.cells.write().unwrap();

        let cell = match cells.get_mut(spec.name()) {
            Some(cell) => cell,
            None => panic!("unregistered ValueSpec {}", spec.name()),
        };

        let mut bytes = Vec::new();
        if let Err(err) = spec.value_type.serialize(&mut bytes, value) {
            panic!("failed to serialize state {}: {}", spec.name(), err);
        }

        cell.bytes = bytes;
        cell.has_value = true;
        cell.mutated = true;
    }

    /// Removes the value persisted under the given spec.
    pub fn remove<T>(&self, spec: &ValueSpec<T>) {
        let mut cells = self.cells.write().unwrap();

        let cell = match cells.get_mut(spec.name()) {
            Some(cell) => cell,
            None => panic!("unregistered ValueSpec {}", spec.name()),
        };

        cell.bytes.clear();
        cell.has_value = false;
        cell.mutated = true;
    }

    /// Drains the storage into its mutation diff: one `MODIFY` or `DELETE`
    /// entry per mutated cell, nothing for untouched ones.
    pub(crate) fn into_state_mutations(self) -> Vec<PersistedValueMutation> {
        self.cells
            .into_inner()
            .unwrap()
            .into_iter()
            .filter_map(|(name, cell)| cell.into_state_mutation(name))
            .collect()
    }
}

/// Builds the storage for a batch, or reports the registered specs the
/// runtime failed to provide. In the latter case the batch must not execute;
/// the missing specs go back to the runtime so it can provision them and
/// retry.
pub(crate) enum StorageFactory {
    Ready(AddressScopedStorage),
    MissingSpecs(Vec<PersistedValueSpec>),
}

impl StorageFactory {
    pub(crate) fn new(
        batch: &InvocationBatchRequest,
        specs: &HashMap<String, PersistedValueSpec>,
    ) -> StorageFactory {
        let mut cells = HashMap::with_capacity(specs.len());
        let mut missing = specs.clone();

        for state in &batch.state {
            if missing.remove(&state.state_name).is_none() {
                // Provided but not registered; not ours to touch.
                continue;
            }

            cells.insert(state.state_name.clone(), Cell::from_persisted(state));
        }

        if missing.is_empty() {
            StorageFactory::Ready(AddressScopedStorage {
                cells: RwLock::new(cells),
            })
        } else {
            StorageFactory::MissingSpecs(missing.into_iter().map(|(_, spec)| spec).collect())
        }
    }
}
