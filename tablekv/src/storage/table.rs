use std::collections::BTreeMap;
use std::hash::Hash;
use std::ops::RangeBounds;
use std::sync::Arc;

use crate::storage::index::{
    AnyIndex, RangeIndex, RangeIndexState, ValueIndex, ValueIndexState,
};
use crate::storage::Entity;

/// A primary-key table: mapping from key to row, plus the state of every
/// attached secondary index.
///
/// Rows are immutable values shared out as `Arc`; replacing a row re-derives
/// all of its index entries. The table itself is a plain cloneable value:
/// the transaction engine clones it for a write transaction's working copy
/// and publishes the result atomically, so none of the methods here know
/// anything about concurrency.
///
/// Indexes are attached through [`TableBuilder`], which is consumed before
/// the table exists. A built table carries no attachment methods at all, so
/// the index set is fixed for the table's lifetime; a write transaction can
/// reach a table mutably but can only ever touch rows.
pub struct Table<V: Entity> {
    rows: BTreeMap<V::Key, Arc<V>>,
    indexes: Vec<Box<dyn AnyIndex<V>>>,
}

impl<V: Entity> Clone for Table<V> {
    fn clone(&self) -> Self {
        Self {
            rows: self.rows.clone(),
            indexes: self.indexes.iter().map(|index| index.boxed_clone()).collect(),
        }
    }
}

impl<V: Entity> Default for Table<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Entity> Table<V> {
    /// Creates an empty table with no indexes.
    pub fn new() -> Self {
        Self { rows: BTreeMap::new(), indexes: Vec::new() }
    }

    /// Starts building a table that carries secondary indexes.
    pub fn builder() -> TableBuilder<V> {
        TableBuilder { indexes: Vec::new() }
    }

    /// The row for `key`, if present. Absence is not an error.
    pub fn get(&self, key: &V::Key) -> Option<Arc<V>> {
        self.rows.get(key).cloned()
    }

    pub fn contains(&self, key: &V::Key) -> bool {
        self.rows.contains_key(key)
    }

    /// Inserts or replaces the row keyed by its primary key. The old row's
    /// index entries are removed before the new ones are added, so every
    /// attached index stays in lockstep with the rows.
    pub fn set(&mut self, row: V) {
        let key = row.primary_key();
        if let Some(old) = self.rows.get(&key) {
            for index in &mut self.indexes {
                index.remove(old);
            }
        }
        let row = Arc::new(row);
        for index in &mut self.indexes {
            index.insert(&row);
        }
        self.rows.insert(key, row);
    }

    /// Removes the row and all index entries derived from it. Returns
    /// whether a row was present. Deletes are idempotent.
    pub fn delete(&mut self, key: &V::Key) -> bool {
        match self.rows.remove(key) {
            Some(old) => {
                for index in &mut self.indexes {
                    index.remove(&old);
                }
                true
            }
            None => false,
        }
    }

    /// Lazy sequence of primary keys in ascending key order. The order is
    /// stable for the lifetime of the snapshot the table belongs to.
    pub fn ids(&self) -> impl Iterator<Item = &V::Key> {
        self.rows.keys()
    }

    /// Iterates rows in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (&V::Key, &V)> {
        self.rows.iter().map(|(key, row)| (key, row.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows whose extracted value equals `key`, via a value index. Order
    /// unspecified.
    pub fn find<S>(&self, index: &ValueIndex<S, V>, key: &S) -> Vec<Arc<V>>
    where
        S: Eq + Hash + Clone + Send + Sync + 'static,
    {
        self.value_state(index)
            .keys(key)
            .filter_map(|id| self.rows.get(id))
            .cloned()
            .collect()
    }

    /// Rows whose extracted value lies within `bounds`, via a range index,
    /// ascending by the extracted value.
    pub fn range<S, B>(&self, index: &RangeIndex<S, V>, bounds: B) -> Vec<Arc<V>>
    where
        S: Ord + Clone + Send + Sync + 'static,
        B: RangeBounds<S>,
    {
        self.range_state(index)
            .keys_in(bounds)
            .filter_map(|id| self.rows.get(id))
            .cloned()
            .collect()
    }

    fn value_state<S>(&self, index: &ValueIndex<S, V>) -> &ValueIndexState<S, V>
    where
        S: Eq + Hash + Clone + Send + Sync + 'static,
    {
        self.indexes
            .get(index.slot())
            .and_then(|state| state.as_any().downcast_ref())
            .unwrap_or_else(|| panic!("value index handle does not belong to this table"))
    }

    fn range_state<S>(&self, index: &RangeIndex<S, V>) -> &RangeIndexState<S, V>
    where
        S: Ord + Clone + Send + Sync + 'static,
    {
        self.indexes
            .get(index.slot())
            .and_then(|state| state.as_any().downcast_ref())
            .unwrap_or_else(|| panic!("range index handle does not belong to this table"))
    }
}

/// Schema-construction-time half of a [`Table`]: the only place where
/// secondary indexes can be attached. `build` consumes the builder, and the
/// resulting table's index set never changes again; by the time an engine
/// serves its first transaction there is nothing left to attach with.
pub struct TableBuilder<V: Entity> {
    indexes: Vec<Box<dyn AnyIndex<V>>>,
}

impl<V: Entity> TableBuilder<V> {
    /// Attaches an inverted index derived from `extract` and returns its
    /// handle, for the schema to keep next to the built table.
    pub fn add_value_index<S>(
        &mut self,
        extract: impl Fn(&V) -> S + Send + Sync + 'static,
    ) -> ValueIndex<S, V>
    where
        S: Eq + Hash + Clone + Send + Sync + 'static,
    {
        let slot = self.indexes.len();
        self.indexes.push(Box::new(ValueIndexState::new(extract)));
        ValueIndex::new(slot)
    }

    /// Attaches an ordered index derived from `extract` and returns its
    /// handle.
    pub fn add_range_index<S>(
        &mut self,
        extract: impl Fn(&V) -> S + Send + Sync + 'static,
    ) -> RangeIndex<S, V>
    where
        S: Ord + Clone + Send + Sync + 'static,
    {
        let slot = self.indexes.len();
        self.indexes.push(Box::new(RangeIndexState::new(extract)));
        RangeIndex::new(slot)
    }

    /// Finishes construction. The table starts empty; rows arrive through
    /// `set` and are indexed as they do.
    pub fn build(self) -> Table<V> {
        Table { rows: BTreeMap::new(), indexes: self.indexes }
    }
}
