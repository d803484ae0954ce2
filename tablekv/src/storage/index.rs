use std::any::Any;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;
use std::marker::PhantomData;
use std::ops::RangeBounds;
use std::sync::Arc;

use crate::storage::Entity;

/// Handle to a value index attached to a [`Table`](crate::storage::table::Table).
///
/// The handle is a cheap copyable token; the index state itself lives inside
/// the table so that snapshots stay consistent. A handle is only meaningful
/// together with the table it was created on.
pub struct ValueIndex<S, V> {
    slot: usize,
    _marker: PhantomData<fn(&V) -> S>,
}

impl<S, V> ValueIndex<S, V> {
    pub(crate) fn new(slot: usize) -> Self {
        Self { slot, _marker: PhantomData }
    }

    pub(crate) fn slot(&self) -> usize {
        self.slot
    }
}

impl<S, V> Clone for ValueIndex<S, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, V> Copy for ValueIndex<S, V> {}

/// Handle to a range-scan index. Same contract as [`ValueIndex`], but the
/// underlying mapping is ordered by the extracted key, so bounded range
/// lookups are possible.
pub struct RangeIndex<S, V> {
    slot: usize,
    _marker: PhantomData<fn(&V) -> S>,
}

impl<S, V> RangeIndex<S, V> {
    pub(crate) fn new(slot: usize) -> Self {
        Self { slot, _marker: PhantomData }
    }

    pub(crate) fn slot(&self) -> usize {
        self.slot
    }
}

impl<S, V> Clone for RangeIndex<S, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, V> Copy for RangeIndex<S, V> {}

/// Index state as stored inside a table, erased over the secondary key type
/// so the table remains one cloneable value. Maintenance goes through the
/// erased vtable; lookups downcast back to the concrete state via a handle.
pub(crate) trait AnyIndex<V: Entity>: Send + Sync {
    fn insert(&mut self, row: &V);
    fn remove(&mut self, row: &V);
    fn boxed_clone(&self) -> Box<dyn AnyIndex<V>>;
    fn as_any(&self) -> &dyn Any;
}

/// Inverted mapping `extracted value -> set of primary keys`.
pub(crate) struct ValueIndexState<S, V: Entity> {
    extract: Arc<dyn Fn(&V) -> S + Send + Sync>,
    map: HashMap<S, HashSet<V::Key>>,
}

impl<S, V> ValueIndexState<S, V>
where
    S: Eq + Hash + Clone + Send + Sync + 'static,
    V: Entity,
{
    pub(crate) fn new(extract: impl Fn(&V) -> S + Send + Sync + 'static) -> Self {
        Self { extract: Arc::new(extract), map: HashMap::new() }
    }

    /// Primary keys whose extracted value equals `key`. Order unspecified.
    pub(crate) fn keys<'a>(&'a self, key: &S) -> impl Iterator<Item = &'a V::Key> + 'a {
        self.map.get(key).into_iter().flatten()
    }
}

impl<S, V> AnyIndex<V> for ValueIndexState<S, V>
where
    S: Eq + Hash + Clone + Send + Sync + 'static,
    V: Entity,
{
    fn insert(&mut self, row: &V) {
        self.map.entry((self.extract)(row)).or_default().insert(row.primary_key());
    }

    fn remove(&mut self, row: &V) {
        let secondary = (self.extract)(row);
        if let Some(keys) = self.map.get_mut(&secondary) {
            keys.remove(&row.primary_key());
            if keys.is_empty() {
                self.map.remove(&secondary);
            }
        }
    }

    fn boxed_clone(&self) -> Box<dyn AnyIndex<V>> {
        Box::new(Self { extract: self.extract.clone(), map: self.map.clone() })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Ordered mapping `extracted value -> set of primary keys`.
pub(crate) struct RangeIndexState<S, V: Entity> {
    extract: Arc<dyn Fn(&V) -> S + Send + Sync>,
    map: BTreeMap<S, HashSet<V::Key>>,
}

impl<S, V> RangeIndexState<S, V>
where
    S: Ord + Clone + Send + Sync + 'static,
    V: Entity,
{
    pub(crate) fn new(extract: impl Fn(&V) -> S + Send + Sync + 'static) -> Self {
        Self { extract: Arc::new(extract), map: BTreeMap::new() }
    }

    /// Primary keys whose extracted value lies within `bounds`, ascending by
    /// that value. Ordering among keys sharing one value is unspecified.
    pub(crate) fn keys_in<'a, B>(&'a self, bounds: B) -> impl Iterator<Item = &'a V::Key> + 'a
    where
        B: RangeBounds<S> + 'a,
    {
        self.map.range(bounds).flat_map(|(_, keys)| keys)
    }
}

impl<S, V> AnyIndex<V> for RangeIndexState<S, V>
where
    S: Ord + Clone + Send + Sync + 'static,
    V: Entity,
{
    fn insert(&mut self, row: &V) {
        self.map.entry((self.extract)(row)).or_default().insert(row.primary_key());
    }

    fn remove(&mut self, row: &V) {
        let secondary = (self.extract)(row);
        if let Some(keys) = self.map.get_mut(&secondary) {
            keys.remove(&row.primary_key());
            if keys.is_empty() {
                self.map.remove(&secondary);
            }
        }
    }

    fn boxed_clone(&self) -> Box<dyn AnyIndex<V>> {
        Box::new(Self { extract: self.extract.clone(), map: self.map.clone() })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
