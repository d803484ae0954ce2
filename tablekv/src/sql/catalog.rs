use std::collections::HashMap;

use crate::error::CResult;
use crate::sql::plan::BoundUpdate;
use crate::sql::value::Value;
use crate::storage::table::Table;
use crate::storage::Entity;

/// Row reflection: attribute access by canonical name. Object-safe, so the
/// executor can walk rows of any table behind one vtable.
pub trait SqlRow: Send + Sync {
    /// The attribute's value, or `None` when the entity has no such
    /// attribute. Names are matched exactly; the planner resolves query
    /// spellings to canonical ones before execution.
    fn attribute(&self, name: &str) -> Option<Value>;
}

/// A queryable entity: reflection plus the copy-and-override constructor the
/// UPDATE executor uses. Entities stay immutable values; an update builds a
/// whole replacement row and runs it through `Table::set`, which keeps the
/// secondary indexes honest.
pub trait SqlEntity: Entity + SqlRow + Clone + Sized {
    /// Canonical attribute names, in declaration order.
    const ATTRIBUTES: &'static [&'static str];

    /// A copy of the row with one attribute replaced. Fails when the value
    /// does not coerce to the attribute's type (narrowing `i64` to `i32` is
    /// fine while the value fits).
    fn with_attribute(&self, name: &str, value: &Value) -> CResult<Self>;
}

/// A query result row, constructed by column name, never by position, so a
/// reordered projection still binds.
pub trait ResultRecord: Sized {
    /// The columns this record wants filled.
    fn columns() -> &'static [&'static str];

    /// Builds the record from the values the executor gathered. The planner
    /// has already verified that every column in [`columns`](Self::columns)
    /// is bindable.
    fn from_values(values: &HashMap<&'static str, Value>) -> CResult<Self>;
}

/// Schema registration: the named table set the SQL planner resolves
/// against. The default catalog is empty, which is plenty for schemas that
/// are only used through typed transactions.
pub trait Schema: Clone + Send + Sync + 'static {
    fn catalog() -> Catalog<Self> {
        Catalog::new()
    }
}

type ScanFn<S> =
    Box<dyn for<'a> Fn(&'a S) -> Box<dyn Iterator<Item = &'a dyn SqlRow> + 'a> + Send + Sync>;
type UpdateFn<S> = Box<dyn Fn(&mut S, &BoundUpdate) -> CResult<u64> + Send + Sync>;

/// Descriptor for one named table: how the planner resolves names, and how
/// the executor reaches the storage without knowing the entity type.
pub struct TableMeta<S> {
    name: &'static str,
    attributes: &'static [&'static str],
    scan: ScanFn<S>,
    update: UpdateFn<S>,
}

impl<S: 'static> TableMeta<S> {
    /// Builds the descriptor from plain field accessors:
    ///
    /// ```ignore
    /// TableMeta::new::<Book>("Books", |s| &s.books, |s| &mut s.books)
    /// ```
    pub fn new<V: SqlEntity>(
        name: &'static str,
        read: fn(&S) -> &Table<V>,
        write: fn(&mut S) -> &mut Table<V>,
    ) -> Self {
        let scan: ScanFn<S> = Box::new(move |schema: &S| {
            Box::new(read(schema).iter().map(|(_, row)| row as &dyn SqlRow))
        });
        let update: UpdateFn<S> = Box::new(move |schema, update| {
            let table = write(schema);
            let keys: Vec<V::Key> = table.ids().cloned().collect();
            let mut matched = 0;
            for key in keys {
                let Some(row) = table.get(&key) else { continue };
                if !update.matches(row.as_ref()) {
                    continue;
                }
                let mut next = (*row).clone();
                for (column, expr) in update.assignments() {
                    let value = expr.evaluate(row.as_ref());
                    next = next.with_attribute(column, &value)?;
                }
                table.set(next);
                matched += 1;
            }
            Ok(matched)
        });
        Self { name, attributes: V::ATTRIBUTES, scan, update }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn attributes(&self) -> &'static [&'static str] {
        self.attributes
    }

    /// Resolves a column reference, case-insensitively, to its canonical
    /// spelling.
    pub fn resolve_column(&self, name: &str) -> Option<&'static str> {
        self.attributes.iter().copied().find(|a| a.eq_ignore_ascii_case(name))
    }

    /// All rows of this table within `schema`, in primary-key order.
    pub(crate) fn rows<'a>(&self, schema: &'a S) -> Box<dyn Iterator<Item = &'a dyn SqlRow> + 'a> {
        (self.scan)(schema)
    }

    /// Runs a bound UPDATE against `schema`, returning the matched-row
    /// count.
    pub(crate) fn apply_update(&self, schema: &mut S, update: &BoundUpdate) -> CResult<u64> {
        (self.update)(schema, update)
    }
}

/// The cached table descriptors for one schema type.
pub struct Catalog<S> {
    tables: Vec<TableMeta<S>>,
}

impl<S: 'static> Catalog<S> {
    pub fn new() -> Self {
        Self { tables: Vec::new() }
    }

    /// Registers a table descriptor. Builder-style, for `Schema::catalog`
    /// implementations.
    pub fn table(mut self, meta: TableMeta<S>) -> Self {
        self.tables.push(meta);
        self
    }

    /// Resolves a table reference, case-insensitively.
    pub(crate) fn resolve_table(&self, name: &str) -> Option<(usize, &TableMeta<S>)> {
        self.tables
            .iter()
            .enumerate()
            .find(|(_, meta)| meta.name().eq_ignore_ascii_case(name))
    }

    pub(crate) fn tables(&self) -> &[TableMeta<S>] {
        &self.tables
    }
}

impl<S: 'static> Default for Catalog<S> {
    fn default() -> Self {
        Self::new()
    }
}
