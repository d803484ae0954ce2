pub mod index;
pub mod table;

use std::hash::Hash;

use serde_derive::{Deserialize, Serialize};

/// A stored row. Every entity carries a stable primary key of a totally
/// ordered, hashable type; the key must not change over the row's lifetime.
/// Rows are immutable values: a write replaces the row wholesale.
pub trait Entity: Send + Sync + 'static {
    /// The primary key type.
    type Key: Ord + Hash + Clone + Send + Sync + 'static;

    /// The primary key of this row.
    fn primary_key(&self) -> Self::Key;
}

/// 用于表示当前存储引擎的状态
///
/// Counts are derived from the schema's SQL catalog, so they cover exactly
/// the tables the `Schema` impl registered there. A schema that leaves the
/// catalog empty (the default) reports zeros even while its tables hold
/// rows.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Status {
    /// The number of catalog-registered tables.
    pub tables: u64,

    /// The number of live rows across the catalog-registered tables, as of
    /// one snapshot.
    pub rows: u64,
}
