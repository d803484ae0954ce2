//! `tablekv` is an in-process, transactional, memory-resident table store.
//! User-defined entity tables carry optional secondary indexes (value and
//! range-scan); the engine runs any number of parallel read-only
//! transactions against pinned snapshots alongside one serialized
//! read-write transaction, and publishes each write atomically across every
//! touched table. A small SQL frontend compiles `SELECT` and `UPDATE`
//! statements into executors over the same typed schema. [Author fengyang]
//!
//! Nothing is persisted: data larger than RAM, replication, and sharding
//! are out of scope.
//!
//! ## Getting started
//!
//! ```rust
//! use std::collections::HashMap;
//!
//! use tablekv::{
//!     CResult, Catalog, Engine, Entity, Error, ResultRecord, Schema, SqlEntity, SqlRow,
//!     Table, TableMeta, Value,
//! };
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Book {
//!     id: i32,
//!     quantity: i32,
//! }
//!
//! impl Entity for Book {
//!     type Key = i32;
//!
//!     fn primary_key(&self) -> i32 {
//!         self.id
//!     }
//! }
//!
//! impl SqlRow for Book {
//!     fn attribute(&self, name: &str) -> Option<Value> {
//!         match name {
//!             "Id" => Some(self.id.into()),
//!             "Quantity" => Some(self.quantity.into()),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! impl SqlEntity for Book {
//!     const ATTRIBUTES: &'static [&'static str] = &["Id", "Quantity"];
//!
//!     fn with_attribute(&self, name: &str, value: &Value) -> CResult<Self> {
//!         let mut next = self.clone();
//!         match name {
//!             "Id" => next.id = value.as_i32()?,
//!             "Quantity" => next.quantity = value.as_i32()?,
//!             _ => return Err(Error::value(format!("no attribute {name}"))),
//!         }
//!         Ok(next)
//!     }
//! }
//!
//! #[derive(Clone)]
//! struct Library {
//!     books: Table<Book>,
//! }
//!
//! impl Schema for Library {
//!     fn catalog() -> Catalog<Self> {
//!         Catalog::new()
//!             .table(TableMeta::new::<Book>("Books", |s| &s.books, |s| &mut s.books))
//!     }
//! }
//!
//! #[derive(Debug, PartialEq)]
//! struct BookView {
//!     id: i64,
//!     quantity: i64,
//! }
//!
//! impl ResultRecord for BookView {
//!     fn columns() -> &'static [&'static str] {
//!         &["Id", "Quantity"]
//!     }
//!
//!     fn from_values(values: &HashMap<&'static str, Value>) -> CResult<Self> {
//!         Ok(Self { id: values["Id"].as_i64()?, quantity: values["Quantity"].as_i64()? })
//!     }
//! }
//!
//! fn main() -> CResult<()> {
//!     let engine = Engine::new(Library { books: Table::new() });
//!
//!     engine.write_transaction(|ctx| {
//!         for id in 1..=3 {
//!             ctx.schema_mut().books.set(Book { id, quantity: 1 });
//!         }
//!         Ok(())
//!     })?;
//!
//!     let none = engine.execute_sql::<BookView>("UPDATE Books SET Quantity = 5 WHERE Id <= 2")?;
//!     assert!(none.is_none());
//!
//!     let rows =
//!         engine.query::<BookView>("SELECT Id, Quantity FROM Books WHERE Quantity = 5")?;
//!     assert_eq!(
//!         rows,
//!         vec![BookView { id: 1, quantity: 5 }, BookView { id: 2, quantity: 5 }],
//!     );
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod sql;
pub mod storage;
pub mod txn;

pub use crate::error::{CResult, Error};
pub use crate::sql::catalog::{Catalog, ResultRecord, Schema, SqlEntity, SqlRow, TableMeta};
pub use crate::sql::value::Value;
pub use crate::storage::index::{RangeIndex, ValueIndex};
pub use crate::storage::table::{Table, TableBuilder};
pub use crate::storage::{Entity, Status};
pub use crate::txn::{Engine, ReadContext, WriteContext};
