//! The transactional core: one writer at a time, any number of readers, and
//! copy-on-write publication of whole-schema snapshots.
//!
//!
//! SNAPSHOTS
//! =========
//! The engine keeps the entire schema (every table together with its index
//! state) behind a single atomic pointer. That pointer is the publication
//! epoch: readers pin it once when their transaction starts and keep reading
//! from the pinned value, so a reader observes every table at the same
//! logical instant even for tables it first touches late in its run.
//!
//! A write transaction takes the exclusive writer lock, clones the current
//! schema value into a private working copy, and runs the caller's callback
//! against that copy. Row payloads are `Arc`-shared, so the clone copies the
//! key maps but not the rows themselves. Two outcomes:
//!
//! * the callback returns `Ok`: the engine swings the pointer to the working
//!   copy in one atomic store. Readers starting afterwards see all of the
//!   transaction's effects; readers already running see none of them.
//! * the callback returns `Err` (or panics): the working copy is dropped and
//!   the pointer is never touched. Observable state is exactly the
//!   pre-transaction snapshot. There is no rollback because there is nothing
//!   to roll back.
//!
//! Cross-table atomicity falls out of the single pointer: a transaction that
//! writes tables A and B publishes both in the same store, so no reader can
//! ever catch A updated and B stale.
//!
//!
//! ISOLATION
//! =========
//! Readers get snapshot isolation; writers are serialized by the writer lock
//! and therefore trivially serializable. Readers never take a lock, so:
//!
//!   Writers don't block readers.
//!   Readers don't block writers.
//!
//! There are no timeouts: a callback that never returns holds the writer
//! lock indefinitely. Keep transactions short.

use std::sync::Arc;

use arc_swap::ArcSwap;
use log::trace;
use parking_lot::Mutex;

use crate::error::CResult;
use crate::sql::catalog::{Catalog, Schema};
use crate::storage::Status;
use crate::txn::context::{ReadContext, WriteContext};

/// A transactional table store over a user-defined schema.
///
/// The engine owns all tables and indexes for its lifetime; the schema is
/// fixed at construction and transaction contexts hand out transient access
/// to it. The engine is `Sync`: share it by reference or `Arc` across
/// threads.
pub struct Engine<S: Schema> {
    /// The published snapshot. Swapped wholesale on each write publication.
    published: ArcSwap<S>,

    /// Serializes write transactions. Readers never touch it.
    writer: Mutex<()>,

    /// SQL metadata, derived once from the schema type and cached.
    catalog: Catalog<S>,
}

impl<S: Schema> Engine<S> {
    /// Binds a schema instance. Tables and indexes are fixed from here on:
    /// index attachment only exists on [`TableBuilder`], and every builder
    /// was consumed to produce the tables now inside `schema`.
    ///
    /// [`TableBuilder`]: crate::storage::table::TableBuilder
    pub fn new(schema: S) -> Self {
        Self {
            published: ArcSwap::from_pointee(schema),
            writer: Mutex::new(()),
            catalog: S::catalog(),
        }
    }

    pub(crate) fn catalog(&self) -> &Catalog<S> {
        &self.catalog
    }

    /// Runs `f` against the snapshot current at call time and returns its
    /// result. Any number of read transactions may run concurrently with
    /// each other and with one writer; none of them block.
    pub fn read_transaction<T>(&self, f: impl FnOnce(&ReadContext<S>) -> T) -> T {
        let ctx = ReadContext::new(self.published.load_full());
        f(&ctx)
    }

    /// Runs `f` against a private working copy under the exclusive writer
    /// lock. On `Ok` the copy is published in a single atomic step; on `Err`
    /// it is dropped and the published state is untouched.
    pub fn write_transaction<T>(
        &self,
        f: impl FnOnce(&mut WriteContext<S>) -> CResult<T>,
    ) -> CResult<T> {
        let _writer = self.writer.lock();
        let working = (*self.published.load_full()).clone();
        let mut ctx = WriteContext::new(working);
        let out = f(&mut ctx)?;
        self.published.store(Arc::new(ctx.into_inner()));
        trace!("write transaction published");
        Ok(out)
    }

    /// A point-in-time report over the current snapshot. The engine has no
    /// reflective view of the schema type itself, so the report covers the
    /// tables registered in the schema's SQL catalog; with an empty catalog
    /// (the `Schema::catalog` default) every count is zero.
    pub fn status(&self) -> Status {
        let snapshot = self.published.load_full();
        let tables = self.catalog.tables();
        Status {
            tables: tables.len() as u64,
            rows: tables.iter().map(|meta| meta.rows(&snapshot).count() as u64).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::sql::catalog::Schema;
    use crate::storage::table::Table;
    use crate::storage::Entity;
    use crate::txn::engine::Engine;

    #[derive(Clone, Debug, PartialEq)]
    struct Account {
        id: u32,
        balance: i64,
    }

    impl Entity for Account {
        type Key = u32;

        fn primary_key(&self) -> u32 {
            self.id
        }
    }

    #[derive(Clone)]
    struct Bank {
        accounts: Table<Account>,
    }

    impl Schema for Bank {}

    fn bank() -> Bank {
        Bank { accounts: Table::new() }
    }

    #[test]
    fn write_then_read_round_trip() {
        let engine = Engine::new(bank());

        engine
            .write_transaction(|ctx| {
                ctx.schema_mut().accounts.set(Account { id: 1, balance: 10 });
                Ok(())
            })
            .unwrap();

        let balance = engine
            .read_transaction(|ctx| ctx.schema().accounts.get(&1).map(|a| a.balance));
        assert_eq!(balance, Some(10));
    }

    #[test]
    fn failed_write_publishes_nothing() {
        let engine = Engine::new(bank());
        engine
            .write_transaction(|ctx| {
                ctx.schema_mut().accounts.set(Account { id: 1, balance: 10 });
                Ok(())
            })
            .unwrap();

        // Mutations before the failure point must not leak out.
        let result = engine.write_transaction(|ctx| {
            ctx.schema_mut().accounts.set(Account { id: 1, balance: -5 });
            ctx.schema_mut().accounts.set(Account { id: 2, balance: 1 });
            Err::<(), _>(Error::callback("balance went negative"))
        });
        assert_eq!(result, Err(Error::callback("balance went negative")));

        engine.read_transaction(|ctx| {
            assert_eq!(ctx.schema().accounts.get(&1).map(|a| a.balance), Some(10));
            assert!(!ctx.schema().accounts.contains(&2));
        });
    }

    #[test]
    fn readers_keep_their_snapshot() {
        let engine = Engine::new(bank());
        engine
            .write_transaction(|ctx| {
                ctx.schema_mut().accounts.set(Account { id: 1, balance: 10 });
                Ok(())
            })
            .unwrap();

        // A reader pins its snapshot at start; a write published while it
        // runs stays invisible to it, but is visible to later readers.
        engine.read_transaction(|ctx| {
            engine
                .write_transaction(|w| {
                    w.schema_mut().accounts.set(Account { id: 1, balance: 99 });
                    Ok(())
                })
                .unwrap();
            assert_eq!(ctx.schema().accounts.get(&1).map(|a| a.balance), Some(10));
        });
        engine.read_transaction(|ctx| {
            assert_eq!(ctx.schema().accounts.get(&1).map(|a| a.balance), Some(99));
        });
    }
}
