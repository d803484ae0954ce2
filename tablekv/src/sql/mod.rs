//! A small SQL frontend over the typed schema.
//!
//! The dialect covers `SELECT` and `UPDATE`:
//!
//! ```text
//! query       := select | update
//! select      := 'SELECT' select_list [ 'FROM' table [ 'WHERE' logical ] ]
//! select_list := expr [ 'AS' ident ] (',' expr [ 'AS' ident ])*
//! update      := 'UPDATE' table 'SET' ident '=' expr (',' ident '=' expr)*
//!                [ 'WHERE' logical ]
//! logical     := comparisons over '=' '<>' '<' '<=' '>' '>=',
//!                'IS [NOT] NULL', combined with 'NOT' / 'AND' / 'OR'
//! ```
//!
//! Keywords and identifiers are case-insensitive; literals are integers and
//! floats. Statements compile against the schema's [`Catalog`](catalog::Catalog) into
//! reusable executors; compilation failures (unknown tables or columns,
//! unbindable result columns, arithmetic) surface before any transaction is
//! opened.

pub mod ast;
pub mod catalog;
pub mod parser;
pub(crate) mod plan;
pub mod token_kind;
pub mod tokenizer;
pub mod value;

use log::debug;

use crate::error::{CResult, Error};
use crate::sql::ast::Statement;
use crate::sql::catalog::{ResultRecord, Schema};
use crate::txn::Engine;

impl<S: Schema> Engine<S> {
    /// Parses, compiles, and runs one statement. A `SELECT` runs inside a
    /// read transaction and yields `Some(rows)`; an `UPDATE` runs inside a
    /// write transaction and yields `None`.
    pub fn execute_sql<R: ResultRecord>(&self, sql: &str) -> CResult<Option<Vec<R>>> {
        match parser::parse(sql)? {
            Statement::Select(select) => {
                let plan = plan::plan_select::<S, R>(self.catalog(), &select)?;
                let rows = self
                    .read_transaction(|ctx| plan::run_select(self.catalog(), &plan, ctx.schema()))?;
                Ok(Some(rows))
            }
            Statement::Update(update) => {
                let plan = plan::plan_update(self.catalog(), &update)?;
                let matched = self.write_transaction(|ctx| {
                    self.catalog().tables()[plan.table].apply_update(ctx.schema_mut(), &plan.update)
                })?;
                debug!("UPDATE matched {matched} rows");
                Ok(None)
            }
        }
    }

    /// Read-only entry point: runs a `SELECT` and returns its rows. Handed a
    /// write statement, it fails with [`Error::ReadOnly`] instead of opening
    /// a write transaction.
    pub fn query<R: ResultRecord>(&self, sql: &str) -> CResult<Vec<R>> {
        match parser::parse(sql)? {
            Statement::Select(select) => {
                let plan = plan::plan_select::<S, R>(self.catalog(), &select)?;
                self.read_transaction(|ctx| plan::run_select(self.catalog(), &plan, ctx.schema()))
            }
            Statement::Update(_) => Err(Error::ReadOnly("UPDATE".into())),
        }
    }

    /// Write-only entry point: runs an `UPDATE` and returns the matched-row
    /// count. Reads don't belong here; a `SELECT` is refused.
    pub fn execute(&self, sql: &str) -> CResult<u64> {
        match parser::parse(sql)? {
            Statement::Update(update) => {
                let plan = plan::plan_update(self.catalog(), &update)?;
                self.write_transaction(|ctx| {
                    self.catalog().tables()[plan.table].apply_update(ctx.schema_mut(), &plan.update)
                })
            }
            Statement::Select(_) => {
                Err(Error::NotImplemented("SELECT through the write-only entry point".into()))
            }
        }
    }
}
