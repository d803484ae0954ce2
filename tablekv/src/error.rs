use thiserror::Error;

/// Result alias used across the crate.
pub type CResult<T> = std::result::Result<T, Error>;

/// Everything that can go wrong between a SQL string and a published
/// transaction. Planner errors (`UnknownTable`, `UnknownColumn`,
/// `ColumnBinding`, `NotImplemented`) always surface before a transaction is
/// opened, so the engine state is untouched when they do.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum Error {
    /// The statement text could not be tokenized or parsed. `pos` is a byte
    /// offset into the statement.
    #[error("parse error at offset {pos}: {msg}")]
    Parse { pos: usize, msg: String },

    #[error("unknown table '{0}'")]
    UnknownTable(String),

    #[error("unknown column '{column}' in table '{table}'")]
    UnknownColumn { table: String, column: String },

    /// A result column could be filled neither by a projected expression nor
    /// by a same-named entity attribute.
    #[error("cannot bind result column '{0}'")]
    ColumnBinding(String),

    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// A write statement reached a read-only execution path.
    #[error("read-only execution cannot run {0}")]
    ReadOnly(String),

    /// Row reflection or value coercion failed.
    #[error("value error: {0}")]
    Value(String),

    /// A transaction callback gave up. The working copy was discarded; the
    /// published state is the pre-transaction snapshot.
    #[error("transaction aborted: {0}")]
    Callback(String),
}

impl Error {
    pub fn parse(pos: usize, msg: impl Into<String>) -> Self {
        Error::Parse { pos, msg: msg.into() }
    }

    pub fn value(msg: impl Into<String>) -> Self {
        Error::Value(msg.into())
    }

    /// Aborts the surrounding write transaction with an application reason.
    pub fn callback(msg: impl Into<String>) -> Self {
        Error::Callback(msg.into())
    }
}
