//! Operation-name dispatch.
//!
//! Operation names have the form `<dialect>.<slot>`, e.g. `sqlite.read` or
//! `mssql.transaction`.

use sluice_core::{Error, Result};
use sluice_sql::schema::{Argument, ArgumentSchema, Shape};
use sluice_sql::{Dialect, Operation};

/// Schema of the `transaction` slot.
pub static TRANSACTION_SCHEMA: ArgumentSchema = ArgumentSchema::new(&[
    Argument::required("connection", Shape::Text),
    Argument::required("commands", Shape::Subtree),
]);

/// What an operation name dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    /// A CRUD builder.
    Crud(Operation),
    /// Several nested commands in one scope. Atomic only for commands on
    /// the transaction's own connection alias.
    Transaction,
}

/// A parsed operation name.
#[derive(Debug, Clone, Copy)]
pub struct Slot {
    /// Target dialect.
    pub dialect: &'static dyn Dialect,
    /// Dispatch target.
    pub kind: SlotKind,
}

impl Slot {
    /// Parse `<dialect>.<slot>`.
    pub fn parse(name: &str) -> Result<Self> {
        let unknown = || Error::UnknownOperation {
            name: name.to_string(),
        };
        let (prefix, slot) = name.split_once('.').ok_or_else(unknown)?;
        let dialect = sluice_sql::dialect::lookup(prefix).ok_or_else(unknown)?;
        let kind = match slot {
            "transaction" => SlotKind::Transaction,
            other => SlotKind::Crud(Operation::from_name(other).ok_or_else(unknown)?),
        };
        Ok(Self { dialect, kind })
    }

    /// Arguments this slot accepts.
    pub fn schema(&self) -> &'static ArgumentSchema {
        match self.kind {
            SlotKind::Crud(op) => op.builder().schema(),
            SlotKind::Transaction => &TRANSACTION_SCHEMA,
        }
    }
}
