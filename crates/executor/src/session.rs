//! Per-request invoke boundary.
//!
//! The [`Session`] owns one [`ScopeStack`] and turns an operation name plus
//! a command tree into a result written back into that tree.
//!
//! # Usage
//!
//! ```ignore
//! use sluice_executor::{Registry, Session, SluiceConfig};
//!
//! let registry = Arc::new(Registry::from_config(config)?);
//! let session = Session::new(registry);
//!
//! let mut tree = sluice_core::json::node_from_json("sqlite.read", &request)?;
//! session.invoke("sqlite.read", &mut tree)?;
//! // tree.children now holds one `.` node per row
//! ```

use std::sync::Arc;

use sluice_core::{Error, Node, Result};
use sluice_sql::{Dialect, Operation};
use tracing::{debug, warn};

use crate::executor::Executor;
use crate::registry::Registry;
use crate::scope::{ScopeGuard, ScopeOutcome, ScopeStack};
use crate::slot::{Slot, SlotKind, TRANSACTION_SCHEMA};

/// One request's view of the registry.
///
/// Not `Sync`. Nested invocations on the same connection alias (through the
/// `transaction` slot) share a single connection and transaction.
pub struct Session {
    registry: Arc<Registry>,
    scopes: ScopeStack,
    executor: Executor,
}

impl Session {
    /// Create a session with an empty scope stack.
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            scopes: ScopeStack::new(Arc::clone(&registry)),
            registry,
            executor: Executor::new(),
        }
    }

    /// Shared registry.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// This session's scope stack.
    pub fn scopes(&self) -> &ScopeStack {
        &self.scopes
    }

    /// Run `operation` (e.g. `"sqlite.read"`) with `tree` as its arguments.
    ///
    /// On success the tree holds the result: rows for a read, a summary for
    /// writes, or the SQL text and parameters in build-only mode. On failure
    /// the tree is left as it was.
    pub fn invoke(&self, operation: &str, tree: &mut Node) -> Result<()> {
        let slot = Slot::parse(operation)?;
        match slot.kind {
            SlotKind::Crud(op) => self.invoke_crud(slot.dialect, op, tree),
            SlotKind::Transaction => self.invoke_transaction(slot.dialect, tree),
        }
    }

    fn invoke_crud(&self, dialect: &'static dyn Dialect, op: Operation, tree: &mut Node) -> Result<()> {
        let built = sluice_sql::build(op, dialect, tree)?;
        if built.generate_only {
            debug!(target: "sluice::session", operation = op.name(), "build-only");
            built.statement.write_into(tree);
            return Ok(());
        }

        let mut guard = self.scopes.acquire(dialect, &built.connection)?;
        let result = guard.with_connection(|connection, dialect| {
            self.executor.execute(&built.statement, dialect, connection)
        });
        let outcome = finish(&mut guard, result)?;
        outcome.write_into(tree);
        Ok(())
    }

    /// Run every child of `commands` inside one scope on `connection`.
    ///
    /// Only commands on that alias share the transaction. A command naming
    /// another alias opens its own scope, which commits when that command
    /// finishes: a later failure rolls back the outer transaction but not
    /// writes already committed on the other alias.
    fn invoke_transaction(&self, dialect: &'static dyn Dialect, tree: &mut Node) -> Result<()> {
        TRANSACTION_SCHEMA.validate(tree)?;
        let connection = tree
            .child("connection")
            .and_then(Node::value_str)
            .ok_or_else(|| Error::MissingArgument {
                key: "connection".to_string(),
            })?
            .to_string();
        let position = tree
            .children
            .iter()
            .position(|c| c.name == "commands")
            .ok_or_else(|| Error::MissingArgument {
                key: "commands".to_string(),
            })?;

        let mut commands = tree.children[position].clone();
        let mut guard = self.scopes.acquire(dialect, &connection)?;
        let result = commands.children.iter_mut().try_for_each(|command| {
            let operation = command.name.clone();
            self.invoke(&operation, command)
        });
        finish(&mut guard, result)?;

        tree.children[position] = commands;
        Ok(())
    }
}

/// Release `guard` according to `result`; a failed release never masks the
/// original error.
fn finish<T>(guard: &mut ScopeGuard<'_>, result: Result<T>) -> Result<T> {
    match result {
        Ok(value) => {
            guard.release(ScopeOutcome::Success)?;
            Ok(value)
        }
        Err(e) => {
            if let Err(release) = guard.release(ScopeOutcome::Failure) {
                warn!(target: "sluice::session", error = %release, "release after failure also failed");
            }
            Err(e)
        }
    }
}
