//! Connection scope stack.
//!
//! A scope is one pooled connection with an open transaction, keyed by
//! `(dialect, alias)`. The first acquisition of a key owns the scope; later
//! acquisitions of the same key while it is live join it and share the
//! connection. Only the owner commits or rolls back.
//!
//! Guards must be released in reverse acquisition order. A release out of
//! order fails with `ScopeNestingViolation` and leaves the stack untouched.
//! A guard dropped without an explicit release is released as a failure.
//!
//! # Example
//!
//! ```ignore
//! let stack = ScopeStack::new(registry);
//! let mut outer = stack.acquire(&Sqlite, "main")?;   // owns: BEGIN
//! let mut inner = stack.acquire(&Sqlite, "main")?;   // joins
//! inner.release(ScopeOutcome::Success)?;              // no commit
//! outer.release(ScopeOutcome::Success)?;              // COMMIT
//! ```

use std::cell::RefCell;
use std::sync::Arc;

use sluice_core::{Error, Result};
use sluice_sql::Dialect;
use tracing::{error, info, warn};

use crate::connection::{Connection, PooledConnection};
use crate::registry::Registry;

/// How the work done under a guard ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeOutcome {
    /// Everything under the guard succeeded.
    Success,
    /// Something under the guard failed.
    Failure,
}

struct Scope {
    dialect: &'static dyn Dialect,
    alias: String,
    connection: Option<PooledConnection>,
    depth: usize,
    poisoned: bool,
}

impl Scope {
    fn matches(&self, dialect: &str, alias: &str) -> bool {
        self.dialect.name() == dialect && self.alias == alias
    }
}

#[derive(Default)]
struct StackState {
    scopes: Vec<Scope>,
    /// Tokens of live guards, in acquisition order.
    guards: Vec<u64>,
    next_token: u64,
    opened: usize,
}

/// Per-request stack of live connection scopes.
///
/// Not `Sync`: one stack serves one request on one thread.
pub struct ScopeStack {
    registry: Arc<Registry>,
    state: RefCell<StackState>,
}

impl ScopeStack {
    /// Empty stack over the registry's pools.
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            state: RefCell::new(StackState::default()),
        }
    }

    /// Join the live scope for `(dialect, alias)` or open a new one.
    pub fn acquire(&self, dialect: &'static dyn Dialect, alias: &str) -> Result<ScopeGuard<'_>> {
        {
            let mut state = self.state.borrow_mut();
            if let Some(index) = state
                .scopes
                .iter()
                .rposition(|s| s.matches(dialect.name(), alias))
            {
                state.scopes[index].depth += 1;
                let token = push_guard(&mut state);
                return Ok(ScopeGuard {
                    stack: self,
                    index,
                    token,
                    owner: false,
                    released: false,
                });
            }
        }

        let pool = self.registry.pool(dialect.name(), alias)?;
        let mut connection = pool.acquire()?;
        if let Err(e) = connection.begin() {
            connection.discard();
            return Err(e);
        }
        info!(target: "sluice::scope", dialect = dialect.name(), alias, "opened scope");

        let mut state = self.state.borrow_mut();
        state.opened += 1;
        state.scopes.push(Scope {
            dialect,
            alias: alias.to_string(),
            connection: Some(connection),
            depth: 1,
            poisoned: false,
        });
        let index = state.scopes.len() - 1;
        let token = push_guard(&mut state);
        Ok(ScopeGuard {
            stack: self,
            index,
            token,
            owner: true,
            released: false,
        })
    }

    /// Connections this stack has taken from pools.
    pub fn opened(&self) -> usize {
        self.state.borrow().opened
    }

    /// Live scopes.
    pub fn len(&self) -> usize {
        self.state.borrow().scopes.len()
    }

    /// Whether no scope is live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for ScopeStack {
    fn drop(&mut self) {
        // Only reachable when an out-of-order release was never repaired.
        for scope in self.state.get_mut().scopes.drain(..).rev() {
            error!(
                target: "sluice::scope",
                dialect = scope.dialect.name(),
                alias = %scope.alias,
                "scope left open; rolling back"
            );
            if let Some(mut connection) = scope.connection {
                if connection.rollback().is_err() {
                    connection.discard();
                }
            }
        }
    }
}

fn push_guard(state: &mut StackState) -> u64 {
    let token = state.next_token;
    state.next_token += 1;
    state.guards.push(token);
    token
}

/// Handle on one acquisition of a scope.
pub struct ScopeGuard<'s> {
    stack: &'s ScopeStack,
    index: usize,
    token: u64,
    owner: bool,
    released: bool,
}

impl ScopeGuard<'_> {
    /// Whether this guard opened the scope.
    pub fn is_owner(&self) -> bool {
        self.owner
    }

    /// Run `f` against the scope's connection.
    pub fn with_connection<R>(
        &self,
        f: impl FnOnce(&mut dyn Connection, &'static dyn Dialect) -> Result<R>,
    ) -> Result<R> {
        if self.released {
            return Err(Error::ScopeNestingViolation {
                reason: "guard already released".to_string(),
            });
        }
        let (mut connection, dialect) = {
            let mut state = self.stack.state.borrow_mut();
            let scope = &mut state.scopes[self.index];
            let connection = scope.connection.take().ok_or_else(|| Error::ScopeNestingViolation {
                reason: "scope connection is already in use".to_string(),
            })?;
            (connection, scope.dialect)
        };
        let result = {
            let mut checkout = DiscardOnUnwind(&mut connection);
            f(&mut *checkout.0, dialect)
        };
        self.stack.state.borrow_mut().scopes[self.index].connection = Some(connection);
        result
    }

    /// Release this acquisition.
    ///
    /// A joined guard only records failures. The owner pops the scope and
    /// commits on success, or rolls back on failure or when a joined guard
    /// failed; committing a poisoned scope is refused with `ExecutionFailed`.
    pub fn release(&mut self, outcome: ScopeOutcome) -> Result<()> {
        let mut state = self.stack.state.borrow_mut();
        if self.released {
            return Err(Error::ScopeNestingViolation {
                reason: "guard already released".to_string(),
            });
        }
        if state.guards.last() != Some(&self.token) {
            return Err(Error::ScopeNestingViolation {
                reason: "scopes must be released in reverse acquisition order".to_string(),
            });
        }
        state.guards.pop();
        self.released = true;

        if !self.owner {
            let scope = &mut state.scopes[self.index];
            scope.depth -= 1;
            if outcome == ScopeOutcome::Failure && !scope.poisoned {
                scope.poisoned = true;
                warn!(
                    target: "sluice::scope",
                    dialect = scope.dialect.name(),
                    alias = %scope.alias,
                    "joined command failed; scope will roll back"
                );
            }
            return Ok(());
        }

        let scope = state.scopes.pop().ok_or_else(|| Error::ScopeNestingViolation {
            reason: "scope stack is empty".to_string(),
        })?;
        drop(state);
        finalize(scope, outcome)
    }
}

/// A connection checked out of its scope. If the caller panics, the
/// transaction state is unknown, so the connection is closed rather than
/// returned to the pool.
struct DiscardOnUnwind<'c>(&'c mut PooledConnection);

impl Drop for DiscardOnUnwind<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.0.discard();
        }
    }
}

fn finalize(scope: Scope, outcome: ScopeOutcome) -> Result<()> {
    let Scope {
        dialect,
        alias,
        connection,
        poisoned,
        ..
    } = scope;
    let mut connection = connection.ok_or_else(|| Error::ScopeNestingViolation {
        reason: "scope connection is in use or was discarded".to_string(),
    })?;

    if outcome == ScopeOutcome::Success && !poisoned {
        return match connection.commit() {
            Ok(()) => {
                info!(target: "sluice::scope", dialect = dialect.name(), alias = %alias, "committed scope");
                Ok(())
            }
            Err(e) => {
                connection.discard();
                Err(e)
            }
        };
    }

    warn!(
        target: "sluice::scope",
        dialect = dialect.name(),
        alias = %alias,
        poisoned,
        "rolling back scope"
    );
    if let Err(e) = connection.rollback() {
        connection.discard();
        return Err(e);
    }
    if outcome == ScopeOutcome::Success {
        return Err(Error::execution(format!(
            "scope '{}' rolled back because a joined command failed",
            alias
        )));
    }
    Ok(())
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.release(ScopeOutcome::Failure) {
            error!(target: "sluice::scope", error = %e, "failed to release dropped scope guard");
        }
    }
}
