//! Error types for command compilation and execution.
//!
//! All failures surfaced at the invoke boundary are represented by the
//! [`Error`] enum. These errors are:
//! - **Structured**: Each variant has typed fields for error details
//! - **Serializable**: Can be converted to/from JSON for transport layers

use serde::{Deserialize, Serialize};

/// Command errors.
///
/// # Categories
///
/// | Category | Variants | Raised |
/// |----------|----------|--------|
/// | Validation | `UnknownArgument`, `MissingArgument`, `InvalidArgumentShape` | before compilation |
/// | Compile | `InvalidIdentifier`, `UnsupportedOperator`, `EmptyWhereGroup` | while compiling |
/// | Dispatch | `UnknownOperation`, `UnknownConnection`, `NoConnector` | before any connection |
/// | Scope | `ScopeNestingViolation` | programming error |
/// | Runtime | `ExecutionFailed`, `PoolExhausted` | against the database |
/// | Config | `Config` | loading configuration |
///
/// # Example
///
/// ```ignore
/// match session.invoke("sqlite.read", &mut tree) {
///     Ok(()) => { /* tree now holds the rows */ }
///     Err(Error::MissingArgument { key }) => eprintln!("missing '{}'", key),
///     Err(e) => eprintln!("error: {}", e),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum Error {
    // ==================== Validation ====================
    /// Top-level key not accepted by the operation
    #[error("unknown argument: {key}")]
    UnknownArgument { key: String },

    /// Required top-level key not supplied
    #[error("missing argument: {key}")]
    MissingArgument { key: String },

    /// Argument present but of the wrong shape
    #[error("invalid argument '{key}': {reason}")]
    InvalidArgumentShape { key: String, reason: String },

    // ==================== Compile ====================
    /// Table or column name fails the identifier grammar
    #[error("invalid identifier: {identifier:?}")]
    InvalidIdentifier { identifier: String },

    /// Where leaf names an operator the compiler does not know
    #[error("unsupported operator: {operator}")]
    UnsupportedOperator { operator: String },

    /// Logical group (`and`/`or`/`not`) without children
    #[error("empty '{logical}' group in where clause")]
    EmptyWhereGroup { logical: String },

    // ==================== Dispatch ====================
    /// Operation name does not resolve to a dialect and slot
    #[error("unknown operation: {name}")]
    UnknownOperation { name: String },

    /// Connection alias not present in configuration
    #[error("unknown connection '{alias}' for dialect {dialect}")]
    UnknownConnection { dialect: String, alias: String },

    /// No driver registered for the dialect
    #[error("no connector registered for dialect {dialect}")]
    NoConnector { dialect: String },

    // ==================== Scope ====================
    /// Scope released out of acquisition order
    #[error("scope nesting violation: {reason}")]
    ScopeNestingViolation { reason: String },

    // ==================== Runtime ====================
    /// Database-level failure, carrying the driver's diagnostic text
    #[error("execution failed: {reason}")]
    ExecutionFailed { reason: String },

    /// Pool had no free connection within the acquire timeout
    #[error("no connection available for '{alias}' within {waited_ms}ms")]
    PoolExhausted { alias: String, waited_ms: u64 },

    // ==================== Config ====================
    /// Configuration could not be read or parsed
    #[error("config error: {reason}")]
    Config { reason: String },
}

impl Error {
    /// Shorthand for [`Error::InvalidArgumentShape`].
    pub fn shape(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidArgumentShape {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`Error::ExecutionFailed`].
    pub fn execution(reason: impl std::fmt::Display) -> Self {
        Error::ExecutionFailed {
            reason: reason.to_string(),
        }
    }

    /// True for errors raised before any connection was touched.
    ///
    /// Such errors leave no state behind to clean up.
    pub fn is_pre_execution(&self) -> bool {
        matches!(
            self,
            Error::UnknownArgument { .. }
                | Error::MissingArgument { .. }
                | Error::InvalidArgumentShape { .. }
                | Error::InvalidIdentifier { .. }
                | Error::UnsupportedOperator { .. }
                | Error::EmptyWhereGroup { .. }
                | Error::UnknownOperation { .. }
                | Error::UnknownConnection { .. }
                | Error::NoConnector { .. }
                | Error::Config { .. }
        )
    }
}

/// Result type for Sluice operations
pub type Result<T> = std::result::Result<T, Error>;
