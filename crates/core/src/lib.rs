//! Core types for Sluice
//!
//! This crate defines the foundational types shared by the compiler and the
//! executor:
//! - Value: Closed scalar value enum
//! - Node: The hierarchical command tree describing one CRUD request
//! - Error: Error taxonomy surfaced at the invoke boundary
//! - json: Mapping between command trees and plain JSON

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod json;
pub mod node;
pub mod value;

pub use error::{Error, Result};
pub use node::{Node, ANONYMOUS};
pub use value::Value;
