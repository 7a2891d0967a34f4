//! Integration Tests
//!
//! End-to-end invocations against real SQLite files, organized by slot:
//! - read: filters, ordering, paging, joins
//! - write: create, update, delete and their summaries
//! - transactions: nested commands sharing one scope
//! - build_only: SQL returned instead of executed
//! - concurrency: sessions on several threads, pool limits

#[path = "../common/mod.rs"]
mod common;

mod build_only;
mod concurrency;
mod read;
mod transactions;
mod write;
