//! # storage-adapters
//!
//! Implementations of `domains::ThreadRepository`.
//! The in-memory store is always compiled; Postgres sits behind `db-postgres`.

pub mod memory;
#[cfg(feature = "db-postgres")]
pub mod postgres;

pub use memory::InMemoryThreadRepository;
#[cfg(feature = "db-postgres")]
pub use postgres::PostgresThreadRepository;
