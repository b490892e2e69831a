//! SQLite persistence for the correspondence sync engine.
//!
//! All writes funnel through a single writer actor that wraps each job in an
//! immediate transaction; reads go straight to the connection pool.

pub mod correspondence;
pub mod db;
pub mod errors;
pub mod idempotency;
pub mod outbox;
pub mod schema;
