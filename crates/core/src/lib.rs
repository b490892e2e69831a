//! Core domain logic for the correspondence event synchronization engine.
//!
//! This crate holds everything that does not touch a database directly: the
//! status state machine, the deduplication/merge algorithm for events synced
//! from the legacy source system, the replay planner, the idempotency-key
//! mechanism and the distributed-lock coordinator. Persistence is provided by
//! a storage crate implementing the traits at the module seams.

pub mod correspondence;
pub mod errors;
pub mod events;
pub mod idempotency;
pub mod lock;
pub mod notification;
pub mod sync;

pub use errors::{Error, Result};
