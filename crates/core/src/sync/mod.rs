//! Event synchronization: dedup/merge, state machine, replay planning,
//! orchestration and post-commit side-effect dispatch.

mod dedup;
mod dispatch;
mod engine;
mod replay;
mod state_machine;
mod store;

pub use dedup::*;
pub use dispatch::*;
pub use engine::*;
pub use replay::*;
pub use state_machine::*;
pub use store::*;
