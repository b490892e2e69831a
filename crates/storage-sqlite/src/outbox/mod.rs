pub mod model;
pub mod repository;

pub use repository::{enqueue_job, SqliteOutboxQueue};
