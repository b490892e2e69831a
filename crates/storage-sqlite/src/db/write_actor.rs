//! Single-writer actor.
//!
//! SQLite allows one writer at a time; funneling every mutation through one
//! dedicated thread removes writer-writer contention inside the process. Each
//! job runs in its own immediate transaction, so the write lock is taken up
//! front and a returned error rolls the whole job back.

use std::any::Any;

use diesel::{Connection, SqliteConnection};
use tokio::sync::{mpsc, oneshot};

use correspondence_core::errors::{DatabaseError, Error, Result};

use crate::db::DbPool;
use crate::errors::StorageError;

type JobResult = Result<Box<dyn Any + Send>>;
type Job = Box<dyn FnOnce(&mut SqliteConnection) -> JobResult + Send>;

enum TxError {
    App(Error),
    Diesel(diesel::result::Error),
}

impl From<diesel::result::Error> for TxError {
    fn from(err: diesel::result::Error) -> Self {
        TxError::Diesel(err)
    }
}

#[derive(Clone)]
pub struct WriteHandle {
    tx: mpsc::UnboundedSender<(Job, oneshot::Sender<JobResult>)>,
}

impl WriteHandle {
    /// Runs `job` on the writer thread inside an immediate transaction and
    /// returns its result. An error return rolls the transaction back.
    pub async fn exec<T, F>(&self, job: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let boxed: Job =
            Box::new(move |conn| job(conn).map(|value| Box::new(value) as Box<dyn Any + Send>));
        self.tx
            .send((boxed, reply_tx))
            .map_err(|_| Error::Unexpected("write actor has stopped".to_string()))?;
        let result = reply_rx
            .await
            .map_err(|_| Error::Unexpected("write actor dropped the job".to_string()))?;
        result.and_then(|value| {
            value
                .downcast::<T>()
                .map(|boxed| *boxed)
                .map_err(|_| Error::Unexpected("write actor returned an unexpected type".to_string()))
        })
    }
}

/// Spawns the writer thread. The actor stops when every `WriteHandle` clone
/// is dropped.
pub fn spawn_writer(pool: DbPool) -> WriteHandle {
    let (tx, mut rx) = mpsc::unbounded_channel::<(Job, oneshot::Sender<JobResult>)>();
    std::thread::spawn(move || {
        while let Some((job, reply)) = rx.blocking_recv() {
            let result = run_job(&pool, job);
            // A dropped receiver means the caller was cancelled; the
            // transaction already committed or rolled back either way.
            let _ = reply.send(result);
        }
    });
    WriteHandle { tx }
}

fn run_job(pool: &DbPool, job: Job) -> JobResult {
    let mut conn = pool
        .get()
        .map_err(|err| Error::Database(DatabaseError::Connection(err.to_string())))?;
    let result = conn.immediate_transaction::<_, TxError, _>(|conn| job(conn).map_err(TxError::App));
    result.map_err(|err| match err {
        TxError::App(err) => err,
        TxError::Diesel(err) => StorageError::from(err).into(),
    })
}
