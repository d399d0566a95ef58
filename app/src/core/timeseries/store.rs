use std::collections::VecDeque;

use derive_more::derive::{Display, Error};
use tokio::sync::{mpsc, oneshot};

use crate::core::time::DateTime;
use crate::core::timeseries::DataPoint;

const INBOX_SIZE: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum StoreError {
    #[display("Time-series store is closed")]
    Closed,
}

enum Request<T> {
    Append(DataPoint<T>, oneshot::Sender<()>),
    History(oneshot::Sender<Vec<DataPoint<T>>>),
    Latest(oneshot::Sender<Option<DataPoint<T>>>),
    Close(oneshot::Sender<()>),
}

/// Bounded history of one quantity, owned by a dedicated task.
///
/// The samples are only reachable through requests to the owning task, so every operation is
/// atomic with respect to all other operations on the same store. Cloned handles talk to the
/// same owner.
pub struct TimeSeriesStore<T> {
    tx: mpsc::Sender<Request<T>>,
}

impl<T> Clone for TimeSeriesStore<T> {
    fn clone(&self) -> Self {
        Self { tx: self.tx.clone() }
    }
}

impl<T: Clone + Send + 'static> TimeSeriesStore<T> {
    /// Spawns the owning task on the current tokio runtime. A capacity of 0 keeps every sample.
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(INBOX_SIZE);
        tokio::spawn(run_owner(History::new(capacity), rx));
        Self { tx }
    }

    /// Records the value at the current time. Evicts the oldest sample when over capacity.
    pub async fn append(&self, value: T) -> Result<(), StoreError> {
        //stamped by the caller, concurrent appends may reach the owner slightly out of timestamp order
        let dp = DataPoint::new(value, DateTime::now());
        self.request(|reply| Request::Append(dp, reply)).await
    }

    /// All retained samples, oldest first.
    pub async fn history(&self) -> Result<Vec<DataPoint<T>>, StoreError> {
        self.request(Request::History).await
    }

    pub async fn latest(&self) -> Result<Option<DataPoint<T>>, StoreError> {
        self.request(Request::Latest).await
    }

    /// Stops the owning task. Requests still queued behind the close fail with `Closed`, as does
    /// closing a second time.
    pub async fn close(&self) -> Result<(), StoreError> {
        self.request(Request::Close).await
    }

    /// Store whose owner never answers.
    #[cfg(test)]
    pub fn stalled() -> Self {
        let (tx, rx) = mpsc::channel::<Request<T>>(INBOX_SIZE);
        tokio::spawn(async move {
            let _inbox = rx;
            std::future::pending::<()>().await
        });
        Self { tx }
    }

    /// Store whose owner receives every request only after `delay`.
    #[cfg(test)]
    pub fn delayed(capacity: usize, delay: std::time::Duration) -> Self {
        let (tx, mut delayed_rx) = mpsc::channel::<Request<T>>(INBOX_SIZE);
        let (owner_tx, owner_rx) = mpsc::channel(INBOX_SIZE);
        tokio::spawn(run_owner(History::new(capacity), owner_rx));
        tokio::spawn(async move {
            while let Some(request) = delayed_rx.recv().await {
                tokio::time::sleep(delay).await;
                if owner_tx.send(request).await.is_err() {
                    break;
                }
            }
        });
        Self { tx }
    }

    async fn request<R>(&self, request: impl FnOnce(oneshot::Sender<R>) -> Request<T>) -> Result<R, StoreError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx.send(request(reply_tx)).await.map_err(|_| StoreError::Closed)?;
        reply_rx.await.map_err(|_| StoreError::Closed)
    }
}

struct History<T> {
    samples: VecDeque<DataPoint<T>>,
    capacity: usize,
}

impl<T: Clone> History<T> {
    fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    fn push(&mut self, dp: DataPoint<T>) {
        self.samples.push_back(dp);

        if self.capacity > 0 && self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    fn snapshot(&self) -> Vec<DataPoint<T>> {
        self.samples.iter().cloned().collect()
    }

    fn latest(&self) -> Option<DataPoint<T>> {
        self.samples.back().cloned()
    }
}

async fn run_owner<T: Clone>(mut history: History<T>, mut rx: mpsc::Receiver<Request<T>>) {
    while let Some(request) = rx.recv().await {
        match request {
            Request::Append(dp, reply) => {
                history.push(dp);
                send_reply(reply, ());
            }
            Request::History(reply) => send_reply(reply, history.snapshot()),
            Request::Latest(reply) => send_reply(reply, history.latest()),
            Request::Close(reply) => {
                rx.close();
                tracing::debug!("Closing time-series store with {} samples", history.samples.len());
                send_reply(reply, ());
                return;
            }
        }
    }

    tracing::debug!("All handles of time-series store dropped, stopping owner");
}

fn send_reply<R>(reply: oneshot::Sender<R>, value: R) {
    if reply.send(value).is_err() {
        tracing::trace!("Requester of time-series store gone before reply");
    }
}
