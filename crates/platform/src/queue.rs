//! Named task queues delivered over HTTP.

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::client::InternalClient;
use crate::error::QueueError;

/// Maximum number of pending tasks per queue.
pub const QUEUE_CAPACITY: usize = 256;

/// HTTP method a task is delivered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskMethod {
    /// Parameters go in the query string.
    Get,
    /// Parameters go in a form body.
    Post,
}

/// A unit of deferred work: an internal request to the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Path relative to the application base URL.
    pub path: String,
    /// HTTP method.
    pub method: TaskMethod,
    /// Request parameters.
    pub params: Vec<(String, String)>,
}

impl Task {
    /// A GET task for `path`.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: TaskMethod::Get,
            params: Vec::new(),
        }
    }

    /// A POST task for `path`.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self {
            method: TaskMethod::Post,
            ..Self::get(path)
        }
    }

    /// Add a request parameter.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }
}

/// A named queue of tasks executed asynchronously.
#[async_trait]
pub trait TaskQueue: Send + Sync {
    /// Queue name.
    fn name(&self) -> &str;

    /// Enqueue a task for later delivery.
    async fn add(&self, task: Task) -> Result<(), QueueError>;

    /// Stop accepting tasks, drop pending ones, and wait for the worker.
    async fn destroy(&self);
}

struct Worker {
    sender: mpsc::Sender<Task>,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Task queue backed by a bounded channel and one delivery worker.
pub struct HttpTaskQueue {
    name: String,
    worker: Mutex<Option<Worker>>,
}

impl HttpTaskQueue {
    /// Start a queue whose worker delivers through `client`.
    ///
    /// Must be called inside a tokio runtime.
    #[must_use]
    pub fn start(name: impl Into<String>, client: InternalClient) -> Self {
        let name = name.into();
        let (sender, receiver) = mpsc::channel(QUEUE_CAPACITY);
        let (shutdown, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(run_worker(name.clone(), client, receiver, shutdown_rx));

        Self {
            name,
            worker: Mutex::new(Some(Worker {
                sender,
                shutdown,
                handle,
            })),
        }
    }
}

impl std::fmt::Debug for HttpTaskQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTaskQueue")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TaskQueue for HttpTaskQueue {
    fn name(&self) -> &str {
        &self.name
    }

    async fn add(&self, task: Task) -> Result<(), QueueError> {
        let sender = match self.worker.lock().await.as_ref() {
            Some(worker) => worker.sender.clone(),
            None => return Err(QueueError::Closed(self.name.clone())),
        };
        debug!(queue = %self.name, path = %task.path, "Enqueued task");
        sender
            .send(task)
            .await
            .map_err(|_| QueueError::Closed(self.name.clone()))
    }

    async fn destroy(&self) {
        let Some(worker) = self.worker.lock().await.take() else {
            return;
        };
        drop(worker.sender);
        // The worker may already have exited; nothing left to signal then.
        let _ = worker.shutdown.send(());
        if let Err(e) = worker.handle.await {
            warn!(queue = %self.name, error = %e, "Task queue worker failed");
        }
    }
}

async fn run_worker(
    name: String,
    client: InternalClient,
    mut receiver: mpsc::Receiver<Task>,
    mut shutdown: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            next = receiver.recv() => match next {
                Some(task) => {
                    if let Err(e) = client.send(&task).await {
                        warn!(queue = %name, path = %task.path, error = %e, "Task delivery failed");
                    }
                }
                None => break,
            },
        }
    }

    receiver.close();
    let mut purged = 0usize;
    while receiver.try_recv().is_ok() {
        purged += 1;
    }
    info!(queue = %name, purged, "Task queue stopped");
}
