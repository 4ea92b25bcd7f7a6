//! Public handle to the AI request queue.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::{mpsc::UnboundedSender, oneshot};

use careerdesk_core::{RequestId, UserId};

use crate::config::{AiQueueConfig, ConfigError};
use crate::error::{EnqueueError, QueueError};
use crate::job::{Job, QueuedRequest};
use crate::priority::Priority;
use crate::scheduler::{self, Command};
use crate::stats::QueueStatus;

/// Admission controller in front of the AI backend.
///
/// Cheap to clone; every clone talks to the same scheduling loop. Create one
/// per process at startup and hand it to whatever issues AI calls.
#[derive(Debug, Clone)]
pub struct AiRequestQueue {
    commands: UnboundedSender<Command>,
}

impl AiRequestQueue {
    /// Start a queue on the current tokio runtime.
    pub fn spawn(mut config: AiQueueConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            commands: scheduler::spawn(config),
        })
    }

    /// Hand an operation to the queue and wait for the admission decision.
    ///
    /// Returns once the request is either rejected (`QueueFull`,
    /// `ServicePaused`) or sitting in the queue / already running. The
    /// returned [`Ticket`] resolves to the operation's result.
    pub async fn submit<F, Fut, T, E>(
        &self,
        operation: F,
        priority: Priority,
        user_id: Option<UserId>,
    ) -> Result<Ticket<T, E>, QueueError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        let id = RequestId::new();
        let (reply, receiver) = oneshot::channel();
        let request = QueuedRequest::new(
            id,
            priority,
            user_id,
            Box::new(Job::new(operation, reply)),
        );

        let (ack, decision) = oneshot::channel();
        self.send(Command::Enqueue { request, ack })?;
        decision.await.map_err(|_| QueueError::Shutdown)??;

        Ok(Ticket {
            id,
            priority,
            receiver,
        })
    }

    /// Run an operation through the queue and return its result.
    ///
    /// Errors from the operation come back as [`EnqueueError::Operation`]
    /// untouched; everything the queue decided on its own is
    /// [`EnqueueError::Queue`].
    pub async fn enqueue<F, Fut, T, E>(
        &self,
        operation: F,
        priority: Priority,
        user_id: Option<UserId>,
    ) -> Result<T, EnqueueError<E>>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        self.submit(operation, priority, user_id).await?.await
    }

    /// Snapshot of the queue. Never changes queue state.
    pub async fn status(&self) -> Result<QueueStatus, QueueError> {
        self.request(Command::Status).await
    }

    /// Stop admitting work. Running operations finish normally; new
    /// submissions are rejected with `ServicePaused` until [`resume`](Self::resume).
    pub async fn pause(&self) -> Result<(), QueueError> {
        self.request(Command::Pause).await
    }

    /// Accept and admit work again, draining any backlog immediately.
    pub async fn resume(&self) -> Result<(), QueueError> {
        self.request(Command::Resume).await
    }

    /// Change the concurrency cap; returns the value actually applied after
    /// clamping to the configured bounds.
    pub async fn set_max_concurrent(&self, max: usize) -> Result<usize, QueueError> {
        self.request(|ack| Command::SetMaxConcurrent { requested: max, ack })
            .await
    }

    /// Reject every pending request with `QueueCleared`; returns how many.
    pub async fn clear(&self) -> Result<usize, QueueError> {
        self.request(Command::Clear).await
    }

    fn send(&self, command: Command) -> Result<(), QueueError> {
        self.commands.send(command).map_err(|_| QueueError::Shutdown)
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(oneshot::Sender<R>) -> Command,
    ) -> Result<R, QueueError> {
        let (tx, rx) = oneshot::channel();
        self.send(build(tx))?;
        rx.await.map_err(|_| QueueError::Shutdown)
    }
}

/// Pending result of a submitted request.
///
/// Resolves exactly once: with the operation's output, the operation's own
/// error, or a queue error (`Timeout`, `QueueCleared`, ...). Dropping a ticket
/// does not cancel the request.
#[derive(Debug)]
pub struct Ticket<T, E> {
    id: RequestId,
    priority: Priority,
    receiver: oneshot::Receiver<Result<T, EnqueueError<E>>>,
}

impl<T, E> Ticket<T, E> {
    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }
}

impl<T, E> Future for Ticket<T, E> {
    type Output = Result<T, EnqueueError<E>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|settled| settled.unwrap_or(Err(EnqueueError::Queue(QueueError::Abandoned))))
    }
}
