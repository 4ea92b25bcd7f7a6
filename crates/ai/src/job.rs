//! Queued requests and their settlement channel.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use careerdesk_core::{RequestId, UserId};

use crate::error::{EnqueueError, QueueError};
use crate::priority::Priority;
use crate::scheduler::SlotGuard;

pub(crate) type RunFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// How an admitted operation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Succeeded,
    Failed,
}

/// Type-erased unit of work bound to its caller's result channel.
///
/// Both methods consume the job, so a request is settled at most once.
pub(crate) trait Settle: Send + 'static {
    /// Run the operation; the slot is released before the caller sees the result.
    fn run(self: Box<Self>, slot: SlotGuard) -> RunFuture;

    /// Settle without running.
    fn reject(self: Box<Self>, error: QueueError);
}

pub(crate) type Reply<T, E> = oneshot::Sender<Result<T, EnqueueError<E>>>;

pub(crate) struct Job<F, T, E> {
    operation: F,
    reply: Reply<T, E>,
}

impl<F, T, E> Job<F, T, E> {
    pub fn new(operation: F, reply: Reply<T, E>) -> Self {
        Self { operation, reply }
    }
}

impl<F, Fut, T, E> Settle for Job<F, T, E>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    fn run(self: Box<Self>, slot: SlotGuard) -> RunFuture {
        let Job { operation, reply } = *self;
        Box::pin(async move {
            let result = operation().await;
            slot.release(match result {
                Ok(_) => Outcome::Succeeded,
                Err(_) => Outcome::Failed,
            });
            // Caller may have stopped listening; the work is done either way.
            let _ = reply.send(result.map_err(EnqueueError::Operation));
        })
    }

    fn reject(self: Box<Self>, error: QueueError) {
        let _ = self.reply.send(Err(EnqueueError::Queue(error)));
    }
}

/// A request owned by the scheduler until it is admitted or removed.
pub(crate) struct QueuedRequest {
    pub id: RequestId,
    pub priority: Priority,
    pub user_id: Option<UserId>,
    pub enqueued_at: Instant,
    job: Box<dyn Settle>,
    timeout: Option<JoinHandle<()>>,
}

impl QueuedRequest {
    pub fn new(
        id: RequestId,
        priority: Priority,
        user_id: Option<UserId>,
        job: Box<dyn Settle>,
    ) -> Self {
        Self {
            id,
            priority,
            user_id,
            enqueued_at: Instant::now(),
            job,
            timeout: None,
        }
    }

    pub fn arm_timeout(&mut self, timer: JoinHandle<()>) {
        self.timeout = Some(timer);
    }

    pub fn disarm_timeout(&mut self) {
        if let Some(timer) = self.timeout.take() {
            timer.abort();
        }
    }

    pub fn start(mut self, slot: SlotGuard) -> RunFuture {
        self.disarm_timeout();
        self.job.run(slot)
    }

    pub fn reject(mut self, error: QueueError) {
        self.disarm_timeout();
        self.job.reject(error);
    }
}

impl std::fmt::Debug for QueuedRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueuedRequest")
            .field("id", &self.id)
            .field("priority", &self.priority)
            .field("user_id", &self.user_id)
            .field("armed", &self.timeout.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reject_settles_the_caller_once() {
        let (tx, rx) = oneshot::channel::<Result<u32, EnqueueError<String>>>();
        let job = Job::new(|| async { Ok::<u32, String>(1) }, tx);
        let request = QueuedRequest::new(RequestId::new(), Priority::Low, None, Box::new(job));

        request.reject(QueueError::QueueCleared);

        assert!(matches!(
            rx.await.unwrap(),
            Err(EnqueueError::Queue(QueueError::QueueCleared))
        ));
    }

    #[tokio::test]
    async fn run_delivers_operation_result() {
        let (tx, rx) = oneshot::channel();
        let job = Job::new(|| async { Err::<u32, String>("model overloaded".into()) }, tx);
        let request = QueuedRequest::new(RequestId::new(), Priority::High, None, Box::new(job));

        request.start(SlotGuard::detached(RequestId::new())).await;

        match rx.await.unwrap() {
            Err(EnqueueError::Operation(msg)) => assert_eq!(msg, "model overloaded"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
