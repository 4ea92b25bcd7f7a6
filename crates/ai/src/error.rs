//! Queue error taxonomy.

use std::time::Duration;

use thiserror::Error;

/// Errors raised by the queue itself.
///
/// Every kind carries a stable code and, where it makes sense, a suggested
/// delay before the caller tries again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("AI request queue is full ({max} requests pending)")]
    QueueFull { max: usize },

    #[error("AI service is temporarily paused")]
    ServicePaused,

    #[error("request timed out after waiting {waited:?} for admission")]
    Timeout { waited: Duration },

    #[error("request was cleared from the queue")]
    QueueCleared,

    /// Raised by callers when the upstream service signals rate limiting;
    /// never produced by the queue itself.
    #[error("AI service rate limit reached")]
    RateLimited,

    #[error("AI request queue is no longer running")]
    Shutdown,

    #[error("request ended without a result")]
    Abandoned,
}

impl QueueError {
    pub fn code(&self) -> &'static str {
        match self {
            QueueError::QueueFull { .. } => "QUEUE_FULL",
            QueueError::ServicePaused => "SERVICE_PAUSED",
            QueueError::Timeout { .. } => "TIMEOUT",
            QueueError::QueueCleared => "QUEUE_CLEARED",
            QueueError::RateLimited => "RATE_LIMITED",
            QueueError::Shutdown => "QUEUE_SHUTDOWN",
            QueueError::Abandoned => "REQUEST_ABANDONED",
        }
    }

    /// Suggested delay before resubmitting.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            QueueError::QueueFull { .. } => Some(Duration::from_secs(30)),
            QueueError::ServicePaused => Some(Duration::from_secs(60)),
            QueueError::Timeout { .. } => Some(Duration::from_secs(5)),
            QueueError::RateLimited => Some(Duration::from_secs(60)),
            QueueError::QueueCleared | QueueError::Shutdown | QueueError::Abandoned => None,
        }
    }
}

/// Failure of an enqueued request.
///
/// `Operation` carries whatever the wrapped operation returned, unchanged.
#[derive(Debug, Error)]
pub enum EnqueueError<E> {
    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error(transparent)]
    Operation(E),
}

impl<E> EnqueueError<E> {
    pub fn queue_error(&self) -> Option<&QueueError> {
        match self {
            EnqueueError::Queue(e) => Some(e),
            EnqueueError::Operation(_) => None,
        }
    }

    pub fn into_operation(self) -> Option<E> {
        match self {
            EnqueueError::Queue(_) => None,
            EnqueueError::Operation(e) => Some(e),
        }
    }

    pub fn retry_after(&self) -> Option<Duration> {
        self.queue_error().and_then(QueueError::retry_after)
    }
}
