//! `careerdesk-ai`
//!
//! **Responsibility:** admission control in front of the generative-AI backend.
//!
//! Every AI call the application makes goes through an [`AiRequestQueue`]:
//! - at most `max_concurrent` operations are in flight at once
//! - pending work is admitted by priority, FIFO within a priority
//! - callers never wait forever (admission timeout, fail-fast when full or paused)
//! - operators can pause, resume, resize and clear the queue at runtime
//!
//! The AI call itself stays opaque: the queue runs whatever async closure it is
//! handed and passes its result back untouched.

pub mod config;
pub mod error;
mod job;
mod pending;
pub mod priority;
pub mod queue;
mod scheduler;
pub mod stats;

pub use config::{AiQueueConfig, ConfigError};
pub use error::{EnqueueError, QueueError};
pub use priority::Priority;
pub use queue::{AiRequestQueue, Ticket};
pub use stats::QueueStatus;
