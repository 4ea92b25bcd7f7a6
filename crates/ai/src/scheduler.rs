//! Single-consumer scheduling loop.
//!
//! All queue state lives inside one task. Enqueues, completions, timer expiries
//! and operator controls arrive as [`Command`]s and are applied one at a time,
//! so a scheduling pass can never interleave with another pass or with an
//! admission decision.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, WeakUnboundedSender};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use careerdesk_core::RequestId;

use crate::config::AiQueueConfig;
use crate::error::QueueError;
use crate::job::{Outcome, QueuedRequest};
use crate::pending::PendingList;
use crate::stats::{QueueStats, QueueStatus};

pub(crate) enum Command {
    Enqueue {
        request: QueuedRequest,
        ack: oneshot::Sender<Result<(), QueueError>>,
    },
    Expire(RequestId),
    Completed {
        id: RequestId,
        outcome: Outcome,
    },
    Drain,
    Pause(oneshot::Sender<()>),
    Resume(oneshot::Sender<()>),
    SetMaxConcurrent {
        requested: usize,
        ack: oneshot::Sender<usize>,
    },
    Clear(oneshot::Sender<usize>),
    Status(oneshot::Sender<QueueStatus>),
}

/// Holds a concurrency slot for one running operation.
///
/// Reports completion to the scheduler exactly once: explicitly through
/// [`SlotGuard::release`], or as a failure when dropped without it (the
/// operation panicked or its task was torn down).
pub(crate) struct SlotGuard {
    id: RequestId,
    commands: Option<UnboundedSender<Command>>,
}

impl SlotGuard {
    fn new(id: RequestId, commands: Option<UnboundedSender<Command>>) -> Self {
        Self { id, commands }
    }

    /// A guard not attached to any scheduler.
    #[cfg(test)]
    pub(crate) fn detached(id: RequestId) -> Self {
        Self::new(id, None)
    }

    pub fn release(mut self, outcome: Outcome) {
        self.notify(outcome);
    }

    fn notify(&mut self, outcome: Outcome) {
        if let Some(commands) = self.commands.take() {
            let _ = commands.send(Command::Completed {
                id: self.id,
                outcome,
            });
        }
    }
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        if self.commands.is_some() {
            warn!(request_id = %self.id, "operation ended without a result; releasing slot");
            self.notify(Outcome::Failed);
        }
    }
}

/// Start the loop on the current runtime and return its command sender.
///
/// The loop keeps only a weak sender for itself; it stops once every handle
/// and running operation is gone.
pub(crate) fn spawn(config: AiQueueConfig) -> UnboundedSender<Command> {
    let (tx, rx) = mpsc::unbounded_channel();
    let scheduler = Scheduler::new(config, tx.downgrade());
    tokio::spawn(scheduler.run(rx));
    tx
}

struct Scheduler {
    config: AiQueueConfig,
    pending: PendingList<QueuedRequest>,
    active: usize,
    max_concurrent: usize,
    paused: bool,
    drain_scheduled: bool,
    stats: QueueStats,
    commands: WeakUnboundedSender<Command>,
}

impl Scheduler {
    fn new(config: AiQueueConfig, commands: WeakUnboundedSender<Command>) -> Self {
        Self {
            pending: PendingList::new(),
            active: 0,
            max_concurrent: config.max_concurrent,
            paused: false,
            drain_scheduled: false,
            stats: QueueStats::new(config.wait_window),
            commands,
            config,
        }
    }

    async fn run(mut self, mut rx: UnboundedReceiver<Command>) {
        info!(
            queue = %self.config.name,
            max_concurrent = self.max_concurrent,
            max_queue_size = self.config.max_queue_size,
            timeout_ms = self.config.request_timeout.as_millis() as u64,
            "ai request queue started"
        );

        while let Some(command) = rx.recv().await {
            self.handle(command);
        }

        let abandoned = self.pending.len();
        for entry in self.pending.drain() {
            entry.item.reject(QueueError::Shutdown);
        }

        info!(queue = %self.config.name, abandoned, "ai request queue stopped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Enqueue { request, ack } => {
                let decision = self.admit_to_pending(request);
                let _ = ack.send(decision);
                self.drain();
            }
            Command::Expire(id) => self.expire(id),
            Command::Completed { id, outcome } => self.complete(id, outcome),
            Command::Drain => {
                self.drain_scheduled = false;
                self.drain();
            }
            Command::Pause(ack) => {
                if !self.paused {
                    self.paused = true;
                    info!(queue = %self.config.name, active = self.active, pending = self.pending.len(), "queue paused");
                }
                let _ = ack.send(());
            }
            Command::Resume(ack) => {
                if self.paused {
                    self.paused = false;
                    info!(queue = %self.config.name, pending = self.pending.len(), "queue resumed");
                }
                self.drain();
                let _ = ack.send(());
            }
            Command::SetMaxConcurrent { requested, ack } => {
                let applied = self.config.clamp_concurrency(requested);
                if applied != self.max_concurrent {
                    info!(
                        queue = %self.config.name,
                        requested,
                        previous = self.max_concurrent,
                        applied,
                        "max concurrency changed"
                    );
                }
                self.max_concurrent = applied;
                self.drain();
                let _ = ack.send(applied);
            }
            Command::Clear(ack) => {
                let cleared = self.clear();
                let _ = ack.send(cleared);
            }
            Command::Status(reply) => {
                let _ = reply.send(self.status());
            }
        }
    }

    /// Fail-fast admission check, then priority-ordered insertion.
    fn admit_to_pending(&mut self, mut request: QueuedRequest) -> Result<(), QueueError> {
        let max = self.config.max_queue_size;
        if self.pending.len() >= max {
            warn!(queue = %self.config.name, request_id = %request.id, pending = max, "rejecting request: queue full");
            return Err(QueueError::QueueFull { max });
        }
        if self.paused {
            warn!(queue = %self.config.name, request_id = %request.id, "rejecting request: queue paused");
            return Err(QueueError::ServicePaused);
        }

        request.arm_timeout(self.arm_timeout(request.id));

        let (id, priority) = (request.id, request.priority);
        let position = self.pending.insert(id, priority, request);
        debug!(
            queue = %self.config.name,
            request_id = %id,
            %priority,
            position,
            pending = self.pending.len(),
            "request queued"
        );
        Ok(())
    }

    /// Timers hold a weak sender so a waiting request never keeps the loop alive.
    fn arm_timeout(&self, id: RequestId) -> JoinHandle<()> {
        let commands = self.commands.clone();
        let timeout = self.config.request_timeout;
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if let Some(commands) = commands.upgrade() {
                let _ = commands.send(Command::Expire(id));
            }
        })
    }

    /// Admit pending requests while capacity allows.
    fn drain(&mut self) {
        while !self.paused && self.active < self.max_concurrent {
            let Some(entry) = self.pending.pop_front() else {
                break;
            };
            self.start(entry.item);
        }
    }

    fn start(&mut self, request: QueuedRequest) {
        let waited = request.enqueued_at.elapsed();
        self.stats.record_wait(waited);
        self.active += 1;

        debug!(
            queue = %self.config.name,
            request_id = %request.id,
            priority = %request.priority,
            user_id = request.user_id.as_ref().map(|u| u.as_str()),
            wait_ms = waited.as_millis() as u64,
            active = self.active,
            "request admitted"
        );

        let slot = SlotGuard::new(request.id, self.commands.upgrade());
        tokio::spawn(request.start(slot));
    }

    fn complete(&mut self, id: RequestId, outcome: Outcome) {
        match outcome {
            Outcome::Succeeded => self.stats.total_processed += 1,
            Outcome::Failed => self.stats.total_failed += 1,
        }
        self.active = self.active.saturating_sub(1);

        debug!(queue = %self.config.name, request_id = %id, ?outcome, active = self.active, "request finished");

        if !self.pending.is_empty() {
            self.schedule_drain();
        }
    }

    /// Coalesced, delayed pass after a completion.
    fn schedule_drain(&mut self) {
        if self.drain_scheduled {
            return;
        }

        let delay = self.config.drain_delay;
        let commands = match self.commands.upgrade() {
            Some(commands) if !delay.is_zero() => commands,
            _ => {
                self.drain();
                return;
            }
        };

        self.drain_scheduled = true;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = commands.send(Command::Drain);
        });
    }

    fn expire(&mut self, id: RequestId) {
        // Already admitted or cleared: nothing to do.
        let Some(entry) = self.pending.remove(id) else {
            return;
        };

        let waited = entry.item.enqueued_at.elapsed();
        warn!(
            queue = %self.config.name,
            request_id = %id,
            priority = %entry.priority,
            wait_ms = waited.as_millis() as u64,
            "request timed out waiting for admission"
        );
        entry.item.reject(QueueError::Timeout { waited });
    }

    fn clear(&mut self) -> usize {
        let cleared = self.pending.len();
        for entry in self.pending.drain() {
            entry.item.reject(QueueError::QueueCleared);
        }
        if cleared > 0 {
            warn!(queue = %self.config.name, cleared, "pending requests cleared");
        }
        cleared
    }

    fn status(&self) -> QueueStatus {
        let queue_length = self.pending.len();
        QueueStatus {
            queue_length,
            active_requests: self.active,
            max_concurrent: self.max_concurrent,
            is_accepting_requests: queue_length < self.config.max_queue_size && !self.paused,
            paused: self.paused,
            average_wait_time_ms: self.stats.average_wait().as_millis() as u64,
            total_processed: self.stats.total_processed,
            total_failed: self.stats.total_failed,
        }
    }
}
