//! Drain queue: admission control, the single drain loop and outcome routing.
//!
//! All mutation of the pending count, the ordered buffer, the drain state and
//! the rate window happens under one `parking_lot::Mutex` that is never held
//! across an `.await`. Producers only ever wait on their own outcome handle.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::QueueConfig;
use crate::core::audit::{build_audit_event, AuditAction, AuditSink};
use crate::core::rate_window::{RateWindow, WindowDecision};
use crate::core::sink::{result_channel, OutcomeHandle, ResultSink};
use crate::core::stats::{QueueCounters, QueueStats, QueueStatus};
use crate::core::{
    ConfigError, QueueError, ScheduledUnit, TaskExecutor, UnitError, UnitMetadata, UnitState,
};
use crate::infra::queue::InMemoryQueue;
use crate::runtime::TokioSpawner;
use crate::util::clock::now_ms;
use crate::util::serde::{Priority, UnitId};

/// Abstraction for the ordered buffer holding queued units.
pub trait TaskQueue<T>: Send {
    /// Insert a unit at its priority position.
    fn enqueue(&mut self, unit: ScheduledUnit<T>);
    /// Remove the head: highest priority, oldest within its tier.
    fn dequeue(&mut self) -> Option<ScheduledUnit<T>>;
    /// Remove every unit, head first.
    fn drain_all(&mut self) -> Vec<ScheduledUnit<T>>;
    /// Whether a unit with `id` is queued.
    fn contains(&self, id: &UnitId) -> bool;
    /// Current depth.
    fn len(&self) -> usize;
    /// True when nothing is queued.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Abstraction for spawning the drain loop on a runtime.
pub trait Spawn {
    /// Spawn a detached future.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}

/// Drain loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainState {
    /// No loop is running; the next admission starts one.
    Idle,
    /// A loop owns the buffer head.
    Draining,
}

/// Handle type returned by [`DrainQueue::submit`] for executor `X`.
pub type HandleFor<P, X> =
    OutcomeHandle<<X as TaskExecutor<P>>::Output, <X as TaskExecutor<P>>::Error>;

/// Payload plus the sink its outcome goes to, as stored in the buffer.
struct Pending<P, R, E> {
    payload: P,
    sink: ResultSink<R, E>,
}

type QueuedUnit<P, R, E> = ScheduledUnit<Pending<P, R, E>>;

struct QueueState<P, R, E> {
    buffer: InMemoryQueue<Pending<P, R, E>>,
    /// Queued plus executing.
    pending: usize,
    executing: Option<UnitId>,
    drain: DrainState,
    /// Advanced by `clear()`; a loop from an older generation stops.
    generation: u64,
    window: RateWindow,
    next_sequence: u64,
}

enum Step<P, R, E> {
    Stop,
    Wait(Duration),
    Run(QueuedUnit<P, R, E>),
}

enum Admission<R, E> {
    Admitted {
        start_generation: Option<u64>,
        pending: usize,
    },
    Rejected {
        sink: ResultSink<R, E>,
        pending: usize,
    },
}

struct Shared<P, X>
where
    P: Send + 'static,
    X: TaskExecutor<P>,
{
    name: String,
    config: QueueConfig,
    state: Mutex<QueueState<P, X::Output, X::Error>>,
    /// One permit: only its holder may execute units.
    lane: Arc<Semaphore>,
    executor: X,
    counters: QueueCounters,
    audit: Option<Arc<dyn AuditSink>>,
}

/// Bounded, priority-ordered, rate-limited work queue.
///
/// Units are admitted while fewer than `capacity` are pending, kept in
/// priority order (FIFO within a tier) and executed one at a time by a single
/// drain loop that starts at most `window_limit` units per 1000 ms window.
///
/// # Example
///
/// ```rust,ignore
/// use prometheus_rate_queue::config::QueueConfig;
/// use prometheus_rate_queue::core::{executor_fn, DrainQueue};
/// use prometheus_rate_queue::runtime::TokioSpawner;
///
/// let queue = DrainQueue::new(
///     QueueConfig::new(5, 100, 3),
///     executor_fn(|text: String| async move { Ok::<_, std::io::Error>(text.len()) }),
///     TokioSpawner::current()?,
/// )?;
///
/// let handle = queue.submit("hello".to_string(), 2, None);
/// assert_eq!(handle.await?, 5);
/// ```
pub struct DrainQueue<P, X, S = TokioSpawner>
where
    P: Send + 'static,
    X: TaskExecutor<P>,
{
    shared: Arc<Shared<P, X>>,
    spawner: S,
}

impl<P, X, S> Clone for DrainQueue<P, X, S>
where
    P: Send + 'static,
    X: TaskExecutor<P>,
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            spawner: self.spawner.clone(),
        }
    }
}

impl<P, X> DrainQueue<P, X, TokioSpawner>
where
    P: Send + 'static,
    X: TaskExecutor<P>,
{
    /// Create a queue whose drain loop runs on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for an invalid config and
    /// [`ConfigError::Runtime`] when called outside a tokio runtime.
    pub fn on_current_runtime(config: QueueConfig, executor: X) -> Result<Self, ConfigError> {
        let spawner = TokioSpawner::current()?;
        Self::new(config, executor, spawner)
    }
}

impl<P, X, S> DrainQueue<P, X, S>
where
    P: Send + 'static,
    X: TaskExecutor<P>,
    S: Spawn,
{
    /// Create a new queue from config, work function and spawner.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the config fails validation.
    pub fn new(config: QueueConfig, executor: X, spawner: S) -> Result<Self, ConfigError> {
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(Self::assemble("default".into(), config, executor, spawner, None))
    }

    /// Set the name used in logs and audit events.
    ///
    /// Takes effect only before the queue is cloned or used.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        if let Some(shared) = Arc::get_mut(&mut self.shared) {
            shared.name = name.into();
        } else {
            warn!("with_name ignored: queue already shared");
        }
        self
    }

    /// Attach an audit sink.
    ///
    /// Takes effect only before the queue is cloned or used.
    #[must_use]
    pub fn with_audit(mut self, sink: Arc<dyn AuditSink>) -> Self {
        if let Some(shared) = Arc::get_mut(&mut self.shared) {
            shared.audit = Some(sink);
        } else {
            warn!("with_audit ignored: queue already shared");
        }
        self
    }

    /// Build from already-validated parts.
    pub(crate) fn assemble(
        name: String,
        config: QueueConfig,
        executor: X,
        spawner: S,
        audit: Option<Arc<dyn AuditSink>>,
    ) -> Self {
        info!(
            queue = %name,
            capacity = config.capacity,
            window_limit = config.window_limit,
            priority_levels = config.priority_levels,
            "drain queue initialized"
        );
        let state = QueueState {
            buffer: InMemoryQueue::new(config.capacity),
            pending: 0,
            executing: None,
            drain: DrainState::Idle,
            generation: 0,
            window: RateWindow::new(config.window_limit, Instant::now()),
            next_sequence: 0,
        };
        Self {
            shared: Arc::new(Shared {
                name,
                config,
                state: Mutex::new(state),
                lane: Arc::new(Semaphore::new(1)),
                executor,
                counters: QueueCounters::default(),
                audit,
            }),
            spawner,
        }
    }

    /// Submit a unit.
    ///
    /// `priority` is clamped into `[0, priority_levels - 1]`. When `id` is
    /// `None` a random identifier is generated. The returned handle resolves
    /// exactly once; a full queue resolves it with [`QueueError::QueueFull`]
    /// without the unit ever occupying a slot.
    pub fn submit(&self, payload: P, priority: i64, id: Option<UnitId>) -> HandleFor<P, X> {
        let shared = &self.shared;
        let id = id.unwrap_or_else(UnitId::generate);
        let priority = Priority::clamped(priority, shared.config.priority_levels);
        let (sink, handle) = result_channel(id.clone());
        QueueCounters::bump(&shared.counters.submitted);

        match shared.admit(id.clone(), priority, payload, sink) {
            Admission::Rejected { sink, pending } => {
                QueueCounters::bump(&shared.counters.rejected);
                warn!(
                    queue = %shared.name,
                    unit_id = %id,
                    pending,
                    capacity = shared.config.capacity,
                    "unit rejected: queue full"
                );
                shared.record_audit(id.as_str(), AuditAction::Reject, None);
                sink.fail(UnitError::Queue(QueueError::QueueFull {
                    capacity: shared.config.capacity,
                    pending,
                }));
            }
            Admission::Admitted {
                start_generation,
                pending,
            } => {
                QueueCounters::bump(&shared.counters.admitted);
                debug!(queue = %shared.name, unit_id = %id, %priority, pending, "unit admitted");
                shared.record_audit(id.as_str(), AuditAction::Submit, None);
                if let Some(generation) = start_generation {
                    debug!(queue = %shared.name, generation, "starting drain loop");
                    self.spawner
                        .spawn(DrainLoop::new(Arc::clone(&self.shared), generation).run());
                }
            }
        }
        handle
    }

    /// Cancel every queued unit.
    ///
    /// Each queued unit resolves with [`QueueError::QueueCleared`] and the
    /// drain state resets to idle. A unit already executing is not touched: it
    /// finishes, receives its real outcome and holds its slot until then. A
    /// loop started afterwards waits for that unit before executing anything.
    ///
    /// Returns the number of units cleared.
    pub fn clear(&self) -> usize {
        let shared = &self.shared;
        let (cleared, pending) = {
            let mut state = shared.state.lock();
            let drained = state.buffer.drain_all();
            state.pending = state.pending.saturating_sub(drained.len());
            state.drain = DrainState::Idle;
            state.generation = state.generation.wrapping_add(1);
            (drained, state.pending)
        };

        let count = cleared.len();
        for unit in cleared {
            unit.payload
                .sink
                .fail(UnitError::Queue(QueueError::QueueCleared));
        }
        shared
            .counters
            .cleared
            .fetch_add(count as u64, std::sync::atomic::Ordering::Relaxed);
        info!(queue = %shared.name, cleared = count, pending, "queue cleared");
        shared.record_audit("batch", AuditAction::Clear, Some(format!("{count} units")));
        count
    }
}

impl<P, X, S> DrainQueue<P, X, S>
where
    P: Send + 'static,
    X: TaskExecutor<P>,
{
    /// Point-in-time snapshot of the queue.
    pub fn status(&self) -> QueueStatus {
        let mut state = self.shared.state.lock();
        let now = Instant::now();
        let until_reset = state.window.until_reset(now);
        QueueStatus {
            queued_count: state.buffer.len(),
            pending_count: state.pending,
            capacity: self.shared.config.capacity,
            draining: state.drain == DrainState::Draining,
            executing: state.executing.clone(),
            started_this_window: state.window.started_this_window(now),
            ms_until_window_reset: u64::try_from(until_reset.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Lifecycle state of a live unit; `None` once resolved or if unknown.
    pub fn unit_state(&self, id: &UnitId) -> Option<UnitState> {
        let state = self.shared.state.lock();
        if state.executing.as_ref() == Some(id) {
            Some(UnitState::Executing)
        } else if state.buffer.contains(id) {
            Some(UnitState::Queued)
        } else {
            None
        }
    }

    /// Lifetime counters.
    pub fn stats(&self) -> QueueStats {
        self.shared.counters.snapshot()
    }

    /// Queue configuration.
    pub fn config(&self) -> &QueueConfig {
        &self.shared.config
    }

    /// Queue name used in logs and audit events.
    pub fn name(&self) -> &str {
        &self.shared.name
    }
}

impl<P, X> Shared<P, X>
where
    P: Send + 'static,
    X: TaskExecutor<P>,
{
    fn admit(
        &self,
        id: UnitId,
        priority: Priority,
        payload: P,
        sink: ResultSink<X::Output, X::Error>,
    ) -> Admission<X::Output, X::Error> {
        let mut state = self.state.lock();
        if state.pending >= self.config.capacity {
            return Admission::Rejected {
                sink,
                pending: state.pending,
            };
        }

        state.pending += 1;
        let sequence = state.next_sequence;
        state.next_sequence += 1;
        state.buffer.enqueue(ScheduledUnit {
            meta: UnitMetadata {
                id,
                priority,
                sequence,
                enqueued_at_ms: now_ms(),
            },
            payload: Pending { payload, sink },
        });

        let start_generation = (state.drain == DrainState::Idle).then(|| {
            state.drain = DrainState::Draining;
            state.generation
        });
        Admission::Admitted {
            start_generation,
            pending: state.pending,
        }
    }

    fn next_step(&self, generation: u64) -> Step<P, X::Output, X::Error> {
        let mut state = self.state.lock();
        if state.generation != generation {
            debug!(queue = %self.name, generation, "drain loop superseded by clear");
            return Step::Stop;
        }
        if state.buffer.is_empty() {
            state.drain = DrainState::Idle;
            debug!(queue = %self.name, "buffer empty, drain loop idle");
            return Step::Stop;
        }
        match state.window.check(Instant::now()) {
            WindowDecision::Wait(wait) => Step::Wait(wait),
            WindowDecision::Ready => match state.buffer.dequeue() {
                Some(unit) => {
                    state.window.record_start();
                    state.executing = Some(unit.meta.id.clone());
                    Step::Run(unit)
                }
                None => {
                    state.drain = DrainState::Idle;
                    Step::Stop
                }
            },
        }
    }

    async fn run_unit(&self, unit: QueuedUnit<P, X::Output, X::Error>) {
        let ScheduledUnit {
            meta,
            payload: Pending { payload, sink },
        } = unit;
        let id = meta.id.clone();
        debug!(queue = %self.name, unit_id = %id, priority = %meta.priority, "unit started");
        self.record_audit(id.as_str(), AuditAction::Start, None);

        let result = AssertUnwindSafe(self.executor.execute(payload, meta))
            .catch_unwind()
            .await;

        match result {
            Ok(Ok(value)) => {
                QueueCounters::bump(&self.counters.completed);
                debug!(queue = %self.name, unit_id = %id, "unit completed");
                self.record_audit(id.as_str(), AuditAction::Complete, None);
                sink.succeed(value);
            }
            Ok(Err(err)) => {
                QueueCounters::bump(&self.counters.failed);
                debug!(queue = %self.name, unit_id = %id, "unit failed");
                self.record_audit(id.as_str(), AuditAction::Fail, None);
                sink.fail(UnitError::Work(err));
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                QueueCounters::bump(&self.counters.failed);
                warn!(queue = %self.name, unit_id = %id, panic = %message, "work function panicked");
                self.record_audit(id.as_str(), AuditAction::Fail, Some(message.clone()));
                sink.fail(UnitError::Panicked(message));
            }
        }

        // Slot is released only after the outcome is delivered.
        let mut state = self.state.lock();
        state.pending = state.pending.saturating_sub(1);
        if state.executing.as_ref() == Some(&id) {
            state.executing = None;
        }
    }

    fn record_audit(&self, unit_id: &str, action: AuditAction, detail: Option<String>) {
        if let Some(sink) = &self.audit {
            sink.record(build_audit_event(unit_id, self.name.as_str(), action, detail));
        }
    }
}

/// One drain loop. Dropping it before it stops on its own (runtime teardown,
/// a panic escaping the unit's section) hands the queue back in a usable state.
struct DrainLoop<P, X>
where
    P: Send + 'static,
    X: TaskExecutor<P>,
{
    shared: Arc<Shared<P, X>>,
    generation: u64,
    /// Released only after `Drop` has settled the in-flight unit.
    lane: Option<OwnedSemaphorePermit>,
    finished: bool,
}

impl<P, X> DrainLoop<P, X>
where
    P: Send + 'static,
    X: TaskExecutor<P>,
{
    fn new(shared: Arc<Shared<P, X>>, generation: u64) -> Self {
        Self {
            shared,
            generation,
            lane: None,
            finished: false,
        }
    }

    async fn run(mut self) {
        // Held for the whole loop so a loop superseded by clear() finishes its
        // in-flight unit before a newer loop executes anything.
        let Ok(permit) = Arc::clone(&self.shared.lane).acquire_owned().await else {
            self.finished = true;
            return;
        };
        self.lane = Some(permit);
        loop {
            match self.shared.next_step(self.generation) {
                Step::Stop => break,
                Step::Wait(wait) => {
                    debug!(
                        queue = %self.shared.name,
                        wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
                        "rate window exhausted"
                    );
                    tokio::time::sleep(wait).await;
                }
                Step::Run(unit) => self.shared.run_unit(unit).await,
            }
        }
        self.finished = true;
    }
}

impl<P, X> Drop for DrainLoop<P, X>
where
    P: Send + 'static,
    X: TaskExecutor<P>,
{
    fn drop(&mut self) {
        if !self.finished {
            self.shared.abandon(self.generation, self.lane.is_some());
        }
    }
}

impl<P, X> Shared<P, X>
where
    P: Send + 'static,
    X: TaskExecutor<P>,
{
    /// Settle state for a loop that was dropped mid-run.
    ///
    /// The in-flight unit's sink went down with the loop, so its handle
    /// already resolves as cleared; only its slot is released here. Queued
    /// units of the current generation are cleared and the queue goes idle.
    fn abandon(&self, generation: u64, held_lane: bool) {
        let (cleared, pending) = {
            let mut state = self.state.lock();
            if held_lane && state.executing.take().is_some() {
                state.pending = state.pending.saturating_sub(1);
            }
            let drained = if state.generation == generation {
                state.drain = DrainState::Idle;
                state.buffer.drain_all()
            } else {
                Vec::new()
            };
            state.pending = state.pending.saturating_sub(drained.len());
            (drained, state.pending)
        };

        let count = cleared.len();
        for unit in cleared {
            unit.payload
                .sink
                .fail(UnitError::Queue(QueueError::QueueCleared));
        }
        self.counters
            .cleared
            .fetch_add(count as u64, std::sync::atomic::Ordering::Relaxed);
        warn!(
            queue = %self.name,
            generation,
            cleared = count,
            pending,
            "drain loop dropped before finishing"
        );
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
