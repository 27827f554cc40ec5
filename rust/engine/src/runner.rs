//! Simulation orchestration.
//!
//! A [`SimulationRunner`] validates a [`StartRequest`] synchronously, then runs
//! the round loop on one dedicated worker thread. The worker only ever pushes
//! to the caller: [`Progress`] snapshots through a bounded channel whose sends
//! never wait, and a single [`RunOutcome`] through a oneshot channel.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};

use crate::dealer::{check_card_budget, Dealer, Variant, MAX_SEATS, MIN_SEATS};
use crate::errors::SimError;
use crate::hand::Category;
use crate::record::{RecordCodec, DEFAULT_INDEX_BYTES};
use crate::round::UniqueRound;
use crate::stats::Statistics;

/// Whether completed rounds are kept for the completion event.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Retention {
    #[default]
    Keep,
    /// Only statistics are accumulated; bounds memory for very long runs.
    Discard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Base seed; `None` draws one from entropy at the start of each run.
    pub seed: Option<u64>,
    pub variant: Variant,
    /// Emit progress every N completed rounds (0 disables the round cadence).
    pub progress_every: u64,
    /// Also emit when this much wall-clock time passed since the last event.
    pub progress_interval_ms: Option<u64>,
    pub retention: Retention,
    /// Evaluate rounds in parallel batches, re-ordered by index before commit.
    pub parallel: bool,
    pub batch_size: usize,
    /// Stop cooperatively once this many rounds are complete.
    pub break_after: Option<u64>,
    pub channel_capacity: usize,
    /// Round-index width of every record; a round past its range fails the run.
    pub index_bytes: u8,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            seed: None,
            variant: Variant::Draw,
            progress_every: 1000,
            progress_interval_ms: None,
            retention: Retention::Keep,
            parallel: false,
            batch_size: 4096,
            break_after: None,
            channel_capacity: 1024,
            index_bytes: DEFAULT_INDEX_BYTES,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct StartRequest {
    pub rounds: u64,
    pub seats: usize,
}

impl StartRequest {
    pub fn new(rounds: u64, seats: usize) -> Self {
        Self { rounds, seats }
    }

    pub fn validate(&self, variant: Variant) -> Result<(), SimError> {
        if self.rounds == 0 {
            return Err(SimError::InvalidRoundCount);
        }
        if !(MIN_SEATS..=MAX_SEATS).contains(&self.seats) {
            return Err(SimError::InvalidSeatCount {
                seats: self.seats,
                min: MIN_SEATS,
                max: MAX_SEATS,
            });
        }
        check_card_budget(variant, self.seats)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum RunState {
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl RunState {
    fn from_u8(v: u8) -> RunState {
        match v {
            1 => RunState::Running,
            2 => RunState::Completed,
            3 => RunState::Cancelled,
            4 => RunState::Failed,
            _ => RunState::Idle,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            RunState::Idle => 0,
            RunState::Running => 1,
            RunState::Completed => 2,
            RunState::Cancelled => 3,
            RunState::Failed => 4,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunState::Completed | RunState::Cancelled | RunState::Failed
        )
    }
}

/// Progress snapshot published by the worker.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Progress {
    pub completed_rounds: u64,
    pub total_rounds: u64,
    pub elapsed: Duration,
}

impl Progress {
    pub fn percent(&self) -> f64 {
        if self.total_rounds == 0 {
            return 0.0;
        }
        self.completed_rounds as f64 * 100.0 / self.total_rounds as f64
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

/// Cooperative cancellation flag, checked by the worker between rounds.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Receives progress snapshots. Implementations must return promptly.
pub trait ProgressObserver {
    fn on_progress(&mut self, progress: &Progress);
}

impl<F: FnMut(&Progress)> ProgressObserver for F {
    fn on_progress(&mut self, progress: &Progress) {
        self(progress)
    }
}

/// Forwards progress into a bounded channel with `try_send`; a full channel
/// drops the snapshot instead of stalling the worker.
#[derive(Debug)]
struct ChannelObserver {
    tx: mpsc::Sender<Progress>,
    dropped: u64,
}

impl ProgressObserver for ChannelObserver {
    fn on_progress(&mut self, progress: &Progress) {
        match self.tx.try_send(*progress) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.dropped += 1;
                tracing::trace!(
                    completed = progress.completed_rounds,
                    "progress channel full, snapshot dropped"
                );
            }
            Err(TrySendError::Closed(_)) => {}
        }
    }
}

/// Everything accumulated by a run, complete or not.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub seed: u64,
    pub variant: Variant,
    pub seats: usize,
    pub index_bytes: u8,
    pub rounds: Vec<UniqueRound>,
    pub statistics: Statistics,
    pub completed_rounds: u64,
    pub total_rounds: u64,
    pub elapsed: Duration,
}

#[derive(Debug)]
pub enum RunOutcome {
    Completed(RunReport),
    Cancelled(RunReport),
    Failed { error: SimError, partial: RunReport },
}

impl RunOutcome {
    pub fn state(&self) -> RunState {
        match self {
            RunOutcome::Completed(_) => RunState::Completed,
            RunOutcome::Cancelled(_) => RunState::Cancelled,
            RunOutcome::Failed { .. } => RunState::Failed,
        }
    }

    pub fn report(&self) -> &RunReport {
        match self {
            RunOutcome::Completed(r) | RunOutcome::Cancelled(r) => r,
            RunOutcome::Failed { partial, .. } => partial,
        }
    }

    pub fn into_report(self) -> RunReport {
        match self {
            RunOutcome::Completed(r) | RunOutcome::Cancelled(r) => r,
            RunOutcome::Failed { partial, .. } => partial,
        }
    }

    pub fn error(&self) -> Option<&SimError> {
        match self {
            RunOutcome::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Owns the run lifecycle: `Idle -> Running -> Completed | Cancelled | Failed`.
/// A runner in a terminal state may start again; statistics start from zero.
#[derive(Debug)]
pub struct SimulationRunner {
    config: RunnerConfig,
    state: Arc<AtomicU8>,
}

impl SimulationRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self {
            config,
            state: Arc::new(AtomicU8::new(RunState::Idle.as_u8())),
        }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn state(&self) -> RunState {
        RunState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Validates `request` and spawns the worker. Validation failures are
    /// returned here and never enter `Running`.
    pub fn start(&self, request: StartRequest) -> Result<RunHandle, SimError> {
        self.start_with_cancel(request, CancelToken::new())
    }

    /// Like [`SimulationRunner::start`], observing an existing token, e.g. one
    /// tripped by a signal handler.
    pub fn start_with_cancel(
        &self,
        request: StartRequest,
        cancel: CancelToken,
    ) -> Result<RunHandle, SimError> {
        request.validate(self.config.variant)?;
        let codec = RecordCodec::new(self.config.index_bytes)?;
        let previous = self
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |s| {
                (s != RunState::Running.as_u8()).then_some(RunState::Running.as_u8())
            })
            .map_err(|_| SimError::RunnerBusy)?;

        let (progress_tx, progress_rx) = mpsc::channel(self.config.channel_capacity.max(1));
        let (done_tx, done_rx) = oneshot::channel();

        let config = self.config.clone();
        let state = Arc::clone(&self.state);
        let worker_cancel = cancel.clone();
        let spawned = std::thread::Builder::new()
            .name("pokersim-worker".into())
            .spawn(move || {
                let mut observer = ChannelObserver {
                    tx: progress_tx,
                    dropped: 0,
                };
                let outcome = simulate(&config, codec, &request, &worker_cancel, &mut observer);
                if observer.dropped > 0 {
                    tracing::debug!(dropped = observer.dropped, "progress snapshots dropped");
                }
                state.store(outcome.state().as_u8(), Ordering::Release);
                // The caller may have dropped its handle; the outcome is discarded then.
                let _ = done_tx.send(outcome);
            });

        let worker = match spawned {
            Ok(handle) => handle,
            Err(e) => {
                self.state.store(previous, Ordering::Release);
                return Err(SimError::Io(e));
            }
        };

        Ok(RunHandle {
            progress: progress_rx,
            completion: done_rx,
            cancel,
            state: Arc::clone(&self.state),
            worker: Some(worker),
        })
    }
}

/// Caller-side view of a running simulation.
#[derive(Debug)]
pub struct RunHandle {
    progress: mpsc::Receiver<Progress>,
    completion: oneshot::Receiver<RunOutcome>,
    cancel: CancelToken,
    state: Arc<AtomicU8>,
    worker: Option<JoinHandle<()>>,
}

impl RunHandle {
    /// Progress stream; yields `None` once the worker has finished.
    pub fn progress(&mut self) -> &mut mpsc::Receiver<Progress> {
        &mut self.progress
    }

    pub fn try_progress(&mut self) -> Option<Progress> {
        self.progress.try_recv().ok()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn state(&self) -> RunState {
        RunState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Blocks until the worker delivers its outcome. Must not be called from
    /// inside an async runtime; use [`RunHandle::finished`] there.
    pub fn wait(mut self) -> RunOutcome {
        let received = self.completion.blocking_recv();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        received.unwrap_or_else(|_| lost_worker(&self.state))
    }

    /// Async counterpart of [`RunHandle::wait`].
    pub async fn finished(self) -> RunOutcome {
        let state = self.state;
        self.completion
            .await
            .unwrap_or_else(|_| lost_worker(&state))
    }
}

/// The worker died without reporting (it panicked); the runner is released.
fn lost_worker(state: &AtomicU8) -> RunOutcome {
    state.store(RunState::Failed.as_u8(), Ordering::Release);
    RunOutcome::Failed {
        error: SimError::WorkerLost,
        partial: RunReport {
            seed: 0,
            variant: Variant::Draw,
            seats: 0,
            index_bytes: DEFAULT_INDEX_BYTES,
            rounds: Vec::new(),
            statistics: Statistics::default(),
            completed_rounds: 0,
            total_rounds: 0,
            elapsed: Duration::ZERO,
        },
    }
}

/// Runs the round loop on the calling thread. This is the worker body; it is
/// public so callers that already own a thread can drive it directly.
pub fn run_simulation(
    config: &RunnerConfig,
    request: &StartRequest,
    cancel: &CancelToken,
    observer: &mut dyn ProgressObserver,
) -> Result<RunOutcome, SimError> {
    request.validate(config.variant)?;
    let codec = RecordCodec::new(config.index_bytes)?;
    Ok(simulate(config, codec, request, cancel, observer))
}

struct PlayedRound {
    round: UniqueRound,
    categories: Vec<Category>,
}

fn play_round(run: &RoundRange<'_>, index: u64) -> Result<PlayedRound, SimError> {
    let deal = run.dealer.deal_round(index, run.seats)?;
    let strengths = deal.evaluate();
    let records = strengths
        .iter()
        .enumerate()
        .map(|(seat, s)| run.codec.encode_raw(index, seat, s))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(PlayedRound {
        round: UniqueRound::new(index, records),
        categories: strengths.iter().map(|s| s.category).collect(),
    })
}

struct Cadence {
    every: u64,
    interval: Option<Duration>,
    last: Instant,
}

impl Cadence {
    fn due(&mut self, completed: u64, total: u64) -> bool {
        let by_rounds = self.every > 0 && completed % self.every == 0;
        let by_time = match self.interval {
            Some(iv) => self.last.elapsed() >= iv,
            None => false,
        };
        if completed == total || by_rounds || by_time {
            self.last = Instant::now();
            true
        } else {
            false
        }
    }
}

struct Accumulator {
    keep: bool,
    rounds: Vec<UniqueRound>,
    statistics: Statistics,
    completed: u64,
}

impl Accumulator {
    fn commit(&mut self, played: PlayedRound) -> Result<(), SimError> {
        for (seat, &category) in played.categories.iter().enumerate() {
            self.statistics.record(seat, category)?;
        }
        if self.keep {
            self.rounds.push(played.round);
        }
        self.completed += 1;
        Ok(())
    }
}

enum Stop {
    Finished,
    Cancelled,
    Failed(SimError),
}

fn simulate(
    config: &RunnerConfig,
    codec: RecordCodec,
    request: &StartRequest,
    cancel: &CancelToken,
    observer: &mut dyn ProgressObserver,
) -> RunOutcome {
    let seed = config.seed.unwrap_or_else(rand::random);
    let dealer = Dealer::with_variant(seed, config.variant);
    let total = request.rounds;
    let started = Instant::now();

    tracing::info!(
        rounds = total,
        seats = request.seats,
        variant = %config.variant,
        seed,
        parallel = config.parallel,
        "simulation started"
    );

    let keep = config.retention == Retention::Keep;
    let mut acc = Accumulator {
        keep,
        rounds: Vec::with_capacity(if keep { total.min(1 << 16) as usize } else { 0 }),
        statistics: Statistics::new(request.seats),
        completed: 0,
    };
    let mut cadence = Cadence {
        every: config.progress_every,
        interval: config.progress_interval_ms.map(Duration::from_millis),
        last: started,
    };
    let mut publish = |completed: u64, force: bool| {
        if force || cadence.due(completed, total) {
            tracing::debug!(completed, total, "progress");
            observer.on_progress(&Progress {
                completed_rounds: completed,
                total_rounds: total,
                elapsed: started.elapsed(),
            });
        }
    };
    // Rounds past this bound are never started.
    let limit = config.break_after.map_or(total, |n| n.min(total));
    let run = RoundRange {
        dealer: &dealer,
        seats: request.seats,
        codec,
        total,
        limit,
        cancel,
    };

    let stop = if config.parallel {
        run_parallel(&run, config.batch_size, &mut acc, &mut publish)
    } else {
        run_sequential(&run, &mut acc, &mut publish)
    };
    if matches!(stop, Stop::Cancelled) {
        publish(acc.completed, true);
    }

    let report = RunReport {
        seed,
        variant: config.variant,
        seats: request.seats,
        index_bytes: codec.index_bytes(),
        completed_rounds: acc.completed,
        total_rounds: total,
        rounds: acc.rounds,
        statistics: acc.statistics,
        elapsed: started.elapsed(),
    };

    match stop {
        Stop::Finished => {
            tracing::info!(
                rounds = report.completed_rounds,
                elapsed_ms = report.elapsed.as_millis() as u64,
                "simulation completed"
            );
            RunOutcome::Completed(report)
        }
        Stop::Cancelled => {
            tracing::warn!(
                completed = report.completed_rounds,
                total,
                "simulation cancelled"
            );
            RunOutcome::Cancelled(report)
        }
        Stop::Failed(error) => {
            tracing::error!(
                completed = report.completed_rounds,
                error = %error,
                "simulation failed"
            );
            RunOutcome::Failed {
                error,
                partial: report,
            }
        }
    }
}

struct RoundRange<'a> {
    dealer: &'a Dealer,
    seats: usize,
    codec: RecordCodec,
    total: u64,
    limit: u64,
    cancel: &'a CancelToken,
}

impl RoundRange<'_> {
    fn should_stop(&self, next: u64) -> bool {
        next >= self.limit || self.cancel.is_cancelled()
    }
}

fn run_sequential(
    run: &RoundRange<'_>,
    acc: &mut Accumulator,
    publish: &mut dyn FnMut(u64, bool),
) -> Stop {
    for index in 0..run.total {
        if run.should_stop(index) {
            return Stop::Cancelled;
        }
        if let Err(e) = play_round(run, index).and_then(|p| acc.commit(p)) {
            return Stop::Failed(e);
        }
        publish(acc.completed, false);
    }
    Stop::Finished
}

#[cfg(feature = "parallel")]
fn run_parallel(
    run: &RoundRange<'_>,
    batch_size: usize,
    acc: &mut Accumulator,
    publish: &mut dyn FnMut(u64, bool),
) -> Stop {
    use rayon::prelude::*;

    let batch = batch_size.max(1) as u64;
    let mut next = 0u64;
    while next < run.total {
        if run.should_stop(next) {
            return Stop::Cancelled;
        }
        let end = (next + batch).min(run.limit);
        let played: Vec<Result<PlayedRound, SimError>> = (0..(end - next) as usize)
            .into_par_iter()
            .map(|offset| play_round(run, next + offset as u64))
            .collect();
        // collect() keeps index order, so commits stay strictly increasing.
        for result in played {
            if let Err(e) = result.and_then(|p| acc.commit(p)) {
                return Stop::Failed(e);
            }
            publish(acc.completed, false);
        }
        next = end;
    }
    Stop::Finished
}

#[cfg(not(feature = "parallel"))]
fn run_parallel(
    run: &RoundRange<'_>,
    _batch_size: usize,
    acc: &mut Accumulator,
    publish: &mut dyn FnMut(u64, bool),
) -> Stop {
    tracing::warn!("built without the `parallel` feature; running rounds sequentially");
    run_sequential(run, acc, publish)
}
