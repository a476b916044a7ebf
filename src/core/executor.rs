//! # Executor: runs a batch over a bounded worker pool.
//!
//! The [`Executor`] owns the configuration, the subscriber fan-out and the
//! run-scoped unit tracker. Each call to [`Executor::run`] builds a fresh run
//! context (task source, outcome stream, cancellation token), drives it to the end
//! and joins every unit it spawned before returning.
//!
//! ## High-level architecture
//! ```text
//! Inputs to run():
//!   Vec<TaskRef> ──► Executor::run(tasks)
//!
//! Starting:
//!   validate cfg (workers == 0 → InvalidWorkers, nothing spawned)
//!   empty batch  → Ok(()), nothing spawned
//!   TaskSource(tasks, cancel)   mpsc::channel(min(outcome_capacity, workers))
//!   Worker[0]  Worker[1]  ...  Worker[min(N, tasks)-1]   (JoinSet)
//!
//! Dispatching:
//!   Worker ── reserve slot ── source.next() ── run_one ── Outcome ──► ErrorAggregator
//!                                                                        │
//!                                          limit reached: cancel token ◄─┘
//!                                                         drop receiver
//!
//! Draining:
//!   every worker has exited → last Sender dropped → aggregator sees end of stream
//!
//! Done:
//!   Verdict → Ok(()) | Err(ErrorsLimitExceeded)
//! ```
//!
//! ## Rules
//! - The aggregator runs inside the caller's future, next to the join loop; only
//!   workers are spawned.
//! - `run` returns only after every worker it spawned has been joined.
//! - If the `run` future is dropped early, the token is cancelled and the
//!   `JoinSet` aborts the remaining workers.
//!
//! ## Example
//! ```rust
//! use batchvisor::{Config, ErrorLimit, Executor, TaskError, TaskFn, TaskRef};
//!
//! #[tokio::main(flavor = "multi_thread", worker_threads = 2)]
//! async fn main() {
//!     let exec = Executor::builder(Config::new(4, ErrorLimit::max(2))).build();
//!
//!     let tasks: Vec<TaskRef> = (0..8)
//!         .map(|i| {
//!             TaskFn::arc(format!("job-{i}"), move || async move {
//!                 if i % 3 == 0 { Err(TaskError::fail("odd one out")) } else { Ok(()) }
//!             }) as TaskRef
//!         })
//!         .collect();
//!
//!     let res = exec.run(tasks).await;
//!     assert!(res.unwrap_err().is_limit_exceeded());
//!     assert_eq!(exec.active_units(), 0);
//!     exec.shutdown().await;
//! }
//! ```

use std::sync::Arc;

use tokio::{sync::mpsc, task::JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::{
    core::{
        aggregator::ErrorAggregator, alive::UnitTracker, builder::ExecutorBuilder, config::Config,
        source::TaskSource, worker::Worker,
    },
    error::RunError,
    events::{Event, EventKind},
    subscribers::SubscriberSet,
    tasks::TaskRef,
};

/// Stage of a single run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Starting,
    Dispatching,
    Draining,
    Done,
}

impl Phase {
    fn as_str(&self) -> &'static str {
        match self {
            Phase::Starting => "starting",
            Phase::Dispatching => "dispatching",
            Phase::Draining => "draining",
            Phase::Done => "done",
        }
    }

    fn enter(self, tasks: usize) {
        debug!(target: "batchvisor", phase = self.as_str(), tasks, "batch phase");
    }
}

/// Bounded concurrent batch executor.
pub struct Executor {
    cfg: Config,
    subs: Arc<SubscriberSet>,
    units: UnitTracker,
}

impl Executor {
    /// Creates an executor without subscribers.
    pub fn new(cfg: Config) -> Self {
        Self::new_internal(cfg, SubscriberSet::new(Vec::new()))
    }

    /// Returns a builder for an executor with subscribers.
    pub fn builder(cfg: Config) -> ExecutorBuilder {
        ExecutorBuilder::new(cfg)
    }

    pub(crate) fn new_internal(cfg: Config, subs: SubscriberSet) -> Self {
        Self {
            cfg,
            subs: Arc::new(subs),
            units: UnitTracker::new(),
        }
    }

    /// Configuration used by every run.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Number of run-scoped units (workers) still alive.
    ///
    /// Zero whenever no [`run`](Self::run) is in progress.
    pub fn active_units(&self) -> usize {
        self.units.active()
    }

    /// Runs `tasks` across the configured worker pool.
    ///
    /// Returns `Ok(())` when the batch completed without reaching the error limit,
    /// [`RunError::ErrorsLimitExceeded`] when it was aborted, and
    /// [`RunError::InvalidWorkers`] when the worker count is zero.
    pub async fn run(&self, tasks: impl Into<Arc<[TaskRef]>>) -> Result<(), RunError> {
        self.cfg.validate()?;
        let tasks: Arc<[TaskRef]> = tasks.into();
        let total = tasks.len();
        if total == 0 {
            debug!(target: "batchvisor", "empty batch; nothing to run");
            return Ok(());
        }

        Phase::Starting.enter(total);
        let workers = self.cfg.workers.min(total);
        let cancel = CancellationToken::new();
        let cancel_on_drop = cancel.clone().drop_guard();

        let (tx, rx) = mpsc::channel(self.cfg.outcome_capacity().min(workers));
        let source = Arc::new(TaskSource::new(tasks, cancel.clone()));
        self.subs.emit(
            &Event::new(EventKind::BatchStarting)
                .with_count(total)
                .with_workers(workers),
        );

        let mut set = JoinSet::new();
        for id in 0..workers {
            let unit = self.units.enter();
            let worker = Worker {
                id,
                source: Arc::clone(&source),
                outcomes: tx.clone(),
                cancel: cancel.clone(),
                subs: Arc::clone(&self.subs),
            };
            set.spawn(async move {
                let _unit = unit;
                worker.run().await
            });
        }
        drop(tx);

        Phase::Dispatching.enter(total);
        let aggregator =
            ErrorAggregator::new(self.cfg.error_limit, cancel.clone(), Arc::clone(&self.subs));
        let (verdict, executed) =
            tokio::join!(aggregator.observe(rx), join_workers(&mut set, total));
        cancel_on_drop.disarm();

        Phase::Done.enter(total);
        let res = verdict.into_result();
        debug!(
            target: "batchvisor",
            executed,
            unclaimed = source.remaining(),
            succeeded = verdict.tally.succeeded,
            failed = verdict.tally.failed,
            limit = %self.cfg.error_limit,
            "batch finished"
        );
        self.subs.emit(
            &Event::new(EventKind::BatchFinished)
                .with_count(verdict.tally.failed)
                .with_reason(match &res {
                    Ok(()) => "success",
                    Err(e) => e.as_label(),
                }),
        );
        res
    }

    /// Closes subscriber queues and waits until queued events are delivered.
    pub async fn shutdown(self) {
        match Arc::into_inner(self.subs) {
            Some(subs) => subs.shutdown().await,
            None => warn!(target: "batchvisor", "subscriber set still shared; skipping shutdown"),
        }
    }
}

/// Joins every worker of a run; returns the number of tasks they executed.
async fn join_workers(set: &mut JoinSet<usize>, total: usize) -> usize {
    let mut executed = 0;
    while let Some(res) = set.join_next().await {
        match res {
            Ok(n) => executed += n,
            Err(e) => error!(target: "batchvisor", error = %e, "worker join failed"),
        }
    }
    Phase::Draining.enter(total);
    executed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ErrorLimit;
    use crate::error::TaskError;
    use crate::subscribers::Subscribe;
    use crate::tasks::TaskFn;

    use async_trait::async_trait;
    use rand::Rng;
    use rand::seq::SliceRandom;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Builds `n` tasks that bump `started`, sleep for `delay` and fail when `fails(i)`.
    fn batch(
        n: usize,
        started: &Arc<AtomicUsize>,
        delay: Duration,
        fails: impl Fn(usize) -> bool,
    ) -> Vec<TaskRef> {
        (0..n)
            .map(|i| {
                let started = Arc::clone(started);
                let fail = fails(i);
                TaskFn::arc(format!("task-{i}"), move || {
                    let started = Arc::clone(&started);
                    async move {
                        started.fetch_add(1, Ordering::SeqCst);
                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                        if fail {
                            Err(TaskError::fail(format!("task {i} failed")))
                        } else {
                            Ok(())
                        }
                    }
                }) as TaskRef
            })
            .collect()
    }

    fn executor(workers: usize, limit: i64) -> Executor {
        Executor::new(Config::new(workers, ErrorLimit::from(limit)))
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn all_failing_tasks_abort_with_bounded_overrun() {
        let started = Arc::new(AtomicUsize::new(0));
        let exec = executor(10, 23);
        let tasks = batch(50, &started, Duration::from_millis(2), |_| true);

        let res = exec.run(tasks).await;
        assert_eq!(
            res,
            Err(RunError::ErrorsLimitExceeded {
                limit: 23,
                failed: 23
            })
        );
        let started = started.load(Ordering::SeqCst);
        assert!(started >= 23, "started {started}");
        assert!(started <= 33, "started {started}");
        assert_eq!(exec.active_units(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn all_succeeding_tasks_complete() {
        let started = Arc::new(AtomicUsize::new(0));
        let exec = executor(7, 1);

        assert_eq!(exec.run(batch(50, &started, Duration::ZERO, |_| false)).await, Ok(()));
        assert_eq!(started.load(Ordering::SeqCst), 50);
        assert_eq!(exec.active_units(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn unlimited_ignores_random_failures() {
        let fail = {
            let mut rng = rand::rng();
            let mut fail = vec![false; 10];
            fail[..rng.random_range(0..=10)].fill(true);
            fail.shuffle(&mut rng);
            fail
        };

        for limit in [0, -1] {
            let started = Arc::new(AtomicUsize::new(0));
            let exec = executor(5, limit);
            let fail = fail.clone();
            let tasks = batch(10, &started, Duration::from_millis(1), move |i| fail[i]);

            assert_eq!(exec.run(tasks).await, Ok(()));
            assert_eq!(started.load(Ordering::SeqCst), 10);
            assert_eq!(exec.active_units(), 0);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn empty_batch_succeeds_without_spawning() {
        let exec = executor(5, 1);
        assert_eq!(exec.run(Vec::<TaskRef>::new()).await, Ok(()));
        assert_eq!(exec.active_units(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn zero_workers_is_rejected_before_anything_starts() {
        let started = Arc::new(AtomicUsize::new(0));
        let exec = executor(0, 1);

        let res = exec.run(batch(5, &started, Duration::ZERO, |_| false)).await;
        assert_eq!(res, Err(RunError::InvalidWorkers { workers: 0 }));
        assert_eq!(started.load(Ordering::SeqCst), 0);
        assert_eq!(exec.active_units(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn first_failure_stops_within_worker_count() {
        let started = Arc::new(AtomicUsize::new(0));
        let exec = executor(4, 1);

        let res = exec
            .run(batch(20, &started, Duration::from_millis(5), |_| true))
            .await;
        assert!(res.as_ref().is_err_and(RunError::is_limit_exceeded));
        let started = started.load(Ordering::SeqCst);
        assert!((1..=5).contains(&started), "started {started}");
        assert_eq!(exec.active_units(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn every_task_runs_exactly_once_below_limit() {
        let hits: Arc<Vec<AtomicUsize>> = Arc::new((0..100).map(|_| AtomicUsize::new(0)).collect());
        let tasks: Vec<TaskRef> = (0..100)
            .map(|i| {
                let hits = Arc::clone(&hits);
                TaskFn::arc(format!("task-{i}"), move || {
                    let hits = Arc::clone(&hits);
                    async move {
                        hits[i].fetch_add(1, Ordering::SeqCst);
                        tokio::task::yield_now().await;
                        if i % 10 == 0 {
                            Err(TaskError::fail("tenth"))
                        } else {
                            Ok(())
                        }
                    }
                }) as TaskRef
            })
            .collect();

        let exec = executor(8, 11);
        assert_eq!(exec.run(tasks).await, Ok(()));
        for (i, h) in hits.iter().enumerate() {
            assert_eq!(h.load(Ordering::SeqCst), 1, "task {i}");
        }
    }

    #[derive(Default)]
    struct WorkerIds {
        starting: Mutex<Vec<usize>>,
        finished: Mutex<Vec<Option<String>>>,
    }

    #[async_trait]
    impl Subscribe for WorkerIds {
        async fn on_event(&self, ev: &Event) {
            match ev.kind {
                EventKind::TaskStarting => {
                    if let Some(w) = ev.worker {
                        self.starting.lock().unwrap().push(w);
                    }
                }
                EventKind::BatchFinished => {
                    self.finished
                        .lock()
                        .unwrap()
                        .push(ev.reason.as_deref().map(str::to_owned));
                }
                _ => {}
            }
        }
        fn name(&self) -> &'static str {
            "worker-ids"
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn all_workers_take_part() {
        let ids = Arc::new(WorkerIds::default());
        let exec = Executor::builder(Config::new(5, ErrorLimit::Unlimited))
            .with_subscribers(vec![ids.clone() as Arc<dyn Subscribe>])
            .build();
        let started = Arc::new(AtomicUsize::new(0));

        assert_eq!(
            exec.run(batch(50, &started, Duration::from_millis(3), |_| false)).await,
            Ok(())
        );
        exec.shutdown().await;

        let starting = ids.starting.lock().unwrap().clone();
        assert_eq!(starting.len(), 50);
        let distinct: HashSet<usize> = starting.into_iter().collect();
        assert_eq!(distinct, (0..5).collect());
        assert_eq!(
            ids.finished.lock().unwrap().as_slice(),
            &[Some("success".to_owned())]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn fewer_tasks_than_workers_spawns_one_worker_per_task() {
        let ids = Arc::new(WorkerIds::default());
        let exec = Executor::builder(Config::new(16, ErrorLimit::Unlimited))
            .with_subscribers(vec![ids.clone() as Arc<dyn Subscribe>])
            .build();
        let started = Arc::new(AtomicUsize::new(0));

        assert_eq!(
            exec.run(batch(3, &started, Duration::ZERO, |_| false)).await,
            Ok(())
        );
        exec.shutdown().await;

        let starting = ids.starting.lock().unwrap().clone();
        assert_eq!(starting.len(), 3);
        assert!(starting.iter().all(|w| *w < 3));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn panicking_tasks_count_as_failures() {
        let tasks: Vec<TaskRef> = (0..10)
            .map(|i| {
                TaskFn::arc(format!("task-{i}"), || async {
                    if true {
                        panic!("boom");
                    }
                    Ok::<(), TaskError>(())
                }) as TaskRef
            })
            .collect();

        let exec = executor(3, 2);
        assert_eq!(
            exec.run(tasks).await,
            Err(RunError::ErrorsLimitExceeded {
                limit: 2,
                failed: 2
            })
        );
        assert_eq!(exec.active_units(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn limit_reached_among_successes_with_single_worker() {
        let started = Arc::new(AtomicUsize::new(0));
        let exec = executor(1, 2);
        // ok, fail, ok, fail, then only successes
        let tasks = batch(20, &started, Duration::ZERO, |i| i == 1 || i == 3);

        assert!(exec.run(tasks).await.is_err_and(|e| e.is_limit_exceeded()));
        let started = started.load(Ordering::SeqCst);
        assert!((4..=5).contains(&started), "started {started}");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn executor_is_reusable_across_runs() {
        let exec = executor(3, 1);
        let started = Arc::new(AtomicUsize::new(0));

        assert!(exec.run(batch(6, &started, Duration::ZERO, |_| true)).await.is_err());
        assert_eq!(exec.run(batch(6, &started, Duration::ZERO, |_| false)).await, Ok(()));
        assert_eq!(exec.active_units(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn dropping_the_run_aborts_its_workers() {
        let exec = executor(4, 0);
        let started = Arc::new(AtomicUsize::new(0));
        let tasks = batch(8, &started, Duration::from_secs(30), |_| false);

        let res = tokio::time::timeout(Duration::from_millis(50), exec.run(tasks)).await;
        assert!(res.is_err());

        let drained = tokio::time::timeout(Duration::from_secs(5), async {
            while exec.active_units() > 0 {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await;
        assert!(drained.is_ok());
        assert!(started.load(Ordering::SeqCst) <= 4);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn huge_worker_count_runs_with_one_worker_per_task() {
        let started = Arc::new(AtomicUsize::new(0));
        let exec = Executor::new(Config::new(usize::MAX, ErrorLimit::max(1)));

        assert_eq!(
            exec.run(batch(3, &started, Duration::ZERO, |_| false)).await,
            Ok(())
        );
        assert_eq!(started.load(Ordering::SeqCst), 3);
        assert_eq!(exec.active_units(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn started_tasks_finish_before_an_aborted_run_returns() {
        let started = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicUsize::new(0));
        let tasks: Vec<TaskRef> = (0..40)
            .map(|i| {
                let started = Arc::clone(&started);
                let finished = Arc::clone(&finished);
                TaskFn::arc(format!("task-{i}"), move || {
                    let started = Arc::clone(&started);
                    let finished = Arc::clone(&finished);
                    async move {
                        started.fetch_add(1, Ordering::SeqCst);
                        if i == 0 {
                            finished.fetch_add(1, Ordering::SeqCst);
                            return Err(TaskError::fail("fast failure"));
                        }
                        tokio::time::sleep(Duration::from_millis(30)).await;
                        finished.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    }
                }) as TaskRef
            })
            .collect();

        let exec = executor(8, 1);
        assert_eq!(
            exec.run(tasks).await,
            Err(RunError::ErrorsLimitExceeded {
                limit: 1,
                failed: 1
            })
        );
        let started = started.load(Ordering::SeqCst);
        assert!((1..=9).contains(&started), "started {started}");
        assert_eq!(finished.load(Ordering::SeqCst), started);
    }
}
