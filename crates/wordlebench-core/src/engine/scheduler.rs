use crate::engine::session::GameSession;
use crate::model::{Game, Outcome, Pair};
use crate::storage::{Store, StoreHandle};
use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

pub const DEFAULT_PARALLEL: usize = 25;

/// Pairs still to play, in model-major order.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    pub pending: Vec<Pair>,
    /// Pairs already recorded in the store.
    pub skipped: usize,
}

#[derive(Debug, Clone)]
pub enum TaskOutcome {
    Recorded {
        pair: Pair,
        id: i64,
        outcome: Outcome,
        guesses: i64,
        cost: f64,
    },
    Faulted {
        pair: Pair,
        error: String,
    },
    PersistFailed {
        pair: Pair,
        error: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskFailure {
    pub model: String,
    pub word: String,
    pub kind: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub scheduled: usize,
    pub skipped: usize,
    pub solved: usize,
    pub exhausted: usize,
    pub errored: usize,
    pub faulted: usize,
    pub persist_failed: usize,
    pub total_cost: f64,
    pub failures: Vec<TaskFailure>,
}

impl RunSummary {
    pub fn record(&mut self, outcome: TaskOutcome) {
        match outcome {
            TaskOutcome::Recorded { outcome, cost, .. } => {
                self.total_cost += cost;
                match outcome {
                    Outcome::Solved => self.solved += 1,
                    Outcome::Exhausted => self.exhausted += 1,
                    Outcome::Errored => self.errored += 1,
                }
            }
            TaskOutcome::Faulted { pair, error } => {
                self.faulted += 1;
                self.failures.push(TaskFailure {
                    model: pair.model,
                    word: pair.word,
                    kind: "fault",
                    message: error,
                });
            }
            TaskOutcome::PersistFailed { pair, error } => {
                self.persist_failed += 1;
                self.failures.push(TaskFailure {
                    model: pair.model,
                    word: pair.word,
                    kind: "persist",
                    message: error,
                });
            }
        }
    }

    pub fn recorded(&self) -> usize {
        self.solved + self.exhausted + self.errored
    }

    /// No session faulted and every finished game was stored.
    pub fn is_clean(&self) -> bool {
        self.faulted == 0 && self.persist_failed == 0
    }
}

/// Plays every unrecorded (model, word) pair on a bounded pool of workers.
pub struct Scheduler {
    store: Store,
    session: GameSession,
    parallel: usize,
}

impl Scheduler {
    pub fn new(store: Store, session: GameSession, parallel: usize) -> Self {
        Self {
            store,
            session,
            parallel: parallel.max(1),
        }
    }

    pub fn parallel(&self) -> usize {
        self.parallel
    }

    pub async fn plan(&self, models: &[String], words: &[String]) -> anyhow::Result<Plan> {
        plan_pending(self.store.clone(), models.to_vec(), words.to_vec()).await
    }

    pub async fn run(&self, models: &[String], words: &[String]) -> anyhow::Result<RunSummary> {
        let plan = self.plan(models, words).await?;
        tracing::info!(
            event = "run.planned",
            pending = plan.pending.len(),
            skipped = plan.skipped,
            parallel = self.parallel
        );
        self.execute(plan).await
    }

    /// Runs an already computed plan. Outcomes are consumed in completion order.
    pub async fn execute(&self, plan: Plan) -> anyhow::Result<RunSummary> {
        let total = plan.pending.len();
        let mut summary = RunSummary {
            scheduled: total,
            skipped: plan.skipped,
            ..RunSummary::default()
        };
        if total == 0 {
            tracing::info!(event = "run.finished", scheduled = 0, "nothing to play");
            return Ok(summary);
        }

        let queue = Arc::new(Mutex::new(VecDeque::from(plan.pending)));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut pool = JoinSet::new();
        for worker_id in 0..self.parallel.min(total) {
            pool.spawn(worker(
                worker_id,
                Arc::clone(&queue),
                self.store.clone(),
                self.session.clone(),
                tx.clone(),
            ));
        }
        drop(tx);

        let mut completed = 0usize;
        while let Some(outcome) = rx.recv().await {
            completed += 1;
            if let TaskOutcome::Recorded {
                pair,
                id,
                outcome,
                guesses,
                ..
            } = &outcome
            {
                tracing::info!(
                    event = "task.completed",
                    model = %pair.model,
                    word = %pair.word,
                    id,
                    outcome = outcome.as_str(),
                    guesses,
                    completed,
                    total
                );
            }
            summary.record(outcome);
        }

        while let Some(res) = pool.join_next().await {
            if let Err(e) = res {
                tracing::error!(event = "worker.join_error", error = %e);
            }
        }

        tracing::info!(
            event = "run.finished",
            scheduled = summary.scheduled,
            solved = summary.solved,
            exhausted = summary.exhausted,
            errored = summary.errored,
            faulted = summary.faulted,
            persist_failed = summary.persist_failed,
            total_cost = summary.total_cost
        );
        Ok(summary)
    }
}

async fn worker(
    worker_id: usize,
    queue: Arc<Mutex<VecDeque<Pair>>>,
    store: Store,
    session: GameSession,
    tx: mpsc::UnboundedSender<TaskOutcome>,
) {
    // Opened on first insert, closed when the queue is drained.
    let mut handle: Option<StoreHandle> = None;

    while let Some(pair) = next_pair(&queue) {
        let outcome = run_task(pair, &session, &store, &mut handle).await;
        if tx.send(outcome).is_err() {
            break;
        }
    }

    if let Some(h) = handle {
        if let Err(e) = h.quiesce() {
            tracing::warn!(event = "worker.quiesce_failed", worker_id, error = %e);
        }
    }
}

fn next_pair(queue: &Mutex<VecDeque<Pair>>) -> Option<Pair> {
    queue
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .pop_front()
}

async fn run_task(
    pair: Pair,
    session: &GameSession,
    store: &Store,
    handle: &mut Option<StoreHandle>,
) -> TaskOutcome {
    // A separate task so a panicking session surfaces as a JoinError here.
    let play = {
        let session = session.clone();
        let pair = pair.clone();
        tokio::spawn(async move { session.play(&pair.model, &pair.word).await })
    };

    let game = match play.await {
        Ok(Ok(game)) => game,
        Ok(Err(e)) => {
            let error = format!("{e:#}");
            tracing::error!(
                event = "task.fault",
                model = %pair.model,
                word = %pair.word,
                error = %error,
                "session failed"
            );
            return TaskOutcome::Faulted { pair, error };
        }
        Err(e) => {
            let error = format!("session task failed: {e}");
            tracing::error!(
                event = "task.fault",
                model = %pair.model,
                word = %pair.word,
                error = %error,
                "session panicked"
            );
            return TaskOutcome::Faulted { pair, error };
        }
    };

    let (outcome, guesses, cost) = (game.outcome(), game.guesses, game.cost);
    match persist(store, handle, game).await {
        Ok(id) => TaskOutcome::Recorded {
            pair,
            id,
            outcome,
            guesses,
            cost,
        },
        Err(e) => {
            let error = format!("{e:#}");
            tracing::error!(
                event = "task.persist_failed",
                model = %pair.model,
                word = %pair.word,
                error = %error
            );
            TaskOutcome::PersistFailed { pair, error }
        }
    }
}

/// Inserts on the blocking pool with the worker's own handle.
async fn persist(
    store: &Store,
    handle: &mut Option<StoreHandle>,
    game: Game,
) -> anyhow::Result<i64> {
    let mut h = match handle.take() {
        Some(h) => h,
        None => store.handle()?,
    };
    let (h, res) = tokio::task::spawn_blocking(move || {
        let res = h.insert(&game);
        (h, res)
    })
    .await?;
    *handle = Some(h);
    res
}

/// Cross-product of `models` x `words` minus pairs already in the store.
///
/// Duplicate entries in either list are played once. The lookups run on the
/// blocking pool.
pub async fn plan_pending(
    store: Store,
    models: Vec<String>,
    words: Vec<String>,
) -> anyhow::Result<Plan> {
    tokio::task::spawn_blocking(move || plan_pairs(&store, &models, &words)).await?
}

fn plan_pairs(store: &Store, models: &[String], words: &[String]) -> anyhow::Result<Plan> {
    let models = dedup(models);
    let words = dedup(words);
    let handle = store.handle()?;

    let mut plan = Plan::default();
    for model in &models {
        for word in &words {
            if handle.exists(model, word)? {
                plan.skipped += 1;
            } else {
                plan.pending.push(Pair::new(model, word));
            }
        }
    }
    handle.quiesce()?;
    Ok(plan)
}

fn dedup(items: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    items.iter().filter(|s| seen.insert(*s)).cloned().collect()
}
