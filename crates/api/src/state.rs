use std::collections::VecDeque;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use runtime::BacktestRunner;
use tokio::sync::{broadcast, RwLock};

use crate::dto::RunResponse;

const EVENT_CHANNEL_CAPACITY: usize = 256;
const RETAINED_RUNS: usize = 16;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StartRunError {
    RunIdOverflow,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum RunEvent {
    Connected {
        latest_run_id: Option<u64>,
    },
    RunStarted {
        run_id: u64,
    },
    RunCompleted {
        run_id: u64,
        months: usize,
        final_total: f64,
    },
    RunFailed {
        run_id: u64,
        kind: String,
        reason: String,
    },
}

impl RunEvent {
    pub fn connected(latest_run_id: Option<u64>) -> Self {
        Self::Connected { latest_run_id }
    }

    pub fn run_started(run_id: u64) -> Self {
        Self::RunStarted { run_id }
    }

    pub fn run_completed(run_id: u64, months: usize, final_total: f64) -> Self {
        Self::RunCompleted {
            run_id,
            months,
            final_total,
        }
    }

    pub fn run_failed(run_id: u64, kind: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::RunFailed {
            run_id,
            kind: kind.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppState {
    next_run_id: Arc<AtomicU64>,
    events_tx: broadcast::Sender<RunEvent>,
    runner: Arc<BacktestRunner>,
    runs: Arc<RwLock<VecDeque<RunResponse>>>,
}

impl AppState {
    pub fn new(runner: Arc<BacktestRunner>) -> Self {
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            next_run_id: Arc::new(AtomicU64::new(0)),
            events_tx,
            runner,
            runs: Arc::new(RwLock::new(VecDeque::with_capacity(RETAINED_RUNS))),
        }
    }

    pub fn runner(&self) -> &BacktestRunner {
        &self.runner
    }

    pub fn start_run(&self) -> Result<u64, StartRunError> {
        let previous = self
            .next_run_id
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                current.checked_add(1)
            })
            .map_err(|_| StartRunError::RunIdOverflow)?;

        Ok(previous + 1)
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<RunEvent> {
        self.events_tx.subscribe()
    }

    /// Sends `event` to every connected subscriber. Returns how many received
    /// it; zero when nobody is listening.
    pub fn publish_event(&self, event: RunEvent) -> usize {
        self.events_tx.send(event).unwrap_or(0)
    }

    /// Keeps `run` for lookups, dropping the oldest once the history is full.
    pub async fn record_run(&self, run: RunResponse) {
        let mut runs = self.runs.write().await;
        if runs.len() == RETAINED_RUNS {
            runs.pop_front();
        }
        runs.push_back(run);
    }

    pub async fn latest_run(&self) -> Option<RunResponse> {
        self.runs.read().await.back().cloned()
    }

    pub async fn find_run(&self, run_id: u64) -> Option<RunResponse> {
        self.runs
            .read()
            .await
            .iter()
            .find(|run| run.run_id == run_id)
            .cloned()
    }

    pub async fn latest_run_id(&self) -> Option<u64> {
        self.runs.read().await.back().map(|run| run.run_id)
    }
}
