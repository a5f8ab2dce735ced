use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunLogEventKind {
    RunStarted,
    PricesLoaded,
    SimulationCompleted,
    SnapshotWritten,
}

impl RunLogEventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RunStarted => "run_started",
            Self::PricesLoaded => "prices_loaded",
            Self::SimulationCompleted => "simulation_completed",
            Self::SnapshotWritten => "snapshot_written",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLogEvent {
    pub run_id: u64,
    pub kind: RunLogEventKind,
    pub rows: Option<usize>,
}

impl RunLogEvent {
    pub fn new(run_id: u64, kind: RunLogEventKind, rows: Option<usize>) -> Self {
        Self { run_id, kind, rows }
    }
}

pub trait RunLogWriter: Send {
    fn write(&mut self, event: RunLogEvent);
}

/// Forwards run log events to the `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRunLogWriter;

impl RunLogWriter for TracingRunLogWriter {
    fn write(&mut self, event: RunLogEvent) {
        info!(
            run_id = event.run_id,
            stage = event.kind.as_str(),
            rows = ?event.rows,
            "backtest run progress"
        );
    }
}

#[derive(Debug, Default)]
pub struct InMemoryRunLogWriter {
    events: Vec<RunLogEvent>,
}

impl InMemoryRunLogWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[RunLogEvent] {
        &self.events
    }

    pub fn kinds(&self) -> Vec<RunLogEventKind> {
        self.events.iter().map(|event| event.kind).collect()
    }
}

impl RunLogWriter for InMemoryRunLogWriter {
    fn write(&mut self, event: RunLogEvent) {
        self.events.push(event);
    }
}
