use super::Param;
use crate::agents::DecisionParameters;
use log::info;
use serde::{Deserialize, Serialize};
use std::io::Write;

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum RecordError {
    #[error("failed to write record: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// How the search treated the candidate of one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IterationOutcome {
    /// Hill climbing: whether the candidate replaced the current point.
    Accepted(bool),
    /// Annealing: acceptance plus the temperature after this iteration's decay.
    Annealed { accepted: bool, temperature: f64 },
}

/// One line of the optimizer log. Iteration 0 is the scored starting point
/// and carries no change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    pub iteration: u32,
    pub change: Option<(Param, f64)>,
    /// Measured score of this iteration's candidate, kept even when rejected.
    pub candidate_score: f64,
    /// Score of the current point after the accept/reject decision.
    pub score: f64,
    pub outcome: IterationOutcome,
    /// Current point after the accept/reject decision.
    pub params: DecisionParameters,
}

/// Destination for iteration records.
pub trait RecordSink {
    fn record(&mut self, record: &IterationRecord) -> Result<(), RecordError>;
}

/// Keeps every record in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub records: Vec<IterationRecord>,
}

impl RecordSink for MemorySink {
    fn record(&mut self, record: &IterationRecord) -> Result<(), RecordError> {
        self.records.push(record.clone());
        Ok(())
    }
}

/// One JSON object per line.
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RecordSink for JsonLinesSink<W> {
    fn record(&mut self, record: &IterationRecord) -> Result<(), RecordError> {
        serde_json::to_writer(&mut self.out, record)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }
}

/// Forwards records to the `log` facade at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl RecordSink for LogSink {
    fn record(&mut self, r: &IterationRecord) -> Result<(), RecordError> {
        let change = match r.change {
            Some((param, value)) => format!("{param} -> {value:.3}"),
            None => "initial".to_string(),
        };
        match r.outcome {
            IterationOutcome::Accepted(ok) => info!(
                "[{}] {change}, score {:.4} (current {:.4}), accepted: {ok}",
                r.iteration, r.candidate_score, r.score
            ),
            IterationOutcome::Annealed { accepted, temperature } => info!(
                "[{}] {change}, score {:.4} (current {:.4}), temp {temperature:.4}, ok: {accepted}",
                r.iteration, r.candidate_score, r.score
            ),
        }
        Ok(())
    }
}

/// Sends each record to two sinks.
pub struct Tee<'a>(pub &'a mut dyn RecordSink, pub &'a mut dyn RecordSink);

impl RecordSink for Tee<'_> {
    fn record(&mut self, record: &IterationRecord) -> Result<(), RecordError> {
        self.0.record(record)?;
        self.1.record(record)
    }
}
