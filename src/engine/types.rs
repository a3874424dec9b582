//! Engine output types
//!
//! Records and state checkpoints flow out through a sink so the engine never
//! decides the output medium itself.

use crate::error::Result;
use crate::state::State;
use crate::types::Record;
use serde_json::json;
use std::io::Write;
use std::time::Duration;

/// Totals for one sync run
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    /// Streams synced
    pub streams: u64,
    /// Records emitted
    pub records: u64,
    /// Pages fetched
    pub pages: u64,
    /// Wall-clock duration
    pub elapsed: Duration,
}

/// Receives emitted records and state checkpoints
pub trait RecordSink {
    /// Emit one normalized record
    fn record(&mut self, stream: &str, record: &Record) -> Result<()>;

    /// Emit a state checkpoint
    fn state(&mut self, state: &State) -> Result<()>;
}

/// Sink writing one JSON message per line
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    /// Create a sink over any writer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consume the sink and return the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for JsonLinesSink<W> {
    fn record(&mut self, stream: &str, record: &Record) -> Result<()> {
        let message = json!({
            "type": "RECORD",
            "stream": stream,
            "record": record,
        });
        writeln!(self.writer, "{message}")?;
        Ok(())
    }

    fn state(&mut self, state: &State) -> Result<()> {
        let message = json!({
            "type": "STATE",
            "value": state,
        });
        writeln!(self.writer, "{message}")?;
        Ok(())
    }
}

/// Sink collecting messages in memory
#[derive(Debug, Default)]
pub struct VecSink {
    /// Emitted (stream, record) pairs
    pub records: Vec<(String, Record)>,
    /// Emitted state checkpoints
    pub states: Vec<State>,
}

impl RecordSink for VecSink {
    fn record(&mut self, stream: &str, record: &Record) -> Result<()> {
        self.records.push((stream.to_string(), record.clone()));
        Ok(())
    }

    fn state(&mut self, state: &State) -> Result<()> {
        self.states.push(state.clone());
        Ok(())
    }
}
