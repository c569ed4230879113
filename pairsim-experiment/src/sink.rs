use pairsim_core::TrialRecord;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use thiserror::Error;

/// Opaque identifier attached to every emitted session event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self(format!("{:016x}", rng.random::<u64>()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("response sink write failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("response sink could not encode event: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("response sink unavailable: {0}")]
    Unavailable(String),
}

/// Receives session boundaries and one record per answered trial.
pub trait ResponseSink {
    fn session_started(&mut self, session_id: &SessionId) -> Result<(), SinkError>;
    fn record_trial(&mut self, session_id: &SessionId, record: &TrialRecord)
    -> Result<(), SinkError>;
    fn session_completed(&mut self, session_id: &SessionId, elapsed_ms: u64)
    -> Result<(), SinkError>;
}

impl<S: ResponseSink + ?Sized> ResponseSink for &mut S {
    fn session_started(&mut self, session_id: &SessionId) -> Result<(), SinkError> {
        (**self).session_started(session_id)
    }
    fn record_trial(
        &mut self,
        session_id: &SessionId,
        record: &TrialRecord,
    ) -> Result<(), SinkError> {
        (**self).record_trial(session_id, record)
    }
    fn session_completed(
        &mut self,
        session_id: &SessionId,
        elapsed_ms: u64,
    ) -> Result<(), SinkError> {
        (**self).session_completed(session_id, elapsed_ms)
    }
}

impl<S: ResponseSink + ?Sized> ResponseSink for Box<S> {
    fn session_started(&mut self, session_id: &SessionId) -> Result<(), SinkError> {
        (**self).session_started(session_id)
    }
    fn record_trial(
        &mut self,
        session_id: &SessionId,
        record: &TrialRecord,
    ) -> Result<(), SinkError> {
        (**self).record_trial(session_id, record)
    }
    fn session_completed(
        &mut self,
        session_id: &SessionId,
        elapsed_ms: u64,
    ) -> Result<(), SinkError> {
        (**self).session_completed(session_id, elapsed_ms)
    }
}

/// Line-oriented event as written by [`JsonLinesSink`].
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum SinkLine<'a> {
    SessionStarted {
        session_id: &'a SessionId,
    },
    Trial {
        session_id: &'a SessionId,
        #[serde(flatten)]
        record: &'a TrialRecord,
    },
    SessionCompleted {
        session_id: &'a SessionId,
        elapsed_ms: u64,
    },
}

/// Writes one JSON object per line and flushes after each event.
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line(&mut self, line: &SinkLine<'_>) -> Result<(), SinkError> {
        serde_json::to_writer(&mut self.writer, line)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write> ResponseSink for JsonLinesSink<W> {
    fn session_started(&mut self, session_id: &SessionId) -> Result<(), SinkError> {
        self.write_line(&SinkLine::SessionStarted { session_id })
    }

    fn record_trial(
        &mut self,
        session_id: &SessionId,
        record: &TrialRecord,
    ) -> Result<(), SinkError> {
        self.write_line(&SinkLine::Trial { session_id, record })
    }

    fn session_completed(
        &mut self,
        session_id: &SessionId,
        elapsed_ms: u64,
    ) -> Result<(), SinkError> {
        self.write_line(&SinkLine::SessionCompleted {
            session_id,
            elapsed_ms,
        })
    }
}

/// Keeps every event in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub started: Vec<SessionId>,
    pub records: Vec<TrialRecord>,
    pub completed: Vec<(SessionId, u64)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResponseSink for MemorySink {
    fn session_started(&mut self, session_id: &SessionId) -> Result<(), SinkError> {
        self.started.push(session_id.clone());
        Ok(())
    }

    fn record_trial(
        &mut self,
        _session_id: &SessionId,
        record: &TrialRecord,
    ) -> Result<(), SinkError> {
        self.records.push(record.clone());
        Ok(())
    }

    fn session_completed(
        &mut self,
        session_id: &SessionId,
        elapsed_ms: u64,
    ) -> Result<(), SinkError> {
        self.completed.push((session_id.clone(), elapsed_ms));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairsim_core::{StimulusId, StimulusItem, Trial};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serde_json::Value;

    fn record() -> TrialRecord {
        let item = |id: &str| {
            StimulusItem::new(StimulusId::new(id).unwrap(), id, "", "$5", format!("{id}.png"))
        };
        let trial = Trial::comparison(item("K2"), item("K1")).unwrap();
        TrialRecord::new(1, &trial, 64, 2310)
    }

    #[test]
    fn json_lines_are_tagged() {
        let id = SessionId::new("s-1");
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.session_started(&id).unwrap();
        sink.record_trial(&id, &record()).unwrap();
        sink.session_completed(&id, 90_000).unwrap();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<Value> = out
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["event"], "session_started");
        assert_eq!(lines[0]["session_id"], "s-1");
        assert_eq!(lines[1]["event"], "trial");
        assert_eq!(lines[1]["pair_key"], "K1_K2");
        assert_eq!(lines[1]["position"], "BA");
        assert_eq!(lines[1]["left_item_id"], "K2");
        assert_eq!(lines[1]["rating"], 64);
        assert_eq!(lines[1]["response_time_ms"], 2310);
        assert_eq!(lines[1]["is_catch_trial"], false);
        assert_eq!(lines[2]["event"], "session_completed");
        assert_eq!(lines[2]["elapsed_ms"], 90_000);
    }

    #[test]
    fn memory_sink_keeps_order() {
        let id = SessionId::new("s-2");
        let mut sink = MemorySink::new();
        sink.session_started(&id).unwrap();
        sink.record_trial(&id, &record()).unwrap();
        assert_eq!(sink.started, vec![id.clone()]);
        assert_eq!(sink.records.len(), 1);
        assert!(sink.completed.is_empty());
    }

    #[test]
    fn boxed_borrowed_sink_forwards() {
        let id = SessionId::new("s-3");
        let mut inner = MemorySink::new();
        {
            let mut sink: Box<dyn ResponseSink + '_> = Box::new(&mut inner);
            sink.session_started(&id).unwrap();
            sink.session_completed(&id, 12).unwrap();
        }
        assert_eq!(inner.started.len(), 1);
        assert_eq!(inner.completed, vec![(id, 12)]);
    }

    #[test]
    fn random_session_ids_are_hex() {
        let mut rng = StdRng::seed_from_u64(5);
        let id = SessionId::random(&mut rng);
        assert_eq!(id.as_str().len(), 16);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }
}
