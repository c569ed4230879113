use super::config::ExperimentConfig;
use super::sequence::TrialSequence;
use super::sink::{ResponseSink, SessionId, SinkError};
use pairsim_core::{SessionPhase, Trial, TrialRecord};
use pairsim_timing::Timer;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Start,
    Respond { rating: u8 },
    /// Any attempt to revisit an earlier trial.
    Back,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("session has already started")]
    AlreadyStarted,
    #[error("session has not started")]
    NotStarted,
    #[error("session is finished")]
    Finished,
    #[error("sessions only move forward")]
    BackwardNavigation,
    #[error("rating {rating} is outside {min}..={max}")]
    RatingOutOfRange { rating: u8, min: u8, max: u8 },
}

/// Pure phase transition for a sequence of `len` trials.
pub fn transition(
    phase: SessionPhase,
    event: SessionEvent,
    len: usize,
) -> Result<SessionPhase, TransitionError> {
    match (phase, event) {
        (_, SessionEvent::Back) => Err(TransitionError::BackwardNavigation),

        (SessionPhase::NotStarted, SessionEvent::Start) => Ok(if len == 0 {
            SessionPhase::Finished
        } else {
            SessionPhase::InProgress { trial_index: 0 }
        }),
        (SessionPhase::NotStarted, SessionEvent::Respond { .. }) => {
            Err(TransitionError::NotStarted)
        }

        (SessionPhase::InProgress { .. }, SessionEvent::Start) => {
            Err(TransitionError::AlreadyStarted)
        }
        (phase @ SessionPhase::InProgress { .. }, SessionEvent::Respond { .. }) => {
            phase.after_response(len).ok_or(TransitionError::Finished)
        }

        (SessionPhase::Finished, _) => Err(TransitionError::Finished),
    }
}

/// Drives one participant through a generated sequence and reports to a sink.
///
/// Sink failures are logged and never affect progression.
pub struct SessionStateMachine<T, S>
where
    T: Timer,
    S: ResponseSink,
{
    session_id: SessionId,
    sequence: TrialSequence,
    phase: SessionPhase,
    config: ExperimentConfig,
    timer: T,
    sink: S,
    started_at: Option<T::Timestamp>,
    shown_at: Option<T::Timestamp>,
    sink_failures: usize,
}

impl<T, S> SessionStateMachine<T, S>
where
    T: Timer,
    S: ResponseSink,
{
    pub fn new(
        session_id: SessionId,
        sequence: TrialSequence,
        config: ExperimentConfig,
        timer: T,
        sink: S,
    ) -> Self {
        Self {
            session_id,
            sequence,
            phase: SessionPhase::NotStarted,
            config,
            timer,
            sink,
            started_at: None,
            shown_at: None,
            sink_failures: 0,
        }
    }

    /// Applies `event`. On error the state is left untouched.
    pub fn handle_event(&mut self, event: SessionEvent) -> Result<SessionPhase, TransitionError> {
        let next = transition(self.phase, event, self.sequence.len())?;

        match event {
            SessionEvent::Start => {
                let now = self.timer.now();
                self.started_at = Some(now);
                self.shown_at = Some(now);
                info!(
                    session = %self.session_id,
                    trials = self.sequence.len(),
                    "session started"
                );
                let result = self.sink.session_started(&self.session_id);
                self.log_sink_result("session_started", result);
            }
            SessionEvent::Respond { rating } => {
                if !self.config.accepts_rating(rating) {
                    return Err(TransitionError::RatingOutOfRange {
                        rating,
                        min: self.config.rating_min,
                        max: self.config.rating_max,
                    });
                }
                self.record_response(rating);
            }
            SessionEvent::Back => return Err(TransitionError::BackwardNavigation),
        }

        self.phase = next;
        match self.phase {
            SessionPhase::Finished => self.complete_session(),
            SessionPhase::InProgress { .. } => self.shown_at = Some(self.timer.now()),
            SessionPhase::NotStarted => {}
        }
        Ok(self.phase)
    }

    fn record_response(&mut self, rating: u8) {
        let Some(index) = self.phase.trial_index() else {
            return;
        };
        let Some(trial) = self.sequence.get(index) else {
            return;
        };
        let response_time_ms = self
            .shown_at
            .map(|shown| self.timer.elapsed_ms(shown))
            .unwrap_or_default();
        let record = TrialRecord::new(index + 1, trial, rating, response_time_ms);
        debug!(
            session = %self.session_id,
            trial = record.trial_number,
            pair = %record.pair_key,
            position = %record.position,
            rating,
            response_time_ms,
            "response recorded"
        );
        let result = self.sink.record_trial(&self.session_id, &record);
        self.log_sink_result("record_trial", result);
    }

    fn complete_session(&mut self) {
        let elapsed_ms = self
            .started_at
            .map(|start| self.timer.elapsed_ms(start))
            .unwrap_or_default();
        self.shown_at = None;
        info!(
            session = %self.session_id,
            elapsed_ms,
            sink_failures = self.sink_failures,
            "session completed"
        );
        let result = self.sink.session_completed(&self.session_id, elapsed_ms);
        self.log_sink_result("session_completed", result);
    }

    fn log_sink_result(&mut self, what: &str, result: Result<(), SinkError>) {
        if let Err(err) = result {
            self.sink_failures += 1;
            warn!(session = %self.session_id, call = what, error = %err, "response sink failed");
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    pub fn sequence(&self) -> &TrialSequence {
        &self.sequence
    }

    /// Trial currently on display, if any.
    pub fn current_trial(&self) -> Option<&Trial> {
        self.phase.trial_index().and_then(|i| self.sequence.get(i))
    }

    /// `(1-based trial number, total)` while in progress.
    pub fn trial_progress(&self) -> Option<(usize, usize)> {
        self.phase
            .trial_index()
            .map(|i| (i + 1, self.sequence.len()))
    }

    pub fn sink_failures(&self) -> usize {
        self.sink_failures
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
