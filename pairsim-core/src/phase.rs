/// Session progression. Only ever moves forward:
/// `NotStarted -> InProgress { trial_index } -> Finished`.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    NotStarted,
    InProgress {
        trial_index: usize,
    },
    Finished,
}

impl SessionPhase {
    pub fn is_not_started(&self) -> bool {
        matches!(self, SessionPhase::NotStarted)
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self, SessionPhase::InProgress { .. })
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, SessionPhase::Finished)
    }

    /// Index of the trial on display, if any.
    pub fn trial_index(&self) -> Option<usize> {
        match self {
            SessionPhase::InProgress { trial_index } => Some(*trial_index),
            _ => None,
        }
    }

    /// Phase reached after the current trial is answered in a sequence of
    /// `len` trials. `None` outside of `InProgress`.
    pub fn after_response(&self, len: usize) -> Option<Self> {
        let index = self.trial_index()?;
        let next = index + 1;
        Some(if next >= len {
            SessionPhase::Finished
        } else {
            SessionPhase::InProgress { trial_index: next }
        })
    }
}
