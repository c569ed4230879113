use crate::pair::{PairKey, UnorderedPair};
use crate::stimulus::{StimulusId, StimulusItem};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which member of the canonical pair was displayed on the left.
///
/// `AB` means the lexicographically smaller id is on the left. A catch trial
/// shows the same id twice and is always `AB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "AB")]
    LowLeft,
    #[serde(rename = "BA")]
    HighLeft,
}

impl Position {
    /// Derives the code from the displayed placement alone.
    pub fn from_placement(left: &StimulusId, right: &StimulusId) -> Self {
        if left <= right {
            Position::LowLeft
        } else {
            Position::HighLeft
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Position::LowLeft => "AB",
            Position::HighLeft => "BA",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A single comparison as it will be displayed. Built once during sequence
/// generation; `pair_key` and `position` are derived from the placement at
/// construction and cannot be set independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trial {
    left: StimulusItem,
    right: StimulusItem,
    pair_key: PairKey,
    position: Position,
    is_catch_trial: bool,
}

impl Trial {
    /// Regular comparison of two distinct items. Returns `None` when both
    /// sides carry the same id.
    pub fn comparison(left: StimulusItem, right: StimulusItem) -> Option<Self> {
        if left.id == right.id {
            return None;
        }
        Some(Self::placed(left, right, false))
    }

    /// Attention check: the same item on both sides.
    pub fn catch(item: StimulusItem) -> Self {
        Self::placed(item.clone(), item, true)
    }

    fn placed(left: StimulusItem, right: StimulusItem, is_catch_trial: bool) -> Self {
        let pair_key = PairKey::from_ids(&left.id, &right.id);
        let position = Position::from_placement(&left.id, &right.id);
        Self {
            left,
            right,
            pair_key,
            position,
            is_catch_trial,
        }
    }

    pub fn left(&self) -> &StimulusItem {
        &self.left
    }

    pub fn right(&self) -> &StimulusItem {
        &self.right
    }

    pub fn pair_key(&self) -> &PairKey {
        &self.pair_key
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn is_catch_trial(&self) -> bool {
        self.is_catch_trial
    }

    /// Canonical pair behind a regular comparison; `None` for the catch trial.
    pub fn pair(&self) -> Option<UnorderedPair> {
        UnorderedPair::new(self.left.id.clone(), self.right.id.clone())
    }
}

/// Recorded result per trial, handed to the response sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialRecord {
    /// 1-indexed position in the session.
    pub trial_number: usize,
    pub pair_key: PairKey,
    pub position: Position,
    pub left_item_id: StimulusId,
    pub right_item_id: StimulusId,
    pub rating: u8,
    pub response_time_ms: u64,
    pub is_catch_trial: bool,
}

impl TrialRecord {
    pub fn new(trial_number: usize, trial: &Trial, rating: u8, response_time_ms: u64) -> Self {
        Self {
            trial_number,
            pair_key: trial.pair_key.clone(),
            position: trial.position,
            left_item_id: trial.left.id.clone(),
            right_item_id: trial.right.id.clone(),
            rating,
            response_time_ms,
            is_catch_trial: trial.is_catch_trial,
        }
    }
}
