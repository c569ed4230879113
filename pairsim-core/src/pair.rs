use crate::stimulus::StimulusId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between the two ids of a pair key.
pub const PAIR_KEY_SEPARATOR: char = '_';

/// Two distinct item ids, stored in canonical (sorted) order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnorderedPair {
    low: StimulusId,
    high: StimulusId,
}

impl UnorderedPair {
    /// Builds the pair from two ids in any order. Returns `None` for a self-pair.
    pub fn new(a: StimulusId, b: StimulusId) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self { low: a, high: b }),
            std::cmp::Ordering::Greater => Some(Self { low: b, high: a }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn low(&self) -> &StimulusId {
        &self.low
    }

    pub fn high(&self) -> &StimulusId {
        &self.high
    }

    pub fn key(&self) -> PairKey {
        PairKey::from_ids(&self.low, &self.high)
    }
}

/// Order-independent identity of a compared pair, `low_high`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PairKey(String);

impl PairKey {
    /// Key for the two ids as displayed. Sorting happens here, so
    /// `from_ids(a, b) == from_ids(b, a)`. Equal ids give the catch-trial form `id_id`.
    pub fn from_ids(a: &StimulusId, b: &StimulusId) -> Self {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        Self(format!("{low}{PAIR_KEY_SEPARATOR}{high}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
