use crate::pair::PAIR_KEY_SEPARATOR;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Stable identifier of a catalog item. Ordering is plain byte-wise string
/// ordering, which is what pair keys and position codes are defined against.
///
/// Ids never contain the pair-key separator, so a pair key splits back into
/// exactly one pair of ids.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct StimulusId(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StimulusError {
    #[error("stimulus id must not be empty")]
    EmptyId,
    #[error("stimulus id '{0}' contains the pair key separator '{sep}'", sep = PAIR_KEY_SEPARATOR)]
    ContainsSeparator(String),
}

impl StimulusId {
    pub fn new(id: impl Into<String>) -> Result<Self, StimulusError> {
        let id = id.into();
        if id.is_empty() {
            return Err(StimulusError::EmptyId);
        }
        if id.contains(PAIR_KEY_SEPARATOR) {
            return Err(StimulusError::ContainsSeparator(id));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StimulusId {
    type Error = StimulusError;

    fn try_from(id: String) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl fmt::Display for StimulusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StimulusId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One product listing shown on either side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StimulusItem {
    pub id: StimulusId,
    pub name: String,
    pub description: String,
    pub price: String,
    /// Asset reference, usually a file name relative to the image directory.
    pub image: String,
}

impl StimulusItem {
    pub fn new(
        id: StimulusId,
        name: impl Into<String>,
        description: impl Into<String>,
        price: impl Into<String>,
        image: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            price: price.into(),
            image: image.into(),
        }
    }
}
