pub mod catalog;
pub mod pair;
pub mod phase;
pub mod stimulus;
pub mod trial;

pub use catalog::{Catalog, CatalogError, CatalogMetadata};
pub use pair::{PairKey, UnorderedPair};
pub use phase::SessionPhase;
pub use stimulus::{StimulusError, StimulusId, StimulusItem};
pub use trial::{Position, Trial, TrialRecord};
