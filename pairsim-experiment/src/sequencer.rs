//! Trial sequence generation.
//!
//! Regular pairs are drawn without replacement from the full enumeration of
//! unordered pairs, so a session can never repeat a comparison. One catch
//! trial (the same item on both sides) is mixed in, the combined list is
//! shuffled again, and each trial gets an independent left/right coin flip.
//! `pair_key` and `position` are derived from the resulting placement inside
//! [`Trial`], never from a separate random draw.

use crate::sequence::TrialSequence;
use pairsim_core::{StimulusId, StimulusItem, Trial};
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    #[error("at least 2 stimuli are required, catalog has {available}")]
    InsufficientStimuli { available: usize },
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

enum Slot {
    Pair(usize, usize),
    Catch(usize),
}

/// Number of distinct unordered pairs among `n` items, `C(n, 2)`.
pub fn pair_count(n: usize) -> usize {
    if n < 2 {
        return 0;
    }
    // one of n, n-1 is even
    if n % 2 == 0 {
        (n / 2).saturating_mul(n - 1)
    } else {
        n.saturating_mul((n - 1) / 2)
    }
}

pub fn generate_sequence<R: Rng>(
    items: &[StimulusItem],
    n_pairs: usize,
    rng: &mut R,
) -> Result<TrialSequence, SequenceError> {
    if items.len() < 2 {
        return Err(SequenceError::InsufficientStimuli {
            available: items.len(),
        });
    }
    if let Some(dup) = first_duplicate_id(items) {
        return Err(SequenceError::InvalidConfiguration(format!(
            "stimulus id '{dup}' appears more than once"
        )));
    }
    let available = pair_count(items.len());
    if n_pairs > available {
        return Err(SequenceError::InvalidConfiguration(format!(
            "{n_pairs} pairs requested but {} items only form {available}",
            items.len()
        )));
    }

    let n = items.len();
    let mut pairs: Vec<(usize, usize)> = (0..n)
        .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
        .collect();
    pairs.shuffle(rng);
    pairs.truncate(n_pairs);

    let catch_index = rng.random_range(0..n);

    let mut slots: Vec<Slot> = pairs
        .into_iter()
        .map(|(i, j)| Slot::Pair(i, j))
        .chain(std::iter::once(Slot::Catch(catch_index)))
        .collect();
    slots.shuffle(rng);

    let trials = slots
        .into_iter()
        .map(|slot| {
            let swap = rng.random_bool(0.5);
            match slot {
                Slot::Pair(i, j) => {
                    let (l, r) = if swap { (j, i) } else { (i, j) };
                    Trial::comparison(items[l].clone(), items[r].clone()).ok_or_else(|| {
                        SequenceError::InvalidConfiguration(format!(
                            "stimulus id '{}' paired with itself",
                            items[l].id
                        ))
                    })
                }
                Slot::Catch(i) => Ok(Trial::catch(items[i].clone())),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        items = n,
        n_pairs,
        catch_item = %items[catch_index].id,
        "generated trial sequence"
    );
    Ok(TrialSequence::new(trials))
}

fn first_duplicate_id(items: &[StimulusItem]) -> Option<&StimulusId> {
    let mut seen = HashSet::with_capacity(items.len());
    items.iter().map(|item| &item.id).find(|id| !seen.insert(*id))
}
