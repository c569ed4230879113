use pairsim_core::Trial;

/// Ordered trials of one session. Immutable once generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialSequence {
    trials: Vec<Trial>,
}

impl TrialSequence {
    pub(crate) fn new(trials: Vec<Trial>) -> Self {
        Self { trials }
    }

    pub fn len(&self) -> usize {
        self.trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Trial> {
        self.trials.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Trial> {
        self.trials.iter()
    }

    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    /// Regular comparisons, in display order.
    pub fn regular_trials(&self) -> impl Iterator<Item = &Trial> {
        self.trials.iter().filter(|t| !t.is_catch_trial())
    }

    pub fn catch_trial(&self) -> Option<&Trial> {
        self.trials.iter().find(|t| t.is_catch_trial())
    }
}

impl<'a> IntoIterator for &'a TrialSequence {
    type Item = &'a Trial;
    type IntoIter = std::slice::Iter<'a, Trial>;

    fn into_iter(self) -> Self::IntoIter {
        self.trials.iter()
    }
}
