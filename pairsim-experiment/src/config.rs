use rand::SeedableRng;
use rand::rngs::StdRng;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("rating range {min}..={max} is empty")]
    EmptyRatingRange { min: u8, max: u8 },
    #[error("rating maximum {0} exceeds 100")]
    RatingAboveScale(u8),
}

#[derive(Debug, Clone)]
pub struct ExperimentConfig {
    /// Regular comparisons per session; one catch trial is added on top.
    pub n_pairs: usize,
    pub rating_min: u8,
    pub rating_max: u8,
    /// Fixed seed for reproducible sequences. `None` seeds from the OS.
    pub seed: Option<u64>,
    pub session_id: Option<String>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            n_pairs: 45,
            rating_min: 0,
            rating_max: 100,
            seed: None,
            session_id: None,
        }
    }
}

impl ExperimentConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rating_min > self.rating_max {
            return Err(ConfigError::EmptyRatingRange {
                min: self.rating_min,
                max: self.rating_max,
            });
        }
        if self.rating_max > 100 {
            return Err(ConfigError::RatingAboveScale(self.rating_max));
        }
        Ok(())
    }

    pub fn accepts_rating(&self, rating: u8) -> bool {
        (self.rating_min..=self.rating_max).contains(&rating)
    }

    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn default_accepts_full_scale() {
        let config = ExperimentConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.accepts_rating(0));
        assert!(config.accepts_rating(100));
        assert!(!config.accepts_rating(101));
    }

    #[test]
    fn inverted_range_is_invalid() {
        let config = ExperimentConfig {
            rating_min: 60,
            rating_max: 40,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::EmptyRatingRange { min: 60, max: 40 })
        );
    }

    #[test]
    fn rating_above_scale_is_invalid() {
        let config = ExperimentConfig {
            rating_max: 120,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::RatingAboveScale(120)));
    }

    #[test]
    fn seeded_rng_repeats() {
        let config = ExperimentConfig {
            seed: Some(7),
            ..Default::default()
        };
        let a: u64 = config.rng().random();
        let b: u64 = config.rng().random();
        assert_eq!(a, b);
    }
}
