use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::sleep;

use super::error::{InteractError, InteractResult};

/// Central source of every pause in the engine. All human-looking
/// variability is drawn here so it stays tunable and testable in one
/// place.
#[derive(Debug)]
pub struct TimingModel {
    profile: BTreeMap<String, [u64; 2]>,
    rng: Mutex<StdRng>,
}

impl TimingModel {
    pub fn new(profile: BTreeMap<String, [u64; 2]>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            profile,
            rng: Mutex::new(rng),
        }
    }

    /// Draw a duration uniformly from the configured closed interval for
    /// `category`.
    pub fn sample(&self, category: &str) -> InteractResult<Duration> {
        let [min, max] = self
            .profile
            .get(category)
            .copied()
            .ok_or_else(|| InteractError::UnknownCategory(category.to_string()))?;
        let millis = self.rng.lock().unwrap().gen_range(min..=max);
        Ok(Duration::from_millis(millis))
    }

    /// Sample `category` and sleep for the drawn duration.
    pub async fn pause(&self, category: &str) -> InteractResult<Duration> {
        let duration = self.sample(category)?;
        sleep(duration).await;
        Ok(duration)
    }

    /// Uniform draw from an arbitrary inclusive integer range.
    pub fn sample_range(&self, bounds: [u32; 2]) -> u32 {
        let lower = bounds[0].min(bounds[1]);
        let upper = bounds[0].max(bounds[1]);
        self.rng.lock().unwrap().gen_range(lower..=upper)
    }

    /// Uniform draw from an inclusive floating-point range.
    pub fn sample_ratio(&self, bounds: [f64; 2]) -> f64 {
        let lower = bounds[0].min(bounds[1]);
        let upper = bounds[0].max(bounds[1]);
        if lower == upper {
            return lower;
        }
        self.rng.lock().unwrap().gen_range(lower..=upper)
    }

    /// Symmetric jitter in `[-max, max]`.
    pub fn sample_offset(&self, max: f64) -> f64 {
        if max <= 0.0 {
            return 0.0;
        }
        self.rng.lock().unwrap().gen_range(-max..=max)
    }

    pub fn chance(&self, probability: f64) -> bool {
        if probability <= 0.0 {
            return false;
        }
        if probability >= 1.0 {
            return true;
        }
        self.rng.lock().unwrap().gen_bool(probability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> TimingModel {
        let mut profile = BTreeMap::new();
        profile.insert("click_delay".to_string(), [200, 500]);
        profile.insert("fixed".to_string(), [300, 300]);
        TimingModel::new(profile, Some(7))
    }

    #[test]
    fn samples_stay_within_bounds() {
        let timing = model();
        for _ in 0..1000 {
            let ms = timing.sample("click_delay").unwrap().as_millis() as u64;
            assert!((200..=500).contains(&ms), "sample {ms} escaped bounds");
        }
    }

    #[test]
    fn degenerate_interval_is_constant() {
        let timing = model();
        for _ in 0..100 {
            assert_eq!(timing.sample("fixed").unwrap(), Duration::from_millis(300));
        }
    }

    #[test]
    fn unknown_category_is_an_error() {
        let timing = model();
        let err = timing.sample("nonexistent").unwrap_err();
        assert!(matches!(err, InteractError::UnknownCategory(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn seeded_models_agree() {
        let a = model();
        let b = model();
        for _ in 0..50 {
            assert_eq!(
                a.sample("click_delay").unwrap(),
                b.sample("click_delay").unwrap()
            );
        }
    }
}
