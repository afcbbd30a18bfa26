use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{ConfigError, Result};

/// Full configuration for the interaction engine. Everything that tunes
/// pacing, motion, or element lookup is data here; the engine itself owns
/// no constants.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct InteractConfig {
    /// Optional RNG seed for reproducible runs.
    pub seed: Option<u64>,
    pub browser: BrowserSection,
    /// Pause categories: name -> [min_ms, max_ms], both inclusive.
    pub timing: BTreeMap<String, [u64; 2]>,
    pub motion: MotionSection,
    pub typing: TypingSection,
    pub scroll: ScrollSection,
    pub click: ClickSection,
    pub resolver: ResolverSection,
    pub retry: RetrySection,
    #[serde(default)]
    pub diagnostics: DiagnosticsSection,
    /// Logical target elements: label -> ordered locator candidates.
    /// Ordering encodes preference; the first visible candidate wins.
    #[serde(default)]
    pub targets: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BrowserSection {
    pub executable_path: Option<String>,
    pub headless: bool,
    pub sandbox: bool,
    pub viewport: [u32; 2],
    pub user_agent: Option<String>,
    pub lang: Option<String>,
    pub nav_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MotionSection {
    /// Maximum offset applied to each Bezier control point, in pixels.
    pub control_jitter_px: f64,
    /// Inclusive bounds for the number of sampled path points.
    pub steps: [usize; 2],
    /// How many points at each end of the path move at the slow cadence.
    pub slow_edge_steps: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypingSection {
    pub wpm: [u32; 2],
    /// Multiplicative jitter applied to each inter-character delay.
    pub jitter_factor: [f64; 2],
    /// Chance of an extra "thinking" pause before a character.
    pub hesitation_probability: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScrollSection {
    pub amount_px: [u32; 2],
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClickSection {
    /// Click position inside the bounding box, as a ratio of width/height.
    pub offset_ratio: [f64; 2],
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResolverSection {
    pub candidate_timeout_ms: u64,
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetrySection {
    pub max_attempts: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiagnosticsSection {
    /// Where failure screenshots land. None disables the capture hook.
    pub screenshot_dir: Option<PathBuf>,
}

impl InteractConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: InteractConfig = load_toml(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (category, [min, max]) in &self.timing {
            if min > max {
                return Err(ConfigError::Invalid(format!(
                    "timing.{category}: min {min} exceeds max {max}"
                )));
            }
        }
        if self.motion.steps[0] < 2 {
            return Err(ConfigError::Invalid(
                "motion.steps: lower bound must be at least 2".into(),
            ));
        }
        if self.motion.steps[0] > self.motion.steps[1] {
            return Err(ConfigError::Invalid(
                "motion.steps: lower bound exceeds upper bound".into(),
            ));
        }
        if self.typing.wpm[0] == 0 || self.typing.wpm[0] > self.typing.wpm[1] {
            return Err(ConfigError::Invalid(
                "typing.wpm: bounds must be positive and ordered".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.typing.hesitation_probability) {
            return Err(ConfigError::Invalid(
                "typing.hesitation_probability: must lie in [0, 1]".into(),
            ));
        }
        if self.typing.jitter_factor[0] <= 0.0
            || self.typing.jitter_factor[0] > self.typing.jitter_factor[1]
        {
            return Err(ConfigError::Invalid(
                "typing.jitter_factor: bounds must be positive and ordered".into(),
            ));
        }
        if self.scroll.amount_px[0] > self.scroll.amount_px[1] {
            return Err(ConfigError::Invalid(
                "scroll.amount_px: lower bound exceeds upper bound".into(),
            ));
        }
        if self.resolver.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "resolver.poll_interval_ms: must be at least 1".into(),
            ));
        }
        if self.click.offset_ratio[0] > self.click.offset_ratio[1]
            || self.click.offset_ratio[0] < 0.0
            || self.click.offset_ratio[1] > 1.0
        {
            return Err(ConfigError::Invalid(
                "click.offset_ratio: must be an ordered sub-range of [0, 1]".into(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "retry.max_attempts: must be at least 1".into(),
            ));
        }
        for (label, candidates) in &self.targets {
            if candidates.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "targets.{label}: candidate list is empty"
                )));
            }
        }
        Ok(())
    }
}

pub fn load_interact_config<P: AsRef<Path>>(path: P) -> Result<InteractConfig> {
    InteractConfig::load(path)
}

fn load_toml<T, P>(path: P) -> Result<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        source,
        path: path.to_path_buf(),
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        source,
        path: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> InteractConfig {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../configs/interact.toml");
        InteractConfig::load(dir).expect("fixture config should parse")
    }

    #[test]
    fn load_fixture_config() {
        let config = fixture();
        assert_eq!(config.timing["page_load"], [2000, 3500]);
        assert_eq!(config.retry.max_attempts, 3);
        assert!(config.targets["more_button"].len() >= 2);
    }

    #[test]
    fn rejects_inverted_timing_range() {
        let mut config = fixture();
        config.timing.insert("broken".into(), [500, 100]);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_non_positive_jitter_factor() {
        let mut config = fixture();
        config.typing.jitter_factor = [-1.0, -0.5];
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        config.typing.jitter_factor = [0.0, 1.5];
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_inverted_scroll_range() {
        let mut config = fixture();
        config.scroll.amount_px = [400, 250];
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_poll_interval() {
        let mut config = fixture();
        config.resolver.poll_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_empty_candidate_list() {
        let mut config = fixture();
        config.targets.insert("ghost".into(), vec![]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_retry_budget() {
        let mut config = fixture();
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());
    }
}
