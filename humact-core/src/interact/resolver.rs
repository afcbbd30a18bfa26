use std::time::{Duration, Instant};

use tokio::time::sleep;
use tracing::{debug, trace};

use crate::config::ResolverSection;
use crate::driver::HostDriver;

use super::error::InteractResult;

/// A logical page element plus the ordered locator candidates that may
/// denote it across locales, cohorts, and redesigns.
#[derive(Debug, Clone)]
pub struct Target {
    pub label: String,
    pub candidates: Vec<String>,
}

impl Target {
    pub fn new(label: impl Into<String>, candidates: Vec<String>) -> Self {
        Self {
            label: label.into(),
            candidates,
        }
    }
}

/// The locator that actually matched, carried forward so later driver
/// calls address the same element.
#[derive(Debug, Clone)]
pub struct ResolvedElement {
    pub locator: String,
}

/// The single place fallback lookup lives. Candidates are tried strictly
/// in order with a bounded per-candidate wait; the first visible match
/// wins and later candidates are never touched. Exhaustion is a normal
/// outcome, not an error.
#[derive(Debug, Clone)]
pub struct ElementResolver {
    config: ResolverSection,
}

impl ElementResolver {
    pub fn new(config: ResolverSection) -> Self {
        Self { config }
    }

    pub async fn resolve(
        &self,
        driver: &mut dyn HostDriver,
        target: &Target,
    ) -> InteractResult<Option<ResolvedElement>> {
        let timeout = Duration::from_millis(self.config.candidate_timeout_ms);
        let poll = Duration::from_millis(self.config.poll_interval_ms);

        for locator in &target.candidates {
            let deadline = Instant::now() + timeout;
            loop {
                if driver.query_visible(locator).await? {
                    trace!(target = %target.label, locator = %locator, "candidate resolved");
                    return Ok(Some(ResolvedElement {
                        locator: locator.clone(),
                    }));
                }
                if Instant::now() >= deadline {
                    break;
                }
                sleep(poll).await;
            }
        }

        debug!(target = %target.label, candidates = target.candidates.len(), "all candidates exhausted");
        Ok(None)
    }
}
