use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::config::{InteractConfig, ScrollSection, TypingSection};
use crate::driver::HostDriver;

use super::error::{InteractError, InteractResult};
use super::path::PathSynthesizer;
use super::pointer::PointerDriver;
use super::resolver::{ElementResolver, ResolvedElement, Target};
use super::timing::TimingModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Down,
    Up,
}

/// Named interaction primitives composed from the resolver, the pointer
/// driver, and the timing model. Owns the host driver session for its
/// whole lifetime; all calls are strictly sequential.
pub struct InteractionController {
    driver: Box<dyn HostDriver>,
    timing: Arc<TimingModel>,
    pointer: PointerDriver,
    resolver: ElementResolver,
    typing: TypingSection,
    scroll: ScrollSection,
    load_timeout: Duration,
}

impl InteractionController {
    pub fn new(
        driver: Box<dyn HostDriver>,
        config: &InteractConfig,
        timing: Arc<TimingModel>,
    ) -> Self {
        let paths = PathSynthesizer::new(config.motion.clone(), Arc::clone(&timing));
        let pointer = PointerDriver::new(paths, Arc::clone(&timing), config.click.clone());
        let resolver = ElementResolver::new(config.resolver.clone());
        Self {
            driver,
            timing,
            pointer,
            resolver,
            typing: config.typing.clone(),
            scroll: config.scroll.clone(),
            load_timeout: Duration::from_millis(config.browser.nav_timeout_ms),
        }
    }

    pub fn timing(&self) -> &Arc<TimingModel> {
        &self.timing
    }

    /// Navigate and let the page settle the way a person waits for it.
    pub async fn navigate_and_settle(&mut self, url: &str) -> InteractResult<()> {
        info!(url = %url, "navigating");
        self.driver.navigate(url).await?;
        self.timing.pause("page_load").await?;
        self.driver.wait_for_load(self.load_timeout).await?;
        Ok(())
    }

    /// Resolve a target and click it with full pointer choreography.
    /// Absence surfaces as [`InteractError::ElementNotFound`].
    pub async fn click_target(&mut self, target: &Target) -> InteractResult<ResolvedElement> {
        let element = self
            .resolver
            .resolve(self.driver.as_mut(), target)
            .await?
            .ok_or_else(|| InteractError::ElementNotFound(target.label.clone()))?;

        self.driver.scroll_into_view(&element.locator).await?;
        self.timing.pause("settle").await?;

        // The element can detach between resolution and the click.
        let bbox = self
            .driver
            .bounding_box(&element.locator)
            .await?
            .ok_or_else(|| {
                InteractError::Interrupted(format!(
                    "element '{}' lost its bounding box before the click",
                    target.label
                ))
            })?;

        self.pointer
            .click_within(self.driver.as_mut(), &bbox)
            .await?;
        debug!(target = %target.label, locator = %element.locator, "clicked");
        Ok(element)
    }

    /// Emit one keypress per character at a sampled words-per-minute
    /// cadence, jittered per character, with occasional hesitation.
    pub async fn type_text(&mut self, text: &str) -> InteractResult<()> {
        let wpm = self.timing.sample_range(self.typing.wpm);
        let chars_per_second = f64::from(wpm) * 5.0 / 60.0;
        let base_delay = 1.0 / chars_per_second;

        for ch in text.chars() {
            if self.timing.chance(self.typing.hesitation_probability) {
                self.timing.pause("thinking").await?;
            }
            self.driver.press_key(&ch.to_string()).await?;
            let factor = self.timing.sample_ratio(self.typing.jitter_factor).max(0.0);
            tokio::time::sleep(Duration::from_secs_f64(base_delay * factor)).await;
        }
        self.timing.pause("post_click").await?;
        Ok(())
    }

    /// Press a named key (e.g. "Enter") without pointer involvement.
    pub async fn press_key(&mut self, key: &str) -> InteractResult<()> {
        self.driver.press_key(key).await?;
        Ok(())
    }

    /// Scroll a sampled distance and wait for the page to settle.
    pub async fn scroll_and_settle(&mut self, direction: ScrollDirection) -> InteractResult<()> {
        let amount = f64::from(self.timing.sample_range(self.scroll.amount_px));
        let dy = match direction {
            ScrollDirection::Down => amount,
            ScrollDirection::Up => -amount,
        };
        self.driver.scroll_by(0.0, dy).await?;
        self.timing.pause("reading").await?;
        Ok(())
    }

    /// Skim the current page: pause, scroll down, read, scroll back.
    pub async fn read_page(&mut self) -> InteractResult<()> {
        self.timing.pause("reading").await?;
        let amount = f64::from(self.timing.sample_range(self.scroll.amount_px));
        self.driver.scroll_by(0.0, amount).await?;
        self.timing.pause("reading").await?;
        self.driver.scroll_by(0.0, -amount).await?;
        self.timing.pause("settle").await?;
        Ok(())
    }

    /// Wait for a named pause category. Used by task scripts for waits
    /// with no associated driver action (menu opening, PDF generation).
    pub async fn wait(&mut self, category: &str) -> InteractResult<()> {
        self.timing.pause(category).await?;
        Ok(())
    }

    /// Diagnostic capture hook. Failures are reported, never fatal.
    pub async fn capture_png(&mut self, path: &Path) -> InteractResult<()> {
        self.driver.capture_png(path).await?;
        Ok(())
    }

    /// Release the driver session. Consumes the controller so no further
    /// interaction can race the teardown.
    pub async fn shutdown(mut self) -> InteractResult<()> {
        self.driver.close().await?;
        Ok(())
    }
}
