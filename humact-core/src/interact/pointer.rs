use std::sync::Arc;

use tokio::time::sleep;
use tracing::trace;

use crate::config::ClickSection;
use crate::driver::{BoundingBox, HostDriver, Point};

use super::error::InteractResult;
use super::path::{PathSynthesizer, PointerPath};
use super::timing::TimingModel;

/// Replays synthesized pointer paths against the host driver and performs
/// the press/hold/release click sequence. Tracks the virtual cursor so
/// consecutive movements chain naturally.
pub struct PointerDriver {
    paths: PathSynthesizer,
    timing: Arc<TimingModel>,
    click: ClickSection,
    cursor: Point,
}

impl PointerDriver {
    pub fn new(paths: PathSynthesizer, timing: Arc<TimingModel>, click: ClickSection) -> Self {
        Self {
            paths,
            timing,
            click,
            // Where the pointer rests before the first movement.
            cursor: Point::new(0.0, 0.0),
        }
    }

    pub fn cursor(&self) -> Point {
        self.cursor
    }

    /// Pick a click point inside `bbox`, off-center by the configured
    /// ratio range so repeated clicks do not land pixel-identically.
    pub fn click_point(&self, bbox: &BoundingBox) -> Point {
        let x_ratio = self.timing.sample_ratio(self.click.offset_ratio);
        let y_ratio = self.timing.sample_ratio(self.click.offset_ratio);
        Point::new(
            bbox.x + bbox.width * x_ratio,
            bbox.y + bbox.height * y_ratio,
        )
    }

    /// Glide the cursor to `target` along a fresh humanlike trajectory.
    pub async fn move_to(
        &mut self,
        driver: &mut dyn HostDriver,
        target: Point,
    ) -> InteractResult<()> {
        let path = self.paths.synthesize(self.cursor, target)?;
        self.replay(driver, &path).await?;
        self.cursor = target;
        self.timing.pause("hover").await?;
        Ok(())
    }

    /// Move to a jittered point inside `bbox` and click it.
    pub async fn click_within(
        &mut self,
        driver: &mut dyn HostDriver,
        bbox: &BoundingBox,
    ) -> InteractResult<Point> {
        let target = self.click_point(bbox);
        trace!(x = target.x, y = target.y, "pointer click");
        self.move_to(driver, target).await?;
        self.timing.pause("click_delay").await?;
        driver.press_button().await?;
        self.timing.pause("button_hold").await?;
        driver.release_button().await?;
        self.timing.pause("post_click").await?;
        Ok(target)
    }

    async fn replay(
        &mut self,
        driver: &mut dyn HostDriver,
        path: &PointerPath,
    ) -> InteractResult<()> {
        for step in &path.steps {
            driver.move_cursor(step.point).await?;
            sleep(step.delay).await;
        }
        Ok(())
    }
}
