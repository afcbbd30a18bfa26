use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use super::error::DriverResult;

/// A viewport-space coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// The browser-side primitives the engine drives. Locators are opaque
/// strings the driver understands; the engine never inspects them.
///
/// Implementations are owned by exactly one controller for their whole
/// lifetime and are called strictly sequentially.
#[async_trait(?Send)]
pub trait HostDriver {
    async fn navigate(&mut self, url: &str) -> DriverResult<()>;
    async fn wait_for_load(&mut self, timeout: Duration) -> DriverResult<()>;

    async fn move_cursor(&mut self, point: Point) -> DriverResult<()>;
    async fn press_button(&mut self) -> DriverResult<()>;
    async fn release_button(&mut self) -> DriverResult<()>;
    async fn press_key(&mut self, key: &str) -> DriverResult<()>;

    async fn query_visible(&mut self, locator: &str) -> DriverResult<bool>;
    async fn bounding_box(&mut self, locator: &str) -> DriverResult<Option<BoundingBox>>;
    async fn scroll_into_view(&mut self, locator: &str) -> DriverResult<()>;
    async fn scroll_by(&mut self, dx: f64, dy: f64) -> DriverResult<()>;

    async fn capture_png(&mut self, path: &Path) -> DriverResult<()>;

    /// Release the underlying session. Called exactly once at shutdown.
    async fn close(&mut self) -> DriverResult<()>;
}
