use std::path::Path;
use std::time::{Duration, Instant};

use chromiumoxide::browser::{Browser, BrowserConfig as ChromiumConfig};
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchKeyEventParams, DispatchKeyEventType, DispatchMouseEventParams,
    DispatchMouseEventType, MouseButton,
};
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, NavigateParams};
use chromiumoxide::cdp::browser_protocol::target::CreateTargetParams;
use chromiumoxide::handler::viewport::Viewport as ChromiumViewport;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::BrowserSection;

use super::error::{DriverError, DriverResult};
use super::host::{BoundingBox, HostDriver, Point};

/// Builds and launches Chromium sessions configured for low-observability
/// automation (no `AutomationControlled` blink feature, stealth overrides).
#[derive(Debug, Clone)]
pub struct CdpLauncher {
    config: BrowserSection,
}

impl CdpLauncher {
    pub fn new(config: BrowserSection) -> Self {
        Self { config }
    }

    pub async fn launch(&self) -> DriverResult<CdpDriver> {
        let chromium_config = self.build_chromium_config()?;
        info!(
            width = self.config.viewport[0],
            height = self.config.viewport[1],
            headless = self.config.headless,
            "Launching Chromium session"
        );

        let (browser, mut handler) = Browser::launch(chromium_config)
            .await
            .map_err(|err| DriverError::Launch(err.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    debug!(error = %err, "Chromium handler reported error");
                }
            }
        });

        let page = browser
            .new_page(CreateTargetParams::new("about:blank"))
            .await?;

        if let Some(agent) = &self.config.user_agent {
            page.enable_stealth_mode_with_agent(agent).await?;
        } else {
            page.enable_stealth_mode().await?;
        }

        Ok(CdpDriver {
            browser,
            page,
            handler_task: Some(handler_task),
            cursor: Point::new(0.0, 0.0),
        })
    }

    fn build_chromium_config(&self) -> DriverResult<ChromiumConfig> {
        let [width, height] = self.config.viewport;
        let mut builder = ChromiumConfig::builder().viewport(ChromiumViewport {
            width,
            height,
            device_scale_factor: Some(1.0),
            emulating_mobile: false,
            is_landscape: width >= height,
            has_touch: false,
        });

        if let Some(path) = &self.config.executable_path {
            builder = builder.chrome_executable(path);
        }
        if !self.config.headless {
            builder = builder.with_head();
        }
        if !self.config.sandbox {
            builder = builder.no_sandbox();
        }
        builder = builder.request_timeout(Duration::from_millis(self.config.nav_timeout_ms));

        let mut args = vec![
            format!("--window-size={width},{height}"),
            "--disable-blink-features=AutomationControlled".to_string(),
            "--disable-infobars".to_string(),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            "--disable-default-apps".to_string(),
        ];
        if let Some(agent) = &self.config.user_agent {
            args.push(format!("--user-agent={agent}"));
        }
        if let Some(lang) = &self.config.lang {
            args.push(format!("--lang={lang}"));
            args.push(format!("--accept-lang={lang}"));
        }
        builder = builder.args(args);

        builder.build().map_err(DriverError::Configuration)
    }
}

/// One Chromium page driven over CDP. Owns the browser process for its
/// whole lifetime; callers must invoke [`CdpDriver::shutdown`] when done.
#[derive(Debug)]
pub struct CdpDriver {
    browser: Browser,
    page: Page,
    handler_task: Option<JoinHandle<()>>,
    cursor: Point,
}

impl CdpDriver {
    async fn dispatch_mouse(
        &self,
        kind: DispatchMouseEventType,
        point: Point,
        with_button: bool,
    ) -> DriverResult<()> {
        let mut builder = DispatchMouseEventParams::builder()
            .r#type(kind)
            .x(point.x)
            .y(point.y);
        if with_button {
            builder = builder.button(MouseButton::Left).click_count(1);
        }
        let params = builder.build().map_err(DriverError::Configuration)?;
        self.page.execute(params).await?;
        Ok(())
    }
}

/// Text a named key produces, where it produces any.
fn named_key_text(key: &str) -> Option<&'static str> {
    match key {
        "Enter" => Some("\r"),
        "Tab" => Some("\t"),
        "Space" => Some(" "),
        _ => None,
    }
}

/// Windows virtual key code for the named keys the engine sends.
fn named_key_code(key: &str) -> Option<i64> {
    match key {
        "Backspace" => Some(8),
        "Tab" => Some(9),
        "Enter" => Some(13),
        "Escape" => Some(27),
        "Space" => Some(32),
        "PageUp" => Some(33),
        "PageDown" => Some(34),
        "End" => Some(35),
        "Home" => Some(36),
        "ArrowLeft" => Some(37),
        "ArrowUp" => Some(38),
        "ArrowRight" => Some(39),
        "ArrowDown" => Some(40),
        "Delete" => Some(46),
        _ => None,
    }
}

impl Drop for CdpDriver {
    fn drop(&mut self) {
        if let Some(handle) = &self.handler_task {
            if !handle.is_finished() {
                warn!("CdpDriver dropped without explicit shutdown");
            }
        }
    }
}

#[async_trait::async_trait(?Send)]
impl HostDriver for CdpDriver {
    async fn navigate(&mut self, url: &str) -> DriverResult<()> {
        let params = NavigateParams::builder()
            .url(url)
            .build()
            .map_err(DriverError::Configuration)?;
        self.page.goto(params).await?;
        self.page.wait_for_navigation().await?;
        Ok(())
    }

    async fn wait_for_load(&mut self, timeout: Duration) -> DriverResult<()> {
        let start = Instant::now();
        loop {
            let state: Option<String> = self
                .page
                .evaluate("document.readyState")
                .await?
                .into_value()
                .ok();
            if state.as_deref() == Some("complete") {
                return Ok(());
            }
            if start.elapsed() >= timeout {
                return Err(DriverError::Timeout("page load".into()));
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    async fn move_cursor(&mut self, point: Point) -> DriverResult<()> {
        self.page
            .move_mouse(chromiumoxide::layout::Point::new(point.x, point.y))
            .await?;
        self.cursor = point;
        Ok(())
    }

    async fn press_button(&mut self) -> DriverResult<()> {
        self.dispatch_mouse(DispatchMouseEventType::MousePressed, self.cursor, true)
            .await
    }

    async fn release_button(&mut self) -> DriverResult<()> {
        self.dispatch_mouse(DispatchMouseEventType::MouseReleased, self.cursor, true)
            .await
    }

    async fn press_key(&mut self, key: &str) -> DriverResult<()> {
        let mut chars = key.chars();
        let is_single_char = matches!((chars.next(), chars.next()), (Some(_), None));
        if is_single_char {
            let params = DispatchKeyEventParams::builder()
                .r#type(DispatchKeyEventType::Char)
                .text(key.to_string())
                .build()
                .map_err(DriverError::Configuration)?;
            self.page.execute(params).await?;
            return Ok(());
        }
        let text = named_key_text(key);
        let key_code = named_key_code(key);
        for kind in [DispatchKeyEventType::KeyDown, DispatchKeyEventType::KeyUp] {
            let is_down = matches!(kind, DispatchKeyEventType::KeyDown);
            let mut builder = DispatchKeyEventParams::builder()
                .r#type(kind)
                .key(key.to_string());
            if let Some(code) = key_code {
                builder = builder
                    .windows_virtual_key_code(code)
                    .native_virtual_key_code(code);
            }
            // Chrome only turns the down event into a keypress when it
            // carries the produced text.
            if is_down {
                if let Some(text) = text {
                    builder = builder.text(text.to_string());
                }
            }
            let params = builder.build().map_err(DriverError::Configuration)?;
            self.page.execute(params).await?;
        }
        Ok(())
    }

    async fn query_visible(&mut self, locator: &str) -> DriverResult<bool> {
        let element = match self.page.find_element(locator).await {
            Ok(element) => element,
            Err(_) => return Ok(false),
        };
        match element.bounding_box().await {
            Ok(bbox) => Ok(bbox.width > 0.0 && bbox.height > 0.0),
            Err(_) => Ok(false),
        }
    }

    async fn bounding_box(&mut self, locator: &str) -> DriverResult<Option<BoundingBox>> {
        let element = match self.page.find_element(locator).await {
            Ok(element) => element,
            Err(_) => return Ok(None),
        };
        match element.bounding_box().await {
            Ok(bbox) => Ok(Some(BoundingBox {
                x: bbox.x,
                y: bbox.y,
                width: bbox.width,
                height: bbox.height,
            })),
            Err(_) => Ok(None),
        }
    }

    async fn scroll_into_view(&mut self, locator: &str) -> DriverResult<()> {
        let element = self.page.find_element(locator).await?;
        element.scroll_into_view().await?;
        Ok(())
    }

    async fn scroll_by(&mut self, dx: f64, dy: f64) -> DriverResult<()> {
        let script = format!("window.scrollBy({{ left: {dx}, top: {dy}, behavior: 'smooth' }});");
        self.page.evaluate(script.as_str()).await?;
        Ok(())
    }

    async fn capture_png(&mut self, path: &Path) -> DriverResult<()> {
        let bytes = self
            .page
            .screenshot(
                ScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Png)
                    .build(),
            )
            .await?;
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }

    async fn close(&mut self) -> DriverResult<()> {
        info!("Shutting down Chromium session");
        if let Err(err) = self.browser.close().await {
            warn!(error = %err, "Failed to close browser gracefully");
        }
        if let Some(handle) = self.handler_task.take() {
            if let Err(err) = handle.await {
                warn!(error = %err, "Browser handler join error");
            }
        }
        Ok(())
    }
}
