#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::rc::Rc;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use humact_core::driver::{BoundingBox, DriverResult, HostDriver, Point};
use humact_core::{
    BrowserSection, ClickSection, DiagnosticsSection, InteractConfig, InteractionController,
    MotionSection, ResolverSection, RetrySection, ScrollSection, TimingModel, TypingSection,
};

pub type Journal = Rc<RefCell<Vec<String>>>;

/// In-memory host driver that records every call it receives, in order.
pub struct MockDriver {
    pub journal: Journal,
    key_stamps: Rc<RefCell<Vec<Instant>>>,
    visible: HashMap<String, bool>,
}

impl MockDriver {
    pub fn new() -> (Self, Journal) {
        let journal: Journal = Rc::new(RefCell::new(Vec::new()));
        let driver = Self {
            journal: Rc::clone(&journal),
            key_stamps: Rc::new(RefCell::new(Vec::new())),
            visible: HashMap::new(),
        };
        (driver, journal)
    }

    /// Arrival times of every keypress, for cadence assertions.
    pub fn key_stamps(&self) -> Rc<RefCell<Vec<Instant>>> {
        Rc::clone(&self.key_stamps)
    }

    pub fn with_visible(mut self, locator: &str) -> Self {
        self.visible.insert(locator.to_string(), true);
        self
    }

    fn record(&self, entry: impl Into<String>) {
        self.journal.borrow_mut().push(entry.into());
    }
}

#[async_trait(?Send)]
impl HostDriver for MockDriver {
    async fn navigate(&mut self, url: &str) -> DriverResult<()> {
        self.record(format!("navigate:{url}"));
        Ok(())
    }

    async fn wait_for_load(&mut self, _timeout: Duration) -> DriverResult<()> {
        self.record("wait_for_load");
        Ok(())
    }

    async fn move_cursor(&mut self, _point: Point) -> DriverResult<()> {
        self.record("move");
        Ok(())
    }

    async fn press_button(&mut self) -> DriverResult<()> {
        self.record("press");
        Ok(())
    }

    async fn release_button(&mut self) -> DriverResult<()> {
        self.record("release");
        Ok(())
    }

    async fn press_key(&mut self, key: &str) -> DriverResult<()> {
        self.key_stamps.borrow_mut().push(Instant::now());
        self.record(format!("key:{key}"));
        Ok(())
    }

    async fn query_visible(&mut self, locator: &str) -> DriverResult<bool> {
        self.record(format!("query:{locator}"));
        Ok(self.visible.get(locator).copied().unwrap_or(false))
    }

    async fn bounding_box(&mut self, locator: &str) -> DriverResult<Option<BoundingBox>> {
        if self.visible.get(locator).copied().unwrap_or(false) {
            Ok(Some(BoundingBox {
                x: 100.0,
                y: 200.0,
                width: 60.0,
                height: 24.0,
            }))
        } else {
            Ok(None)
        }
    }

    async fn scroll_into_view(&mut self, locator: &str) -> DriverResult<()> {
        self.record(format!("scroll_into_view:{locator}"));
        Ok(())
    }

    async fn scroll_by(&mut self, _dx: f64, dy: f64) -> DriverResult<()> {
        self.record(format!("scroll_by:{dy:.0}"));
        Ok(())
    }

    async fn capture_png(&mut self, path: &Path) -> DriverResult<()> {
        std::fs::write(path, b"png")?;
        self.record(format!("capture:{}", path.display()));
        Ok(())
    }

    async fn close(&mut self) -> DriverResult<()> {
        self.record("close");
        Ok(())
    }
}

pub fn controller(driver: MockDriver) -> InteractionController {
    let config = test_config();
    let timing = std::sync::Arc::new(TimingModel::new(config.timing.clone(), config.seed));
    InteractionController::new(Box::new(driver), &config, timing)
}

/// Engine configuration with millisecond-scale pauses so tests stay fast.
pub fn test_config() -> InteractConfig {
    let mut timing = BTreeMap::new();
    for category in [
        "page_load",
        "reading",
        "thinking",
        "click_delay",
        "hover",
        "menu_open",
        "button_hold",
        "post_click",
        "path_step_slow",
        "path_step_fast",
        "settle",
        "retry_backoff",
        "between_tasks",
    ] {
        timing.insert(category.to_string(), [0, 1]);
    }

    InteractConfig {
        seed: Some(42),
        browser: BrowserSection {
            executable_path: None,
            headless: true,
            sandbox: true,
            viewport: [1280, 720],
            user_agent: None,
            lang: None,
            nav_timeout_ms: 100,
        },
        timing,
        motion: MotionSection {
            control_jitter_px: 50.0,
            steps: [3, 5],
            slow_edge_steps: 1,
        },
        typing: TypingSection {
            wpm: [600, 600],
            jitter_factor: [1.0, 1.0],
            hesitation_probability: 0.0,
        },
        scroll: ScrollSection {
            amount_px: [250, 400],
        },
        click: ClickSection {
            offset_ratio: [0.3, 0.7],
        },
        resolver: ResolverSection {
            candidate_timeout_ms: 20,
            poll_interval_ms: 5,
        },
        retry: RetrySection { max_attempts: 3 },
        diagnostics: DiagnosticsSection {
            screenshot_dir: None,
        },
        targets: BTreeMap::new(),
    }
}
