mod common;

use common::{controller, MockDriver};

use humact_core::{InteractError, ScrollDirection, Target};

#[tokio::test]
async fn type_text_emits_one_keypress_per_character() {
    let (driver, journal) = MockDriver::new();
    let stamps = driver.key_stamps();
    let mut ctl = controller(driver);

    ctl.type_text("abc").await.unwrap();

    let keys: Vec<String> = journal
        .borrow()
        .iter()
        .filter(|e| e.starts_with("key:"))
        .cloned()
        .collect();
    assert_eq!(keys, vec!["key:a", "key:b", "key:c"]);

    // At 600 wpm with unit jitter the per-character delay is exactly
    // 20ms, so consecutive keys must be at least that far apart.
    let stamps = stamps.borrow();
    for pair in stamps.windows(2) {
        let gap = pair[1] - pair[0];
        assert!(
            gap >= std::time::Duration::from_millis(20),
            "inter-key gap {gap:?} fell below the typing cadence"
        );
    }
}

#[tokio::test]
async fn click_target_presses_before_releasing() {
    let (driver, journal) = MockDriver::new();
    let driver = driver.with_visible("#save");
    let mut ctl = controller(driver);

    let target = Target::new("save", vec!["#save".to_string()]);
    let element = ctl.click_target(&target).await.unwrap();
    assert_eq!(element.locator, "#save");

    let journal = journal.borrow();
    let press = journal.iter().position(|e| e == "press").expect("press recorded");
    let release = journal
        .iter()
        .position(|e| e == "release")
        .expect("release recorded");
    assert!(press < release);

    // The pointer moved along a path before the button went down.
    let first_move = journal.iter().position(|e| e == "move").expect("cursor moved");
    assert!(first_move < press);
}

#[tokio::test]
async fn click_target_missing_element_is_not_found() {
    let (driver, _journal) = MockDriver::new();
    let mut ctl = controller(driver);

    let target = Target::new("ghost", vec!["#ghost".to_string()]);
    let err = ctl.click_target(&target).await.unwrap_err();
    assert!(matches!(err, InteractError::ElementNotFound(label) if label == "ghost"));
}

#[tokio::test]
async fn scroll_and_settle_scrolls_in_the_requested_direction() {
    let (driver, journal) = MockDriver::new();
    let mut ctl = controller(driver);

    ctl.scroll_and_settle(ScrollDirection::Down).await.unwrap();
    ctl.scroll_and_settle(ScrollDirection::Up).await.unwrap();

    let scrolls: Vec<f64> = journal
        .borrow()
        .iter()
        .filter_map(|e| e.strip_prefix("scroll_by:"))
        .map(|v| v.parse::<f64>().unwrap())
        .collect();
    assert_eq!(scrolls.len(), 2);
    assert!(scrolls[0] > 0.0, "down scrolls positive, got {}", scrolls[0]);
    assert!(scrolls[1] < 0.0, "up scrolls negative, got {}", scrolls[1]);
}

#[tokio::test]
async fn navigate_and_settle_waits_for_load() {
    let (driver, journal) = MockDriver::new();
    let mut ctl = controller(driver);

    ctl.navigate_and_settle("https://example.com/feed").await.unwrap();

    let journal = journal.borrow();
    assert_eq!(journal[0], "navigate:https://example.com/feed");
    assert!(journal.iter().any(|e| e == "wait_for_load"));
}

#[tokio::test]
async fn shutdown_closes_the_driver() {
    let (driver, journal) = MockDriver::new();
    let ctl = controller(driver);

    ctl.shutdown().await.unwrap();
    assert_eq!(journal.borrow().last().map(String::as_str), Some("close"));
}
