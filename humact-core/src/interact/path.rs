use std::sync::Arc;
use std::time::Duration;

use crate::config::MotionSection;
use crate::driver::Point;

use super::error::InteractResult;
use super::timing::TimingModel;

pub const PATH_STEP_SLOW: &str = "path_step_slow";
pub const PATH_STEP_FAST: &str = "path_step_fast";

/// One sampled position on a pointer trajectory plus the pause taken
/// before moving on to the next.
#[derive(Debug, Clone, Copy)]
pub struct PathStep {
    pub point: Point,
    pub delay: Duration,
}

/// An ephemeral pointer trajectory. Synthesized fresh for every movement
/// and consumed once; never cached.
#[derive(Debug, Clone)]
pub struct PointerPath {
    pub steps: Vec<PathStep>,
}

impl PointerPath {
    pub fn end(&self) -> Option<Point> {
        self.steps.last().map(|step| step.point)
    }
}

/// Produces curved, variable-speed pointer trajectories. A straight line
/// at constant velocity is the most recognisable artifact of scripted
/// movement, so every move follows a cubic Bezier with jittered control
/// points and an ease-in/ease-out cadence.
#[derive(Debug, Clone)]
pub struct PathSynthesizer {
    motion: MotionSection,
    timing: Arc<TimingModel>,
}

impl PathSynthesizer {
    pub fn new(motion: MotionSection, timing: Arc<TimingModel>) -> Self {
        Self { motion, timing }
    }

    pub fn synthesize(&self, start: Point, end: Point) -> InteractResult<PointerPath> {
        if start == end {
            // No movement: a single-point path, the caller still settles.
            let delay = self.timing.sample(PATH_STEP_SLOW)?;
            return Ok(PointerPath {
                steps: vec![PathStep { point: end, delay }],
            });
        }

        let jitter = self.motion.control_jitter_px;
        let control_one = Point::new(
            start.x + self.timing.sample_offset(jitter),
            start.y + self.timing.sample_offset(jitter),
        );
        let control_two = Point::new(
            end.x + self.timing.sample_offset(jitter),
            end.y + self.timing.sample_offset(jitter),
        );

        let count = self
            .timing
            .sample_range([self.motion.steps[0] as u32, self.motion.steps[1] as u32])
            as usize;
        let slow_edge = self.motion.slow_edge_steps.min(count / 2);

        let mut steps = Vec::with_capacity(count);
        for index in 0..count {
            let t = index as f64 / (count - 1) as f64;
            let point = cubic_bezier(t, start, control_one, control_two, end);
            // Slower at the edges, faster through the middle.
            let category = if index < slow_edge || index >= count - slow_edge {
                PATH_STEP_SLOW
            } else {
                PATH_STEP_FAST
            };
            let delay = self.timing.sample(category)?;
            steps.push(PathStep { point, delay });
        }

        Ok(PointerPath { steps })
    }
}

fn cubic_bezier(t: f64, p0: Point, c1: Point, c2: Point, p1: Point) -> Point {
    let u = 1.0 - t;
    let x = u.powi(3) * p0.x
        + 3.0 * u.powi(2) * t * c1.x
        + 3.0 * u * t.powi(2) * c2.x
        + t.powi(3) * p1.x;
    let y = u.powi(3) * p0.y
        + 3.0 * u.powi(2) * t * c1.y
        + 3.0 * u * t.powi(2) * c2.y
        + t.powi(3) * p1.y;
    Point::new(x, y)
}
