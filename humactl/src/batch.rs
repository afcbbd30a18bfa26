//! Batch descriptions: a TOML file listing tasks, each a sequence of
//! named interaction steps executed through the controller primitives.

use std::path::Path;

use serde::Deserialize;

use humact_core::{InteractConfig, ScrollDirection, Target, Task};

use crate::{AppError, Result};

#[derive(Debug, Deserialize)]
pub struct BatchPlan {
    #[serde(default, rename = "task")]
    pub tasks: Vec<TaskSpec>,
}

#[derive(Debug, Deserialize)]
pub struct TaskSpec {
    pub label: String,
    #[serde(default, rename = "step")]
    pub steps: Vec<StepSpec>,
}

/// One declarative step. `click` addresses targets by the label they
/// carry in the config's `[targets]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepSpec {
    Navigate { url: String },
    Click { target: String },
    Type { text: String },
    Press { key: String },
    Read,
    Scroll { direction: Direction },
    Wait { category: String },
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Down,
    Up,
}

impl From<Direction> for ScrollDirection {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Down => ScrollDirection::Down,
            Direction::Up => ScrollDirection::Up,
        }
    }
}

pub fn load_batch(path: &Path) -> Result<BatchPlan> {
    let raw = std::fs::read_to_string(path)?;
    toml::from_str(&raw).map_err(|source| AppError::BatchParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Compile a parsed plan into executable tasks. Target labels are
/// resolved against the config up front so a typo fails the whole run
/// before the browser ever launches.
pub fn build_tasks(plan: &BatchPlan, config: &InteractConfig) -> Result<Vec<Task>> {
    plan.tasks
        .iter()
        .map(|spec| {
            let mut task = Task::new(spec.label.clone());
            for step in &spec.steps {
                task = add_step(task, step, config)?;
            }
            Ok(task)
        })
        .collect()
}

fn add_step(task: Task, step: &StepSpec, config: &InteractConfig) -> Result<Task> {
    Ok(match step {
        StepSpec::Navigate { url } => {
            let url = url.clone();
            task.step("navigate", move |ctl| {
                let url = url.clone();
                Box::pin(async move { ctl.navigate_and_settle(&url).await })
            })
        }
        StepSpec::Click { target } => {
            let candidates = config
                .targets
                .get(target)
                .ok_or_else(|| AppError::UnknownTarget(target.clone()))?;
            let target = Target::new(target.clone(), candidates.clone());
            task.step(format!("click {}", target.label), move |ctl| {
                let target = target.clone();
                Box::pin(async move { ctl.click_target(&target).await.map(|_| ()) })
            })
        }
        StepSpec::Type { text } => {
            let text = text.clone();
            task.step("type", move |ctl| {
                let text = text.clone();
                Box::pin(async move { ctl.type_text(&text).await })
            })
        }
        StepSpec::Press { key } => {
            let key = key.clone();
            task.step(format!("press {key}"), move |ctl| {
                let key = key.clone();
                Box::pin(async move { ctl.press_key(&key).await })
            })
        }
        StepSpec::Read => task.step("read", |ctl| Box::pin(async move { ctl.read_page().await })),
        StepSpec::Scroll { direction } => {
            let direction = ScrollDirection::from(*direction);
            task.step("scroll", move |ctl| {
                Box::pin(async move { ctl.scroll_and_settle(direction).await })
            })
        }
        StepSpec::Wait { category } => {
            let category = category.clone();
            task.step(format!("wait {category}"), move |ctl| {
                let category = category.clone();
                Box::pin(async move { ctl.wait(&category).await })
            })
        }
    })
}
