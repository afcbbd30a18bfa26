mod controller;
mod error;
mod path;
mod pointer;
mod resolver;
mod timing;

pub use controller::{InteractionController, ScrollDirection};
pub use error::{InteractError, InteractResult};
pub use path::{PathStep, PathSynthesizer, PointerPath, PATH_STEP_FAST, PATH_STEP_SLOW};
pub use pointer::PointerDriver;
pub use resolver::{ElementResolver, ResolvedElement, Target};
pub use timing::TimingModel;
