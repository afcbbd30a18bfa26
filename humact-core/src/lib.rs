pub mod config;
pub mod driver;
pub mod error;
pub mod interact;
pub mod run;

pub use config::{
    load_interact_config, BrowserSection, ClickSection, DiagnosticsSection, InteractConfig,
    MotionSection, ResolverSection, RetrySection, ScrollSection, TypingSection,
};
pub use driver::{BoundingBox, CdpDriver, CdpLauncher, DriverError, DriverResult, HostDriver, Point};
pub use error::{ConfigError, Result};
pub use interact::{
    ElementResolver, InteractError, InteractResult, InteractionController, PathSynthesizer,
    PointerDriver, PointerPath, ResolvedElement, ScrollDirection, Target, TimingModel,
};
pub use run::{
    BatchCoordinator, CancelFlag, RunSummary, Task, TaskFailure, TaskOutcome, TaskRunner,
    TaskState, TaskStep,
};
