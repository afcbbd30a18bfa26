mod cdp;
mod error;
mod host;

pub use cdp::{CdpDriver, CdpLauncher};
pub use error::{DriverError, DriverResult};
pub use host::{BoundingBox, HostDriver, Point};
