use thiserror::Error;

use crate::driver::DriverError;

pub type InteractResult<T> = Result<T, InteractError>;

#[derive(Debug, Error)]
pub enum InteractError {
    /// A pause category missing from the timing profile. Configuration
    /// bug: fatal, never retried.
    #[error("unknown timing category: {0}")]
    UnknownCategory(String),
    /// Every locator candidate for a target was exhausted. Expected in
    /// normal operation; callers decide whether absence is fatal.
    #[error("element not found: {0}")]
    ElementNotFound(String),
    /// The page state changed mid-action (element detached, navigation,
    /// driver transport failure). Transient; retried at the task layer.
    #[error("interaction interrupted: {0}")]
    Interrupted(String),
}

impl InteractError {
    /// Whether a fresh attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            InteractError::UnknownCategory(_) => false,
            InteractError::ElementNotFound(_) | InteractError::Interrupted(_) => true,
        }
    }
}

impl From<DriverError> for InteractError {
    fn from(err: DriverError) -> Self {
        InteractError::Interrupted(err.to_string())
    }
}
