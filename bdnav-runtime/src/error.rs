//! Error types for the navigation runtime

use bdnav_spec::FormatError;
use thiserror::Error;

/// Register-bank access errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegisterError {
    #[error("psr {index} is read-only")]
    ReadOnly { index: u32 },

    #[error("register index {index} out of range")]
    InvalidIndex { index: u32 },
}

/// Virtual-machine execution errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VmError {
    #[error("movie object {object} does not exist")]
    InvalidTarget { object: u32 },

    #[error("title {title} is not addressable on this disc")]
    InvalidTitle { title: u32 },

    #[error("object did not terminate after {steps} instructions")]
    NotTerminating { steps: u64 },
}

/// Navigation-controller errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("disc supports neither first-play nor top-menu navigation")]
    NoMenuSupport,

    #[error("title {title} not found")]
    TitleNotFound { title: u32 },

    #[error("title requires a managed-application runtime")]
    ManagedAppUnsupported,
}

/// Resource-provider errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("resource {resource} not found")]
    NotFound { resource: String },
}

/// Any failure surfaced by the player API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayerError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Navigation(#[from] NavigationError),

    #[error(transparent)]
    Vm(#[from] VmError),
}

pub type Result<T> = std::result::Result<T, PlayerError>;
