//! Error types for the format layer

use thiserror::Error;

/// Errors produced while decoding disc metadata files
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("invalid signature {found:#010x}, expected {expected:#010x}")]
    InvalidSignature { expected: u32, found: u32 },

    #[error("unsupported format version {found:#010x}")]
    UnsupportedVersion { found: u32 },

    #[error("file truncated: read past end at offset {offset}")]
    Truncated { offset: usize },

    #[error("unknown playback object type {value} at offset {offset}")]
    UnknownObjectType { value: u8, offset: usize },

    #[error("index contains no titles and no entry-point objects")]
    EmptyIndex,

    #[error("movie object {index} has no commands")]
    EmptyObject { index: usize },
}

pub type Result<T> = std::result::Result<T, FormatError>;
