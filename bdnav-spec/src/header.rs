//! Common file header shared by the three metadata formats
//!
//! ```text
//! offset  size  field
//! 0       4     signature, ASCII ("INDX", "MOBJ" or "MPLS")
//! 4       4     version, ASCII ("0100", "0200", "0240" or "0300")
//! ```

use crate::error::{FormatError, Result};
use crate::reader::ByteReader;

pub const SIG_INDEX: u32 = u32::from_be_bytes(*b"INDX");
pub const SIG_MOVIE_OBJECTS: u32 = u32::from_be_bytes(*b"MOBJ");
pub const SIG_PLAYLIST: u32 = u32::from_be_bytes(*b"MPLS");

pub const VERSION_0100: u32 = u32::from_be_bytes(*b"0100");
pub const VERSION_0200: u32 = u32::from_be_bytes(*b"0200");
pub const VERSION_0240: u32 = u32::from_be_bytes(*b"0240");
pub const VERSION_0300: u32 = u32::from_be_bytes(*b"0300");

pub const SUPPORTED_VERSIONS: [u32; 4] =
    [VERSION_0100, VERSION_0200, VERSION_0240, VERSION_0300];

/// Validates the 8-byte header and returns the version token.
pub fn check_header(reader: &ByteReader<'_>, expected_sig: u32) -> Result<u32> {
    let sig = reader.u32_at(0)?;
    if sig != expected_sig {
        return Err(FormatError::InvalidSignature {
            expected: expected_sig,
            found: sig,
        });
    }

    let version = reader.u32_at(4)?;
    if !SUPPORTED_VERSIONS.contains(&version) {
        return Err(FormatError::UnsupportedVersion { found: version });
    }

    Ok(version)
}
