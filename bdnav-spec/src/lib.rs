//! BDMV navigation format layer
//!
//! Decoders for the three metadata files that drive disc navigation:
//!
//! - [`index::DiscIndex`] — the disc index ("INDX"): entry points and the
//!   title table.
//! - [`mobj::MovieObjects`] — the movie-object container ("MOBJ"): the
//!   programs executed by the navigation machine.
//! - [`mpls::Playlist`] — playlists ("MPLS"): play items, sub-paths and
//!   chapter marks.
//!
//! Plus the pieces shared with the runtime: the instruction codec
//! ([`insn`]), register-file definitions ([`psr`]) and the user-operation
//! mask ([`uo_mask`]).
//!
//! All multi-byte fields in these files are big-endian. Decoders are
//! strict about structure (truncation and unknown object types are errors)
//! and lenient about field values the player can ignore, which are logged
//! and carried through.

pub mod bits;
pub mod error;
pub mod header;
pub mod index;
pub mod insn;
pub mod mobj;
pub mod mpls;
pub mod psr;
pub mod reader;
pub mod uo_mask;

pub use error::{FormatError, Result};
pub use index::DiscIndex;
pub use insn::Instruction;
pub use mobj::{Command, MovieObject, MovieObjects};
pub use mpls::Playlist;
pub use uo_mask::UoMask;
