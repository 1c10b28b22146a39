//! Movie-object container decoder ("MOBJ")
//!
//! Movie objects are the programs of the navigation machine. Each object is
//! three flag bits plus a command list; each command is 12 bytes:
//!
//! ```text
//! offset  size  field
//! 0       8     header (signature "MOBJ" + version)
//! 8       4     extension data start (ignored)
//! 48      2     object count
//! 50      ...   objects:
//!   0     1     resume-intention(1) menu-call-mask(1) title-search-mask(1)
//!   2     2     command count
//!   4     12*n  commands: instruction word, destination, source
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bits::split;
use crate::error::{FormatError, Result};
use crate::header::{check_header, SIG_MOVIE_OBJECTS};
use crate::insn::Instruction;
use crate::reader::ByteReader;

/// One navigation command: instruction word plus its two operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub insn: Instruction,
    pub dst: u32,
    pub src: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieObject {
    pub resume_intention: bool,
    pub menu_call_mask: bool,
    pub title_search_mask: bool,
    pub commands: Vec<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieObjects {
    pub version: u32,
    pub objects: Vec<MovieObject>,
}

impl MovieObjects {
    pub fn decode(data: &[u8]) -> Result<Self> {
        let r = ByteReader::new(data);
        let version = check_header(&r, SIG_MOVIE_OBJECTS)?;

        let extension_start = r.u32_at(8)?;
        if extension_start != 0 {
            debug!(extension_start, "ignoring movie-object extension data");
        }

        let num_objects = r.u16_at(48)? as usize;
        let mut objects = Vec::with_capacity(num_objects);
        let mut ptr = 50usize;
        for index in 0..num_objects {
            let [resume_intention, menu_call_mask, title_search_mask, _] =
                split(r.u8_at(ptr)? as u32, [1, 1, 1, 5]);

            let num_cmds = r.u16_at(ptr + 2)? as usize;
            if num_cmds == 0 {
                return Err(FormatError::EmptyObject { index });
            }

            let mut commands = Vec::with_capacity(num_cmds);
            for i in 0..num_cmds {
                let cmd = ptr + 4 + i * 12;
                commands.push(Command {
                    insn: Instruction::decode(r.u32_at(cmd)?),
                    dst: r.u32_at(cmd + 4)?,
                    src: r.u32_at(cmd + 8)?,
                });
            }

            objects.push(MovieObject {
                resume_intention: resume_intention != 0,
                menu_call_mask: menu_call_mask != 0,
                title_search_mask: title_search_mask != 0,
                commands,
            });
            ptr += 4 + num_cmds * 12;
        }

        Ok(Self { version, objects })
    }
}
