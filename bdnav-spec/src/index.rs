//! Disc index decoder ("INDX")
//!
//! The index names the disc's entry points and its title table:
//!
//! ```text
//! offset        size  field
//! 0             8     header (signature "INDX" + version)
//! 8             4     index table start
//! 40            4     app-info length (34 expected)
//! 44            1     flags: reserved(1) output-mode-pref(1) 3d-content(1)
//!                            reserved(1) dynamic-range-type(4)
//! 45            1     video-format(4) frame-rate(4)
//! 46            32    user data
//! start         4     index table length
//! start+4       12    first-play playback object
//! start+16      12    top-menu playback object
//! start+28      2     title count
//! start+30      12*n  title entries
//! ```
//!
//! A playback object is either an HDMV object (movie-object reference) or a
//! managed-application object (named application); titles carry two access
//! bits on top.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bits::split;
use crate::error::{FormatError, Result};
use crate::header::{check_header, SIG_INDEX};
use crate::reader::ByteReader;

const APP_INFO_LEN: u32 = 34;

/// Playback-object reference meaning "no object".
pub const NO_OBJECT_REF: u16 = 0xffff;

const ACCESS_PROHIBITED_MASK: u32 = 0x01;
const ACCESS_HIDDEN_MASK: u32 = 0x02;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum HdmvPlaybackType {
    Movie = 0,
    Interactive = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum ManagedAppPlaybackType {
    Movie = 2,
    Interactive = 3,
}

/// What a title or entry point starts when activated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackObject {
    Hdmv {
        playback_type: HdmvPlaybackType,
        id_ref: u16,
    },
    ManagedApp {
        playback_type: ManagedAppPlaybackType,
        name: String,
    },
}

impl PlaybackObject {
    /// Movie-object reference, when this is a present HDMV object.
    pub fn hdmv_id_ref(&self) -> Option<u16> {
        match self {
            Self::Hdmv { id_ref, .. } if *id_ref != NO_OBJECT_REF => Some(*id_ref),
            _ => None,
        }
    }

    pub fn is_interactive(&self) -> bool {
        matches!(
            self,
            Self::Hdmv {
                playback_type: HdmvPlaybackType::Interactive,
                ..
            } | Self::ManagedApp {
                playback_type: ManagedAppPlaybackType::Interactive,
                ..
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleEntry {
    pub object: PlaybackObject,
    pub prohibited: bool,
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexAppInfo {
    pub initial_output_mode_preference: u8,
    pub content_exist_3d: bool,
    pub initial_dynamic_range_type: u8,
    pub video_format: u8,
    pub frame_rate: u8,
    pub user_data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscIndex {
    pub version: u32,
    pub app_info: IndexAppInfo,
    pub first_play: PlaybackObject,
    pub top_menu: PlaybackObject,
    pub titles: Vec<TitleEntry>,
}

impl DiscIndex {
    pub fn decode(data: &[u8]) -> Result<Self> {
        let r = ByteReader::new(data);
        let version = check_header(&r, SIG_INDEX)?;

        let index_start = r.u32_at(8)? as usize;
        let app_info = decode_app_info(&r)?;

        let index_len = r.u32_at(index_start)? as usize;
        if r.remaining(index_start + 4) < index_len {
            return Err(FormatError::Truncated {
                offset: index_start + 4,
            });
        }

        let first_play = decode_playback_object(&r, index_start + 4)?;
        let top_menu = decode_playback_object(&r, index_start + 16)?;

        let num_titles = r.u16_at(index_start + 28)? as usize;
        let mut titles = Vec::with_capacity(num_titles);
        for i in 0..num_titles {
            let entry = index_start + 30 + i * 12;
            let [_, access, _] = split(r.u8_at(entry)? as u32, [2, 2, 4]);
            let object = decode_playback_object(&r, entry)?;
            titles.push(TitleEntry {
                object,
                prohibited: access & ACCESS_PROHIBITED_MASK != 0,
                hidden: access & ACCESS_HIDDEN_MASK != 0,
            });
        }

        let index = Self {
            version,
            app_info,
            first_play,
            top_menu,
            titles,
        };
        if index.is_empty() {
            return Err(FormatError::EmptyIndex);
        }
        Ok(index)
    }

    /// No titles and neither entry point references a movie object.
    fn is_empty(&self) -> bool {
        self.titles.is_empty()
            && self.first_play.hdmv_id_ref().is_none()
            && self.top_menu.hdmv_id_ref().is_none()
            && matches!(self.first_play, PlaybackObject::Hdmv { .. })
            && matches!(self.top_menu, PlaybackObject::Hdmv { .. })
    }
}

fn decode_app_info(r: &ByteReader<'_>) -> Result<IndexAppInfo> {
    let app_info_len = r.u32_at(40)?;
    if app_info_len != APP_INFO_LEN {
        debug!(app_info_len, "unexpected app-info length");
    }

    let [_, output_mode, exist_3d, _, dynamic_range] = split(r.u8_at(44)? as u32, [1, 1, 1, 1, 4]);
    let [video_format, frame_rate] = split(r.u8_at(45)? as u32, [4, 4]);

    Ok(IndexAppInfo {
        initial_output_mode_preference: output_mode as u8,
        content_exist_3d: exist_3d != 0,
        initial_dynamic_range_type: dynamic_range as u8,
        video_format: video_format as u8,
        frame_rate: frame_rate as u8,
        user_data: r.slice_at(46, 32)?.to_vec(),
    })
}

/// Decodes the 12-byte playback object starting at `offset`.
fn decode_playback_object(r: &ByteReader<'_>, offset: usize) -> Result<PlaybackObject> {
    let [object_type, _] = split(r.u8_at(offset)? as u32, [2, 6]);
    match object_type {
        1 => {
            let [playback_type, _] = split(r.u8_at(offset + 4)? as u32, [2, 6]);
            let playback_type = match playback_type {
                0 => HdmvPlaybackType::Movie,
                1 => HdmvPlaybackType::Interactive,
                other => {
                    debug!(playback_type = other, "unexpected hdmv playback type");
                    HdmvPlaybackType::Interactive
                }
            };
            Ok(PlaybackObject::Hdmv {
                playback_type,
                id_ref: r.u16_at(offset + 6)?,
            })
        }
        2 => {
            let raw = r.u8_at(offset + 4)?;
            let playback_type = match raw {
                2 => ManagedAppPlaybackType::Movie,
                3 => ManagedAppPlaybackType::Interactive,
                other => {
                    debug!(playback_type = other, "unexpected managed-app playback type");
                    ManagedAppPlaybackType::Movie
                }
            };
            Ok(PlaybackObject::ManagedApp {
                playback_type,
                name: r.ascii_at(offset + 6, 5)?,
            })
        }
        other => Err(FormatError::UnknownObjectType {
            value: other as u8,
            offset,
        }),
    }
}
