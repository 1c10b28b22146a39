//! Playlist decoder ("MPLS")
//!
//! A playlist is three sections located by absolute offsets in the header:
//! the play-item list (main path plus sub-paths), the play-mark list and an
//! extension block (ignored here). Records inside the sections are
//! length-prefixed; a record's length field counts the bytes after the field
//! itself, so the cursor advances by `len + 2` over 16-bit-prefixed records
//! and `len + 4` over 32-bit-prefixed ones.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::bits::split;
use crate::error::Result;
use crate::header::{check_header, SIG_PLAYLIST};
use crate::reader::ByteReader;
use crate::uo_mask::UoMask;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub version: u32,
    pub app_info: PlaylistAppInfo,
    pub play_items: Vec<PlayItem>,
    pub sub_paths: Vec<SubPath>,
    pub marks: Vec<PlayMark>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistAppInfo {
    pub playback_type: u8,
    /// Repetition count for random/shuffle playback types.
    pub playback_count: u16,
    pub uo_mask: UoMask,
    pub random_access: bool,
    pub audio_mix: bool,
    pub lossless_bypass: bool,
    pub mvc_base_view_r: bool,
    pub sdr_conversion_notification: bool,
}

/// A clip reference: clip file name, codec identifier and STC sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipRef {
    pub clip_id: String,
    pub codec_id: String,
    pub stc_id: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayItem {
    pub connection_condition: u8,
    pub in_time: u32,
    pub out_time: u32,
    pub uo_mask: UoMask,
    pub random_access: bool,
    pub still_mode: u8,
    pub still_time: u16,
    pub different_audio: bool,
    pub seamless_angle: bool,
    /// One clip per angle; index 0 is the primary angle.
    pub angles: Vec<ClipRef>,
    pub streams: StreamTable,
}

/// The play item's stream-number table.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamTable {
    pub video: Vec<Stream>,
    pub audio: Vec<Stream>,
    pub pg: Vec<Stream>,
    pub ig: Vec<Stream>,
    pub secondary_audio: Vec<Stream>,
    pub secondary_video: Vec<Stream>,
    pub dv: Vec<Stream>,
    /// Declared picture-in-picture PG stream count (entries are not stored
    /// in the table itself).
    pub pip_pg_count: u8,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stream {
    pub stream_type: u8,
    pub subpath_id: u8,
    pub subclip_id: u8,
    pub pid: u16,
    pub coding_type: u8,
    pub format: u8,
    pub rate: u8,
    pub lang: String,
    pub char_code: u8,
    pub dynamic_range_type: u8,
    pub color_space: u8,
    pub cr_flag: bool,
    pub hdr_plus_flag: bool,
    /// Secondary audio: primary audio streams it may combine with.
    pub primary_audio_refs: Vec<u8>,
    /// Secondary video: secondary audio streams it may combine with.
    pub secondary_audio_refs: Vec<u8>,
    /// Secondary video: PiP PG streams it may combine with.
    pub pip_pg_refs: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubPath {
    pub path_type: u8,
    pub repeat: bool,
    pub items: Vec<SubPlayItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubPlayItem {
    pub connection_condition: u8,
    pub in_time: u32,
    pub out_time: u32,
    pub sync_play_item_id: u16,
    pub sync_pts: u32,
    /// One entry per clip; index 0 is the primary clip.
    pub clips: Vec<ClipRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayMark {
    pub mark_type: u8,
    pub play_item_ref: u16,
    pub time: u32,
    pub entry_es_pid: u16,
    pub duration: u32,
}

impl Playlist {
    pub fn decode(data: &[u8]) -> Result<Self> {
        let r = ByteReader::new(data);
        let version = check_header(&r, SIG_PLAYLIST)?;

        let list_pos = r.u32_at(8)? as usize;
        let mark_pos = r.u32_at(12)? as usize;
        let ext_pos = r.u32_at(16)?;
        if ext_pos != 0 {
            debug!(ext_pos, "ignoring playlist extension data");
        }

        let app_info = decode_app_info(&r)?;

        let list_count = r.u16_at(list_pos + 6)? as usize;
        let sub_count = r.u16_at(list_pos + 8)? as usize;

        let mut play_items = Vec::with_capacity(list_count);
        let mut pos = list_pos + 10;
        for _ in 0..list_count {
            let len = r.u16_at(pos)? as usize;
            play_items.push(decode_play_item(&r, pos)?);
            pos += len + 2;
        }

        let mut sub_paths = Vec::with_capacity(sub_count);
        for _ in 0..sub_count {
            let len = r.u32_at(pos)? as usize;
            sub_paths.push(decode_sub_path(&r, pos)?);
            pos += len + 4;
        }

        let mark_count = r.u16_at(mark_pos + 4)? as usize;
        let mut marks = Vec::with_capacity(mark_count);
        for i in 0..mark_count {
            let m = mark_pos + 7 + i * 14;
            marks.push(PlayMark {
                mark_type: r.u8_at(m)?,
                play_item_ref: r.u16_at(m + 1)?,
                time: r.u32_at(m + 3)?,
                entry_es_pid: r.u16_at(m + 7)?,
                duration: r.u32_at(m + 9)?,
            });
        }

        Ok(Self {
            version,
            app_info,
            play_items,
            sub_paths,
            marks,
        })
    }
}

fn decode_app_info(r: &ByteReader<'_>) -> Result<PlaylistAppInfo> {
    let playback_type = r.u8_at(45)?;
    // random (2) and shuffle (3) playback carry a repetition count
    let playback_count = if playback_type == 2 || playback_type == 3 {
        r.u16_at(46)?
    } else {
        0
    };
    let uo_mask = UoMask::from_raw(r.u64_at(48)?);
    let [random_access, audio_mix, lossless_bypass, mvc_base_view_r, sdr_notification, _] =
        split(r.u16_at(56)? as u32, [1, 1, 1, 1, 1, 11]);

    Ok(PlaylistAppInfo {
        playback_type,
        playback_count,
        uo_mask,
        random_access: random_access != 0,
        audio_mix: audio_mix != 0,
        lossless_bypass: lossless_bypass != 0,
        mvc_base_view_r: mvc_base_view_r != 0,
        sdr_conversion_notification: sdr_notification != 0,
    })
}

fn decode_clip_ref(r: &ByteReader<'_>, offset: usize) -> Result<ClipRef> {
    let clip_id = r.ascii_at(offset, 5)?;
    let codec_id = r.ascii_at(offset + 5, 4)?;
    if codec_id != "M2TS" && codec_id != "FMTS" {
        warn!(codec_id, "unexpected codec identifier");
    }
    Ok(ClipRef {
        clip_id,
        codec_id,
        stc_id: r.u8_at(offset + 9)?,
    })
}

fn check_connection_condition(cc: u32) {
    if cc != 0x01 && cc != 0x05 && cc != 0x06 {
        warn!(
            connection_condition = cc,
            "unexpected connection condition"
        );
    }
}

fn decode_play_item(r: &ByteReader<'_>, start: usize) -> Result<PlayItem> {
    let clip_id = r.ascii_at(start + 2, 5)?;
    let codec_id = r.ascii_at(start + 7, 4)?;
    if codec_id != "M2TS" && codec_id != "FMTS" {
        warn!(codec_id, "unexpected codec identifier");
    }

    let [_, multi_angle, connection_condition] = split(r.u8_at(start + 12)? as u32, [3, 1, 4]);
    check_connection_condition(connection_condition);
    let multi_angle = multi_angle != 0;

    let stc_id = r.u8_at(start + 13)?;
    let in_time = r.u32_at(start + 14)?;
    let out_time = r.u32_at(start + 18)?;
    let uo_mask = UoMask::from_raw(r.u64_at(start + 22)?);
    let random_access = r.u8_at(start + 30)? & 0x80 != 0;
    let still_mode = r.u8_at(start + 31)?;
    let still_time = if still_mode == 0x01 {
        r.u16_at(start + 32)?
    } else {
        0
    };

    let angle_count = if multi_angle {
        r.u8_at(start + 34)? as usize
    } else {
        1
    };
    let angle_flags = if multi_angle { r.u8_at(start + 35)? } else { 0 };

    let mut angles = Vec::with_capacity(angle_count);
    angles.push(ClipRef {
        clip_id,
        codec_id,
        stc_id,
    });
    for i in 0..angle_count.saturating_sub(1) {
        angles.push(decode_clip_ref(r, start + 36 + i * 10)?);
    }

    let streams = decode_stream_table(r, start + 24 + angle_count * 10)?;

    Ok(PlayItem {
        connection_condition: connection_condition as u8,
        in_time,
        out_time,
        uo_mask,
        random_access,
        still_mode,
        still_time,
        different_audio: angle_flags & 0x02 != 0,
        seamless_angle: angle_flags & 0x01 != 0,
        angles,
        streams,
    })
}

fn decode_stream_table(r: &ByteReader<'_>, start: usize) -> Result<StreamTable> {
    // length field and two reserved bytes
    let mut pos = start + 4;

    let num_video = r.u8_at(pos)?;
    let num_audio = r.u8_at(pos + 1)?;
    let num_pg = r.u8_at(pos + 2)?;
    let num_ig = r.u8_at(pos + 3)?;
    let num_secondary_audio = r.u8_at(pos + 4)?;
    let num_secondary_video = r.u8_at(pos + 5)?;
    let pip_pg_count = r.u8_at(pos + 6)?;
    let num_dv = r.u8_at(pos + 7)?;
    pos += 8 + 4; // counts plus reserved

    let mut table = StreamTable {
        pip_pg_count,
        ..StreamTable::default()
    };

    for _ in 0..num_video {
        let (stream, size) = decode_stream(r, pos)?;
        table.video.push(stream);
        pos += size;
    }
    for _ in 0..num_audio {
        let (stream, size) = decode_stream(r, pos)?;
        table.audio.push(stream);
        pos += size;
    }
    for _ in 0..num_pg {
        let (stream, size) = decode_stream(r, pos)?;
        table.pg.push(stream);
        pos += size;
    }
    for _ in 0..num_ig {
        let (stream, size) = decode_stream(r, pos)?;
        table.ig.push(stream);
        pos += size;
    }
    for _ in 0..num_secondary_audio {
        let (mut stream, size) = decode_stream(r, pos)?;
        let (refs, next) = decode_ref_list(r, pos + size)?;
        pos = next;
        stream.primary_audio_refs = refs;
        table.secondary_audio.push(stream);
    }
    for _ in 0..num_secondary_video {
        let (mut stream, size) = decode_stream(r, pos)?;
        pos += size;
        let (audio_refs, next) = decode_ref_list(r, pos)?;
        let (pip_refs, next) = decode_ref_list(r, next)?;
        pos = next;
        stream.secondary_audio_refs = audio_refs;
        stream.pip_pg_refs = pip_refs;
        table.secondary_video.push(stream);
    }
    for _ in 0..num_dv {
        let (stream, size) = decode_stream(r, pos)?;
        table.dv.push(stream);
        pos += size;
    }

    Ok(table)
}

/// Count byte, reserved byte, entries, then one alignment byte when the
/// count is odd.
fn decode_ref_list(r: &ByteReader<'_>, start: usize) -> Result<(Vec<u8>, usize)> {
    let count = r.u8_at(start)? as usize;
    let mut refs = Vec::with_capacity(count);
    let mut pos = start + 2;
    for _ in 0..count {
        refs.push(r.u8_at(pos)?);
        pos += 1;
    }
    if count % 2 != 0 {
        pos += 1;
    }
    Ok((refs, pos))
}

/// Decodes one stream entry plus its attributes; returns the record and its
/// total size.
fn decode_stream(r: &ByteReader<'_>, start: usize) -> Result<(Stream, usize)> {
    let len = r.u8_at(start)? as usize;
    let stream_type = r.u8_at(start + 1)?;

    let valid_type = (1..=4).contains(&stream_type);
    if !valid_type {
        warn!(stream_type, "unrecognized stream entry type");
    }

    let subpath_id = if valid_type && stream_type > 1 {
        r.u8_at(start + 2)?
    } else {
        0
    };
    let subclip_id = if stream_type == 2 {
        r.u8_at(start + 3)?
    } else {
        0
    };
    // pid position depends on how many reference bytes precede it
    let pid = if valid_type {
        let pid_loc = [2, 4, 3, 3][stream_type as usize - 1];
        r.u16_at(start + pid_loc)?
    } else {
        0
    };

    let info_len = r.u8_at(start + len + 1)? as usize;
    let coding_type = r.u8_at(start + len + 2)?;

    let grp1 = [0x01, 0x02, 0xea, 0x1b, 0x24].contains(&coding_type);
    let grp2 = [0x03, 0x04, 0x80, 0x81, 0x82, 0x83, 0x84, 0x85, 0x86, 0xa1, 0xa2]
        .contains(&coding_type);
    let grp3 = coding_type == 0x90 || coding_type == 0x91;
    let grp4 = coding_type == 0x92;

    let (format, rate) = if grp1 || grp2 {
        let [format, rate] = split(r.u8_at(start + len + 3)? as u32, [4, 4]);
        (format as u8, rate as u8)
    } else {
        (0, 0)
    };
    let lang = if grp2 || grp3 {
        let skip = usize::from(grp2);
        r.ascii_at(start + len + 3 + skip, 3)?
    } else {
        String::new()
    };
    let char_code = if grp4 { r.u8_at(start + len + 3)? } else { 0 };

    // HEVC carries HDR metadata
    let (dynamic_range_type, color_space, cr_flag, hdr_plus_flag) = if coding_type == 0x24 {
        let [dr, cs, cr, hp] = split(r.u16_at(start + len + 4)? as u32, [4, 4, 1, 1]);
        (dr as u8, cs as u8, cr != 0, hp != 0)
    } else {
        (0, 0, false, false)
    };

    let stream = Stream {
        stream_type,
        subpath_id,
        subclip_id,
        pid,
        coding_type,
        format,
        rate,
        lang,
        char_code,
        dynamic_range_type,
        color_space,
        cr_flag,
        hdr_plus_flag,
        primary_audio_refs: Vec::new(),
        secondary_audio_refs: Vec::new(),
        pip_pg_refs: Vec::new(),
    };
    Ok((stream, len + info_len + 2))
}

fn decode_sub_path(r: &ByteReader<'_>, start: usize) -> Result<SubPath> {
    let path_type = r.u8_at(start + 5)?;
    let repeat = r.u8_at(start + 7)? & 0x01 != 0;
    let item_count = r.u8_at(start + 9)? as usize;

    let mut items = Vec::with_capacity(item_count);
    let mut pos = start + 10;
    for _ in 0..item_count {
        let len = r.u16_at(pos)? as usize;
        items.push(decode_sub_play_item(r, pos)?);
        pos += len + 2;
    }

    Ok(SubPath {
        path_type,
        repeat,
        items,
    })
}

fn decode_sub_play_item(r: &ByteReader<'_>, start: usize) -> Result<SubPlayItem> {
    let clip_id = r.ascii_at(start + 2, 5)?;
    let codec_id = r.ascii_at(start + 7, 4)?;
    if codec_id != "M2TS" && codec_id != "FMTS" {
        warn!(codec_id, "unexpected codec identifier");
    }

    let [_, connection_condition, multi_clip] = split(r.u8_at(start + 14)? as u32, [3, 4, 1]);
    check_connection_condition(connection_condition);
    let multi_clip = multi_clip != 0;

    let stc_id = r.u8_at(start + 15)?;
    let in_time = r.u32_at(start + 16)?;
    let out_time = r.u32_at(start + 20)?;
    let sync_play_item_id = r.u16_at(start + 24)?;
    let sync_pts = r.u32_at(start + 26)?;
    let clip_count = if multi_clip {
        r.u8_at(start + 30)? as usize
    } else {
        1
    };

    let mut clips = Vec::with_capacity(clip_count);
    clips.push(ClipRef {
        clip_id,
        codec_id,
        stc_id,
    });
    for i in 0..clip_count.saturating_sub(1) {
        clips.push(decode_clip_ref(r, start + 31 + i * 10)?);
    }

    Ok(SubPlayItem {
        connection_condition: connection_condition as u8,
        in_time,
        out_time,
        sync_play_item_id,
        sync_pts,
        clips,
    })
}
