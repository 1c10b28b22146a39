//! Player status/setting register definitions
//!
//! The register file has 128 player status registers (PSRs) and 4096
//! general-purpose registers (GPRs). Register operands in navigation
//! commands address a PSR by setting bit 31; the low bits select the index.
//!
//! PSRs below 32 report playback position and stream selection; 32 and up
//! hold player settings and the backup slots used while a menu object
//! borrows the machine. A subset is read-only to navigation code.

/// Number of player status registers.
pub const PSR_COUNT: usize = 128;

/// Number of general-purpose registers.
pub const GPR_COUNT: usize = 4096;

/// Register operands select a PSR with this bit.
pub const PSR_FLAG: u32 = 0x8000_0000;

/// Index mask for PSR operands.
pub const PSR_INDEX_MASK: u32 = 0x7f;

/// Index mask for GPR operands.
pub const GPR_INDEX_MASK: u32 = 0xfff;

pub const PSR_IG_STREAM_ID: u32 = 0;
pub const PSR_PRIMARY_AUDIO_ID: u32 = 1;
pub const PSR_PG_STREAM: u32 = 2;
pub const PSR_ANGLE_NUMBER: u32 = 3;
pub const PSR_TITLE_NUMBER: u32 = 4;
pub const PSR_CHAPTER: u32 = 5;
pub const PSR_PLAYLIST: u32 = 6;
pub const PSR_PLAYITEM: u32 = 7;
pub const PSR_TIME: u32 = 8;
pub const PSR_NAV_TIMER: u32 = 9;
pub const PSR_SELECTED_BUTTON_ID: u32 = 10;
pub const PSR_MENU_PAGE_ID: u32 = 11;
pub const PSR_STYLE: u32 = 12;
pub const PSR_PARENTAL: u32 = 13;
pub const PSR_SECONDARY_AUDIO_VIDEO: u32 = 14;
pub const PSR_AUDIO_CAP: u32 = 15;
pub const PSR_AUDIO_LANG: u32 = 16;
pub const PSR_PG_AND_SUB_LANG: u32 = 17;
pub const PSR_MENU_LANG: u32 = 18;
pub const PSR_COUNTRY: u32 = 19;
pub const PSR_REGION: u32 = 20;
pub const PSR_OUTPUT_PREFER: u32 = 21;
pub const PSR_3D_STATUS: u32 = 22;
pub const PSR_DISPLAY_CAP: u32 = 23;
pub const PSR_3D_CAP: u32 = 24;
pub const PSR_UHD_CAP: u32 = 25;
pub const PSR_UHD_DISPLAY_CAP: u32 = 26;
pub const PSR_HDR_PREFER: u32 = 27;
pub const PSR_SDR_CONV_PREFER: u32 = 28;
pub const PSR_VIDEO_CAP: u32 = 29;
pub const PSR_TEXT_CAP: u32 = 30;
pub const PSR_PROFILE_VERSION: u32 = 31;

pub const PSR_BACKUP_TITLE_NUMBER: u32 = 36;
pub const PSR_BACKUP_CHAPTER: u32 = 37;
pub const PSR_BACKUP_PLAYLIST: u32 = 38;
pub const PSR_BACKUP_PLAYITEM: u32 = 39;
pub const PSR_BACKUP_TIME: u32 = 40;
pub const PSR_BACKUP_SELECTED_BUTTON_ID: u32 = 42;
pub const PSR_BACKUP_MENU_PAGE_ID: u32 = 43;
pub const PSR_BACKUP_STYLE: u32 = 44;

/// Profile-5 gate on the PSR31 profile/version word.
pub const PROFILE_5_MASK: u32 = 0x0013_0240;

/// Profile 2 version 2.0, the default player profile word.
pub const PROFILE_2_V2_0: u32 = 0x0003_0200;

/// True when `index` names a PSR navigation code may not write.
pub fn is_read_only(index: u32) -> bool {
    matches!(index, 13 | 15..=21 | 23..=31 | 48..=61)
}

/// True when a command register operand is well formed: a PSR operand may
/// only carry a 7-bit index, a GPR operand a 12-bit one.
pub fn is_valid_operand(reg: u32) -> bool {
    if reg & PSR_FLAG != 0 {
        reg & !(PSR_FLAG | PSR_INDEX_MASK) == 0
    } else {
        reg & !GPR_INDEX_MASK == 0
    }
}

/// Initial PSR values for a freshly opened disc.
///
/// Capability words advertise a fully featured profile-2 player: every
/// surround codec, secondary video at HD and 25/50 Hz, all text-subtitle
/// capabilities, region B.
pub fn default_psr() -> [u32; PSR_COUNT] {
    let mut psr = [0u32; PSR_COUNT];
    psr[0] = 1; // IG stream 1
    psr[1] = 0xff; // primary audio: none selected
    psr[2] = 0x0fff_0fff; // PG/TextST streams: none selected
    psr[3] = 1; // angle 1
    psr[4] = 0xffff; // no title
    psr[5] = 0xffff; // no chapter
    psr[10] = 0xffff; // no button selected
    psr[12] = 0xff; // style
    psr[13] = 0xff; // parental: unlimited
    psr[14] = 0xffff; // secondary streams: none
    psr[15] = 0x3333; // audio caps: LPCM/DD+/DTS-HD/DD/MLP surround
    psr[16] = 0xff_ffff; // audio language: undefined
    psr[17] = 0xff_ffff; // PG language: undefined
    psr[18] = 0xff_ffff; // menu language: undefined
    psr[19] = 0xffff; // country: undefined
    psr[20] = 0x02; // region B
    psr[21] = 0; // output mode preference: 2D
    psr[29] = 0x03; // video caps: secondary HD, 25/50 Hz
    psr[30] = 0x1_ffff; // text subtitle caps
    psr[31] = PROFILE_2_V2_0;
    psr[36] = 0xffff; // backups mirror their sources
    psr[37] = 0xffff;
    psr[42] = 0xffff;
    psr[44] = 0xff;
    for slot in psr.iter_mut().take(62).skip(48) {
        *slot = 0xffff_ffff;
    }
    psr
}
