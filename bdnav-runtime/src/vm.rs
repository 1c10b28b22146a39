//! HDMV virtual machine
//!
//! A stack-free interpreter over movie-object command lists. Control state
//! is three single frames rather than a stack:
//!
//! - `current` — the frame being executed.
//! - `playing` — the frame that handed playback to a playlist and waits for
//!   it to finish.
//! - `suspended` — the frame parked by a call (menu borrow); PSRs are backed
//!   up alongside it.
//!
//! On top of the movie objects from the disc, an interactive-graphics
//! object (button command list) can be run in the same machine; a few
//! operations are only legal in one of the two contexts.
//!
//! The machine never blocks: playlist playback, title jumps and button
//! actions are queued as [`HdmvEvent`]s for the controller.

use std::collections::VecDeque;
use std::sync::Arc;

use bdnav_spec::insn::{
    BranchSubGroup, CompareOption, GotoOption, InsnGroup, JumpOption, PlayOption, SetOption,
    SetSubGroup, SetSystemOption,
};
use bdnav_spec::mobj::{Command, MovieObject, MovieObjects};
use bdnav_spec::psr;
use tracing::{debug, error, warn};

use crate::error::VmError;
use crate::events::HdmvEvent;
use crate::registers::RegisterBank;

/// Instruction ceiling for one `run` call.
pub const STEP_LIMIT: u64 = 1_000_000;

/// Program counter parked past any real command list.
const PC_EXIT: usize = 1 << 17;

/// Which command list a frame executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ObjectRef {
    /// Movie object by index.
    Disc(usize),
    /// The interactive-graphics object.
    Ig,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    object: ObjectRef,
    pc: usize,
}

/// Title numbers addressable on the disc, shared between the machine and
/// the controller for jump/call validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TitleCaps {
    pub num_titles: u32,
    pub first_play: bool,
    pub top_menu: bool,
}

impl TitleCaps {
    /// 0 selects the top menu, 0xffff first play, anything else must be a
    /// title-table index.
    pub fn is_valid_title(&self, title: u32) -> bool {
        match title {
            0 => self.top_menu,
            0xffff => self.first_play,
            t => (1..=self.num_titles).contains(&t),
        }
    }
}

pub struct HdmvVm {
    caps: TitleCaps,
    objects: Option<Arc<MovieObjects>>,
    ig_object: Option<MovieObject>,
    current: Option<Frame>,
    playing: Option<Frame>,
    suspended: Option<Frame>,
    events: VecDeque<HdmvEvent>,
}

impl HdmvVm {
    pub fn new(caps: TitleCaps) -> Self {
        Self {
            caps,
            objects: None,
            ig_object: None,
            current: None,
            playing: None,
            suspended: None,
            events: VecDeque::new(),
        }
    }

    pub fn set_movie_objects(&mut self, objects: Arc<MovieObjects>) {
        self.objects = Some(objects);
    }

    /// Starts executing the movie object `object` from its first command.
    pub fn select_object(&mut self, object: u32) -> Result<(), VmError> {
        self.jump_object(object)
    }

    /// Starts executing a button command list in the interactive-graphics
    /// context.
    pub fn select_ig_object(&mut self, object: MovieObject) {
        self.ig_object = Some(object);
        self.current = Some(Frame {
            object: ObjectRef::Ig,
            pc: 0,
        });
    }

    /// True while a frame is scheduled for execution.
    pub fn is_running(&self) -> bool {
        self.current.is_some()
    }

    pub fn next_event(&mut self) -> Option<HdmvEvent> {
        self.events.pop_front()
    }

    /// Playlist playback ran out on its own; the object that started it
    /// continues past the play command.
    pub fn playlist_finished(&mut self) {
        let Some(frame) = self.playing.take() else {
            debug!("playlist finished with no waiting object");
            return;
        };
        self.current = Some(Frame {
            object: frame.object,
            pc: frame.pc + 1,
        });
    }

    /// The object whose user-operation masks currently apply: the executing
    /// movie object, otherwise the one waiting on a playlist or parked by a
    /// call.
    pub fn active_object(&self) -> Option<&MovieObject> {
        let frame = match self.current {
            Some(frame) if self.ig_object.is_none() => Some(frame),
            _ => self.playing.or(self.suspended),
        };
        match frame?.object {
            ObjectRef::Disc(i) => self.objects.as_ref()?.objects.get(i),
            ObjectRef::Ig => self.ig_object.as_ref(),
        }
    }

    fn commands(&self, object: ObjectRef) -> &[Command] {
        match object {
            ObjectRef::Disc(i) => self
                .objects
                .as_ref()
                .and_then(|m| m.objects.get(i))
                .map(|o| o.commands.as_slice())
                .unwrap_or(&[]),
            ObjectRef::Ig => self
                .ig_object
                .as_ref()
                .map(|o| o.commands.as_slice())
                .unwrap_or(&[]),
        }
    }

    /// Executes until the current object terminates, suspends or hands off
    /// to a playlist.
    pub fn run(&mut self, regs: &mut RegisterBank) -> Result<(), VmError> {
        if self.current.is_none() {
            warn!("run: no object selected");
            return Ok(());
        }

        for _ in 0..STEP_LIMIT {
            let Some(frame) = self.current else {
                debug!("object suspended");
                return Ok(());
            };

            if frame.pc >= self.commands(frame.object).len() {
                debug!(pc = frame.pc, "object terminated");
                self.current = None;
                if self.ig_object.take().is_some() {
                    self.events.push_back(HdmvEvent::IgEnd);
                } else {
                    self.events.push_back(HdmvEvent::End);
                }
                return Ok(());
            }

            let cmd = self.commands(frame.object)[frame.pc];
            let advance = self.step(regs, cmd);
            if let Some(frame) = &mut self.current {
                frame.pc += advance;
            }
        }

        error!("possibly infinite program, aborting");
        self.current = None;
        Err(VmError::NotTerminating { steps: STEP_LIMIT })
    }

    /// Executes one command and returns how far to advance the program
    /// counter (0 when the command repositioned control flow itself).
    fn step(&mut self, regs: &mut RegisterBank, cmd: Command) -> usize {
        let insn = cmd.insn;

        // SET_STREAM and SET_BUTTON_PAGE pack register references inside
        // their operand words; resolve those before plain register fetch.
        let is_setsystem = InsnGroup::from_u8(insn.group) == Some(InsnGroup::Set)
            && SetSubGroup::from_u8(insn.sub_group) == Some(SetSubGroup::SetSystem);
        let setstream = is_setsystem
            && matches!(
                SetSystemOption::from_u8(insn.set_option),
                Some(SetSystemOption::SetStream) | Some(SetSystemOption::SetSecStream)
            );
        let setbuttonpage = is_setsystem
            && SetSystemOption::from_u8(insn.set_option) == Some(SetSystemOption::SetButtonPage);

        let mut dst = 0;
        let mut src = 0;
        if insn.operand_count > 0 {
            dst = self.fetch_operand(regs, setstream, setbuttonpage, insn.imm_op1, cmd.dst);
        }
        if insn.operand_count > 1 {
            src = self.fetch_operand(regs, setstream, setbuttonpage, insn.imm_op2, cmd.src);
        }

        match InsnGroup::from_u8(insn.group) {
            Some(InsnGroup::Branch) => match BranchSubGroup::from_u8(insn.sub_group) {
                Some(BranchSubGroup::Goto) => {
                    if insn.operand_count > 1 {
                        warn!(word = insn.encode(), "too many operands in goto");
                    }
                    match GotoOption::from_u8(insn.branch_option) {
                        Some(GotoOption::Nop) => 1,
                        Some(GotoOption::Goto) => {
                            self.set_pc(dst as usize);
                            0
                        }
                        Some(GotoOption::Break) => {
                            self.set_pc(PC_EXIT);
                            0
                        }
                        None => {
                            warn!(option = insn.branch_option, "unknown goto option");
                            1
                        }
                    }
                }
                Some(BranchSubGroup::Jump) => {
                    if insn.operand_count > 1 {
                        warn!(word = insn.encode(), "too many operands in jump");
                    }
                    match JumpOption::from_u8(insn.branch_option) {
                        Some(JumpOption::JumpObject) => match self.jump_object(dst) {
                            Ok(()) => 0,
                            Err(e) => {
                                warn!(%e, "jump failed");
                                1
                            }
                        },
                        Some(JumpOption::CallObject) => match self.call_object(regs, dst) {
                            Ok(()) => 0,
                            Err(e) => {
                                warn!(%e, "call failed");
                                1
                            }
                        },
                        Some(JumpOption::JumpTitle) => {
                            if let Err(e) = self.jump_title(dst) {
                                warn!(%e, "title jump failed");
                            }
                            1
                        }
                        Some(JumpOption::CallTitle) => {
                            if let Err(e) = self.call_title(regs, dst) {
                                warn!(%e, "title call failed");
                            }
                            1
                        }
                        Some(JumpOption::Resume) => {
                            if self.resume_object(regs) {
                                0
                            } else {
                                1
                            }
                        }
                        None => {
                            warn!(option = insn.branch_option, "unknown jump option");
                            1
                        }
                    }
                }
                Some(BranchSubGroup::Play) => match PlayOption::from_u8(insn.branch_option) {
                    Some(PlayOption::PlayPlaylist) => {
                        self.play_at(HdmvEvent::PlayPlaylist(dst));
                        1
                    }
                    Some(PlayOption::PlayPlaylistItem) => {
                        self.play_at(HdmvEvent::PlayPlaylistItem {
                            playlist: dst,
                            item: src,
                        });
                        1
                    }
                    Some(PlayOption::PlayPlaylistMark) => {
                        self.play_at(HdmvEvent::PlayPlaylistMark {
                            playlist: dst,
                            mark: src,
                        });
                        1
                    }
                    Some(PlayOption::LinkItem) => {
                        self.link_at(HdmvEvent::LinkItem(dst));
                        1
                    }
                    Some(PlayOption::LinkMark) => {
                        self.link_at(HdmvEvent::LinkMark(dst));
                        1
                    }
                    Some(PlayOption::TerminatePlaylist) => {
                        if self.play_stop() {
                            0
                        } else {
                            1
                        }
                    }
                    None => {
                        warn!(option = insn.branch_option, "unknown play option");
                        1
                    }
                },
                None => {
                    warn!(sub_group = insn.sub_group, "unknown branch sub-group");
                    1
                }
            },

            Some(InsnGroup::Compare) => {
                if insn.operand_count < 2 {
                    warn!(word = insn.encode(), "missing operands in compare");
                }
                let condition = match CompareOption::from_u8(insn.compare_option) {
                    Some(CompareOption::Bc) => dst & !src != 0,
                    Some(CompareOption::Eq) => dst == src,
                    Some(CompareOption::Ne) => dst != src,
                    Some(CompareOption::Ge) => dst >= src,
                    Some(CompareOption::Gt) => dst > src,
                    Some(CompareOption::Le) => dst <= src,
                    Some(CompareOption::Lt) => dst < src,
                    None => {
                        warn!(option = insn.compare_option, "unknown compare option");
                        return 1;
                    }
                };
                // a false condition also skips the next command
                if condition {
                    1
                } else {
                    2
                }
            }

            Some(InsnGroup::Set) => match SetSubGroup::from_u8(insn.sub_group) {
                Some(SetSubGroup::Set) => {
                    if insn.operand_count < 2 {
                        warn!(word = insn.encode(), "missing operands in set");
                    }
                    let (dst0, src0) = (dst, src);
                    match SetOption::from_u8(insn.set_option) {
                        Some(SetOption::Move) => dst = src,
                        Some(SetOption::Swap) => (dst, src) = (src0, dst0),
                        Some(SetOption::Add) => dst = dst.wrapping_add(src),
                        Some(SetOption::Sub) => dst = dst.saturating_sub(src),
                        Some(SetOption::Mul) => dst = dst.wrapping_mul(src),
                        Some(SetOption::Div) => dst = if src > 0 { dst / src } else { u32::MAX },
                        Some(SetOption::Mod) => dst = if src > 0 { dst % src } else { u32::MAX },
                        Some(SetOption::Rnd) => {
                            warn!("random-value set not implemented");
                        }
                        Some(SetOption::And) => dst &= src,
                        Some(SetOption::Or) => dst |= src,
                        Some(SetOption::Xor) => dst ^= src,
                        Some(SetOption::BitSet) => dst |= 1u32.wrapping_shl(src),
                        Some(SetOption::BitClr) => dst &= !1u32.wrapping_shl(src),
                        Some(SetOption::Shl) => dst = dst.wrapping_shl(src),
                        Some(SetOption::Shr) => dst = dst.wrapping_shr(src),
                        None => {
                            warn!(option = insn.set_option, "unknown set option");
                        }
                    }

                    if insn.imm_op1 {
                        warn!("set result targets an immediate, dropping");
                        return 1;
                    }
                    if dst != dst0 {
                        self.store_reg(regs, cmd.dst, dst);
                    }
                    if src != src0 {
                        self.store_reg(regs, cmd.src, src);
                    }
                    1
                }
                Some(SetSubGroup::SetSystem) => {
                    match SetSystemOption::from_u8(insn.set_option) {
                        Some(SetSystemOption::SetStream) => self.set_stream(regs, dst, src),
                        Some(SetSystemOption::SetSecStream) => self.set_sec_stream(regs, dst, src),
                        Some(SetSystemOption::SetNvTimer) => {
                            warn!("navigation timer not implemented");
                        }
                        Some(SetSystemOption::SetButtonPage) => self.set_button_page(dst, src),
                        Some(SetSystemOption::EnableButton) => {
                            self.button_event(HdmvEvent::EnableButton(dst))
                        }
                        Some(SetSystemOption::DisableButton) => {
                            self.button_event(HdmvEvent::DisableButton(dst))
                        }
                        Some(SetSystemOption::PopupOff) => self.button_event(HdmvEvent::PopupOff),
                        Some(SetSystemOption::StillOn) => self.button_event(HdmvEvent::Still(true)),
                        Some(SetSystemOption::StillOff) => {
                            self.button_event(HdmvEvent::Still(false))
                        }
                        Some(SetSystemOption::SetOutputMode) => self.set_output_mode(regs, dst),
                        Some(SetSystemOption::SetStreamSs) => self.set_stream_ss(regs, dst, src),
                        Some(SetSystemOption::SetSystem0x10) => {
                            debug!(dst, "vendor setsystem extension");
                            self.write_psr(regs, 103, dst);
                        }
                        None => {
                            warn!(option = insn.set_option, "unknown setsystem option");
                        }
                    }
                    1
                }
                None => {
                    warn!(sub_group = insn.sub_group, "unknown set sub-group");
                    1
                }
            },

            None => {
                warn!(group = insn.group, "unknown operation group");
                1
            }
        }
    }

    fn set_pc(&mut self, pc: usize) {
        if let Some(frame) = &mut self.current {
            frame.pc = pc;
        }
    }

    /* ---- operand access ------------------------------------------------ */

    fn fetch_operand(
        &self,
        regs: &RegisterBank,
        setstream: bool,
        setbuttonpage: bool,
        immediate: bool,
        value: u32,
    ) -> u32 {
        if immediate {
            value
        } else if setstream {
            self.read_setstream_regs(regs, value)
        } else if setbuttonpage {
            self.read_setbuttonpage_reg(regs, value)
        } else {
            self.read_reg(regs, value)
        }
    }

    fn read_reg(&self, regs: &RegisterBank, reg: u32) -> u32 {
        if !psr::is_valid_operand(reg) {
            warn!(reg = format_args!("{reg:#010x}"), "invalid register operand");
            return 0;
        }
        if reg & psr::PSR_FLAG != 0 {
            regs.psr(reg & psr::PSR_INDEX_MASK).unwrap_or(0)
        } else {
            regs.gpr(reg).unwrap_or(0)
        }
    }

    /// SET_STREAM operands carry two packed GPR references plus enable
    /// flags; the referenced values replace the low 12 bits of each half.
    fn read_setstream_regs(&self, regs: &RegisterBank, value: u32) -> u32 {
        let flags = value & 0xf000_f000;
        let lo = regs.gpr(value & 0xfff).unwrap_or(0) & 0xfff;
        let hi = regs.gpr((value >> 16) & 0xfff).unwrap_or(0) & 0xfff;
        flags | lo | (hi << 16)
    }

    fn read_setbuttonpage_reg(&self, regs: &RegisterBank, value: u32) -> u32 {
        (value & 0xc000_0000) | (regs.gpr(value & 0xfff).unwrap_or(0) & 0x3fff_ffff)
    }

    fn store_reg(&self, regs: &mut RegisterBank, reg: u32, value: u32) {
        if !psr::is_valid_operand(reg) {
            warn!(reg = format_args!("{reg:#010x}"), "invalid store operand");
            return;
        }
        if reg & psr::PSR_FLAG != 0 {
            warn!(reg = format_args!("{reg:#010x}"), "psr store rejected");
            return;
        }
        if let Err(e) = regs.gpr_write(reg, value) {
            warn!(%e, "gpr store failed");
        }
    }

    fn write_psr(&self, regs: &mut RegisterBank, index: u32, value: u32) {
        if let Err(e) = regs.psr_write(index, value) {
            warn!(index, %e, "psr write failed");
        }
    }

    /* ---- control flow -------------------------------------------------- */

    fn validate_object(&self, object: u32) -> Result<usize, VmError> {
        let count = self.objects.as_ref().map(|m| m.objects.len()).unwrap_or(0);
        if (object as usize) < count {
            Ok(object as usize)
        } else {
            Err(VmError::InvalidTarget { object })
        }
    }

    fn jump_object(&mut self, object: u32) -> Result<(), VmError> {
        let index = self.validate_object(object)?;
        debug!(object, "jumping to movie object");
        self.events.push_back(HdmvEvent::PlayStop);
        self.playing = None;
        self.current = Some(Frame {
            object: ObjectRef::Disc(index),
            pc: 0,
        });
        Ok(())
    }

    fn call_object(&mut self, regs: &mut RegisterBank, object: u32) -> Result<(), VmError> {
        self.validate_object(object)?;
        debug!(object, "calling movie object");
        self.suspend_object(regs, true);
        self.jump_object(object)
    }

    fn jump_title(&mut self, title: u32) -> Result<(), VmError> {
        if !self.caps.is_valid_title(title) {
            return Err(VmError::InvalidTitle { title });
        }
        debug!(title, "jumping to title");
        self.suspended = None;
        self.playing = None;
        // the controller resolves the title and selects the next object
        self.current = None;
        self.events.push_back(HdmvEvent::Title(title));
        Ok(())
    }

    fn call_title(&mut self, regs: &mut RegisterBank, title: u32) -> Result<(), VmError> {
        if !self.caps.is_valid_title(title) {
            return Err(VmError::InvalidTitle { title });
        }
        debug!(title, "calling title");
        self.suspend_object(regs, true);
        self.events.push_back(HdmvEvent::Title(title));
        Ok(())
    }

    /// Parks the current frame in the suspend slot. From the
    /// interactive-graphics context the playlist-waiting frame is parked
    /// instead, since the menu frame is not resumable.
    fn suspend_object(&mut self, regs: &mut RegisterBank, psr_backup: bool) {
        if self.suspended.is_some() {
            debug!("an object is already suspended, replacing it");
        }
        if psr_backup {
            regs.save_state();
        }

        if self.ig_object.is_some() {
            match self.playing.take() {
                Some(frame) => self.suspended = Some(frame),
                None => {
                    error!("interactive object suspends with no playing object");
                    return;
                }
            }
        } else {
            if self.playing.is_some() {
                error!("movie object suspends while a playing object exists");
                return;
            }
            self.suspended = self.current;
        }
        self.current = None;
    }

    /// Returns true when control flow was repositioned.
    fn resume_object(&mut self, regs: &mut RegisterBank) -> bool {
        let Some(frame) = self.suspended.take() else {
            warn!("resume with no suspended object");
            return false;
        };
        self.current = None;
        self.playing = None;

        // an object suspended on a play-playlist command goes back to
        // waiting for the playlist rather than executing
        let suspended_on_play = self
            .commands(frame.object)
            .get(frame.pc)
            .map(|cmd| {
                let insn = cmd.insn;
                InsnGroup::from_u8(insn.group) == Some(InsnGroup::Branch)
                    && BranchSubGroup::from_u8(insn.sub_group) == Some(BranchSubGroup::Play)
                    && matches!(
                        PlayOption::from_u8(insn.branch_option),
                        Some(PlayOption::PlayPlaylist)
                            | Some(PlayOption::PlayPlaylistItem)
                            | Some(PlayOption::PlayPlaylistMark)
                    )
            })
            .unwrap_or(false);

        if suspended_on_play {
            debug!("resuming playlist playback");
            self.playing = Some(frame);
            regs.restore_state();
            return true;
        }

        self.current = Some(Frame {
            object: frame.object,
            pc: frame.pc + 1,
        });
        self.events.push_back(HdmvEvent::PlayStop);
        true
    }

    /// Hands playback to a playlist: the current frame moves to the
    /// playing slot and execution stops until the playlist terminates.
    fn play_at(&mut self, event: HdmvEvent) {
        if self.ig_object.is_some() {
            error!("playlist change not allowed in interactive composition");
            return;
        }
        debug!(?event, "starting playlist");
        self.events.push_back(event);

        if self.playing.is_some() {
            error!("an object is already playing a playlist");
            return;
        }
        self.playing = self.current;
        self.current = None;
    }

    fn link_at(&mut self, event: HdmvEvent) {
        if self.ig_object.is_none() {
            error!("link commands not allowed in movie objects");
            return;
        }
        debug!(?event, "link");
        self.events.push_back(event);
    }

    /// Terminates playlist playback from a menu and resumes the movie
    /// object that started it. Returns true when control was repositioned.
    fn play_stop(&mut self) -> bool {
        if self.ig_object.is_none() {
            error!("terminate-playlist not allowed in movie objects");
            return false;
        }
        debug!("terminating playlist");
        self.events.push_back(HdmvEvent::PlayStop);

        let Some(frame) = self.playing.take() else {
            error!("no object is playing a playlist");
            return false;
        };
        self.current = Some(Frame {
            object: frame.object,
            pc: frame.pc + 1,
        });
        self.ig_object = None;
        true
    }

    /* ---- setsystem ----------------------------------------------------- */

    fn set_stream(&mut self, regs: &mut RegisterBank, dst: u32, src: u32) {
        debug!(dst, src, "stream selection");

        if dst & 0x8000_0000 != 0 {
            self.write_psr(regs, psr::PSR_PRIMARY_AUDIO_ID, (dst >> 16) & 0xfff);
        }
        if src & 0x8000_0000 != 0 {
            self.write_psr(regs, psr::PSR_IG_STREAM_ID, (src >> 16) & 0xff);
        }
        if src & 0x8000 != 0 {
            self.write_psr(regs, psr::PSR_ANGLE_NUMBER, src & 0xff);
        }

        let mut psr2 = regs.psr(psr::PSR_PG_STREAM).unwrap_or(0);
        if dst & 0x8000 != 0 {
            psr2 = (dst & 0xfff) | (psr2 & 0xffff_f000);
        }
        // display flag moves from bit 14 to bit 31
        psr2 = ((dst & 0x4000) << 17) | (psr2 & 0x7fff_ffff);
        self.write_psr(regs, psr::PSR_PG_STREAM, psr2);
    }

    fn set_sec_stream(&mut self, regs: &mut RegisterBank, dst: u32, src: u32) {
        debug!(dst, src, "secondary stream selection");

        let disp_video = (dst >> 30) & 1;
        let disp_audio = (src >> 30) & 1;
        let textst_flags = (src >> 13) & 3;

        let mut psr14 = regs.psr(psr::PSR_SECONDARY_AUDIO_VIDEO).unwrap_or(0);
        if dst & 0x8000_0000 != 0 {
            psr14 = ((dst & 0xff) << 8) | (psr14 & 0xffff_00ff);
        }
        if dst & 0x0080_0000 != 0 {
            psr14 = (((dst >> 16) & 0xf) << 24) | (psr14 & 0xf0ff_ffff);
        }
        if src & 0x8000_0000 != 0 {
            psr14 = ((src >> 16) & 0xff) | (psr14 & 0xffff_ff00);
        }
        psr14 = (disp_video << 31) | (psr14 & 0x7fff_ffff);
        psr14 = (disp_audio << 30) | (psr14 & 0xbfff_ffff);
        self.write_psr(regs, psr::PSR_SECONDARY_AUDIO_VIDEO, psr14);

        let mut psr2 = regs.psr(psr::PSR_PG_STREAM).unwrap_or(0);
        if src & 0x8000 != 0 {
            psr2 = ((src & 0xfff) << 16) | (psr2 & 0xf000_ffff);
        }
        psr2 = (textst_flags << 30) | (psr2 & 0x3fff_ffff);
        self.write_psr(regs, psr::PSR_PG_STREAM, psr2);
    }

    fn set_stream_ss(&mut self, regs: &mut RegisterBank, dst: u32, src: u32) {
        if regs.psr(psr::PSR_3D_STATUS).unwrap_or(0) & 1 == 0 {
            debug!("stereoscopic stream selection ignored in 2D mode");
            return;
        }
        warn!(dst, src, "stereoscopic stream selection not implemented");
    }

    fn set_button_page(&mut self, dst: u32, src: u32) {
        if self.ig_object.is_none() {
            warn!("button-page selection outside interactive composition");
            return;
        }
        let param = (src & 0xc000_0000)
            | ((dst & 0x8000_0000) >> 2)
            | ((src & 0xff) << 16)
            | (dst & 0xffff);
        self.events.push_back(HdmvEvent::ButtonPage(param));
        // the graphics controller takes over
        self.set_pc(PC_EXIT);
    }

    fn button_event(&mut self, event: HdmvEvent) {
        if self.ig_object.is_none() {
            warn!(?event, "button control outside interactive composition");
            return;
        }
        self.events.push_back(event);
    }

    fn set_output_mode(&mut self, regs: &mut RegisterBank, dst: u32) {
        let profile = regs.psr(psr::PSR_PROFILE_VERSION).unwrap_or(0);
        if profile & psr::PROFILE_5_MASK != psr::PROFILE_5_MASK {
            debug!("output mode ignored, not a profile 5 player");
            return;
        }
        let mut psr22 = regs.psr(psr::PSR_3D_STATUS).unwrap_or(0);
        if dst & 1 != 0 {
            psr22 |= 1;
        } else {
            psr22 &= !1;
        }
        self.write_psr(regs, psr::PSR_3D_STATUS, psr22);
    }
}
