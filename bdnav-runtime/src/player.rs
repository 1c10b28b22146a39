//! Navigation controller
//!
//! [`Player`] ties the pieces together: it decodes the disc index, drives
//! the HDMV virtual machine, mirrors register traffic into application
//! events and resolves title numbers and playlist references. It does not
//! decode or present audio/video; the application owns playback and reports
//! back with [`Player::playlist_ended`] when a playlist runs out.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;

use bdnav_spec::index::{DiscIndex, PlaybackObject, NO_OBJECT_REF};
use bdnav_spec::mobj::MovieObjects;
use bdnav_spec::mpls::Playlist;
use bdnav_spec::psr;
use bdnav_spec::UoMask;
use tracing::{debug, error, warn};

use crate::error::{NavigationError, Result};
use crate::events::{ErrorDomain, HdmvEvent, PlayerEvent};
use crate::provider::{Resource, ResourceProvider};
use crate::registers::{RegisterBank, RegisterEvent, RegisterEventKind};
use crate::vm::{HdmvVm, TitleCaps};

/// Title number addressing the top menu.
pub const TITLE_TOP_MENU: u32 = 0;

/// Title number addressing the first-play entry point.
pub const TITLE_FIRST_PLAY: u32 = 0xffff;

/// Ceiling on navigation rounds started by one user action. A disc whose
/// objects keep handing control to each other without ever reaching
/// playback is broken.
const NAVIGATION_ROUND_LIMIT: u32 = 100;

/// One selectable entry in [`DiscInfo::titles`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscTitle {
    /// Title number as used by `play_title` and navigation commands.
    pub number: u32,
    pub object: PlaybackObject,
    pub prohibited: bool,
    pub hidden: bool,
}

/// What the disc index offers, resolved at open time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscInfo {
    pub first_play_supported: bool,
    pub top_menu_supported: bool,
    /// Neither entry point references a movie object; such a disc cannot
    /// be navigated at all.
    pub no_menu_support: bool,
    /// Number of regular titles, entry points excluded.
    pub num_titles: u32,
    /// Top menu first, then the regular titles, then first play.
    pub titles: Vec<DiscTitle>,
}

impl DiscInfo {
    fn from_index(index: &DiscIndex) -> Self {
        let entry_supported = |object: &PlaybackObject| object.hdmv_id_ref().is_some();
        let first_play_supported = entry_supported(&index.first_play);
        let top_menu_supported = entry_supported(&index.top_menu);

        let mut titles = Vec::with_capacity(index.titles.len() + 2);
        titles.push(DiscTitle {
            number: TITLE_TOP_MENU,
            object: index.top_menu.clone(),
            prohibited: false,
            hidden: false,
        });
        for (i, entry) in index.titles.iter().enumerate() {
            titles.push(DiscTitle {
                number: i as u32 + 1,
                object: entry.object.clone(),
                prohibited: entry.prohibited,
                hidden: entry.hidden,
            });
        }
        titles.push(DiscTitle {
            number: TITLE_FIRST_PLAY,
            object: index.first_play.clone(),
            prohibited: false,
            hidden: false,
        });

        Self {
            first_play_supported,
            top_menu_supported,
            no_menu_support: !first_play_supported && !top_menu_supported,
            num_titles: index.titles.len() as u32,
            titles,
        }
    }

    fn title(&self, number: u32) -> Option<&DiscTitle> {
        self.titles.iter().find(|t| t.number == number)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TitleType {
    Undef,
    Hdmv,
}

type PlayerCallback = Box<dyn FnMut(&PlayerEvent)>;

pub struct Player {
    provider: Box<dyn ResourceProvider>,
    disc_info: DiscInfo,
    regs: RegisterBank,
    vm: HdmvVm,
    movie_objects: Option<Arc<MovieObjects>>,
    current_playlist: Option<Playlist>,
    title_type: TitleType,
    started: bool,
    register_events: Rc<RefCell<VecDeque<RegisterEvent>>>,
    subscribers: Vec<Option<PlayerCallback>>,
}

impl Player {
    /// Opens a disc: decodes its index and prepares the machine. Playback
    /// starts with [`play`](Self::play).
    pub fn open(provider: impl ResourceProvider + 'static) -> Result<Self> {
        let data = provider.fetch(&Resource::Index)?;
        let index = DiscIndex::decode(&data)?;
        let disc_info = DiscInfo::from_index(&index);
        debug!(
            num_titles = disc_info.num_titles,
            first_play = disc_info.first_play_supported,
            top_menu = disc_info.top_menu_supported,
            "disc opened"
        );

        let vm = HdmvVm::new(TitleCaps {
            num_titles: disc_info.num_titles,
            first_play: disc_info.first_play_supported,
            top_menu: disc_info.top_menu_supported,
        });

        Ok(Self {
            provider: Box::new(provider),
            disc_info,
            regs: RegisterBank::new(),
            vm,
            movie_objects: None,
            current_playlist: None,
            title_type: TitleType::Undef,
            started: false,
            register_events: Rc::new(RefCell::new(VecDeque::new())),
            subscribers: Vec::new(),
        })
    }

    pub fn disc_info(&self) -> &DiscInfo {
        &self.disc_info
    }

    /// Current value of a player status register.
    pub fn psr(&self, index: u32) -> Option<u32> {
        self.regs.psr(index).ok()
    }

    /// Registers `callback` for player events. Callbacks must not call
    /// back into the player.
    pub fn subscribe(&mut self, callback: impl FnMut(&PlayerEvent) + 'static) -> usize {
        let slot = Box::new(callback) as PlayerCallback;
        for (i, entry) in self.subscribers.iter_mut().enumerate() {
            if entry.is_none() {
                *entry = Some(slot);
                return i;
            }
        }
        self.subscribers.push(Some(slot));
        self.subscribers.len() - 1
    }

    pub fn unsubscribe(&mut self, token: usize) {
        if let Some(entry) = self.subscribers.get_mut(token) {
            *entry = None;
        }
    }

    /// Starts disc playback from the first-play entry point.
    pub fn play(&mut self) -> Result<()> {
        if !self.started {
            self.started = true;
            let queue = self.register_events.clone();
            self.regs.subscribe(None, move |event| {
                queue.borrow_mut().push_back(*event);
            });
            self.replay_initial_state();
        }
        self.select_title(TITLE_FIRST_PLAY)?;
        self.run_navigation()
    }

    /// Jumps to a title: 0 for the top menu, [`TITLE_FIRST_PLAY`] for the
    /// first-play object, otherwise a number from the title table.
    pub fn play_title(&mut self, title: u32) -> Result<()> {
        self.select_title(title)?;
        self.run_navigation()
    }

    fn select_title(&mut self, title: u32) -> Result<()> {
        if self.disc_info.no_menu_support {
            return Err(NavigationError::NoMenuSupport.into());
        }
        if !self.started {
            warn!(title, "title selected before playback started");
            return Err(NavigationError::TitleNotFound { title }.into());
        }
        let Some(entry) = self.disc_info.title(title) else {
            return Err(NavigationError::TitleNotFound { title }.into());
        };
        let object = entry.object.clone();
        debug!(title, "title selected");
        self.psr_write(psr::PSR_TITLE_NUMBER, title);

        match object {
            PlaybackObject::ManagedApp { name, .. } => {
                warn!(title, app = %name, "managed-application titles not supported");
                Err(NavigationError::ManagedAppUnsupported.into())
            }
            PlaybackObject::Hdmv { id_ref, .. } => {
                if id_ref == NO_OBJECT_REF {
                    return Err(NavigationError::TitleNotFound { title }.into());
                }
                self.play_hdmv(id_ref as u32);
                Ok(())
            }
        }
    }

    /// The application finished presenting the current playlist; control
    /// returns to the movie object that started it.
    pub fn playlist_ended(&mut self) -> Result<()> {
        debug!("playlist ended");
        self.current_playlist = None;
        self.vm.playlist_finished();
        self.run_navigation()
    }

    /// User operations the disc currently forbids.
    pub fn uo_mask(&self) -> UoMask {
        let mut raw = 0u64;
        if let Some(object) = self.vm.active_object() {
            if object.menu_call_mask {
                raw |= 1 << 63;
            }
            if object.title_search_mask {
                raw |= 1 << 62;
            }
        }
        if let Some(playlist) = &self.current_playlist {
            raw |= playlist.app_info.uo_mask.raw();
        }
        UoMask::from_raw(raw)
    }

    fn play_hdmv(&mut self, object: u32) {
        self.title_type = TitleType::Hdmv;

        if self.movie_objects.is_none() {
            let loaded = self
                .provider
                .fetch(&Resource::MovieObjects)
                .map_err(crate::error::PlayerError::from)
                .and_then(|data| Ok(MovieObjects::decode(&data)?));
            match loaded {
                Ok(mobj) => {
                    let mobj = Arc::new(mobj);
                    self.vm.set_movie_objects(mobj.clone());
                    self.movie_objects = Some(mobj);
                }
                Err(e) => {
                    error!(%e, "loading movie objects failed");
                    self.title_type = TitleType::Undef;
                    self.emit(PlayerEvent::Error(ErrorDomain::Hdmv));
                    return;
                }
            }
        }

        if let Err(e) = self.vm.select_object(object) {
            error!(%e, object, "movie object selection failed");
            self.title_type = TitleType::Undef;
            self.emit(PlayerEvent::Error(ErrorDomain::Hdmv));
        }
    }

    /// Runs the machine until it stops on its own, resolving any title
    /// jumps it requests along the way.
    fn run_navigation(&mut self) -> Result<()> {
        let mut rounds = 0u32;
        while self.title_type == TitleType::Hdmv && self.vm.is_running() {
            rounds += 1;
            if rounds > NAVIGATION_ROUND_LIMIT {
                error!(rounds, "navigation makes no progress, giving up");
                self.title_type = TitleType::Undef;
                self.emit(PlayerEvent::Error(ErrorDomain::Hdmv));
                break;
            }

            if let Err(e) = self.vm.run(&mut self.regs) {
                error!(%e, "navigation program failed");
                self.title_type = TitleType::Undef;
                self.emit(PlayerEvent::Error(ErrorDomain::Hdmv));
            }
            self.drain_register_events();
            while let Some(event) = self.vm.next_event() {
                self.handle_hdmv_event(event);
            }
        }
        self.drain_register_events();
        Ok(())
    }

    fn handle_hdmv_event(&mut self, event: HdmvEvent) {
        match event {
            HdmvEvent::End => self.emit(PlayerEvent::EndOfTitle),
            HdmvEvent::IgEnd => debug!("interactive object finished"),
            HdmvEvent::Title(title) => {
                // stays inside the caller's navigation loop so that discs
                // bouncing between titles hit the round ceiling
                if let Err(e) = self.select_title(title) {
                    error!(%e, title, "title jump failed");
                    self.emit(PlayerEvent::Error(ErrorDomain::Hdmv));
                }
            }
            HdmvEvent::PlayPlaylist(playlist) => self.start_playlist(playlist, 0, None),
            HdmvEvent::PlayPlaylistItem { playlist, item } => {
                self.start_playlist(playlist, item, None)
            }
            HdmvEvent::PlayPlaylistMark { playlist, mark } => {
                self.start_playlist(playlist, 0, Some(mark))
            }
            HdmvEvent::LinkItem(item) => {
                self.psr_write(psr::PSR_PLAYITEM, item);
            }
            HdmvEvent::LinkMark(mark) => self.link_mark(mark),
            HdmvEvent::PlayStop => {
                self.current_playlist = None;
                self.emit(PlayerEvent::PlaylistStop);
            }
            HdmvEvent::Still(on) => self.emit(PlayerEvent::Still(on)),
            HdmvEvent::EnableButton(id) => self.emit(PlayerEvent::EnableButton(id)),
            HdmvEvent::DisableButton(id) => self.emit(PlayerEvent::DisableButton(id)),
            HdmvEvent::ButtonPage(param) => self.emit(PlayerEvent::ButtonPage(param)),
            HdmvEvent::PopupOff => self.emit(PlayerEvent::PopupOff),
        }
        self.drain_register_events();
    }

    /// Loads a playlist and points the position registers at it. The
    /// register traffic tells the application what to present.
    fn start_playlist(&mut self, playlist: u32, item: u32, mark: Option<u32>) {
        let resource = Resource::Playlist(format!("{playlist:05}"));
        let loaded = self
            .provider
            .fetch(&resource)
            .map_err(crate::error::PlayerError::from)
            .and_then(|data| Ok(Playlist::decode(&data)?));
        let decoded = match loaded {
            Ok(decoded) => decoded,
            Err(e) => {
                error!(%e, playlist, "loading playlist failed");
                self.emit(PlayerEvent::Error(ErrorDomain::Hdmv));
                return;
            }
        };

        let mut item = item;
        if let Some(mark) = mark {
            match decoded.marks.get(mark as usize) {
                Some(play_mark) => item = play_mark.play_item_ref as u32,
                None => warn!(playlist, mark, "playlist has no such mark"),
            }
        }
        if decoded.play_items.get(item as usize).is_none() {
            warn!(playlist, item, "playlist has no such play item");
        }

        self.psr_write(psr::PSR_PLAYLIST, playlist);
        self.psr_write(psr::PSR_PLAYITEM, item);
        if let Some(mark) = mark {
            self.psr_write(psr::PSR_CHAPTER, mark + 1);
        }
        self.current_playlist = Some(decoded);
    }

    fn link_mark(&mut self, mark: u32) {
        let Some(playlist) = &self.current_playlist else {
            warn!(mark, "mark link without an active playlist");
            return;
        };
        let Some(play_mark) = playlist.marks.get(mark as usize) else {
            warn!(mark, "active playlist has no such mark");
            return;
        };
        let item = play_mark.play_item_ref as u32;
        self.psr_write(psr::PSR_PLAYITEM, item);
        self.psr_write(psr::PSR_CHAPTER, mark + 1);
    }

    fn psr_write(&mut self, index: u32, value: u32) {
        if let Err(e) = self.regs.psr_write(index, value) {
            warn!(index, %e, "psr write failed");
        }
        self.drain_register_events();
    }

    /// Replays the stream-selection and position registers to a fresh
    /// subscriber set, as if each had just been written.
    fn replay_initial_state(&mut self) {
        const REPLAYED: [u32; 6] = [
            psr::PSR_ANGLE_NUMBER,
            psr::PSR_TITLE_NUMBER,
            psr::PSR_IG_STREAM_ID,
            psr::PSR_PRIMARY_AUDIO_ID,
            psr::PSR_PG_STREAM,
            psr::PSR_SECONDARY_AUDIO_VIDEO,
        ];
        for index in REPLAYED {
            let new = self.regs.psr(index).unwrap_or(0);
            let events = translate_register_event(&RegisterEvent {
                kind: RegisterEventKind::Change,
                index,
                old: 0,
                new,
            });
            for event in events {
                self.emit(event);
            }
        }
    }

    fn drain_register_events(&mut self) {
        loop {
            let Some(event) = self.register_events.borrow_mut().pop_front() else {
                break;
            };
            for player_event in translate_register_event(&event) {
                self.emit(player_event);
            }
        }
    }

    fn emit(&mut self, event: PlayerEvent) {
        debug!(?event, "player event");
        for entry in self.subscribers.iter_mut().flatten() {
            entry(&event);
        }
    }
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("disc_info", &self.disc_info)
            .field("title_type", &self.title_type)
            .field("started", &self.started)
            .finish_non_exhaustive()
    }
}

/// Maps one register event to the player events it implies.
fn translate_register_event(event: &RegisterEvent) -> Vec<PlayerEvent> {
    let mut out = Vec::new();
    let new = event.new;
    let changed = event.old ^ event.new;

    match event.kind {
        RegisterEventKind::Save => {
            debug!("register state saved");
        }
        RegisterEventKind::Restore => {
            if event.index == psr::PSR_TITLE_NUMBER {
                out.push(PlayerEvent::Title(new));
            }
        }
        RegisterEventKind::Write | RegisterEventKind::Change => {
            match event.index {
                psr::PSR_ANGLE_NUMBER => out.push(PlayerEvent::Angle(new)),
                psr::PSR_TITLE_NUMBER => out.push(PlayerEvent::Title(new)),
                psr::PSR_PLAYLIST => out.push(PlayerEvent::Playlist(new)),
                psr::PSR_PLAYITEM => out.push(PlayerEvent::PlayItem(new)),
                _ => {}
            }
            if event.kind == RegisterEventKind::Change {
                match event.index {
                    psr::PSR_CHAPTER if new != 0xffff => out.push(PlayerEvent::Chapter(new)),
                    psr::PSR_IG_STREAM_ID => out.push(PlayerEvent::IgStream(new)),
                    psr::PSR_PRIMARY_AUDIO_ID => out.push(PlayerEvent::AudioStream(new)),
                    psr::PSR_PG_STREAM => {
                        if changed & 0x8000_0fff != 0 {
                            out.push(PlayerEvent::PgTextSt(new & 0x8000_0000 != 0));
                            out.push(PlayerEvent::PgTextStStream(new & 0xfff));
                        }
                    }
                    psr::PSR_SECONDARY_AUDIO_VIDEO => {
                        if changed & 0x8f00_ff00 != 0 {
                            out.push(PlayerEvent::SecondaryVideo(new & 0x8000_0000 != 0));
                            out.push(PlayerEvent::SecondaryVideoSize((new >> 24) & 0xf));
                            out.push(PlayerEvent::SecondaryVideoStream((new & 0xff00) >> 8));
                        }
                        if changed & 0x4000_00ff != 0 {
                            out.push(PlayerEvent::SecondaryAudio(new & 0x4000_0000 != 0));
                            out.push(PlayerEvent::SecondaryAudioStream(new & 0xff));
                        }
                    }
                    psr::PSR_3D_STATUS => {
                        out.push(PlayerEvent::StereoscopicStatus(new & 1 != 0))
                    }
                    _ => {}
                }
            }
        }
    }
    out
}
