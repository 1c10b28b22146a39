//! Event types
//!
//! Two surfaces: [`HdmvEvent`] is what the virtual machine hands to the
//! navigation controller, [`PlayerEvent`] is what the controller hands to
//! the application.

use serde::{Deserialize, Serialize};

/// Events queued by the HDMV virtual machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HdmvEvent {
    /// The active movie object ran off the end of its command list.
    End,
    /// The active interactive-graphics object ran off the end.
    IgEnd,
    /// Jump or call to a disc title; the controller resolves it.
    Title(u32),
    PlayPlaylist(u32),
    PlayPlaylistItem { playlist: u32, item: u32 },
    PlayPlaylistMark { playlist: u32, mark: u32 },
    /// Link to a play item within the current playlist (menus only).
    LinkItem(u32),
    /// Link to a play mark within the current playlist (menus only).
    LinkMark(u32),
    PlayStop,
    Still(bool),
    EnableButton(u32),
    DisableButton(u32),
    /// Packed button/page selector for the graphics controller.
    ButtonPage(u32),
    PopupOff,
}

/// The failing domain carried by [`PlayerEvent::Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorDomain {
    Hdmv,
}

/// Events delivered to player subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerEvent {
    Error(ErrorDomain),

    /* playback position */
    Angle(u32),
    Title(u32),
    Playlist(u32),
    PlayItem(u32),
    Chapter(u32),
    EndOfTitle,

    /* stream selection */
    IgStream(u32),
    AudioStream(u32),
    PgTextSt(bool),
    PgTextStStream(u32),
    SecondaryVideo(bool),
    SecondaryVideoSize(u32),
    SecondaryVideoStream(u32),
    SecondaryAudio(bool),
    SecondaryAudioStream(u32),
    StereoscopicStatus(bool),

    /* menu playback */
    PlaylistStop,
    Still(bool),
    EnableButton(u32),
    DisableButton(u32),
    ButtonPage(u32),
    PopupOff,
}
