//! BDMV navigation runtime
//!
//! Everything that happens after the disc files are decoded: the player
//! register bank, the HDMV virtual machine executing movie-object command
//! lists, and the navigation controller that turns both into a usable
//! player surface.
//!
//! The controller never touches audio or video. The application subscribes
//! to [`PlayerEvent`]s, presents whatever playlist the registers point at,
//! and reports completion back through [`Player::playlist_ended`].

pub mod error;
pub mod events;
pub mod player;
pub mod provider;
pub mod registers;
pub mod vm;

pub use error::{NavigationError, PlayerError, ProviderError, RegisterError, Result, VmError};
pub use events::{ErrorDomain, HdmvEvent, PlayerEvent};
pub use player::{DiscInfo, DiscTitle, Player, TITLE_FIRST_PLAY, TITLE_TOP_MENU};
pub use provider::{MemoryProvider, Resource, ResourceProvider};
pub use registers::{RegisterBank, RegisterEvent, RegisterEventKind, Subscription};
pub use vm::{HdmvVm, TitleCaps};
