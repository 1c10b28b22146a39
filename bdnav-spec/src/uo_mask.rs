//! User-operation mask
//!
//! Playlists, play items and the navigation controller all expose a 64-bit
//! mask of user operations the disc forbids while the item is active. Bit 0
//! is the most significant bit of the stored big-endian word.

use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UoMask(u64);

impl UoMask {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }

    /// Bit `n` of the mask, counted from the most significant end.
    pub fn bit(&self, n: u32) -> bool {
        debug_assert!(n < 64);
        (self.0 >> (63 - n)) & 1 != 0
    }

    pub fn menu_call(&self) -> bool {
        self.bit(0)
    }

    pub fn title_search(&self) -> bool {
        self.bit(1)
    }

    pub fn chapter_search(&self) -> bool {
        self.bit(2)
    }

    pub fn time_search(&self) -> bool {
        self.bit(3)
    }
}
