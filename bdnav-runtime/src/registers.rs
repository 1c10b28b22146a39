//! Player register bank
//!
//! Navigation state lives in two register files: 128 player status
//! registers (PSRs) and 4096 general-purpose registers (GPRs), all
//! unsigned 32-bit. PSR writes are observable: subscribers receive an
//! event after the value is committed, tagged `Write` when the value was
//! unchanged and `Change` when it differs. A subset of PSRs is read-only
//! to navigation code; writing one fails without dispatching anything.
//!
//! Callbacks must not write back into the bank; mutation is not reentrant.
//! The VM and controller queue events out of their callbacks and process
//! them afterwards.

use bdnav_spec::psr;
use tracing::{debug, warn};

use crate::error::RegisterError;

type Result<T> = std::result::Result<T, RegisterError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterEventKind {
    /// PSR backup taken (menu call). Carries no register index.
    Save,
    /// PSR written with an unchanged value.
    Write,
    /// PSR written with a new value.
    Change,
    /// PSR restored from backup.
    Restore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterEvent {
    pub kind: RegisterEventKind,
    pub index: u32,
    pub old: u32,
    pub new: u32,
}

/// Token returned by [`RegisterBank::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription(usize);

type Callback = Box<dyn FnMut(&RegisterEvent)>;

pub struct RegisterBank {
    psr: [u32; psr::PSR_COUNT],
    gpr: Vec<u32>,
    subscribers: Vec<Option<(Option<RegisterEventKind>, Callback)>>,
}

impl Default for RegisterBank {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterBank {
    pub fn new() -> Self {
        Self {
            psr: psr::default_psr(),
            gpr: vec![0; psr::GPR_COUNT],
            subscribers: Vec::new(),
        }
    }

    /// Registers `callback` for events of `kind`, or for all events when
    /// `kind` is `None`.
    pub fn subscribe(
        &mut self,
        kind: Option<RegisterEventKind>,
        callback: impl FnMut(&RegisterEvent) + 'static,
    ) -> Subscription {
        let slot = (kind, Box::new(callback) as Callback);
        for (i, entry) in self.subscribers.iter_mut().enumerate() {
            if entry.is_none() {
                *entry = Some(slot);
                return Subscription(i);
            }
        }
        self.subscribers.push(Some(slot));
        Subscription(self.subscribers.len() - 1)
    }

    pub fn unsubscribe(&mut self, token: Subscription) {
        if let Some(entry) = self.subscribers.get_mut(token.0) {
            *entry = None;
        }
    }

    pub fn psr(&self, index: u32) -> Result<u32> {
        self.psr
            .get(index as usize)
            .copied()
            .ok_or(RegisterError::InvalidIndex { index })
    }

    pub fn gpr(&self, index: u32) -> Result<u32> {
        self.gpr
            .get(index as usize)
            .copied()
            .ok_or(RegisterError::InvalidIndex { index })
    }

    pub fn gpr_write(&mut self, index: u32, value: u32) -> Result<()> {
        match self.gpr.get_mut(index as usize) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(RegisterError::InvalidIndex { index }),
        }
    }

    /// Writes a PSR on behalf of navigation code, enforcing the read-only
    /// set and notifying subscribers after the commit.
    pub fn psr_write(&mut self, index: u32, value: u32) -> Result<()> {
        if index as usize >= psr::PSR_COUNT {
            return Err(RegisterError::InvalidIndex { index });
        }
        if psr::is_read_only(index) {
            warn!(index, value, "rejected write to read-only psr");
            return Err(RegisterError::ReadOnly { index });
        }

        let old = self.psr[index as usize];
        let kind = if old == value {
            RegisterEventKind::Write
        } else {
            RegisterEventKind::Change
        };
        self.psr[index as usize] = value;
        debug!(index, old, new = value, ?kind, "psr write");
        self.dispatch(RegisterEvent {
            kind,
            index,
            old,
            new: value,
        });
        Ok(())
    }

    /// Backs up the position and menu PSRs before a menu borrows the
    /// machine. Dispatches a single Save event.
    pub fn save_state(&mut self) {
        for i in 4..=8 {
            self.psr[i + 32] = self.psr[i];
        }
        for i in 10..=12 {
            self.psr[i + 32] = self.psr[i];
        }
        debug!("psr state saved");
        self.dispatch(RegisterEvent {
            kind: RegisterEventKind::Save,
            index: 0,
            old: 0,
            new: 0,
        });
    }

    /// Restores the PSRs saved by [`save_state`](Self::save_state) and
    /// resets the backup slots to their defaults. Dispatches a Restore
    /// event per restored register (the navigation timer slot excluded).
    pub fn restore_state(&mut self) {
        let before = self.psr;
        let defaults = psr::default_psr();
        for i in 4..=8 {
            self.psr[i] = self.psr[i + 32];
            self.psr[i + 32] = defaults[i + 32];
        }
        for i in 10..=12 {
            self.psr[i] = self.psr[i + 32];
            self.psr[i + 32] = defaults[i + 32];
        }
        debug!("psr state restored");
        for i in (4..=8).chain(10..=12) {
            self.dispatch(RegisterEvent {
                kind: RegisterEventKind::Restore,
                index: i as u32,
                old: before[i],
                new: self.psr[i],
            });
        }
    }

    fn dispatch(&mut self, event: RegisterEvent) {
        for entry in self.subscribers.iter_mut().flatten() {
            let (filter, callback) = entry;
            if filter.is_none() || *filter == Some(event.kind) {
                callback(&event);
            }
        }
    }
}

impl std::fmt::Debug for RegisterBank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterBank")
            .field("psr", &self.psr)
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}
