//! Per-index cursor state.
//!
//! Every index in a file carries one cursor. Navigation repositions it and
//! structural mutations keep it coherent; it is never observed mid-mutation
//! because the owning handle serializes all operations.

use trellis_common::NO_POSITION;

/// Cursor boundary flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CursorFlags(u16);

impl CursorFlags {
    /// The cursor sits at the end of the index; no more keys forward.
    pub const EOF: u16 = 0x0001;
    /// The cursor sits at the beginning; no more keys backward.
    pub const BOF: u16 = 0x0002;

    /// No flags set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Returns true if the EOF flag is set.
    pub fn is_eof(&self) -> bool {
        self.0 & Self::EOF != 0
    }

    /// Sets or clears the EOF flag.
    pub fn set_eof(&mut self, eof: bool) {
        if eof {
            self.0 |= Self::EOF;
        } else {
            self.0 &= !Self::EOF;
        }
    }

    /// Returns true if the BOF flag is set.
    pub fn is_bof(&self) -> bool {
        self.0 & Self::BOF != 0
    }

    /// Sets or clears the BOF flag.
    pub fn set_bof(&mut self, bof: bool) {
        if bof {
            self.0 |= Self::BOF;
        } else {
            self.0 &= !Self::BOF;
        }
    }
}

/// Navigation state for one index.
#[derive(Debug, Clone)]
pub struct Cursor {
    /// Position of the current leaf.
    pub current_leaf: i64,
    /// Position of the next leaf in the chain.
    pub next_leaf: i64,
    /// Position of the previous leaf in the chain.
    pub prev_leaf: i64,
    /// Data position of the current leaf.
    pub data_pos: i64,
    /// Boundary flags.
    pub flags: CursorFlags,
}

impl Cursor {
    /// A cursor pointing nowhere.
    pub fn unset() -> Self {
        Self {
            current_leaf: NO_POSITION,
            next_leaf: NO_POSITION,
            prev_leaf: NO_POSITION,
            data_pos: NO_POSITION,
            flags: CursorFlags::empty(),
        }
    }

    /// Clears the cursor back to the unset state.
    pub fn reset(&mut self) {
        *self = Self::unset();
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::unset()
    }
}
