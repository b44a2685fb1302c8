//! Script-level immutability (`:lockvar`) for containers.
//!
//! Two kinds of flags exist:
//!
//! - a *slot* lock on each variable binding, List item and Dictionary entry,
//!   which forbids replacing the value held in that slot;
//! - a *container* lock ([`LockState`]) on each List, Dictionary and Blob,
//!   which forbids adding, removing or reordering its items.
//!
//! `:lockvar {depth} name` always locks the binding slot. Depth 1 adds the
//! item slots of the container it holds, depth 2 adds the container itself,
//! and each further level repeats this one container further down.
//! Removing an item only consults the container lock, so an item whose own
//! slot is locked can still be removed from an unlocked List.

use std::rc::Rc;

/// How far a lock reaches into nested containers.
///
/// Counted from the binding: 0 locks only the binding, 1 adds the item
/// slots, 2 (the `:lockvar` default) adds the container and the item slots
/// of the containers it holds, and so on.
/// [`LockDepth::UNLIMITED`] (`:lockvar!`) covers the whole structure.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct LockDepth(i32);

impl LockDepth {
    pub const BINDING_ONLY: Self = Self(0);
    pub const ITEMS: Self = Self(1);
    pub const DEFAULT: Self = Self(2);
    pub const UNLIMITED: Self = Self(-1);

    /// Negative depths mean "everything".
    pub const fn new(depth: i32) -> Self {
        if depth < 0 {
            Self::UNLIMITED
        } else {
            Self(depth)
        }
    }

    pub const fn raw(self) -> i32 {
        self.0
    }

    pub const fn is_unlimited(self) -> bool {
        self.0 < 0
    }

    /// Whether the item slots of the container at this level are covered.
    pub const fn covers_items(self) -> bool {
        self.is_unlimited() || self.0 >= 1
    }

    /// Whether the container itself is covered, so it cannot grow or shrink.
    pub const fn covers_container(self) -> bool {
        self.is_unlimited() || self.0 >= 2
    }

    /// Depth remaining for an item's own value, one level down.
    #[must_use]
    pub const fn descend(self) -> Self {
        if self.is_unlimited() {
            self
        } else if self.0 > 0 {
            Self(self.0 - 1)
        } else {
            Self(0)
        }
    }
}

impl Default for LockDepth {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Lock state of one container.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LockState {
    locked: bool,
    /// Name of the variable through which the lock was applied.
    owner: Option<Rc<str>>,
    /// Depth the lock was applied with, measured from this container.
    depth: Option<LockDepth>,
}

impl LockState {
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn depth(&self) -> Option<LockDepth> {
        self.depth
    }

    pub fn lock(&mut self, owner: Option<Rc<str>>, depth: LockDepth) {
        self.locked = true;
        self.owner = owner;
        self.depth = Some(depth);
    }

    pub fn unlock(&mut self) {
        self.locked = false;
        self.owner = None;
        self.depth = None;
    }
}
