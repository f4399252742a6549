mod arena;


use crate::error::AllocError;

pub(crate) use self::arena::NodeArena;


/// Names a node of a [`RankedSkiplist`], as returned by insertions, lookups, and cursors.
///
/// A handle stays valid until its node is deleted or the skiplist is cleared. Afterwards,
/// operations given the handle report it as invalid; a stale handle never refers to a different
/// node, even if the node's memory is reused. (A slot whose generation counter runs out is never
/// reused.) Handles are not tied to a particular skiplist, though, so a handle must only be given
/// to the skiplist that produced it.
///
/// [`RankedSkiplist`]: crate::RankedSkiplist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle {
    index:      u32,
    generation: u32,
}

impl NodeHandle {
    #[inline]
    #[must_use]
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    #[inline]
    #[must_use]
    pub(crate) const fn index(self) -> u32 {
        self.index
    }

    #[inline]
    #[must_use]
    pub(crate) const fn generation(self) -> u32 {
        self.generation
    }

    #[inline]
    #[must_use]
    pub(crate) fn slot(self) -> usize {
        // A `u32` always fits into a `usize` on the platforms this crate targets.
        usize::try_from(self.index).unwrap_or(usize::MAX)
    }
}

/// One lane of a node: a link to the next node on this level, and how many level-0 positions
/// that link moves forwards.
///
/// If `forward` is `None`, then `span` is instead the number of nodes after the owner of this
/// level. Insertions and deletions keep both meanings up to date with the same arithmetic.
#[expect(
    clippy::field_scoped_visibility_modifiers,
    reason = "P.O.D. struct, only visible within the crate",
)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Level {
    pub(crate) forward: Option<NodeHandle>,
    pub(crate) span:    usize,
}

impl Level {
    pub(crate) const EMPTY: Self = Self { forward: None, span: 0 };
}

/// Allocate `height` empty levels, without aborting on allocation failure.
pub(crate) fn try_alloc_levels(height: usize) -> Result<Vec<Level>, AllocError> {
    let mut levels = Vec::new();
    levels.try_reserve_exact(height)?;
    levels.resize(height, Level::EMPTY);
    Ok(levels)
}

/// An element of a skiplist. Its height, the length of `levels`, never changes after
/// the node is created.
#[expect(
    clippy::field_scoped_visibility_modifiers,
    reason = "the list splices `levels` directly, and moves `value` out on deletion",
)]
#[derive(Debug, Clone)]
pub(crate) struct Node<T> {
    pub(crate) value:  T,
    pub(crate) levels: Vec<Level>,
}

#[expect(unreachable_pub, reason = "control Node's visibility from one site, its definition")]
impl<T> Node<T> {
    /// Allocate the levels of a new node with the given height, all of whose links are `None`.
    pub fn try_new(value: T, height: usize) -> Result<Self, (T, AllocError)> {
        match try_alloc_levels(height) {
            Ok(levels) => Ok(Self { value, levels }),
            Err(err)   => Err((value, err)),
        }
    }

    #[cfg(test)]
    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        self.levels.len()
    }

    /// # Panics
    /// Panics if `level >= self.height()`.
    #[inline]
    #[must_use]
    pub fn level(&self, level: usize) -> Level {
        #[expect(clippy::indexing_slicing, reason = "callers stay below the node's height")]
        self.levels[level]
    }

    #[inline]
    #[must_use]
    pub fn next_node(&self) -> Option<NodeHandle> {
        self.levels.first()?.forward
    }
}
