use std::borrow::Borrow;
use std::fmt::{Debug, Formatter, Result as FmtResult};

use oorandom::Rand32;
use tracing::Level as LogLevel;

use crate::{config::SkiplistConfig, interface::Comparator};
use crate::{
    error::{AllocError, CreateError, InvalidHandle},
    iter::{Cursor, Iter},
    node_heights::{HeightGenerator, MAX_HEIGHT_LIMIT},
};
use crate::node::{Level, Node, NodeArena, NodeHandle, try_alloc_levels};


// ================================
//  Search results
// ================================

/// A place on some level of the skiplist: either the head, or a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Head,
    Node(NodeHandle),
}

/// The last position visited on each level by a search, along with the rank of that position
/// (where the head has rank `0`).
///
/// Entries at or above the skiplist's current height refer to the head, with rank `0`.
#[derive(Debug, Clone, Copy)]
struct Predecessors {
    positions: [Position; MAX_HEIGHT_LIMIT],
    ranks:     [usize; MAX_HEIGHT_LIMIT],
}

impl Predecessors {
    #[inline]
    #[must_use]
    const fn new() -> Self {
        Self {
            positions: [Position::Head; MAX_HEIGHT_LIMIT],
            ranks:     [0; MAX_HEIGHT_LIMIT],
        }
    }

    /// # Panics
    /// Panics if `level >= MAX_HEIGHT_LIMIT`.
    #[inline]
    #[must_use]
    const fn at(&self, level: usize) -> (Position, usize) {
        #![expect(clippy::indexing_slicing, reason = "levels are below `MAX_HEIGHT_LIMIT`")]
        (self.positions[level], self.ranks[level])
    }

    /// # Panics
    /// Panics if `level >= MAX_HEIGHT_LIMIT`.
    #[inline]
    const fn set(&mut self, level: usize, position: Position, rank: usize) {
        #![expect(clippy::indexing_slicing, reason = "levels are below `MAX_HEIGHT_LIMIT`")]
        self.positions[level] = position;
        self.ranks[level] = rank;
    }
}

/// A value found in a [`RankedSkiplist`], and its 1-based rank: its position in sorted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Found {
    pub handle: NodeHandle,
    pub rank:   usize,
}

/// The result of inserting a value into a [`RankedSkiplist`].
///
/// The value type `V` is whatever was passed to the insertion: the stored type for
/// [`RankedSkiplist::insert`], or a borrowed form of it for [`RankedSkiplist::insert_copy`].
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InsertOutcome<V> {
    /// The value was added to the skiplist at the given 1-based `rank`.
    Inserted {
        handle: NodeHandle,
        rank:   usize,
    },
    /// The skiplist already holds a value comparing equal to the inserted value, which is at the
    /// given 1-based `rank`. Nothing was changed, and the rejected `value` is given back.
    Rejected {
        existing: NodeHandle,
        rank:     usize,
        value:    V,
    },
}

impl<V> InsertOutcome<V> {
    #[inline]
    #[must_use]
    pub const fn is_inserted(&self) -> bool {
        matches!(self, Self::Inserted { .. })
    }

    /// The rank of the inserted value, or of the existing value which caused a rejection.
    #[inline]
    #[must_use]
    pub const fn rank(&self) -> usize {
        match self {
            Self::Inserted { rank, .. } | Self::Rejected { rank, .. } => *rank,
        }
    }

    /// The node of the inserted value, or of the existing value which caused a rejection.
    #[inline]
    #[must_use]
    pub const fn handle(&self) -> NodeHandle {
        match self {
            Self::Inserted { handle, .. } => *handle,
            Self::Rejected { existing, .. } => *existing,
        }
    }
}

// ================================
//  List
// ================================

/// A single-threaded [skiplist] holding a set of unique values, ordered by a [`Comparator`].
///
/// Besides the usual logarithmic (expected) insertions, lookups, and deletions, every insertion
/// and lookup reports the 1-based rank of its value. Each link of the skiplist records how many
/// values it skips over, so ranks are summed up during the same search that finds the value.
///
/// # Ownership of values
/// The skiplist owns every value it stores, and drops a value when it is deleted (unless it is
/// returned to the caller), when the skiplist is cleared, or when the skiplist is dropped.
/// - [`insert`] stores the provided value as-is.
/// - [`insert_copy`] stores an owned copy of a borrowed value, made only if no equal value is
///   already present.
/// - To store values without ever freeing them, store references: a
///   `RankedSkiplist<&'a str, _>` never drops the strings it refers to.
///
/// [skiplist]: https://en.wikipedia.org/wiki/Skip_list
/// [`insert`]: RankedSkiplist::insert
/// [`insert_copy`]: RankedSkiplist::insert_copy
#[derive(Clone)]
pub struct RankedSkiplist<T, Cmp> {
    cmp:            Cmp,
    arena:          NodeArena<T>,
    /// The levels of the head sentinel. Has length `heights.max_height()`.
    ///
    /// Levels at or above `current_height` have no forward link, and their spans are
    /// overwritten before they are next used.
    head:           Vec<Level>,
    /// In `1..=heights.max_height()`.
    current_height: usize,
    tail:           Option<NodeHandle>,
    heights:        HeightGenerator,
    prng:           Rand32,
}

// Creation and accessors
impl<T, Cmp> RankedSkiplist<T, Cmp> {
    /// Create an empty skiplist with the default [`SkiplistConfig`].
    #[must_use]
    pub fn new(cmp: Cmp) -> Self {
        Self::with_valid_config(cmp, &SkiplistConfig::new())
    }

    /// Create an empty skiplist with the default [`SkiplistConfig`], aside from the provided
    /// PRNG seed.
    #[must_use]
    pub fn new_seeded(cmp: Cmp, seed: u64) -> Self {
        Self::with_valid_config(cmp, &SkiplistConfig { seed, ..SkiplistConfig::new() })
    }

    /// Create an empty skiplist with the given settings.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] if `config` is invalid, or an [`AllocError`] if the head of the
    /// skiplist could not be allocated.
    ///
    /// [`ConfigError`]: crate::ConfigError
    pub fn with_config(cmp: Cmp, config: SkiplistConfig) -> Result<Self, CreateError> {
        if let Err(err) = config.validate() {
            tracing::event!(LogLevel::DEBUG, "rejected skiplist configuration: {err}");
            return Err(err.into());
        }

        let head = try_alloc_levels(config.max_height).inspect_err(|err| {
            tracing::event!(LogLevel::DEBUG, "could not allocate skiplist head: {err}");
        })?;

        Ok(Self::from_parts(cmp, &config, head))
    }

    /// `config` must already be valid.
    fn with_valid_config(cmp: Cmp, config: &SkiplistConfig) -> Self {
        let head = vec![Level::EMPTY; config.max_height];
        Self::from_parts(cmp, config, head)
    }

    fn from_parts(cmp: Cmp, config: &SkiplistConfig, head: Vec<Level>) -> Self {
        Self {
            cmp,
            arena: NodeArena::new(),
            head,
            current_height: 1,
            tail: None,
            heights: HeightGenerator::new(config.max_height, config.promotion_probability),
            prng: Rand32::new(config.seed),
        }
    }

    /// The number of values in the skiplist.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.arena.len()
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The number of levels currently in use, which is at least `1`.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.current_height
    }

    #[inline]
    #[must_use]
    pub const fn max_height(&self) -> usize {
        self.heights.max_height()
    }

    #[inline]
    #[must_use]
    pub const fn comparator(&self) -> &Cmp {
        &self.cmp
    }

    /// The node of the least value, if the skiplist is nonempty.
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<NodeHandle> {
        self.head.first()?.forward
    }

    /// The node of the greatest value, if the skiplist is nonempty.
    ///
    /// This operation is fast.
    #[inline]
    #[must_use]
    pub const fn tail(&self) -> Option<NodeHandle> {
        self.tail
    }

    #[must_use]
    pub fn first_value(&self) -> Option<&T> {
        let first = self.first()?;
        self.get(first)
    }

    #[must_use]
    pub fn last_value(&self) -> Option<&T> {
        self.get(self.tail?)
    }

    /// Get the value of a node, if `handle` refers to a node currently in the skiplist.
    #[must_use]
    pub fn get(&self, handle: NodeHandle) -> Option<&T> {
        self.arena.get(handle).map(|node| &node.value)
    }

    /// Iterate over the values of the skiplist, in increasing order.
    #[inline]
    #[must_use]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(&self.arena, self.first(), self.len())
    }

    /// Get a cursor over the nodes of the skiplist, in increasing order, which does not borrow
    /// the skiplist.
    #[inline]
    #[must_use]
    pub fn cursor(&self) -> Cursor {
        Cursor::new(self.first())
    }

    /// Drop every value in the skiplist, leaving it empty (with the same settings).
    ///
    /// Every previously returned [`NodeHandle`] becomes invalid.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.head.fill(Level::EMPTY);
        self.current_height = 1;
        self.tail = None;
    }

    #[inline]
    #[must_use]
    pub(crate) const fn arena(&self) -> &NodeArena<T> {
        &self.arena
    }
}

// Short utility functions
impl<T, Cmp> RankedSkiplist<T, Cmp> {
    /// # Panics
    /// Panics if `position` is a node whose height is at most `level`, or if `level` is at least
    /// the maximum height.
    fn level(&self, position: Position, level: usize) -> Level {
        #![expect(clippy::indexing_slicing, reason = "the head has every level")]
        match position {
            Position::Head       => self.head[level],
            Position::Node(node) => self.arena.node(node).level(level),
        }
    }

    /// # Panics
    /// Panics if `position` is a node whose height is at most `level`, or if `level` is at least
    /// the maximum height.
    fn level_mut(&mut self, position: Position, level: usize) -> &mut Level {
        #![expect(clippy::indexing_slicing, reason = "callers stay below the relevant height")]
        match position {
            Position::Head       => &mut self.head[level],
            Position::Node(node) => &mut self.arena.node_mut(node).levels[level],
        }
    }

    /// Return the node at `position` if its value compares equal to `value`.
    fn equal_node<Q>(&self, position: Position, value: &Q) -> Option<NodeHandle>
    where
        Q:   ?Sized,
        T:   Borrow<Q>,
        Cmp: Comparator<Q>,
    {
        let Position::Node(handle) = position else {
            return None;
        };

        let node_value: &Q = self.arena.node(handle).value.borrow();
        self.cmp.cmp(node_value, value).is_eq().then_some(handle)
    }
}

// Searching through the skiplist.
impl<T, Cmp> RankedSkiplist<T, Cmp> {
    /// Walk down from the top level in use, recording on each level the last position reached
    /// and its rank.
    ///
    /// If `INCLUSIVE`, the walk passes over values less than or equal to `value`, so that the
    /// level-0 position is `value`'s own node if it is present. Otherwise, only values strictly
    /// less than `value` are passed over.
    fn find_predecessors<Q, const INCLUSIVE: bool>(&self, value: &Q) -> Predecessors
    where
        Q:   ?Sized,
        T:   Borrow<Q>,
        Cmp: Comparator<Q>,
    {
        let mut predecessors = Predecessors::new();
        let mut position = Position::Head;
        let mut rank = 0;

        for level in (0..self.current_height).rev() {
            loop {
                let link = self.level(position, level);
                let Some(next) = link.forward else {
                    break;
                };

                let next_value: &Q = self.arena.node(next).value.borrow();
                let ordering = self.cmp.cmp(next_value, value);

                if ordering.is_lt() || (INCLUSIVE && ordering.is_eq()) {
                    // We should search further ahead since `next` was too small.
                    // (So, don't go down a level.)
                    rank += link.span;
                    position = Position::Node(next);
                } else {
                    // This level might look too far ahead. Drop down to a lower level.
                    break;
                }
            }

            predecessors.set(level, position, rank);
        }

        predecessors
    }

    /// Find the node whose value compares equal to `value`, and its 1-based rank.
    ///
    /// `value` may be any borrowed form of the stored type, provided that the comparator orders
    /// it consistently with the stored type.
    #[must_use]
    pub fn find<Q>(&self, value: &Q) -> Option<Found>
    where
        Q:   ?Sized,
        T:   Borrow<Q>,
        Cmp: Comparator<Q>,
    {
        let predecessors = self.find_predecessors::<_, true>(value);
        let (position, rank) = predecessors.at(0);

        self.equal_node(position, value).map(|handle| Found { handle, rank })
    }

    /// Check whether the value, or something which compares as equal to the value, is in
    /// the skiplist.
    #[must_use]
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        Q:   ?Sized,
        T:   Borrow<Q>,
        Cmp: Comparator<Q>,
    {
        self.find(value).is_some()
    }

    /// The 1-based rank of the value comparing equal to `value`, if there is one.
    #[must_use]
    pub fn rank_of<Q>(&self, value: &Q) -> Option<usize>
    where
        Q:   ?Sized,
        T:   Borrow<Q>,
        Cmp: Comparator<Q>,
    {
        self.find(value).map(|found| found.rank)
    }
}

// Insertions and deletions.
impl<T, Cmp: Comparator<T>> RankedSkiplist<T, Cmp> {
    /// Insert `value` into the skiplist, unless a value comparing equal to it is already present.
    ///
    /// On success, returns the handle and 1-based rank of the new node. If an equal value is
    /// present, the skiplist is left untouched, and `value` is returned in
    /// [`InsertOutcome::Rejected`].
    ///
    /// # Errors
    /// Returns an [`AllocError`] if the new node could not be allocated, in which case the
    /// skiplist is not changed and `value` is dropped.
    pub fn insert(&mut self, value: T) -> Result<InsertOutcome<T>, AllocError> {
        let predecessors = self.find_predecessors::<_, true>(&value);
        let (position, rank) = predecessors.at(0);

        if let Some(existing) = self.equal_node(position, &value) {
            return Ok(InsertOutcome::Rejected { existing, rank, value });
        }

        let handle = self.link_new_node(predecessors, value)?;
        Ok(InsertOutcome::Inserted { handle, rank: rank + 1 })
    }

    /// Insert an owned copy of `value` into the skiplist, unless a value comparing equal to it is
    /// already present.
    ///
    /// The copy is only made if it will be inserted. Otherwise, this acts like [`insert`].
    ///
    /// # Errors
    /// Returns an [`AllocError`] if the new node could not be allocated, in which case the
    /// skiplist is not changed.
    ///
    /// [`insert`]: RankedSkiplist::insert
    pub fn insert_copy<'q, Q>(
        &mut self,
        value: &'q Q,
    ) -> Result<InsertOutcome<&'q Q>, AllocError>
    where
        Q:   ?Sized + ToOwned<Owned = T>,
        T:   Borrow<Q>,
        Cmp: Comparator<Q>,
    {
        let predecessors = self.find_predecessors::<_, true>(value);
        let (position, rank) = predecessors.at(0);

        if let Some(existing) = self.equal_node(position, value) {
            return Ok(InsertOutcome::Rejected { existing, rank, value });
        }

        let handle = self.link_new_node(predecessors, value.to_owned())?;
        Ok(InsertOutcome::Inserted { handle, rank: rank + 1 })
    }

    /// Allocate a node for `value` and splice it in after the positions in `predecessors`,
    /// which must come from an inclusive search for `value` that did not find an equal value.
    ///
    /// No change is made to the list structure unless allocation succeeds.
    fn link_new_node(
        &mut self,
        mut predecessors: Predecessors,
        value:            T,
    ) -> Result<NodeHandle, AllocError> {
        let old_len = self.len();
        let node_height = self.heights.next_height(&mut self.prng);

        // If allocation fails, the worst that happens here is that we've mutated the PRNG.
        let allocated = Node::try_new(value, node_height)
            .and_then(|node| self.arena.try_alloc(node).map_err(|(node, err)| (node.value, err)));
        let handle = match allocated {
            Ok(handle) => handle,
            Err((_value, err)) => {
                tracing::event!(LogLevel::DEBUG, "could not allocate skiplist node: {err}");
                return Err(err);
            }
        };

        if node_height > self.current_height {
            for level in self.current_height..node_height {
                // The new levels start out as a single link from the head past every node.
                predecessors.set(level, Position::Head, 0);
                self.level_mut(Position::Head, level).span = old_len;
            }

            tracing::event!(
                LogLevel::TRACE,
                "skiplist height raised from {} to {node_height}",
                self.current_height,
            );
            self.current_height = node_height;
        }

        let (_, rank_before_node) = predecessors.at(0);

        for level in 0..node_height {
            let (prev_position, prev_rank) = predecessors.at(level);
            let prev_link = self.level(prev_position, level);
            // The number of level-0 steps from `prev_position` to the node preceding the new one.
            let distance = rank_before_node - prev_rank;

            *self.level_mut(Position::Node(handle), level) = Level {
                forward: prev_link.forward,
                span:    prev_link.span - distance,
            };
            *self.level_mut(prev_position, level) = Level {
                forward: Some(handle),
                span:    distance + 1,
            };
        }

        // Links above the new node now pass over one more node.
        for level in node_height..self.current_height {
            let (prev_position, _) = predecessors.at(level);
            self.level_mut(prev_position, level).span += 1;
        }

        if self.arena.node(handle).next_node().is_none() {
            self.tail = Some(handle);
        }

        Ok(handle)
    }

    /// Remove the node referred to by `handle` from the skiplist, and return its value.
    ///
    /// Dropping the returned value releases it. `handle`, and any copies of it, become invalid.
    ///
    /// # Errors
    /// Returns [`InvalidHandle`], without changing the skiplist, if `handle` does not refer to a
    /// node currently in the skiplist (for instance, if its node was already deleted).
    pub fn delete(&mut self, handle: NodeHandle) -> Result<T, InvalidHandle> {
        let predecessors = if let Some(node) = self.arena.get(handle) {
            self.find_predecessors::<_, false>(&node.value)
        } else {
            tracing::event!(LogLevel::DEBUG, "attempted to delete invalid node {handle:?}");
            return Err(InvalidHandle);
        };

        debug_assert_eq!(
            self.level(predecessors.at(0).0, 0).forward,
            Some(handle),
            "the comparator should be a consistent total order",
        );

        let node = self.arena.take(handle).ok_or(InvalidHandle)?;

        for level in 0..self.current_height {
            let (prev_position, _) = predecessors.at(level);
            let removed_link = node.levels.get(level).copied();
            let prev_link = self.level_mut(prev_position, level);

            match removed_link {
                Some(removed_link) if prev_link.forward == Some(handle) => {
                    prev_link.span = prev_link.span + removed_link.span - 1;
                    prev_link.forward = removed_link.forward;
                }
                // The node wasn't on this level, but the link passed over it.
                _ => prev_link.span -= 1,
            }
        }

        let old_height = self.current_height;
        while self.current_height > 1 {
            if self.level(Position::Head, self.current_height - 1).forward.is_some() {
                break;
            }
            self.current_height -= 1;
        }

        if self.current_height != old_height {
            tracing::event!(
                LogLevel::TRACE,
                "skiplist height lowered from {old_height} to {}",
                self.current_height,
            );
        }

        if node.next_node().is_none() {
            self.tail = match predecessors.at(0).0 {
                Position::Head         => None,
                Position::Node(before) => Some(before),
            };
        }

        Ok(node.value)
    }

    /// Remove the value comparing equal to `value` from the skiplist, if there is one,
    /// and return it.
    pub fn remove<Q>(&mut self, value: &Q) -> Option<T>
    where
        Q:   ?Sized,
        T:   Borrow<Q>,
        Cmp: Comparator<Q>,
    {
        let found = self.find(value)?;
        self.delete(found.handle).ok()
    }
}

impl<T: Debug, Cmp: Debug> Debug for RankedSkiplist<T, Cmp> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        /// Formats the values of the skiplist in order.
        struct Values<'a, T>(Iter<'a, T>);

        impl<T: Debug> Debug for Values<'_, T> {
            fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
                f.debug_list().entries(self.0.clone()).finish()
            }
        }

        f.debug_struct("RankedSkiplist")
            .field("cmp", &self.cmp)
            .field("len", &self.len())
            .field("height", &self.current_height)
            .field("max_height", &self.max_height())
            .field("values", &Values(self.iter()))
            .finish_non_exhaustive()
    }
}

impl<T, Cmp: Default> Default for RankedSkiplist<T, Cmp> {
    #[inline]
    fn default() -> Self {
        Self::new(Cmp::default())
    }
}

impl<'a, T, Cmp> IntoIterator for &'a RankedSkiplist<T, Cmp> {
    type Item     = &'a T;
    type IntoIter = Iter<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}


#[cfg(test)]
impl<T, Cmp: Comparator<T>> RankedSkiplist<T, Cmp> {
    /// Check the structural invariants of the skiplist, panicking if any are violated.
    pub(crate) fn assert_invariants(&self) {
        use std::collections::HashMap;

        let max_height = self.max_height();
        assert_eq!(self.head.len(), max_height);
        assert!((1..=max_height).contains(&self.current_height));

        // Level 0: order, length, and tail.
        let mut ranks = HashMap::new();
        let mut previous: Option<NodeHandle> = None;
        let mut next = self.level(Position::Head, 0).forward;

        while let Some(handle) = next {
            let node = self.arena.node(handle);
            assert!((1..=max_height).contains(&node.height()));
            assert!(node.height() <= self.current_height);

            if let Some(previous) = previous {
                let previous = &self.arena.node(previous).value;
                assert!(self.cmp.cmp(previous, &node.value).is_lt(), "values must increase");
            }

            assert!(ranks.insert(handle, ranks.len() + 1).is_none(), "level 0 has a cycle");
            previous = Some(handle);
            next = node.next_node();
        }

        assert_eq!(ranks.len(), self.len());
        assert_eq!(self.tail, previous);

        // Every level: spans add up to ranks, and nodes on higher levels appear on lower levels.
        for level in 0..self.current_height {
            let mut position = Position::Head;
            let mut rank = 0;

            loop {
                let link = self.level(position, level);
                let Some(next) = link.forward else {
                    assert_eq!(link.span, self.len() - rank, "span past the end of level {level}");
                    break;
                };

                rank += link.span;
                assert_eq!(ranks.get(&next), Some(&rank), "span mismatch on level {level}");
                position = Position::Node(next);
            }

            if level + 1 == self.current_height && level > 0 {
                assert!(self.head[level].forward.is_some(), "top level should be nonempty");
            }
        }

        for level in self.current_height..max_height {
            assert!(self.head[level].forward.is_none());
        }
    }
}
