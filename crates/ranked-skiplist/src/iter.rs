use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::iter::FusedIterator;

use crate::{list::RankedSkiplist, node::{NodeArena, NodeHandle}};


/// An iterator over the values of a [`RankedSkiplist`], in increasing order.
///
/// The iterator borrows the skiplist, so the skiplist cannot be modified while iterating.
/// See [`Cursor`] for a traversal which permits deleting nodes along the way.
pub struct Iter<'a, T> {
    arena:     &'a NodeArena<T>,
    first:     Option<NodeHandle>,
    next:      Option<NodeHandle>,
    len:       usize,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    #[inline]
    #[must_use]
    pub(crate) const fn new(
        arena: &'a NodeArena<T>,
        first: Option<NodeHandle>,
        len:   usize,
    ) -> Self {
        Self {
            arena,
            first,
            next:      first,
            len,
            remaining: len,
        }
    }

    /// Move the iterator back to the start, so that the next value is the least value in
    /// the skiplist.
    #[inline]
    pub const fn reset(&mut self) {
        self.next = self.first;
        self.remaining = self.len;
    }

    /// The value that will be returned by the next call to `next()`, if any.
    #[must_use]
    pub fn peek(&self) -> Option<&'a T> {
        self.next.map(|next| &self.arena.node(next).value)
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.arena.node(self.next?);

        self.next = node.next_node();
        self.remaining = self.remaining.saturating_sub(1);

        Some(&node.value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            arena:     self.arena,
            first:     self.first,
            next:      self.next,
            len:       self.len,
            remaining: self.remaining,
        }
    }
}

impl<T> Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Iter")
            .field("next", &self.next)
            .field("remaining", &self.remaining)
            .finish_non_exhaustive()
    }
}

/// A position in the level-0 list of a [`RankedSkiplist`], which does not borrow the skiplist.
///
/// Each call to [`next`] returns the handle of the next node, and records that node's current
/// successor as the cursor's new position. Because the successor is captured when the handle is
/// returned, the node just returned may be deleted before advancing. On the other hand, a value
/// inserted directly after the returned node (before the next call) is not visited. If the node
/// which the cursor would visit next has itself been deleted, the cursor stops early and [`next`]
/// returns `None`.
///
/// ```
/// use ranked_skiplist::{DefaultComparator, RankedSkiplist};
///
/// let mut list = RankedSkiplist::new(DefaultComparator);
/// for value in 1..=6_u32 {
///     let _outcome = list.insert(value).unwrap();
/// }
///
/// let mut cursor = list.cursor();
/// while let Some(handle) = cursor.next(&list) {
///     if list.get(handle).is_some_and(|value| value % 2 == 0) {
///         let _removed = list.delete(handle).unwrap();
///     }
/// }
///
/// assert!(list.iter().copied().eq([1, 3, 5]));
/// ```
///
/// [`next`]: Cursor::next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cursor {
    next: Option<NodeHandle>,
}

impl Cursor {
    #[inline]
    #[must_use]
    pub(crate) const fn new(first: Option<NodeHandle>) -> Self {
        Self { next: first }
    }

    /// Return the handle of the next node, and move the cursor to that node's successor.
    ///
    /// `list` must be the skiplist which created this cursor.
    pub fn next<T, Cmp>(&mut self, list: &RankedSkiplist<T, Cmp>) -> Option<NodeHandle> {
        let handle = self.next?;

        if let Some(node) = list.arena().get(handle) {
            self.next = node.next_node();
            Some(handle)
        } else {
            self.next = None;
            None
        }
    }

    /// Move the cursor back to the least value in `list`.
    #[inline]
    pub fn reset<T, Cmp>(&mut self, list: &RankedSkiplist<T, Cmp>) {
        self.next = list.first();
    }

    /// Whether [`next`] will return `None`, without checking whether the next node still exists.
    ///
    /// [`next`]: Cursor::next
    #[inline]
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.next.is_none()
    }
}
