use crate::error::AllocError;
use super::{Node, NodeHandle};


#[derive(Debug, Clone)]
struct Slot<T> {
    /// Incremented whenever the slot's node is removed, so that handles to the removed node
    /// stop matching the slot. Once it reaches `u32::MAX`, the slot is retired.
    generation: u32,
    node:       Option<Node<T>>,
}

impl<T> Slot<T> {
    /// Advance the generation of a slot whose node was just removed, and return whether the slot
    /// may hold another node.
    ///
    /// Nodes are only ever placed in slots with a generation below `u32::MAX`, so no handle
    /// can match a retired slot's generation.
    const fn vacate(&mut self) -> bool {
        self.generation = self.generation.saturating_add(1);
        self.is_reusable()
    }

    const fn is_reusable(&self) -> bool {
        self.generation != u32::MAX
    }
}

/// Owns every node of a skiplist. Nodes refer to each other by [`NodeHandle`]s into the arena.
///
/// # Invariants
/// - `free` lists exactly the indices of the slots which have no node and are not retired.
/// - `free.capacity() >= slots.len()`, so that removing a node never allocates.
#[derive(Debug, Clone)]
pub(crate) struct NodeArena<T> {
    slots:           Vec<Slot<T>>,
    free:            Vec<u32>,
    len:             usize,
    /// Makes the next call to `try_alloc` fail.
    #[cfg(test)]
    fail_next_alloc: bool,
}

#[expect(unreachable_pub, reason = "control visibility at type definition")]
impl<T> NodeArena<T> {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots:           Vec::new(),
            free:            Vec::new(),
            len:             0,
            #[cfg(test)]
            fail_next_alloc: false,
        }
    }

    /// The number of nodes in the arena.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Move `node` into the arena. If memory for it cannot be reserved, `node` is given back
    /// and the arena is unchanged.
    pub fn try_alloc(&mut self, node: Node<T>) -> Result<NodeHandle, (Node<T>, AllocError)> {
        #[cfg(test)]
        {
            if std::mem::take(&mut self.fail_next_alloc) {
                return Err((node, AllocError::TooManyNodes));
            }
        }

        if let Some(index) = self.free.pop() {
            #[expect(clippy::unreachable, reason = "`free` only holds indices of slots")]
            let Some(slot) = self.slots.get_mut(NodeHandle::new(index, 0).slot()) else {
                unreachable!("`NodeArena::free` should only contain indices of slots");
            };

            slot.node = Some(node);
            self.len += 1;
            return Ok(NodeHandle::new(index, slot.generation));
        }

        let Ok(index) = u32::try_from(self.slots.len()) else {
            return Err((node, AllocError::TooManyNodes));
        };

        if let Err(err) = self.slots.try_reserve(1) {
            return Err((node, err.into()));
        }
        // `free` is empty, so this makes room for every slot (including the new one).
        if let Err(err) = self.free.try_reserve(self.slots.len() + 1) {
            return Err((node, err.into()));
        }

        self.slots.push(Slot {
            generation: 0,
            node:       Some(node),
        });
        self.len += 1;

        Ok(NodeHandle::new(index, 0))
    }

    /// Get the node referred to by `handle`, if it is still in the arena.
    #[must_use]
    pub fn get(&self, handle: NodeHandle) -> Option<&Node<T>> {
        let slot = self.slots.get(handle.slot())?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.node.as_ref()
    }

    #[must_use]
    pub fn get_mut(&mut self, handle: NodeHandle) -> Option<&mut Node<T>> {
        let slot = self.slots.get_mut(handle.slot())?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.node.as_mut()
    }

    /// Get a node which is known to be in the arena, such as one linked from another node.
    ///
    /// # Panics
    /// Panics if `handle` does not refer to a node in the arena.
    #[must_use]
    pub fn node(&self, handle: NodeHandle) -> &Node<T> {
        #[expect(clippy::expect_used, reason = "links between nodes always refer to live nodes")]
        self.get(handle).expect("`NodeArena::node()` - `handle` is invalid!")
    }

    /// # Panics
    /// Panics if `handle` does not refer to a node in the arena.
    #[must_use]
    pub fn node_mut(&mut self, handle: NodeHandle) -> &mut Node<T> {
        #[expect(clippy::expect_used, reason = "links between nodes always refer to live nodes")]
        self.get_mut(handle).expect("`NodeArena::node_mut()` - `handle` is invalid!")
    }

    /// Remove the node referred to by `handle` from the arena, invalidating `handle`.
    ///
    /// Returns `None`, and does nothing, if `handle` was already invalid.
    pub fn take(&mut self, handle: NodeHandle) -> Option<Node<T>> {
        let slot = self.slots.get_mut(handle.slot())?;
        if slot.generation != handle.generation() {
            return None;
        }

        let node = slot.node.take()?;
        if slot.vacate() {
            // Does not allocate, by the capacity invariant of `free`.
            self.free.push(handle.index());
        }
        self.len -= 1;

        Some(node)
    }

    /// Drop every node in the arena, invalidating every handle.
    ///
    /// Slots are kept (with their generations) so that old handles keep failing to match.
    pub fn clear(&mut self) {
        self.free.clear();

        for (index, slot) in (0_u32..).zip(&mut self.slots) {
            let reusable = if slot.node.take().is_some() {
                slot.vacate()
            } else {
                slot.is_reusable()
            };

            if reusable {
                self.free.push(index);
            }
        }

        self.len = 0;
    }

    #[cfg(test)]
    pub fn fail_next_alloc(&mut self) {
        self.fail_next_alloc = true;
    }
}

impl<T> Default for NodeArena<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}


#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use oorandom::Rand32;

    use super::*;


    fn leaf<T>(value: T) -> Node<T> {
        Node::try_new(value, 1).map_err(|(_, err)| err).unwrap()
    }

    #[test]
    fn alloc_get_take() {
        let mut arena = NodeArena::new();

        let a = arena.try_alloc(leaf('a')).unwrap();
        let b = arena.try_alloc(leaf('b')).unwrap();

        assert_eq!(arena.len(), 2);
        assert_eq!(arena.node(a).value, 'a');
        assert_eq!(arena.get(b).map(|node| node.value), Some('b'));

        arena.node_mut(b).value = 'B';
        assert_eq!(arena.node(b).value, 'B');

        assert_eq!(arena.take(a).map(|node| node.value), Some('a'));
        assert_eq!(arena.len(), 1);
        assert!(arena.get(a).is_none());
        assert!(arena.get_mut(a).is_none());
        assert!(arena.take(a).is_none());
    }

    #[test]
    fn stale_handles_do_not_match_reused_slots() {
        let mut arena = NodeArena::new();

        let old = arena.try_alloc(leaf(1)).unwrap();
        let _taken = arena.take(old);

        let new = arena.try_alloc(leaf(2)).unwrap();
        assert_eq!(new.slot(), old.slot());
        assert_ne!(new, old);

        assert!(arena.get(old).is_none());
        assert!(arena.take(old).is_none());
        assert_eq!(arena.node(new).value, 2);
    }

    #[test]
    fn clear_drops_and_invalidates() {
        struct Counted(Rc<Cell<usize>>);

        impl Drop for Counted {
            fn drop(&mut self) {
                self.0.set(self.0.get() + 1);
            }
        }

        let drops = Rc::new(Cell::new(0));
        let mut arena = NodeArena::new();

        let handles: Vec<_> = (0..10)
            .map(|_| arena.try_alloc(leaf(Counted(Rc::clone(&drops)))).ok().unwrap())
            .collect();
        drop(arena.take(handles[3]));
        assert_eq!(drops.get(), 1);

        arena.clear();
        assert_eq!(drops.get(), 10);
        assert_eq!(arena.len(), 0);

        for handle in handles {
            assert!(arena.get(handle).is_none());
        }

        let fresh = arena.try_alloc(leaf(Counted(Rc::clone(&drops)))).ok().unwrap();
        assert!(arena.get(fresh).is_some());
        drop(arena);
        assert_eq!(drops.get(), 11);
    }

    #[test]
    fn exhausted_slots_are_retired() {
        let mut arena = NodeArena::new();

        let first = arena.try_alloc(leaf('a')).unwrap();
        let _taken = arena.take(first);
        // Fast-forward the (free) slot to its last usable generation.
        arena.slots[0].generation = u32::MAX - 1;

        let last = arena.try_alloc(leaf('b')).unwrap();
        assert_eq!(last.slot(), 0);
        assert_eq!(last.generation(), u32::MAX - 1);
        assert_eq!(arena.take(last).map(|node| node.value), Some('b'));

        // The slot is never handed out again, so no later handle can collide with `last`.
        let other = arena.try_alloc(leaf('c')).unwrap();
        assert_eq!(other.slot(), 1);
        assert!(arena.get(last).is_none());
        assert!(arena.get(NodeHandle::new(0, u32::MAX)).is_none());

        arena.clear();
        let after_clear = arena.try_alloc(leaf('d')).unwrap();
        assert_eq!(after_clear.slot(), 1);
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn injected_failure_returns_node() {
        let mut arena = NodeArena::new();
        let kept = arena.try_alloc(leaf(1)).unwrap();

        arena.fail_next_alloc();
        let (node, err) = arena.try_alloc(leaf(2)).unwrap_err();
        assert_eq!(node.value, 2);
        assert_eq!(err, AllocError::TooManyNodes);
        assert_eq!(arena.len(), 1);

        // Only one allocation fails.
        let added = arena.try_alloc(node).unwrap();
        assert_eq!(arena.node(kept).value, 1);
        assert_eq!(arena.node(added).value, 2);
    }

    #[test]
    fn matches_a_model() {
        let mut prng = Rand32::new(17);
        let mut arena = NodeArena::new();
        let mut live: Vec<(NodeHandle, u32)> = Vec::new();
        let mut dead: Vec<NodeHandle> = Vec::new();

        for _ in 0..5_000 {
            if live.is_empty() || prng.rand_range(0..3) != 0 {
                let value = prng.rand_u32();
                let handle = arena.try_alloc(leaf(value)).unwrap();
                live.push((handle, value));
            } else {
                let which = prng.rand_range(0..u32::try_from(live.len()).unwrap()) as usize;
                let (handle, value) = live.swap_remove(which);
                assert_eq!(arena.take(handle).map(|node| node.value), Some(value));
                dead.push(handle);
            }

            assert_eq!(arena.len(), live.len());
        }

        for (handle, value) in live {
            assert_eq!(arena.node(handle).value, value);
        }
        for handle in dead {
            assert!(arena.get(handle).is_none());
        }
    }
}
