// allocator/src/arena.rs

use alloc::vec;
use alloc::vec::Vec;
use crate::block::{Block, BlockId};
use crate::{AllocError, AllocResult};

enum Slot {
    Occupied { generation: u32, block: Block },
    Vacant { generation: u32, next_free: Option<usize> },
}

/// Slot storage for buddy tree nodes
/// Implementation Techniques: intrusive free list over vacant slots, generation-checked handles
pub struct BlockArena {
    slots: Vec<Slot>,
    free_head: Option<usize>, // most recently vacated slot
    live: usize,
    limit: usize, // upper bound on live nodes
}

impl BlockArena {
    // ----- constructor -----
    /// Create an arena holding only `root`.
    /// `limit` bounds the number of live nodes, the root included.
    pub fn with_root(limit: usize, root: Block) -> (Self, BlockId) {
        let arena = Self {
            slots: vec![Slot::Occupied { generation: 0, block: root }],
            free_head: None,
            live: 1,
            limit: limit.max(1),
        };
        (arena, BlockId { index: 0, generation: 0 })
    }

    // ----- methods -----
    /// Make sure `additional` nodes can be inserted without failing.
    pub fn reserve(&mut self, additional: usize) -> AllocResult {
        if self.live + additional > self.limit {
            return Err(AllocError::NodeExhausted);
        }
        let mut vacant = 0;
        let mut cursor = self.free_head;
        while let Some(index) = cursor {
            if vacant >= additional {
                break;
            }
            vacant += 1;
            cursor = match self.slots[index] {
                Slot::Vacant { next_free, .. } => next_free,
                Slot::Occupied { .. } => None,
            };
        }
        self.slots
            .try_reserve(additional - vacant)
            .map_err(|_| AllocError::NodeExhausted)
    }

    pub fn insert(&mut self, block: Block) -> AllocResult<BlockId> {
        if self.live >= self.limit {
            return Err(AllocError::NodeExhausted);
        }
        if let Some(index) = self.free_head {
            let slot = &mut self.slots[index];
            let generation = match *slot {
                Slot::Vacant { generation, next_free } => {
                    self.free_head = next_free;
                    generation
                }
                Slot::Occupied { .. } => unreachable!("free list points at a live slot"),
            };
            *slot = Slot::Occupied { generation, block };
            self.live += 1;
            return Ok(BlockId { index, generation });
        }
        self.slots
            .try_reserve(1)
            .map_err(|_| AllocError::NodeExhausted)?;
        let index = self.slots.len();
        self.slots.push(Slot::Occupied { generation: 0, block });
        self.live += 1;
        Ok(BlockId { index, generation: 0 })
    }

    /// Remove the node behind `id`; every copy of `id` turns stale.
    pub fn remove(&mut self, id: BlockId) -> Option<Block> {
        let slot = self.slots.get_mut(id.index)?;
        match slot {
            Slot::Occupied { generation, .. } if *generation == id.generation => {}
            _ => return None,
        }
        let vacant = Slot::Vacant {
            generation: id.generation.wrapping_add(1),
            next_free: self.free_head,
        };
        let Slot::Occupied { block, .. } = core::mem::replace(slot, vacant) else {
            return None;
        };
        self.free_head = Some(id.index);
        self.live -= 1;
        Some(block)
    }

    pub fn get(&self, id: BlockId) -> Option<&Block> {
        match self.slots.get(id.index)? {
            Slot::Occupied { generation, block } if *generation == id.generation => Some(block),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        match self.slots.get_mut(id.index)? {
            Slot::Occupied { generation, block } if *generation == id.generation => Some(block),
            _ => None,
        }
    }

    // ----- utils -----
    pub fn len(&self) -> usize {
        self.live
    }
    pub fn limit(&self) -> usize {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena(limit: usize) -> (BlockArena, BlockId) {
        BlockArena::with_root(limit, Block::leaf(0, 64, None))
    }

    #[test]
    fn removed_handle_turns_stale() {
        let (mut arena, root) = arena(8);
        let child = arena.insert(Block::leaf(0, 32, Some(root))).unwrap();
        assert!(arena.remove(child).is_some());
        assert!(arena.get(child).is_none());

        // the slot is reused under a new generation
        let reused = arena.insert(Block::leaf(32, 32, Some(root))).unwrap();
        assert_eq!(reused.index, child.index);
        assert_ne!(reused.generation, child.generation);
        assert!(arena.get(child).is_none());
        assert_eq!(arena.get(reused).unwrap().offset, 32);
        assert!(arena.remove(child).is_none());
    }

    #[test]
    fn limit_is_enforced() {
        let (mut arena, root) = arena(3);
        assert_eq!(arena.reserve(2), Ok(()));
        arena.insert(Block::leaf(0, 32, Some(root))).unwrap();
        arena.insert(Block::leaf(32, 32, Some(root))).unwrap();
        assert_eq!(arena.len(), 3);
        assert_eq!(arena.reserve(1), Err(AllocError::NodeExhausted));
        assert_eq!(
            arena.insert(Block::leaf(0, 16, None)).unwrap_err(),
            AllocError::NodeExhausted
        );
    }
}
