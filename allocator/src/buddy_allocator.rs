// allocator/src/buddy_allocator.rs

use alloc::vec;
use alloc::vec::Vec;
use log::{debug, error, trace};
use crate::arena::BlockArena;
use crate::block::{Block, BlockId, BlockInfo, BlockState};
use crate::{AllocError, AllocResult};

/// Buddy Allocator
/// Implementation Techniques: binary tree of blocks in an arena, tight-fit search before splitting
pub struct BuddyTree {
    arena: BlockArena,
    root: BlockId,

    pool_size: usize, // size of the root block
    min_block: usize, // blocks are never halved below this
    used: usize,      // bytes held by allocated leaves (including internal fragmentation)
}

/// constructors: `new`, `with_node_limit`
/// methods: `alloc`, `split`, `free`, `merge`, `dump`
/// utils: accounting and lookups
impl BuddyTree {
    // ----- constructors -----
    /// Create a tree whose root spans `[base, base + pool_size)`.
    pub fn new(base: usize, pool_size: usize, min_block: usize) -> Self {
        Self::with_node_limit(base, pool_size, min_block, usize::MAX)
    }

    /// Same as `new`, but the tree never holds more than `max_nodes` nodes.
    /// Splitting past that point fails with [`AllocError::NodeExhausted`].
    pub fn with_node_limit(base: usize, pool_size: usize, min_block: usize, max_nodes: usize) -> Self {
        assert!(pool_size.is_power_of_two(), "pool size must be a power of 2");
        assert!(
            min_block.is_power_of_two() && min_block <= pool_size,
            "minimum block must be a power of 2 no larger than the pool"
        );
        let (arena, root) = BlockArena::with_root(max_nodes, Block::leaf(base, pool_size, None));
        Self {
            arena,
            root,
            pool_size,
            min_block,
            used: 0,
        }
    }

    // ----- methods -----
    /// Allocate a block for `size` bytes.
    ///
    /// Existing free leaves are searched first (depth first, left before
    /// right) for a tight fit. Only when none fits is the first free leaf
    /// that can be halved down to a fit split.
    pub fn alloc(&mut self, size: usize) -> AllocResult<BlockId> {
        if size < 1 || size > self.pool_size {
            return Err(AllocError::InvalidParam);
        }
        let id = match self.find_fit(self.root, size) {
            Some(id) => id,
            None => self.split_first(self.root, size)?.ok_or(AllocError::NoFit)?,
        };
        let block = self.arena.get_mut(id).ok_or(AllocError::NoFit)?;
        block.state = BlockState::Allocated;
        self.used += block.size;
        debug!(
            "buddy: {} bytes -> block at {} of size {}",
            size, block.offset, block.size
        );
        Ok(id)
    }

    /// Split the free leaf `id` until a tight fit for `size` is found.
    ///
    /// Halves are explored left first. Returns the fitting leaf, which is
    /// left unallocated, or `None` when `id` is not a free leaf large enough.
    pub fn split(&mut self, id: BlockId, size: usize) -> AllocResult<Option<BlockId>> {
        let Some(block) = self.arena.get(id).copied() else {
            return Ok(None);
        };
        if block.state != BlockState::Free || block.size < size {
            return Ok(None);
        }

        if block.size >= 2 * size && block.size / 2 >= self.min_block {
            let (left, right) = self.divide(id, &block)?;
            if let Some(found) = self.split(left, size)? {
                return Ok(Some(found));
            }
            return self.split(right, size);
        }

        Ok(self.is_tight_fit(block.size, size).then_some(id))
    }

    /// Release an allocated block and coalesce buddies across the tree.
    ///
    /// Returns `false` without touching the tree when the block is not
    /// allocated or no longer exists.
    pub fn free(&mut self, id: BlockId) -> bool {
        let Some(block) = self.arena.get_mut(id) else {
            return false;
        };
        if block.state != BlockState::Allocated {
            return false;
        }
        block.state = BlockState::Free;
        self.used -= block.size;
        debug!("buddy: free block at {} of size {}", block.offset, block.size);

        let root = self.root_of(id);
        self.merge(root);
        true
    }

    /// Coalesce free buddies below `id`, deepest pairs first.
    pub fn merge(&mut self, id: BlockId) {
        let Some((left, right)) = self.arena.get(id).and_then(|block| block.children) else {
            return;
        };
        self.merge(left);
        self.merge(right);

        let is_free = |child| {
            self.arena
                .get(child)
                .is_some_and(|block| block.state == BlockState::Free)
        };
        if is_free(left) && is_free(right) {
            self.arena.remove(left);
            self.arena.remove(right);
            if let Some(block) = self.arena.get_mut(id) {
                block.state = BlockState::Free;
                block.children = None;
                trace!("buddy: merged buddies into block at {} of size {}", block.offset, block.size);
            }
        }
    }

    /// Leaves of the tree in address order.
    pub fn dump(&self) -> Leaves<'_> {
        Leaves {
            tree: self,
            stack: vec![self.root],
        }
    }

    // ----- utils -----
    fn is_tight_fit(&self, block_size: usize, size: usize) -> bool {
        size <= block_size && (size > block_size / 2 || block_size == self.min_block)
    }

    fn find_fit(&self, id: BlockId, size: usize) -> Option<BlockId> {
        let block = self.arena.get(id)?;
        match block.state {
            BlockState::Free => self.is_tight_fit(block.size, size).then_some(id),
            BlockState::Allocated => None,
            BlockState::Split => {
                let (left, right) = block.children?;
                self.find_fit(left, size)
                    .or_else(|| self.find_fit(right, size))
            }
        }
    }

    fn split_first(&mut self, id: BlockId, size: usize) -> AllocResult<Option<BlockId>> {
        let Some(block) = self.arena.get(id).copied() else {
            return Ok(None);
        };
        match (block.state, block.children) {
            (BlockState::Free, _) => self.split(id, size),
            (BlockState::Split, Some((left, right))) => match self.split_first(left, size)? {
                Some(found) => Ok(Some(found)),
                None => self.split_first(right, size),
            },
            _ => Ok(None),
        }
    }

    // turn the leaf `id` into a split node with two free halves
    fn divide(&mut self, id: BlockId, block: &Block) -> AllocResult<(BlockId, BlockId)> {
        let half = block.size / 2;
        if let Err(err) = self.arena.reserve(2) {
            error!(
                "buddy: cannot split block at {} of size {}: {} of {} nodes in use",
                block.offset,
                block.size,
                self.arena.len(),
                self.arena.limit()
            );
            return Err(err);
        }
        let left = self.arena.insert(Block::leaf(block.offset, half, Some(id)))?;
        let right = self.arena.insert(Block::leaf(block.offset + half, half, Some(id)))?;
        if let Some(parent) = self.arena.get_mut(id) {
            parent.state = BlockState::Split;
            parent.children = Some((left, right));
        }
        trace!("buddy: split block at {} of size {}", block.offset, block.size);
        Ok((left, right))
    }

    fn root_of(&self, mut id: BlockId) -> BlockId {
        while let Some(parent) = self.arena.get(id).and_then(|block| block.parent) {
            id = parent;
        }
        id
    }

    pub fn root(&self) -> BlockId {
        self.root
    }
    pub fn block(&self, id: BlockId) -> Option<BlockInfo> {
        self.arena.get(id).map(Block::info)
    }
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }
    pub fn min_block(&self) -> usize {
        self.min_block
    }
    pub fn total_bytes(&self) -> usize {
        self.pool_size
    }
    pub fn used_bytes(&self) -> usize {
        self.used
    }
    pub fn available_bytes(&self) -> usize {
        self.pool_size - self.used
    }
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }
    pub fn leaf_count(&self) -> usize {
        self.dump().count()
    }
}

/// Iterator over the leaves of a [`BuddyTree`], left to right
pub struct Leaves<'a> {
    tree: &'a BuddyTree,
    stack: Vec<BlockId>,
}

impl Iterator for Leaves<'_> {
    type Item = BlockInfo;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            let Some(block) = self.tree.arena.get(id) else {
                continue;
            };
            match block.children {
                Some((left, right)) => {
                    // right below left so the left half comes out first
                    self.stack.push(right);
                    self.stack.push(left);
                }
                None if block.size > 0 => return Some(block.info()),
                None => {}
            }
        }
        None
    }
}
