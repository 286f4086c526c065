// allocator/src/block.rs

use core::fmt;

/// Handle to a block stored in the [`BlockArena`](crate::arena::BlockArena).
///
/// The generation makes handles to merged-away blocks stale instead of
/// silently aliasing whatever block later reuses the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId {
    pub(crate) index: usize,
    pub(crate) generation: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockState {
    Free,
    Allocated,
    /// Internal node, its two halves live in the children.
    Split,
}

/// A node of the buddy tree
#[derive(Debug, Clone, Copy)]
pub(crate) struct Block {
    pub offset: usize,
    pub size: usize,
    pub state: BlockState,
    pub parent: Option<BlockId>,
    pub children: Option<(BlockId, BlockId)>,
}

impl Block {
    pub const fn leaf(offset: usize, size: usize, parent: Option<BlockId>) -> Self {
        Self {
            offset,
            size,
            state: BlockState::Free,
            parent,
            children: None,
        }
    }

    pub fn info(&self) -> BlockInfo {
        BlockInfo {
            offset: self.offset,
            // split nodes carry no size of their own, their halves do
            size: match self.state {
                BlockState::Split => 0,
                _ => self.size,
            },
            state: self.state,
        }
    }
}

/// Public snapshot of a block, as produced by `dump`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
    pub offset: usize,
    pub size: usize,
    pub state: BlockState,
}

impl BlockInfo {
    pub fn end(&self) -> usize {
        self.offset + self.size
    }

    pub fn is_allocated(&self) -> bool {
        self.state == BlockState::Allocated
    }
}

impl fmt::Display for BlockInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = match self.state {
            BlockState::Free => 0,
            BlockState::Allocated => 1,
            BlockState::Split => 2,
        };
        write!(f, "Offset: {}, Size: {}, Allocated: {}", self.offset, self.size, flag)
    }
}
