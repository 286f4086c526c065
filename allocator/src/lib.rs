// allocator/src/lib.rs

//! Buddy allocator over a fixed-size address range.
//!
//! The pool is modelled as a binary tree of blocks kept in an arena. Blocks
//! are split in halves to satisfy a request and coalesced with their buddy
//! when both halves are free again.

#![cfg_attr(not(test), no_std)]

mod arena;
pub mod block;
pub mod buddy_allocator;

extern crate alloc;

use core::fmt;

pub use block::{BlockId, BlockInfo, BlockState};
pub use buddy_allocator::{BuddyTree, Leaves};

/// The error type used for allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    /// Requested size is zero or larger than the pool.
    InvalidParam,
    /// No free block can satisfy the request right now.
    NoFit,
    /// The tree cannot materialise new nodes. Not recoverable.
    NodeExhausted,
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocError::InvalidParam => f.write_str("requested size is outside the pool range"),
            AllocError::NoFit => f.write_str("no free block fits the request"),
            AllocError::NodeExhausted => f.write_str("buddy tree cannot create new nodes"),
        }
    }
}

impl core::error::Error for AllocError {}

/// A [`Result`] type with [`AllocError`] as the error type.
pub type AllocResult<T = ()> = Result<T, AllocError>;
