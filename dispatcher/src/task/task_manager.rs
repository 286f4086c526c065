// dispatcher/src/task/task_manager.rs

use std::collections::VecDeque;
use super::task::ProcessControlBlock;

/// A FIFO queue of descriptors.
#[derive(Debug, Default)]
pub struct PcbQueue {
    queue: VecDeque<ProcessControlBlock>,
}

impl PcbQueue {
    // ----- constructor -----
    pub fn new() -> Self {
        Self { queue: VecDeque::new() }
    }
    // ----- methods -----
    pub fn add(&mut self, pcb: ProcessControlBlock) {
        self.queue.push_back(pcb);
    }
    pub fn fetch(&mut self) -> Option<ProcessControlBlock> {
        self.queue.pop_front()
    }
    pub fn front(&self) -> Option<&ProcessControlBlock> {
        self.queue.front()
    }
    // ----- utils -----
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
    pub fn len(&self) -> usize {
        self.queue.len()
    }
    pub fn iter(&self) -> impl Iterator<Item = &ProcessControlBlock> {
        self.queue.iter()
    }
}

impl FromIterator<ProcessControlBlock> for PcbQueue {
    fn from_iter<I: IntoIterator<Item = ProcessControlBlock>>(iter: I) -> Self {
        Self {
            queue: iter.into_iter().collect(),
        }
    }
}
