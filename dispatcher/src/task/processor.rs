// dispatcher/src/task/processor.rs

use super::task::ProcessControlBlock;

/// The single simulated CPU.
#[derive(Debug, Default)]
pub struct Processor {
    current: Option<ProcessControlBlock>, // the currently running process
}

impl Processor {
    // ----- constructor -----
    pub fn new_empty() -> Self {
        Self { current: None }
    }
    // ----- methods -----
    /// Put `pcb` on the CPU. The CPU must be idle.
    pub fn run(&mut self, pcb: ProcessControlBlock) {
        debug_assert!(self.current.is_none(), "processor is already running a process");
        self.current = Some(pcb);
    }
    // take: 取出当前正在执行的进程，CPU 随之空闲
    pub fn take_current(&mut self) -> Option<ProcessControlBlock> {
        self.current.take()
    }
    pub fn current(&self) -> Option<&ProcessControlBlock> {
        self.current.as_ref()
    }
    pub fn current_mut(&mut self) -> Option<&mut ProcessControlBlock> {
        self.current.as_mut()
    }
    pub fn is_idle(&self) -> bool {
        self.current.is_none()
    }
}
