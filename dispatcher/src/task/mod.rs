// dispatcher/src/task/mod.rs

mod control;
mod pid;
mod processor;
mod task;
mod task_manager;

pub use control::{ProcessControl, SimulatedControl};
pub use pid::{Pid, PidAllocator};
pub use processor::Processor;
pub use task::{ProcessControlBlock, TaskStatus};
pub use task_manager::PcbQueue;
