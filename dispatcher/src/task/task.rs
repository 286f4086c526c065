// dispatcher/src/task/task.rs

use buddy_allocator::BlockId;
use crate::loader::JobRecord;
use super::pid::Pid;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    Initialized, // loaded from the job file, never started
    Running,
    Suspended,
    Terminated,
}

/// Scheduling and memory state of one job.
///
/// Not `Clone`: a descriptor lives in exactly one queue, head slot or the
/// processor at a time and moves between them.
#[derive(Debug)]
pub struct ProcessControlBlock {
    pub job: usize,       // position in the job file
    pub pid: Option<Pid>, // assigned on first start
    pub status: TaskStatus,

    pub arrival_time: u64,
    pub service_time: u64,
    pub memory_size: usize,
    pub mem_block: Option<BlockId>, // set once admitted, cleared on termination

    pub remaining_cpu_time: i64,
    pub start_time: u64,      // last (re)dispatch
    pub curr_iterations: u32, // Level-1 rotations done
    pub max_iterations: u32,  // Level-1 rotations allowed
}

impl ProcessControlBlock {
    // ----- constructor -----
    pub fn new(job: usize, record: &JobRecord) -> Self {
        Self {
            job,
            pid: None,
            status: TaskStatus::Initialized,
            arrival_time: record.arrival_time,
            service_time: record.service_time,
            memory_size: record.memory_size,
            mem_block: None,
            remaining_cpu_time: record.service_time as i64,
            start_time: 0,
            curr_iterations: 0,
            max_iterations: 0,
        }
    }

    // ----- methods -----
    pub fn is_finished(&self) -> bool {
        self.remaining_cpu_time <= 0
    }

    /// Label used in log lines, `#job` or `#job (pid n)` once started.
    pub fn label(&self) -> String {
        match self.pid {
            Some(pid) => format!("#{} (pid {})", self.job, pid.0),
            None => format!("#{}", self.job),
        }
    }
}
