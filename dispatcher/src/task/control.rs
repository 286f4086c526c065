// dispatcher/src/task/control.rs

use log::{debug, info};
use crate::loader::JobRecord;
use super::pid::PidAllocator;
use super::task::{ProcessControlBlock, TaskStatus};

/// Process Control Facility
///
/// The dispatcher only creates, starts, suspends and terminates processes
/// through this trait and treats every call as blocking.
pub trait ProcessControl {
    /// Build the descriptor for the `job`-th record of the job file.
    fn create(&mut self, job: usize, record: &JobRecord) -> ProcessControlBlock {
        ProcessControlBlock::new(job, record)
    }

    /// Launch a fresh process, or resume a suspended one.
    fn start(&mut self, pcb: &mut ProcessControlBlock);

    fn suspend(&mut self, pcb: &mut ProcessControlBlock);

    fn terminate(&mut self, pcb: &mut ProcessControlBlock);
}

/// In-process stand-in for real processes: hands out pids and tracks status.
#[derive(Debug, Default)]
pub struct SimulatedControl {
    pids: PidAllocator,
}

impl SimulatedControl {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProcessControl for SimulatedControl {
    fn start(&mut self, pcb: &mut ProcessControlBlock) {
        match pcb.status {
            TaskStatus::Suspended => {
                debug!("[process] resume {}", pcb.label());
            }
            TaskStatus::Initialized => {
                pcb.pid = Some(self.pids.alloc());
                info!("[process] start {}", pcb.label());
            }
            TaskStatus::Running | TaskStatus::Terminated => {
                debug!("[process] {} is {:?}, start ignored", pcb.label(), pcb.status);
                return;
            }
        }
        pcb.status = TaskStatus::Running;
    }

    fn suspend(&mut self, pcb: &mut ProcessControlBlock) {
        if pcb.status == TaskStatus::Running {
            debug!("[process] suspend {}", pcb.label());
            pcb.status = TaskStatus::Suspended;
        }
    }

    fn terminate(&mut self, pcb: &mut ProcessControlBlock) {
        info!("[process] terminate {}", pcb.label());
        if let Some(pid) = pcb.pid {
            self.pids.dealloc(pid);
        }
        pcb.status = TaskStatus::Terminated;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Pid;

    fn pcb(job: usize) -> ProcessControlBlock {
        let record = JobRecord {
            arrival_time: 0,
            service_time: 4,
            memory_size: 16,
        };
        SimulatedControl::new().create(job, &record)
    }

    #[test]
    fn lifecycle_moves_through_every_status() {
        let mut control = SimulatedControl::new();
        let mut p = pcb(0);
        assert_eq!(p.status, TaskStatus::Initialized);
        assert_eq!(p.remaining_cpu_time, 4);

        control.start(&mut p);
        assert_eq!(p.status, TaskStatus::Running);
        let pid = p.pid.unwrap();

        control.suspend(&mut p);
        assert_eq!(p.status, TaskStatus::Suspended);

        // resuming keeps the pid
        control.start(&mut p);
        assert_eq!(p.status, TaskStatus::Running);
        assert_eq!(p.pid, Some(pid));

        control.terminate(&mut p);
        assert_eq!(p.status, TaskStatus::Terminated);
    }

    #[test]
    fn terminated_pids_are_recycled() {
        let mut control = SimulatedControl::new();
        let mut a = pcb(0);
        let mut b = pcb(1);
        control.start(&mut a);
        control.terminate(&mut a);
        control.start(&mut b);
        assert_eq!(b.pid, Some(Pid(1)));
    }
}
