// dispatcher/src/admission.rs

//! Admission of arrived jobs into memory.
//!
//! A job only reaches the Level-0 queue once the buddy allocator has granted
//! it a block. A job that does not fit keeps its place at the head of the
//! arrival line and is retried on the next tick.

use buddy_allocator::{AllocError, BuddyTree};
use log::{debug, trace};
use crate::error::Result;
use crate::task::{PcbQueue, ProcessControlBlock};

/// Move the front of the job queue to the arrived queue if it has arrived by
/// `timer`. At most one job moves per call.
pub fn admit_arrival(job_queue: &mut PcbQueue, arrived: &mut PcbQueue, timer: u64) -> bool {
    match job_queue.front() {
        Some(pcb) if pcb.arrival_time <= timer => {}
        _ => return false,
    }
    let Some(pcb) = job_queue.fetch() else {
        return false;
    };
    trace!("t={}: job {} arrived", timer, pcb.label());
    arrived.add(pcb);
    true
}

/// Try to allocate memory for the next waiting job and queue it on Level-0.
///
/// The head slot is served before the arrived queue. Returns `Ok(true)` when
/// a job was admitted. Running out of tree nodes is the only error.
pub fn try_admit(
    arrived: &mut PcbQueue,
    arrived_head: &mut Option<ProcessControlBlock>,
    level0: &mut PcbQueue,
    memory: &mut BuddyTree,
) -> Result<bool> {
    let Some(mut pcb) = arrived_head.take().or_else(|| arrived.fetch()) else {
        return Ok(false);
    };

    match memory.alloc(pcb.memory_size) {
        Ok(block) => {
            debug!("job {} admitted with {} of memory", pcb.label(), pcb.memory_size);
            pcb.mem_block = Some(block);
            level0.add(pcb);
            Ok(true)
        }
        Err(AllocError::NoFit | AllocError::InvalidParam) => {
            trace!("job {} waits for {} of memory", pcb.label(), pcb.memory_size);
            *arrived_head = Some(pcb);
            Ok(false)
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MIN_BLOCK_SIZE, POOL_SIZE};
    use crate::error::DispatchError;
    use crate::loader::JobRecord;

    fn pcb(job: usize, arrival_time: u64, memory_size: usize) -> ProcessControlBlock {
        let record = JobRecord {
            arrival_time,
            service_time: 1,
            memory_size,
        };
        ProcessControlBlock::new(job, &record)
    }

    fn memory() -> BuddyTree {
        BuddyTree::new(0, POOL_SIZE, MIN_BLOCK_SIZE)
    }

    #[test]
    fn arrival_moves_one_job_per_call() {
        let mut jobs: PcbQueue = [pcb(0, 0, 8), pcb(1, 0, 8), pcb(2, 5, 8)].into_iter().collect();
        let mut arrived = PcbQueue::new();

        assert!(admit_arrival(&mut jobs, &mut arrived, 0));
        assert_eq!(arrived.len(), 1);
        assert!(admit_arrival(&mut jobs, &mut arrived, 0));
        // job 2 has not arrived yet
        assert!(!admit_arrival(&mut jobs, &mut arrived, 4));
        assert!(admit_arrival(&mut jobs, &mut arrived, 5));
        assert!(!admit_arrival(&mut jobs, &mut arrived, 6));
        let order: Vec<usize> = arrived.iter().map(|p| p.job).collect();
        assert_eq!(order, [0, 1, 2]);
    }

    #[test]
    fn nothing_waiting_is_a_noop() {
        let mut memory = memory();
        let mut head = None;
        let mut level0 = PcbQueue::new();
        assert!(!try_admit(&mut PcbQueue::new(), &mut head, &mut level0, &mut memory).unwrap());
        assert!(level0.is_empty());
        assert_eq!(memory.node_count(), 1);
    }

    #[test]
    fn admitted_job_carries_its_block() {
        let mut memory = memory();
        let mut arrived: PcbQueue = [pcb(0, 0, 600)].into_iter().collect();
        let mut head = None;
        let mut level0 = PcbQueue::new();

        assert!(try_admit(&mut arrived, &mut head, &mut level0, &mut memory).unwrap());
        let admitted = level0.front().unwrap();
        let block = memory.block(admitted.mem_block.unwrap()).unwrap();
        assert_eq!((block.offset, block.size), (0, 1024));
        assert!(head.is_none());
    }

    #[test]
    fn failed_job_keeps_its_place_in_line() {
        let mut memory = memory();
        let mut arrived: PcbQueue = [pcb(0, 0, 2048), pcb(1, 0, 2048), pcb(2, 0, 8)]
            .into_iter()
            .collect();
        let mut head = None;
        let mut level0 = PcbQueue::new();

        assert!(try_admit(&mut arrived, &mut head, &mut level0, &mut memory).unwrap());
        for _ in 0..3 {
            assert!(!try_admit(&mut arrived, &mut head, &mut level0, &mut memory).unwrap());
            assert_eq!(head.as_ref().map(|p| p.job), Some(1));
            // job 2 would fit nowhere either, but it must not overtake job 1
            assert_eq!(arrived.len(), 1);
        }

        let first = level0.fetch().unwrap();
        assert!(memory.free(first.mem_block.unwrap()));
        assert!(try_admit(&mut arrived, &mut head, &mut level0, &mut memory).unwrap());
        assert_eq!(level0.front().map(|p| p.job), Some(1));
        assert!(head.is_none());
    }

    #[test]
    fn node_exhaustion_is_fatal() {
        let mut memory = BuddyTree::with_node_limit(0, POOL_SIZE, MIN_BLOCK_SIZE, 1);
        let mut arrived: PcbQueue = [pcb(0, 0, 100)].into_iter().collect();
        let mut head = None;
        let mut level0 = PcbQueue::new();

        let err = try_admit(&mut arrived, &mut head, &mut level0, &mut memory).unwrap_err();
        assert!(matches!(err, DispatchError::Allocator(AllocError::NodeExhausted)));
    }
}
