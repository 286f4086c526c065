// dispatcher/src/dispatcher.rs

//! The three-level feedback scheduler.
//!
//! * Level-0: FCFS, a process is demoted to Level-1 once it has run `t0` ticks.
//! * Level-1: round robin with quantum `t1`, demoted to Level-2 after `k` rotations.
//! * Level-2: FCFS, preempted by every newly admitted job.
//!
//! Level-0 is the entry state. Levels 1 and 2 run as sub-loops that return
//! to Level-0 whenever a job is admitted or they run out of work.

use std::io::Write;
use buddy_allocator::BuddyTree;
use log::{debug, info, trace};
use crate::admission::{admit_arrival, try_admit};
use crate::config::{MIN_BLOCK_SIZE, POOL_BASE, POOL_SIZE, SchedParams};
use crate::error::Result;
use crate::loader::JobRecord;
use crate::stats::{Stats, Summary};
use crate::task::{PcbQueue, ProcessControl, ProcessControlBlock, Processor};
use crate::timer::Clock;

/// Whole simulation state, advanced only by [`Dispatcher::run`].
pub struct Dispatcher<C, K, W> {
    params: SchedParams,
    memory: BuddyTree,

    job_queue: PcbQueue,     // not arrived yet
    arrived_queue: PcbQueue, // arrived, waiting for memory
    arrived_head: Option<ProcessControlBlock>,
    level0: PcbQueue,
    level1: PcbQueue,
    level2: PcbQueue,
    level2_head: Option<ProcessControlBlock>, // preempted Level-2 process
    processor: Processor,

    timer: u64,
    stats: Stats,
    control: C,
    clock: K,
    out: W, // memory dumps
}

impl<C: ProcessControl, K: Clock, W: Write> Dispatcher<C, K, W> {
    // ----- constructors -----
    pub fn new(params: SchedParams, jobs: &[JobRecord], control: C, clock: K, out: W) -> Self {
        let memory = BuddyTree::new(POOL_BASE, POOL_SIZE, MIN_BLOCK_SIZE);
        Self::with_memory(params, jobs, memory, control, clock, out)
    }

    pub fn with_memory(
        params: SchedParams,
        jobs: &[JobRecord],
        memory: BuddyTree,
        mut control: C,
        clock: K,
        out: W,
    ) -> Self {
        let job_queue = jobs
            .iter()
            .enumerate()
            .map(|(job, record)| control.create(job, record))
            .collect();
        Self {
            params,
            memory,
            job_queue,
            arrived_queue: PcbQueue::new(),
            arrived_head: None,
            level0: PcbQueue::new(),
            level1: PcbQueue::new(),
            level2: PcbQueue::new(),
            level2_head: None,
            processor: Processor::new_empty(),
            timer: 0,
            stats: Stats::new(jobs.len()),
            control,
            clock,
            out,
        }
    }

    // ----- methods -----
    /// Run every job to completion.
    pub fn run(&mut self) -> Result<Summary> {
        info!(
            "dispatching {} jobs, t0={}, t1={}, k={}",
            self.job_queue.len(),
            self.params.t0,
            self.params.t1,
            self.params.k
        );
        loop {
            self.tick_level0()?;

            if self.is_drained() {
                break;
            }

            self.intake()?;

            if self.processor.is_idle() {
                if let Some(mut pcb) = self.level0.fetch() {
                    pcb.start_time = self.timer;
                    trace!("t={}: level-0 runs {}", self.timer, pcb.label());
                    self.control.start(&mut pcb);
                    self.processor.run(pcb);
                } else if !self.level1.is_empty() {
                    self.run_level1()?;
                    continue;
                } else if !self.level2.is_empty() || self.level2_head.is_some() {
                    self.run_level2()?;
                    continue;
                }
            }

            self.advance(1);
        }

        let summary = self.stats.summary(self.timer);
        info!("all jobs finished at t={}", self.timer);
        Ok(summary)
    }

    // one tick of the Level-0 process, if any
    fn tick_level0(&mut self) -> Result<()> {
        let Some(pcb) = self.processor.current_mut() else {
            return Ok(());
        };
        pcb.remaining_cpu_time -= 1;
        let finished = pcb.is_finished();
        let expired = self.timer - pcb.start_time >= self.params.t0;

        if finished {
            if let Some(pcb) = self.processor.take_current() {
                self.terminate(pcb)?;
            }
        } else if expired {
            if let Some(mut pcb) = self.processor.take_current() {
                self.control.suspend(&mut pcb);
                pcb.max_iterations = self.params.k;
                debug!("t={}: {} demoted to level-1", self.timer, pcb.label());
                self.level1.add(pcb);
            }
        }
        Ok(())
    }

    // Level-1 round robin, returns to Level-0 on admission or when empty
    fn run_level1(&mut self) -> Result<()> {
        let mut quantum = 0;
        while !self.processor.is_idle() || !self.level1.is_empty() {
            if let Some(mut pcb) = self.processor.take_current() {
                pcb.remaining_cpu_time -= quantum as i64;
                pcb.curr_iterations += 1;
                if pcb.is_finished() {
                    self.terminate(pcb)?;
                } else if pcb.curr_iterations == pcb.max_iterations {
                    self.control.suspend(&mut pcb);
                    debug!("t={}: {} demoted to level-2", self.timer, pcb.label());
                    self.level2.add(pcb);
                } else {
                    self.control.suspend(&mut pcb);
                    self.level1.add(pcb);
                }
            }

            if self.intake()? {
                break;
            }

            if self.processor.is_idle() {
                match self.level1.fetch() {
                    Some(mut pcb) => {
                        pcb.start_time = self.timer;
                        trace!("t={}: level-1 runs {}", self.timer, pcb.label());
                        self.control.start(&mut pcb);
                        self.processor.run(pcb);
                    }
                    None => break,
                }
            }

            // idle waits a single tick, a final partial slice only what is left
            quantum = match self.processor.current() {
                Some(pcb) if pcb.remaining_cpu_time < self.params.t1 as i64 => {
                    pcb.remaining_cpu_time as u64
                }
                Some(_) => self.params.t1,
                None => 1,
            };
            self.advance(quantum);
        }
        Ok(())
    }

    // Level-2 FCFS, preempted by any admission
    fn run_level2(&mut self) -> Result<()> {
        while !self.processor.is_idle() || self.level2_head.is_some() || !self.level2.is_empty() {
            if let Some(pcb) = self.processor.current_mut() {
                pcb.remaining_cpu_time -= 1;
                if pcb.is_finished() {
                    if let Some(pcb) = self.processor.take_current() {
                        self.terminate(pcb)?;
                    }
                    debug_assert!(self.level2_head.is_none());
                }
            }

            if self.intake()? {
                if let Some(mut pcb) = self.processor.take_current() {
                    self.control.suspend(&mut pcb);
                    debug!("t={}: {} preempted by an admission", self.timer, pcb.label());
                    self.level2_head = Some(pcb);
                }
                break;
            }

            if let Some(mut pcb) = self.level2_head.take() {
                // keeps the start time of its first Level-2 dispatch
                self.control.start(&mut pcb);
                self.processor.run(pcb);
            } else if self.processor.is_idle() {
                match self.level2.fetch() {
                    Some(mut pcb) => {
                        pcb.start_time = self.timer;
                        trace!("t={}: level-2 runs {}", self.timer, pcb.label());
                        self.control.start(&mut pcb);
                        self.processor.run(pcb);
                    }
                    None => break,
                }
            }

            self.advance(1);
        }
        Ok(())
    }

    /// Arrival intake then one admission attempt. `true` if a job was admitted.
    fn intake(&mut self) -> Result<bool> {
        admit_arrival(&mut self.job_queue, &mut self.arrived_queue, self.timer);
        let admitted = try_admit(
            &mut self.arrived_queue,
            &mut self.arrived_head,
            &mut self.level0,
            &mut self.memory,
        )?;
        if admitted {
            self.print_memory()?;
        }
        Ok(admitted)
    }

    fn terminate(&mut self, mut pcb: ProcessControlBlock) -> Result<()> {
        self.control.terminate(&mut pcb);
        let completion = self
            .stats
            .record(pcb.job, pcb.arrival_time, pcb.service_time, self.timer);
        info!(
            "t={}: job {} finished, turnaround={}, wait={}",
            self.timer,
            pcb.label(),
            completion.turnaround,
            completion.wait
        );
        if let Some(block) = pcb.mem_block.take() {
            if self.memory.free(block) {
                self.print_memory()?;
            }
        }
        Ok(())
    }

    fn advance(&mut self, ticks: u64) {
        self.clock.sleep(ticks);
        self.timer += ticks;
    }

    fn print_memory(&mut self) -> Result<()> {
        writeln!(self.out)?;
        for leaf in self.memory.dump() {
            writeln!(self.out, "{}", leaf)?;
        }
        Ok(())
    }

    // ----- utils -----
    fn is_drained(&self) -> bool {
        self.job_queue.is_empty()
            && self.arrived_queue.is_empty()
            && self.arrived_head.is_none()
            && self.level0.is_empty()
            && self.level1.is_empty()
            && self.level2.is_empty()
            && self.level2_head.is_none()
            && self.processor.is_idle()
    }

    pub fn timer(&self) -> u64 {
        self.timer
    }
    pub fn memory(&self) -> &BuddyTree {
        &self.memory
    }
    pub fn control(&self) -> &C {
        &self.control
    }
    pub fn clock(&self) -> &K {
        &self.clock
    }
    pub fn output(&self) -> &W {
        &self.out
    }
}
