// dispatcher/src/stats.rs

use std::io::{self, Write};

/// Outcome of one terminated job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub job: usize,
    pub finished_at: u64,
    pub turnaround: u64,
    pub wait: i64,
}

/// Running sums over terminated jobs
#[derive(Debug, Default)]
pub struct Stats {
    jobs: usize, // parsed records, the divisor of both averages
    turnaround_sum: u64,
    wait_sum: i64,
    completions: Vec<Completion>,
}

impl Stats {
    pub fn new(jobs: usize) -> Self {
        Self {
            jobs,
            ..Self::default()
        }
    }

    /// Fold a job terminated at `timer` into the sums.
    pub fn record(&mut self, job: usize, arrival_time: u64, service_time: u64, timer: u64) -> Completion {
        let turnaround = timer - arrival_time;
        let wait = turnaround as i64 - service_time as i64;
        self.turnaround_sum += turnaround;
        self.wait_sum += wait;
        let completion = Completion {
            job,
            finished_at: timer,
            turnaround,
            wait,
        };
        self.completions.push(completion);
        completion
    }

    pub fn summary(&self, total_runtime: u64) -> Summary {
        let average = |sum: f64| {
            if self.jobs == 0 { 0.0 } else { sum / self.jobs as f64 }
        };
        Summary {
            total_runtime,
            jobs: self.jobs,
            average_turnaround: average(self.turnaround_sum as f64),
            average_wait: average(self.wait_sum as f64),
            completions: self.completions.clone(),
        }
    }
}

/// End-of-run report
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total_runtime: u64,
    pub jobs: usize,
    pub average_turnaround: f64,
    pub average_wait: f64,
    pub completions: Vec<Completion>, // in termination order
}

impl Summary {
    pub fn completion(&self, job: usize) -> Option<&Completion> {
        self.completions.iter().find(|c| c.job == job)
    }

    pub fn report<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out)?;
        writeln!(out, "total runtime = {}", self.total_runtime)?;
        writeln!(out, "average turnaround time = {:.6}", self.average_turnaround)?;
        writeln!(out, "average wait time = {:.6}", self.average_wait)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_cover_every_parsed_job() {
        let mut stats = Stats::new(2);
        let c = stats.record(0, 0, 3, 3);
        assert_eq!((c.turnaround, c.wait), (3, 0));
        let c = stats.record(1, 0, 3, 6);
        assert_eq!((c.turnaround, c.wait), (6, 3));

        let summary = stats.summary(6);
        assert_eq!(summary.average_turnaround, 4.5);
        assert_eq!(summary.average_wait, 1.5);
        assert_eq!(summary.completion(1).unwrap().finished_at, 6);
    }

    #[test]
    fn no_jobs_reports_zero() {
        let summary = Stats::new(0).summary(0);
        assert_eq!(summary.average_turnaround, 0.0);
        let mut out = Vec::new();
        summary.report(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\ntotal runtime = 0\naverage turnaround time = 0.000000\naverage wait time = 0.000000\n"
        );
    }
}
