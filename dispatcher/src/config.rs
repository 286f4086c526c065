// dispatcher/src/config.rs

use std::collections::VecDeque;
use std::io::{BufRead, Write};
use crate::error::{DispatchError, Result};

// memory
pub const POOL_BASE: usize = 0;
pub const POOL_SIZE: usize = 2048; // virtual megabytes handed out to jobs
pub const MIN_BLOCK_SIZE: usize = 8;

// scheduling
pub const MAX_QUANTUM: u64 = u32::MAX as u64; // upper bound for t0 and t1

// timer
pub const DEFAULT_TICK_MS: u64 = 0; // real milliseconds per simulated tick, 0 = do not sleep

/// Scheduling parameters entered by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedParams {
    pub t0: u64, // Level-0 quantum
    pub t1: u64, // Level-1 quantum
    pub k: u32,  // Level-1 rotations before demotion to Level-2
}

impl SchedParams {
    /// Both quanta must lie in `1..=MAX_QUANTUM` and `k` must be positive.
    pub fn new(t0: u64, t1: u64, k: u32) -> Result<Self> {
        let quantum = |name, value: u64| match value {
            1..=MAX_QUANTUM => Ok(value),
            _ => Err(DispatchError::InvalidParameter {
                name,
                input: value.to_string(),
            }),
        };
        if k == 0 {
            return Err(DispatchError::InvalidParameter {
                name: "k",
                input: k.to_string(),
            });
        }
        Ok(Self {
            t0: quantum("t0", t0)?,
            t1: quantum("t1", t1)?,
            k,
        })
    }

    /// Ask for `t0`, `t1` and `k` in that order.
    ///
    /// Values are whitespace separated tokens, so they may come one per line
    /// or all on one line.
    pub fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<Self> {
        let mut tokens = Tokens::new(input);
        let t0 = ask(
            &mut tokens,
            output,
            "t0",
            "Please enter a positive integer as the time quantum for the Level-0 queue: ",
        )?;
        let t1 = ask(
            &mut tokens,
            output,
            "t1",
            "Please enter a positive integer as the time quantum for the Level-1 queue: ",
        )?;
        let k = ask(
            &mut tokens,
            output,
            "k",
            "Please enter a positive integer to specify the max number of iterations a job can stay in the Level-1 queue: ",
        )?;
        let k = u32::try_from(k).map_err(|_| DispatchError::InvalidParameter {
            name: "k",
            input: k.to_string(),
        })?;
        Self::new(t0, t1, k)
    }
}

fn ask<R: BufRead, W: Write>(
    tokens: &mut Tokens<'_, R>,
    output: &mut W,
    name: &'static str,
    prompt: &str,
) -> Result<u64> {
    write!(output, "{}", prompt)?;
    output.flush()?;
    let token = tokens.next_token()?.unwrap_or_default();
    token
        .parse::<u64>()
        .map_err(|_| DispatchError::InvalidParameter { name, input: token })
}

// whitespace separated tokens, reading more lines only when needed
struct Tokens<'a, R> {
    reader: &'a mut R,
    pending: VecDeque<String>,
}

impl<'a, R: BufRead> Tokens<'a, R> {
    fn new(reader: &'a mut R) -> Self {
        Self {
            reader,
            pending: VecDeque::new(),
        }
    }

    fn next_token(&mut self) -> Result<Option<String>> {
        while self.pending.is_empty() {
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.pending
                .extend(line.split_whitespace().map(str::to_owned));
        }
        Ok(self.pending.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt(input: &str) -> Result<SchedParams> {
        let mut output = Vec::new();
        SchedParams::prompt(&mut input.as_bytes(), &mut output)
    }

    #[test]
    fn one_value_per_line() {
        assert_eq!(prompt("10\n5\n2\n").unwrap(), SchedParams::new(10, 5, 2).unwrap());
    }

    #[test]
    fn values_on_one_line() {
        assert_eq!(prompt("  3 4   1").unwrap(), SchedParams::new(3, 4, 1).unwrap());
    }

    #[test]
    fn prompts_are_written_in_order() {
        let mut output = Vec::new();
        SchedParams::prompt(&mut "1 2 3".as_bytes(), &mut output).unwrap();
        let output = String::from_utf8(output).unwrap();
        let t0 = output.find("Level-0").unwrap();
        let t1 = output.find("Level-1 queue: ").unwrap();
        let k = output.find("max number of iterations").unwrap();
        assert!(t0 < t1 && t1 < k);
    }

    #[test]
    fn rejects_non_positive_and_garbage() {
        for input in ["0 5 2", "10 -1 2", "10 5 x", "10 5", "", "10 5 0"] {
            match prompt(input) {
                Err(DispatchError::InvalidParameter { .. }) => {}
                other => panic!("{:?} accepted: {:?}", input, other),
            }
        }
    }

    #[test]
    fn oversized_quantum_is_rejected() {
        for input in ["1\n18446744073709551615\n1\n", "4294967296 1 1", "1 1 4294967296"] {
            match prompt(input) {
                Err(DispatchError::InvalidParameter { .. }) => {}
                other => panic!("{:?} accepted: {:?}", input, other),
            }
        }
        let largest = MAX_QUANTUM.to_string();
        let params = prompt(&format!("{} {} 1", largest, largest)).unwrap();
        assert_eq!((params.t0, params.t1), (MAX_QUANTUM, MAX_QUANTUM));
    }

    #[test]
    fn constructor_validates_like_prompt() {
        assert!(matches!(
            SchedParams::new(10, 0, 2),
            Err(DispatchError::InvalidParameter { name: "t1", .. })
        ));
        assert!(matches!(
            SchedParams::new(0, 5, 2),
            Err(DispatchError::InvalidParameter { name: "t0", .. })
        ));
        assert!(matches!(
            SchedParams::new(10, 5, 0),
            Err(DispatchError::InvalidParameter { name: "k", .. })
        ));
        assert!(SchedParams::new(10, MAX_QUANTUM + 1, 2).is_err());
    }
}
