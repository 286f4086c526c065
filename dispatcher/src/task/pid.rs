// dispatcher/src/task/pid.rs

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pid(pub usize);

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ----- pid allocator -----
#[derive(Debug)]
pub struct PidAllocator {
    current: usize,
    recycled: Vec<usize>,
}

impl PidAllocator {
    // ----- constructor -----
    pub fn new() -> Self {
        PidAllocator {
            current: 1,
            recycled: Vec::new(),
        }
    }
    // ----- methods -----
    pub fn alloc(&mut self) -> Pid {
        if let Some(pid) = self.recycled.pop() {
            // 有回收的 pid，直接使用
            Pid(pid)
        } else {
            let pid = self.current;
            self.current += 1;
            Pid(pid)
        }
    }
    pub fn dealloc(&mut self, pid: Pid) {
        if pid.0 < self.current {
            if self.recycled.contains(&pid.0) {
                panic!("pid {} has already been recycled", pid);
            }
            self.recycled.push(pid.0);
        } else {
            panic!("pid {} is out of range", pid);
        }
    }
}

impl Default for PidAllocator {
    fn default() -> Self {
        Self::new()
    }
}
