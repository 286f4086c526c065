// dispatcher/src/lib.rs

//! Multi-level queue dispatcher simulator.
//!
//! Jobs are admitted from a job list once the buddy allocator grants them
//! memory, then scheduled over three feedback levels on one simulated CPU.

pub mod admission;
pub mod config;
pub mod console;
pub mod dispatcher;
pub mod error;
pub mod loader;
pub mod stats;
pub mod task;
pub mod timer;

pub use config::SchedParams;
pub use dispatcher::Dispatcher;
pub use error::{DispatchError, Result};
pub use loader::JobRecord;
pub use stats::{Completion, Summary};
