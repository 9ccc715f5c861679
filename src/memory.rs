//! Process memory sampling.

use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

use crate::constants::BYTES_PER_MB;

/// Source of the resident memory figure shown by the MEM block.
pub trait MemorySource: Send + Sync {
    /// Resident set size in bytes, `None` when it cannot be determined.
    fn resident_bytes(&mut self) -> Option<u64>;
}

/// Resident memory of the current process, read through `sysinfo`.
pub struct ProcessMemory {
    system: System,
    pid: Option<Pid>,
}

impl ProcessMemory {
    pub fn new() -> Self {
        Self {
            system: System::new(),
            pid: sysinfo::get_current_pid().ok(),
        }
    }
}

impl Default for ProcessMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySource for ProcessMemory {
    fn resident_bytes(&mut self) -> Option<u64> {
        let pid = self.pid?;
        // Only this process, only its memory counters
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_memory(),
        );
        self.system.process(pid).map(|process| process.memory())
    }
}

/// Convert a byte count to the megabytes shown by the MEM block.
pub fn bytes_to_mb(bytes: u64) -> f32 {
    (bytes as f64 / f64::from(BYTES_PER_MB)) as f32
}
