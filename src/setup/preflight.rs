//! Host preflight gates for local setup
//!
//! Disk below the floor and a missing Python runtime are fatal; low
//! memory, few cores, and an unexpected OS only warn.

use crate::errors::Result;
use crate::python::PythonRuntime;
use crate::system;
use std::path::Path;

/// Disk floor below which setup refuses to continue
pub const DISK_FAIL_GB: u64 = 15;

/// Disk level below which setup warns
pub const DISK_WARN_GB: u64 = 25;

/// Memory level below which setup warns
pub const MEMORY_WARN_GB: u64 = 8;

/// Core count below which setup warns
pub const CPU_WARN_CORES: usize = 4;

/// Outcome of one gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateStatus {
    Pass,
    Warn,
    Fail,
}

/// One preflight gate result
#[derive(Debug, Clone)]
pub struct Gate {
    pub name: String,
    pub status: GateStatus,
    pub message: String,
}

impl Gate {
    fn pass(name: &str, message: String) -> Self {
        Self {
            name: name.to_string(),
            status: GateStatus::Pass,
            message,
        }
    }

    fn warn(name: &str, message: String) -> Self {
        Self {
            name: name.to_string(),
            status: GateStatus::Warn,
            message,
        }
    }

    fn fail(name: &str, message: String) -> Self {
        Self {
            name: name.to_string(),
            status: GateStatus::Fail,
            message,
        }
    }
}

/// All gate results plus the located Python runtime when present
#[derive(Debug)]
pub struct Preflight {
    pub gates: Vec<Gate>,
    pub python: Option<PythonRuntime>,
}

impl Preflight {
    /// Run every gate against the host and `project_path`'s disk
    pub async fn run(project_path: &Path) -> Result<Self> {
        let mut gates = Vec::new();

        let os = system::os_label();
        if system::os_supported() {
            gates.push(Gate::pass("Operating system", os));
        } else {
            gates.push(Gate::warn(
                "Operating system",
                format!("{} is untested, expect rough edges", os),
            ));
        }

        let memory = system::total_memory_gb();
        if memory >= MEMORY_WARN_GB {
            gates.push(Gate::pass("Memory", format!("{} GB", memory)));
        } else {
            gates.push(Gate::warn(
                "Memory",
                format!("{} GB ({}+ GB recommended for local models)", memory, MEMORY_WARN_GB),
            ));
        }

        match system::available_disk_gb(project_path) {
            Some(disk) if disk < DISK_FAIL_GB => {
                gates.push(Gate::fail(
                    "Disk space",
                    format!("{} GB free, at least {} GB required", disk, DISK_FAIL_GB),
                ));
            }
            Some(disk) if disk < DISK_WARN_GB => {
                gates.push(Gate::warn(
                    "Disk space",
                    format!("{} GB free ({}+ GB recommended)", disk, DISK_WARN_GB),
                ));
            }
            Some(disk) => {
                gates.push(Gate::pass("Disk space", format!("{} GB free", disk)));
            }
            None => {
                gates.push(Gate::warn(
                    "Disk space",
                    "could not determine free space".to_string(),
                ));
            }
        }

        let cores = system::cpu_count();
        if cores >= CPU_WARN_CORES {
            gates.push(Gate::pass("CPU", format!("{} cores", cores)));
        } else {
            gates.push(Gate::warn(
                "CPU",
                format!("{} cores ({}+ recommended)", cores, CPU_WARN_CORES),
            ));
        }

        let python = match PythonRuntime::locate().await {
            Ok(runtime) => {
                gates.push(Gate::pass(
                    "Python",
                    format!("{} found", runtime.version_string()),
                ));
                Some(runtime)
            }
            Err(e) => {
                gates.push(Gate::fail("Python", e.to_string()));
                None
            }
        };

        Ok(Self { gates, python })
    }

    /// First fatal gate, if any
    pub fn fatal(&self) -> Option<&Gate> {
        self.gates.iter().find(|g| g.status == GateStatus::Fail)
    }
}
