//! Host inspection helpers
//!
//! Thin wrappers around sysinfo used by the setup preflight gates and
//! the doctor command.

use std::path::Path;
use sysinfo::{Disks, System};

const GB: u64 = 1024 * 1024 * 1024;

/// Human-readable OS label, e.g. "Ubuntu 22.04" or "macOS 14.2"
pub fn os_label() -> String {
    let name = System::name().unwrap_or_else(|| std::env::consts::OS.to_string());
    match System::os_version() {
        Some(version) => format!("{} {}", name, version),
        None => name,
    }
}

/// True when the host OS is one the MCP server stack supports natively
pub fn os_supported() -> bool {
    matches!(std::env::consts::OS, "linux" | "macos")
}

/// Available system memory in whole gigabytes
pub fn available_memory_gb() -> u64 {
    let mut sys = System::new_all();
    sys.refresh_memory();
    sys.available_memory() / GB
}

/// Total system memory in whole gigabytes
pub fn total_memory_gb() -> u64 {
    let mut sys = System::new_all();
    sys.refresh_memory();
    sys.total_memory() / GB
}

/// Available space in whole gigabytes on the disk holding `path`.
///
/// Picks the longest mount point that prefixes `path` so nested mounts
/// (e.g. `/home` under `/`) report the right filesystem.
pub fn available_disk_gb(path: &Path) -> Option<u64> {
    let disks = Disks::new_with_refreshed_list();

    disks
        .iter()
        .filter(|disk| path.starts_with(disk.mount_point()))
        .max_by_key(|disk| disk.mount_point().as_os_str().len())
        .map(|disk| disk.available_space() / GB)
}

/// Logical CPU core count
pub fn cpu_count() -> usize {
    num_cpus::get()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_label_nonempty() {
        assert!(!os_label().is_empty());
    }

    #[test]
    fn test_cpu_count_positive() {
        assert!(cpu_count() > 0);
    }

    #[test]
    fn test_memory_readable() {
        assert!(total_memory_gb() > 0);
    }

    #[test]
    #[cfg(unix)]
    fn test_disk_space_for_root() {
        let gb = available_disk_gb(Path::new("/"));
        assert!(gb.is_some());
    }
}
