//! File-state access helpers.
//!
//! Most device state is a marker file: a small file whose existence or
//! content encodes one value. Everything here is a projection of the
//! filesystem at call time; nothing is cached.

use std::path::Path;

/// Read a file and trim its contents, returning `default` verbatim when
/// the file does not exist or cannot be read.
pub fn read_trimmed(path: &Path, default: &str) -> String {
    match std::fs::read_to_string(path) {
        Ok(content) => content.trim().to_string(),
        Err(_) => default.to_string(),
    }
}

/// Write content to a file, creating parent directories as needed.
pub fn write_file(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)
}

/// Count regular files directly inside `dir`, ignoring subdirectories.
/// Returns 0 when the directory does not exist.
pub fn count_files(dir: &Path) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };

    entries
        .flatten()
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .count()
}

/// MAC address of a network interface from its sysfs node, or the
/// all-zero address when the interface is absent.
pub fn mac_address(sysfs_net_dir: &Path, interface: &str) -> String {
    let path = sysfs_net_dir.join(interface).join("address");
    read_trimmed(&path, crate::config::ZERO_MAC)
}

/// Whether `path` appears as a mount point in /proc/mounts.
pub fn is_mounted(path: &Path) -> bool {
    let mounts = read_trimmed(Path::new("/proc/mounts"), "");
    let target = path.to_string_lossy();
    mounts
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .any(|mount_point| mount_point == target)
}
