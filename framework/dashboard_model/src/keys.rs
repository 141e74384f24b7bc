//! Metric keys the dashboard knows how to display.

/// 1 minute CPU load average
pub const CPU_LOAD: &str = "system.cpu.load[,avg1]";

/// Percentage of memory in use
pub const MEMORY_USED: &str = "vm.memory.size[pused]";

/// Wildcard matching the free space percentage of every mounted filesystem
pub const FILESYSTEM_FREE_PATTERN: &str = "vfs.fs.size[*,pfree]";

const FILESYSTEM_FREE_PREFIX: &str = "vfs.fs.size[";
const FILESYSTEM_FREE_SUFFIX: &str = ",pfree]";

/// Extract the mount point from a filesystem free space key.
///
/// `vfs.fs.size[/data,pfree]` gives `/data`. Keys of any other metric give [None].
pub fn filesystem_mount(key: &str) -> Option<&str> {
    key.strip_prefix(FILESYSTEM_FREE_PREFIX)?
        .strip_suffix(FILESYSTEM_FREE_SUFFIX)
        .filter(|mount| !mount.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mount_from_filesystem_key() {
        assert_eq!(Some("/data"), filesystem_mount("vfs.fs.size[/data,pfree]"));
        assert_eq!(Some("/"), filesystem_mount("vfs.fs.size[/,pfree]"));
        assert_eq!(Some("C:"), filesystem_mount("vfs.fs.size[C:,pfree]"));
    }

    #[test]
    fn other_keys_have_no_mount() {
        assert_eq!(None, filesystem_mount(CPU_LOAD));
        assert_eq!(None, filesystem_mount("vfs.fs.size[/data,used]"));
        assert_eq!(None, filesystem_mount("vfs.fs.size[,pfree]"));
    }
}
