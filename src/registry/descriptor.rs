//! Container handler descriptors
//!
//! A descriptor is the static record for one named container: where its
//! logs live, how to open a shell inside it, and which source trees are
//! synced into it.

/// Default shell entry point inside a container.
pub const DEFAULT_SHELL: &str = "bash";

/// A local source tree paired with its destination path inside the
/// container's root filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncTarget {
    pub source: &'static str,
    pub dest: &'static str,
}

/// Static record describing one named container.
#[derive(Debug, Clone, Copy)]
pub struct ContainerDescriptor {
    /// Logical name, unique across the catalog. Resolution is exact and
    /// case-sensitive.
    pub name: &'static str,
    /// Log directory inside the container.
    pub log_dir: Option<&'static str>,
    /// Custom shell entry point; `bash` when absent.
    pub shell: Option<&'static str>,
    /// Rsync exclude patterns, passed on in this order.
    pub rsync_excludes: &'static [&'static str],
    /// Source trees synced into the container by the rsync verb.
    pub sync_targets: &'static [SyncTarget],
    /// Static-asset bundle synced by the rsync-static verb.
    pub static_target: Option<SyncTarget>,
    /// Free-form operator notes shown by `info`.
    pub extra_info: Option<&'static str>,
}

impl ContainerDescriptor {
    /// Shell entry point, falling back to the default shell.
    pub fn shell_entry(&self) -> &'static str {
        self.shell.unwrap_or(DEFAULT_SHELL)
    }
}
