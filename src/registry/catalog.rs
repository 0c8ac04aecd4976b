//! The fixed container catalog

use crate::error::{DockhandError, Result};
use crate::registry::descriptor::{ContainerDescriptor, SyncTarget};

/// Every container the tool knows how to handle. Puppet is listed as a
/// quasi-container: it has no runtime container of its own, so verbs that
/// need a runtime ID report it as not running, and the batch module sync
/// skips it with a warning.
pub const CONTAINERS: &[ContainerDescriptor] = &[
    ContainerDescriptor {
        name: "astute",
        log_dir: Some("/var/log/astute"),
        shell: None,
        rsync_excludes: &[".git", "spec"],
        sync_targets: &[SyncTarget {
            source: "astute/lib/astute",
            dest: "/usr/lib/ruby/site_ruby/astute",
        }],
        static_target: None,
        extra_info: Some("deployment orchestrator; sources under astute/lib are synced by rsync"),
    },
    ContainerDescriptor {
        name: "cobbler",
        log_dir: Some("/var/log/cobbler"),
        shell: None,
        rsync_excludes: &[],
        sync_targets: &[],
        static_target: None,
        extra_info: None,
    },
    ContainerDescriptor {
        name: "keystone",
        log_dir: Some("/var/log/keystone"),
        shell: None,
        rsync_excludes: &[],
        sync_targets: &[],
        static_target: None,
        extra_info: None,
    },
    ContainerDescriptor {
        name: "mcollective",
        log_dir: Some("/var/log/mcollective"),
        shell: None,
        rsync_excludes: &[],
        sync_targets: &[],
        static_target: None,
        extra_info: None,
    },
    ContainerDescriptor {
        name: "nailgun",
        log_dir: Some("/var/log/nailgun"),
        shell: None,
        rsync_excludes: &["*.pyc", "test"],
        sync_targets: &[
            SyncTarget {
                source: "nailgun/nailgun",
                dest: "/usr/lib/python2.7/site-packages/nailgun",
            },
            SyncTarget {
                source: "nailgun/static",
                dest: "/usr/share/nailgun/static",
            },
        ],
        static_target: Some(SyncTarget {
            source: "nailgun/static_compressed",
            dest: "/usr/share/nailgun/static",
        }),
        extra_info: Some("REST API and UI backend; rsync ships both the python package and the raw static tree"),
    },
    ContainerDescriptor {
        name: "postgres",
        log_dir: Some("/var/lib/pgsql/data/pg_log"),
        shell: Some("sudo -u postgres psql nailgun"),
        rsync_excludes: &[],
        sync_targets: &[],
        static_target: None,
        extra_info: Some("shell opens psql against the nailgun database"),
    },
    ContainerDescriptor {
        name: "rabbitmq",
        log_dir: Some("/var/log/rabbitmq"),
        shell: None,
        rsync_excludes: &[],
        sync_targets: &[],
        static_target: None,
        extra_info: None,
    },
    ContainerDescriptor {
        name: "nginx",
        log_dir: Some("/var/log/nginx"),
        shell: None,
        rsync_excludes: &[],
        sync_targets: &[],
        static_target: None,
        extra_info: Some("fronts the REST API and serves the compressed UI bundle"),
    },
    ContainerDescriptor {
        name: "puppet",
        log_dir: Some("/var/log/puppet"),
        shell: None,
        rsync_excludes: &[],
        sync_targets: &[],
        static_target: None,
        extra_info: Some("quasi-container: module sources are synced onto the node and into every running container"),
    },
];

/// Look up a container by its logical name. Exact, case-sensitive match
/// over the static table.
pub fn resolve(name: &str) -> Result<&'static ContainerDescriptor> {
    CONTAINERS
        .iter()
        .find(|container| container.name == name)
        .ok_or_else(|| DockhandError::UnsupportedContainer(name.to_string()))
}

/// Every known descriptor, in catalog order.
pub fn all() -> &'static [ContainerDescriptor] {
    CONTAINERS
}
