//! File synchronization into containers
//!
//! Builds rsync command lines against a handler's target paths and runs
//! them through the transport. A handler-specific sync restarts the
//! container afterwards so the new files take effect. The batch puppet
//! variant tolerates containers that are not currently running.

use std::path::Path;

use tracing::{info, warn};

use crate::docker;
use crate::error::{DockhandError, Result};
use crate::registry::ContainerDescriptor;
use crate::remote::{Exec, Outcome, RemoteExecutor};

/// Puppet module path, both on the master node and inside each container.
pub const PUPPET_MODULES_DIR: &str = "/etc/puppet/modules";

/// Base rsync argument list plus the handler's exclude patterns, in table
/// order.
pub fn rsync_args(excludes: &[&str]) -> Vec<String> {
    let mut args: Vec<String> = ["-a", "-v", "-z", "-e", "ssh"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    for pattern in excludes {
        args.push(format!("--exclude={pattern}"));
    }
    args
}

/// Sync one local tree to a path on the master node.
fn sync_tree(
    executor: &mut RemoteExecutor,
    excludes: &[&str],
    source: &str,
    dest: &str,
) -> Result<String> {
    executor.ensure_authenticated()?;

    // Trailing slash: ship the tree's contents, not the directory itself.
    let source = if source.ends_with('/') {
        source.to_string()
    } else {
        format!("{source}/")
    };

    let exec = Exec::new("rsync")
        .args(rsync_args(excludes))
        .arg(source)
        .arg(format!("{}:{}", executor.target().login(), dest));
    executor.run_local(&exec)
}

/// Sync every source tree of `handler` into the running container, then
/// restart it so the new files take effect.
pub fn sync_container(
    handler: &ContainerDescriptor,
    executor: &mut RemoteExecutor,
) -> Result<Outcome> {
    if handler.sync_targets.is_empty() {
        return Err(DockhandError::UnsupportedVerb {
            verb: "rsync".to_string(),
            container: handler.name.to_string(),
        });
    }

    let dir = docker::container_dir(handler, executor)?;
    let mut report = String::new();
    for target in handler.sync_targets {
        let output = sync_tree(
            executor,
            handler.rsync_excludes,
            target.source,
            &format!("{dir}{}", target.dest),
        )?;
        report.push_str(&output);
        report.push('\n');
    }

    docker::lifecycle(handler, executor, "restart")?;
    Ok(Outcome::Text(report.trim_end().to_string()))
}

/// Build the static-asset bundle locally, sync it into the container, and
/// restart it.
pub fn sync_static(
    handler: &ContainerDescriptor,
    executor: &mut RemoteExecutor,
) -> Result<Outcome> {
    let target = handler
        .static_target
        .ok_or_else(|| DockhandError::UnsupportedVerb {
            verb: "rsync-static".to_string(),
            container: handler.name.to_string(),
        })?;

    // The bundle is produced next to the sources before shipping it.
    let (src_root, bundle) = target.source.rsplit_once('/').unwrap_or((".", target.source));
    let build = Exec::new("sh")
        .arg("-c")
        .arg(format!("cd {src_root} && grunt build --static-dir={bundle}"));
    executor.run_local(&build)?;

    let dir = docker::container_dir(handler, executor)?;
    let output = sync_tree(
        executor,
        &[],
        target.source,
        &format!("{dir}{}", target.dest),
    )?;

    docker::lifecycle(handler, executor, "restart")?;
    Ok(Outcome::Text(output))
}

/// Sync puppet module sources to the master node, then into every
/// container that is currently running.
///
/// A container that cannot be resolved is skipped with a warning; the
/// batch tolerates partial failure per container. Any other error aborts
/// the batch.
pub fn sync_puppet_modules(
    executor: &mut RemoteExecutor,
    modules: &Path,
    containers: &[ContainerDescriptor],
) -> Result<()> {
    let source = modules.display().to_string();
    sync_tree(executor, &[], &source, PUPPET_MODULES_DIR)?;

    for handler in containers {
        match docker::container_dir(handler, executor) {
            Ok(dir) => {
                info!(container = handler.name, "syncing puppet modules");
                sync_tree(executor, &[], &source, &format!("{dir}{PUPPET_MODULES_DIR}"))?;
            }
            Err(DockhandError::ContainerNotRunning(_)) => {
                warn!(
                    container = handler.name,
                    "not running, skipping puppet module sync"
                );
            }
            Err(e) => return Err(e),
        }
    }

    Ok(())
}
