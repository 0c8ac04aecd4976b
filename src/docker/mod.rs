//! Container verb dispatch
//!
//! Resolves a handler by name and executes one of the fixed verbs against
//! it. Every verb that talks to the container re-fetches the runtime ID
//! first: containers restart with new IDs, so nothing is cached across
//! invocations.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{DockhandError, Result};
use crate::registry::{self, ContainerDescriptor};
use crate::remote::{Outcome, RemoteExecutor};
use crate::sync;

/// Container metadata root on the master node.
pub const CONTAINER_META_ROOT: &str = "/var/lib/docker/containers";

/// Container root filesystem mount root on the master node.
pub const CONTAINER_MNT_ROOT: &str = "/var/lib/docker/devicemapper/mnt";

/// The operations the dispatcher can run against a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verb {
    Id,
    Config,
    Dir,
    Log { lines: usize, names: Vec<String> },
    Tail { names: Vec<String> },
    Restart,
    Start,
    Stop,
    Shell,
    Rsync,
    RsyncStatic,
    Volumes,
}

/// Runtime configuration document of a container, as written by the
/// container runtime. Only the parts the tool inspects are typed; the
/// `config` verb prints the raw document instead.
#[derive(Debug, Clone, Deserialize)]
pub struct ContainerConfig {
    /// Container paths exported as volumes, mapped to host paths.
    #[serde(rename = "Volumes", default)]
    pub volumes: Option<serde_json::Map<String, Value>>,
    /// Mount records on runtimes that report them separately.
    #[serde(rename = "Mounts", default)]
    pub mounts: Option<Vec<Value>>,
}

/// Resolve `container` and execute `verb` against it.
pub fn dispatch(container: &str, verb: &Verb, executor: &mut RemoteExecutor) -> Result<Outcome> {
    let handler = registry::resolve(container)?;

    match verb {
        Verb::Id => container_id(handler, executor).map(Outcome::Text),
        Verb::Config => {
            let config: Value = serde_json::from_str(&fetch_config_raw(handler, executor)?)?;
            Ok(Outcome::Text(serde_json::to_string_pretty(&config)?))
        }
        Verb::Dir => container_dir(handler, executor).map(Outcome::Text),
        Verb::Log { lines, names } => {
            let path = log_path(handler, names, "log")?;
            executor
                .run(&format!("tail -n {lines} {path}"))
                .map(Outcome::Text)
        }
        Verb::Tail { names } => {
            let path = log_path(handler, names, "tail")?;
            Ok(Outcome::Handoff(
                executor.interactive(Some(&format!("tail -f {path}"))),
            ))
        }
        Verb::Restart => lifecycle(handler, executor, "restart").map(Outcome::Text),
        Verb::Start => lifecycle(handler, executor, "start").map(Outcome::Text),
        Verb::Stop => lifecycle(handler, executor, "stop").map(Outcome::Text),
        Verb::Shell => {
            let id = container_id(handler, executor)?;
            let entry = handler.shell_entry();
            Ok(Outcome::Handoff(
                executor.interactive(Some(&format!("docker exec -it {id} {entry}"))),
            ))
        }
        Verb::Rsync => sync::sync_container(handler, executor),
        Verb::RsyncStatic => sync::sync_static(handler, executor),
        Verb::Volumes => {
            let config: ContainerConfig =
                serde_json::from_str(&fetch_config_raw(handler, executor)?)?;
            let volumes = config.volumes.unwrap_or_default();
            Ok(Outcome::Text(serde_json::to_string_pretty(&volumes)?))
        }
    }
}

/// Current runtime ID of the container.
pub fn container_id(
    handler: &ContainerDescriptor,
    executor: &mut RemoteExecutor,
) -> Result<String> {
    let listing = executor.run(&format!(
        "docker ps -a | grep -i {} | grep Up | cut -f 1 -d \" \"",
        handler.name
    ))?;
    parse_container_id(&listing, handler.name)
}

/// First whitespace-delimited token of the first listing line. An empty
/// listing means the container is not up; that is a hard stop, not retried.
pub(crate) fn parse_container_id(listing: &str, name: &str) -> Result<String> {
    listing
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().next())
        .map(str::to_string)
        .ok_or_else(|| DockhandError::ContainerNotRunning(name.to_string()))
}

/// Root filesystem directory of the container on the master node.
///
/// `docker ps` reports a short ID while the mount directory is keyed by
/// the full one, so the path is resolved remotely with a prefix glob.
pub fn container_dir(
    handler: &ContainerDescriptor,
    executor: &mut RemoteExecutor,
) -> Result<String> {
    let id = container_id(handler, executor)?;
    let listing = executor.run(&format!("ls -d {CONTAINER_MNT_ROOT}/{id}*"))?;
    let mount = listing
        .lines()
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .ok_or_else(|| DockhandError::ContainerNotRunning(handler.name.to_string()))?;
    Ok(format!("{mount}/rootfs"))
}

/// Issue a lifecycle command (`restart`, `start`, `stop`) against the
/// container's current ID.
pub(crate) fn lifecycle(
    handler: &ContainerDescriptor,
    executor: &mut RemoteExecutor,
    verb: &str,
) -> Result<String> {
    let id = container_id(handler, executor)?;
    executor.run(&format!("docker {verb} {id}"))
}

fn fetch_config_raw(handler: &ContainerDescriptor, executor: &mut RemoteExecutor) -> Result<String> {
    let id = container_id(handler, executor)?;
    executor.run(&format!("cat {CONTAINER_META_ROOT}/{id}*/config.json"))
}

/// Log file pattern for the requested names: all `*.log` files by default,
/// one exact file for a single name, a brace expansion for several. The
/// remote shell expands the pattern; nothing is validated locally.
pub fn log_pattern(names: &[String]) -> String {
    match names {
        [] => "*.log".to_string(),
        [one] => format!("{one}.log"),
        many => format!("{{{}}}.log", many.join(",")),
    }
}

fn log_path(handler: &ContainerDescriptor, names: &[String], verb: &str) -> Result<String> {
    let dir = handler
        .log_dir
        .ok_or_else(|| DockhandError::UnsupportedVerb {
            verb: verb.to_string(),
            container: handler.name.to_string(),
        })?;
    Ok(format!("{dir}/{}", log_pattern(names)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::transport::stub::{fail, ok, ScriptedTransport};
    use crate::remote::Transport;
    use crate::session::RemoteTarget;

    fn executor(transport: &dyn Transport) -> RemoteExecutor<'_> {
        RemoteExecutor::new(RemoteTarget::new("10.20.0.2", None), transport)
    }

    #[test]
    fn test_log_pattern_defaults_to_all() {
        assert_eq!(log_pattern(&[]), "*.log");
    }

    #[test]
    fn test_log_pattern_single_name() {
        assert_eq!(log_pattern(&["api".to_string()]), "api.log");
    }

    #[test]
    fn test_log_pattern_brace_expansion() {
        assert_eq!(
            log_pattern(&["api".to_string(), "app".to_string()]),
            "{api,app}.log"
        );
    }

    #[test]
    fn test_parse_container_id_empty_listing() {
        let err = parse_container_id("", "nailgun").unwrap_err();
        assert!(matches!(err, DockhandError::ContainerNotRunning(name) if name == "nailgun"));
    }

    #[test]
    fn test_parse_container_id_takes_first_token() {
        let listing = "f00ba4cafe12  master/nailgun  Up 2 days\nother line\n";
        assert_eq!(parse_container_id(listing, "nailgun").unwrap(), "f00ba4cafe12");
    }

    #[test]
    fn test_dispatch_unknown_container_fails_before_remote_work() {
        let transport = ScriptedTransport::new(|_| ok(""));
        let mut executor = executor(&transport);

        let err = dispatch("mongo", &Verb::Id, &mut executor).unwrap_err();
        assert!(matches!(err, DockhandError::UnsupportedContainer(_)));
        assert_eq!(transport.call_count(), 0);
    }

    #[test]
    fn test_dispatch_id() {
        let transport = ScriptedTransport::new(|_| ok("f00ba4cafe12\n"));
        let mut executor = executor(&transport);

        match dispatch("nailgun", &Verb::Id, &mut executor).unwrap() {
            Outcome::Text(id) => assert_eq!(id, "f00ba4cafe12"),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(transport.calls()[0].contains("docker ps -a | grep -i nailgun | grep Up"));
    }

    #[test]
    fn test_dispatch_id_not_running() {
        let transport = ScriptedTransport::new(|_| ok("\n"));
        let mut executor = executor(&transport);

        let err = dispatch("rabbitmq", &Verb::Id, &mut executor).unwrap_err();
        assert!(matches!(err, DockhandError::ContainerNotRunning(_)));
    }

    #[test]
    fn test_dispatch_log_builds_tail_command() {
        let transport = ScriptedTransport::new(|_| ok("log line"));
        let mut executor = executor(&transport);

        let verb = Verb::Log {
            lines: 50,
            names: vec!["api".to_string(), "app".to_string()],
        };
        dispatch("nailgun", &verb, &mut executor).unwrap();
        assert!(transport.calls()[0].contains("tail -n 50 /var/log/nailgun/{api,app}.log"));
    }

    #[test]
    fn test_dispatch_tail_hands_off() {
        let transport = ScriptedTransport::new(|_| ok(""));
        let mut executor = executor(&transport);

        match dispatch("astute", &Verb::Tail { names: vec![] }, &mut executor).unwrap() {
            Outcome::Handoff(exec) => {
                assert_eq!(
                    exec.to_string(),
                    "ssh -t root@10.20.0.2 -C tail -f /var/log/astute/*.log"
                );
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        // Handoffs are values; the transport is untouched.
        assert_eq!(transport.call_count(), 0);
    }

    #[test]
    fn test_dispatch_shell_uses_custom_entry_point() {
        let transport = ScriptedTransport::new(|_| ok("deadbeef1234"));
        let mut executor = executor(&transport);

        match dispatch("postgres", &Verb::Shell, &mut executor).unwrap() {
            Outcome::Handoff(exec) => {
                assert!(exec
                    .to_string()
                    .contains("docker exec -it deadbeef1234 sudo -u postgres psql nailgun"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_dispatch_restart_targets_current_id() {
        let transport = ScriptedTransport::new(|_| ok("deadbeef1234"));
        let mut executor = executor(&transport);

        dispatch("keystone", &Verb::Restart, &mut executor).unwrap();
        let calls = transport.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[1].contains("docker restart deadbeef1234"));
    }

    #[test]
    fn test_dispatch_volumes_extracts_sub_object() {
        let transport = ScriptedTransport::new(|line| {
            if line.contains("docker ps") {
                ok("deadbeef1234")
            } else if line.contains("config.json") {
                ok(r#"{"ID":"deadbeef1234","Volumes":{"/var/log":"/var/log/docker-nailgun"},"State":{"Running":true}}"#)
            } else {
                fail("unexpected")
            }
        });
        let mut executor = executor(&transport);

        match dispatch("nailgun", &Verb::Volumes, &mut executor).unwrap() {
            Outcome::Text(text) => {
                assert!(text.contains("/var/log/docker-nailgun"));
                assert!(!text.contains("Running"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_dispatch_dir_resolves_mount_glob() {
        let transport = ScriptedTransport::new(|line| {
            if line.contains("docker ps") {
                ok("f00ba4")
            } else {
                ok("/var/lib/docker/devicemapper/mnt/f00ba4cafe12full\n")
            }
        });
        let mut executor = executor(&transport);

        match dispatch("cobbler", &Verb::Dir, &mut executor).unwrap() {
            Outcome::Text(dir) => {
                assert_eq!(dir, "/var/lib/docker/devicemapper/mnt/f00ba4cafe12full/rootfs");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(transport.calls()[1].contains("ls -d /var/lib/docker/devicemapper/mnt/f00ba4*"));
    }
}
