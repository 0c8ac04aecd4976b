//! SSH session bootstrap
//!
//! Before the first captured remote command of a run, the session manager
//! checks that passwordless authentication works, and provisions the local
//! public key onto the master node when it does not. The check happens at
//! most once per process; so does the provisioning fallback.

use std::env;
use std::fs;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::error::{DockhandError, Result};
use crate::remote::{run_captured, Exec, Transport};

/// All remote operations run as root on the master node.
pub const REMOTE_USER: &str = "root";

/// Default address of the master node on the host-only network.
pub const DEFAULT_HOST: &str = "10.20.0.2";

/// OpenSSH banner fragment printed when a known_hosts entry goes stale.
/// Substring matching is a best-effort heuristic; it can miss on exotic
/// client builds, in which case the provisioning fallback runs and fails
/// loudly instead.
const HOST_KEY_CHANGED_MARKER: &str = "REMOTE HOST IDENTIFICATION HAS CHANGED";

/// The machine every remote command targets. Built once from the CLI
/// options and immutable for the process lifetime.
#[derive(Debug, Clone)]
pub struct RemoteTarget {
    pub host: String,
    /// None when the operator disabled identity-file auth.
    pub identity_file: Option<PathBuf>,
}

impl RemoteTarget {
    pub fn new(host: impl Into<String>, identity_file: Option<PathBuf>) -> Self {
        Self {
            host: host.into(),
            identity_file,
        }
    }

    /// `root@<host>`, as passed to ssh and rsync.
    pub fn login(&self) -> String {
        format!("{}@{}", REMOTE_USER, self.host)
    }

    /// Path of the public half of the identity key (`<identity>.pub`).
    pub fn public_key_file(&self) -> Option<PathBuf> {
        self.identity_file.as_ref().map(|identity| {
            let mut path = identity.clone().into_os_string();
            path.push(".pub");
            PathBuf::from(path)
        })
    }
}

/// Default identity file: `~/.ssh/id_rsa`.
pub fn default_identity_file() -> Option<PathBuf> {
    env::var_os("HOME").map(|home| PathBuf::from(home).join(".ssh").join("id_rsa"))
}

/// Captured-mode ssh command line for `command`.
pub fn ssh_command(target: &RemoteTarget, command: &str) -> Exec {
    let mut exec = Exec::new("ssh").arg(target.login());
    if let Some(identity) = &target.identity_file {
        exec = exec.arg("-i").arg(identity.display().to_string());
    }
    exec.arg("-C").arg(command)
}

/// Interactive ssh command line, pseudo-terminal forced.
pub fn ssh_interactive(target: &RemoteTarget, command: Option<&str>) -> Exec {
    let mut exec = Exec::new("ssh").arg("-t").arg(target.login());
    if let Some(identity) = &target.identity_file {
        exec = exec.arg("-i").arg(identity.display().to_string());
    }
    if let Some(command) = command {
        exec = exec.arg("-C").arg(command);
    }
    exec
}

/// Tracks whether passwordless authentication has been checked this run.
/// A memoized flag, not a state machine: there are no retries.
#[derive(Debug)]
pub struct SessionManager {
    auth_checked: bool,
}

impl SessionManager {
    /// A target without an identity file skips the bootstrap entirely; the
    /// operator's terminal handles any password prompts.
    pub fn new(target: &RemoteTarget) -> Self {
        Self {
            auth_checked: target.identity_file.is_none(),
        }
    }

    pub fn auth_checked(&self) -> bool {
        self.auth_checked
    }

    /// Make sure key-based auth works before the first captured command.
    ///
    /// Probes with password prompting disabled. On a stale host key the
    /// whole operation fails: that needs operator intervention. Any other
    /// probe failure is treated as "key not installed yet" and triggers
    /// the single provisioning attempt of this process.
    pub fn ensure_authenticated(
        &mut self,
        target: &RemoteTarget,
        transport: &dyn Transport,
    ) -> Result<()> {
        if self.auth_checked {
            return Ok(());
        }

        let probe = Exec::new("ssh")
            .args(["-o", "PasswordAuthentication=no"])
            .arg(target.login())
            .args(["echo", "1"]);

        match run_captured(transport, &probe) {
            Ok(_) => {
                debug!(host = %target.host, "passwordless auth is usable");
                self.auth_checked = true;
                Ok(())
            }
            Err(DockhandError::RemoteExecution { output, .. }) => {
                if output.contains(HOST_KEY_CHANGED_MARKER) {
                    return Err(DockhandError::HostKeyChanged);
                }
                // Key not installed yet. Provision once; the session
                // counts as checked whether or not it worked.
                self.auth_checked = true;
                provision(target, transport)
            }
            Err(e) => Err(e),
        }
    }

    /// Force the provisioning sequence regardless of the probe outcome
    /// (the `send-identity` command).
    pub fn send_identity(
        &mut self,
        target: &RemoteTarget,
        transport: &dyn Transport,
    ) -> Result<()> {
        provision(target, transport)?;
        self.auth_checked = true;
        Ok(())
    }
}

/// Install the local public key on the master node: append it to root's
/// authorized_keys, rewrite the bogus `/etc/hosts` entry for the node's own
/// address so sshd stops stalling on reverse lookups, and restart sshd.
///
/// Appending does not deduplicate; running this twice leaves two copies of
/// the key, which sshd tolerates.
pub fn provision(target: &RemoteTarget, transport: &dyn Transport) -> Result<()> {
    let key_file = target
        .public_key_file()
        .ok_or(DockhandError::IdentityMissing)?;
    let key = fs::read_to_string(&key_file)?;
    let key = key.trim();

    info!(host = %target.host, "installing public key on the master node");
    run_captured(
        transport,
        &ssh_command(
            target,
            &format!("mkdir -p ~/.ssh && echo '{key}' >> ~/.ssh/authorized_keys"),
        ),
    )?;
    run_captured(
        transport,
        &ssh_command(
            target,
            &format!("sed -i 's/^{ip} .*/{ip} localhost/' /etc/hosts", ip = target.host),
        ),
    )?;
    run_captured(transport, &ssh_command(target, "service sshd restart"))?;

    Ok(())
}
