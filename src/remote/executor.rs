//! Captured and interactive remote execution

use tracing::debug;

use crate::error::Result;
use crate::remote::transport::{run_captured, Exec, Transport};
use crate::session::{self, RemoteTarget, SessionManager};

/// What a dispatched command asks the caller to do next.
///
/// Interactive verbs never run to completion inside the library: they hand
/// back the command line that should replace the current process, so
/// callers (and tests) can intercept the handoff.
#[derive(Debug)]
pub enum Outcome {
    /// Side effects finished, nothing left to print.
    Done,
    /// Print this and exit normally.
    Text(String),
    /// Replace the current process image with this command.
    Handoff(Exec),
}

/// Runs one-shot commands on the master node and builds interactive
/// session command lines. Owns the per-process session state.
pub struct RemoteExecutor<'t> {
    target: RemoteTarget,
    session: SessionManager,
    transport: &'t dyn Transport,
}

impl<'t> RemoteExecutor<'t> {
    pub fn new(target: RemoteTarget, transport: &'t dyn Transport) -> Self {
        let session = SessionManager::new(&target);
        Self {
            target,
            session,
            transport,
        }
    }

    pub fn target(&self) -> &RemoteTarget {
        &self.target
    }

    /// Probe (and if needed provision) passwordless auth. No-op after the
    /// first call in this process.
    pub fn ensure_authenticated(&mut self) -> Result<()> {
        self.session.ensure_authenticated(&self.target, self.transport)
    }

    /// Run `command` on the master node, returning its combined output with
    /// trailing whitespace trimmed.
    pub fn run(&mut self, command: &str) -> Result<String> {
        self.ensure_authenticated()?;
        debug!(host = %self.target.host, command, "remote command");
        run_captured(self.transport, &session::ssh_command(&self.target, command))
    }

    /// Run a local command (rsync, asset build) through the same transport
    /// seam. No auth bootstrap.
    pub fn run_local(&self, exec: &Exec) -> Result<String> {
        debug!(command = %exec, "local command");
        run_captured(self.transport, exec)
    }

    /// Build the interactive session command for a handoff, optionally
    /// running `command` instead of a login shell. Skips the auth
    /// bootstrap: the operator's terminal handles any password prompt.
    pub fn interactive(&self, command: Option<&str>) -> Exec {
        session::ssh_interactive(&self.target, command)
    }

    /// Force the provisioning sequence (the `send-identity` command).
    pub fn send_identity(&mut self) -> Result<()> {
        self.session.send_identity(&self.target, self.transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::transport::stub::{ok, ScriptedTransport};

    fn anon_target() -> RemoteTarget {
        // No identity file: the session counts as checked from the start.
        RemoteTarget::new("10.20.0.2", None)
    }

    #[test]
    fn test_run_round_trips_canned_output() {
        let transport = ScriptedTransport::new(|_| ok("abc123  mcollective  Up 2 days \n"));
        let mut executor = RemoteExecutor::new(anon_target(), &transport);

        let output = executor.run("docker ps -a").unwrap();
        assert_eq!(output, "abc123  mcollective  Up 2 days");
        assert_eq!(
            transport.calls()[0],
            "ssh root@10.20.0.2 -C docker ps -a"
        );
    }

    #[test]
    fn test_interactive_is_a_value_not_a_side_effect() {
        let transport = ScriptedTransport::new(|_| ok(""));
        let executor = RemoteExecutor::new(anon_target(), &transport);

        let exec = executor.interactive(Some("bash"));
        assert_eq!(exec.to_string(), "ssh -t root@10.20.0.2 -C bash");
        // Building the handoff must not touch the transport.
        assert_eq!(transport.call_count(), 0);
    }
}
