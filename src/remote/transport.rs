//! Process transport seam
//!
//! A [`Transport`] spawns a local process and captures its combined output.
//! The production implementation blocks on `std::process`; tests use a
//! scripted stub with call recording.

use std::fmt;
use std::io;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{DockhandError, Result};

/// A command line ready to spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exec {
    pub program: String,
    pub args: Vec<String>,
}

impl Exec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for Exec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// What a captured spawn produced.
#[derive(Debug, Clone)]
pub struct Captured {
    pub success: bool,
    /// stdout followed by stderr, decoded lossily.
    pub output: String,
}

/// Spawns local processes and captures their combined output.
pub trait Transport {
    fn capture(&self, exec: &Exec) -> io::Result<Captured>;
}

/// Production transport backed by `std::process`. Blocking; there is no
/// internal timeout, cancellation is an external kill signal.
#[derive(Debug, Default)]
pub struct SystemTransport;

impl Transport for SystemTransport {
    fn capture(&self, exec: &Exec) -> io::Result<Captured> {
        debug!(command = %exec, "spawning");
        // stdin stays attached so ssh can still prompt on the terminal
        // during provisioning.
        let out = Command::new(&exec.program)
            .args(&exec.args)
            .stdin(Stdio::inherit())
            .output()?;

        let mut output = String::from_utf8_lossy(&out.stdout).into_owned();
        output.push_str(&String::from_utf8_lossy(&out.stderr));

        Ok(Captured {
            success: out.status.success(),
            output,
        })
    }
}

/// Run a command through the transport. Returns the combined output with
/// trailing whitespace trimmed; a nonzero exit becomes a typed error that
/// carries the captured output for diagnostics.
pub fn run_captured(transport: &dyn Transport, exec: &Exec) -> Result<String> {
    let captured = transport.capture(exec)?;
    let output = captured.output.trim_end().to_string();

    if captured.success {
        Ok(output)
    } else {
        Err(DockhandError::RemoteExecution {
            command: exec.to_string(),
            output,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::stub::{fail, ok, ScriptedTransport};
    use super::*;

    #[test]
    fn test_exec_display() {
        let exec = Exec::new("ssh").arg("root@10.20.0.2").args(["-C", "echo 1"]);
        assert_eq!(exec.to_string(), "ssh root@10.20.0.2 -C echo 1");
    }

    #[test]
    fn test_run_captured_trims_trailing_whitespace() {
        let transport = ScriptedTransport::new(|_| ok("abc123  \n\n"));
        let output = run_captured(&transport, &Exec::new("ssh")).unwrap();
        assert_eq!(output, "abc123");
    }

    #[test]
    fn test_run_captured_failure_carries_output() {
        let transport = ScriptedTransport::new(|_| fail("Permission denied (publickey)"));
        let err = run_captured(&transport, &Exec::new("ssh").arg("root@host")).unwrap_err();
        match err {
            DockhandError::RemoteExecution { command, output } => {
                assert_eq!(command, "ssh root@host");
                assert!(output.contains("Permission denied"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
