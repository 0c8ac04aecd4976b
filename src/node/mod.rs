//! VirtualBox master node lifecycle
//!
//! Thin wrapper over `VBoxManage` for starting and stopping the VM that
//! hosts the container fleet. Local-only; no SSH involved.

use crate::error::Result;
use crate::remote::{run_captured, Exec, Transport};

/// Default VirtualBox VM name of the master node.
pub const DEFAULT_VM: &str = "master";

/// Start the VM headless.
pub fn start(name: &str, transport: &dyn Transport) -> Result<String> {
    run_captured(
        transport,
        &Exec::new("VBoxManage").args(["startvm", name, "--type", "headless"]),
    )
}

/// Power the VM off.
pub fn stop(name: &str, transport: &dyn Transport) -> Result<String> {
    run_captured(
        transport,
        &Exec::new("VBoxManage").args(["controlvm", name, "poweroff"]),
    )
}
