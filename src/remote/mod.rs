//! Remote execution over SSH
//!
//! Everything that leaves the process goes through the [`Transport`] seam,
//! so tests can substitute a scripted fake for the real ssh/rsync binaries.

pub mod executor;
pub mod transport;

pub use executor::{Outcome, RemoteExecutor};
pub use transport::{run_captured, Captured, Exec, SystemTransport, Transport};
