//! Dockhand - operator's helper for the master node container fleet
//!
//! Dockhand resolves a logical container name to a handler that knows the
//! container's filesystem layout, log paths, and lifecycle commands, and
//! executes one of a small set of verbs against it on the master node VM,
//! reachable only over SSH.
//!
//! # Example
//!
//! ```no_run
//! use dockhand::docker::{dispatch, Verb};
//! use dockhand::remote::{RemoteExecutor, SystemTransport};
//! use dockhand::session::RemoteTarget;
//!
//! let transport = SystemTransport;
//! let target = RemoteTarget::new("10.20.0.2", None);
//! let mut executor = RemoteExecutor::new(target, &transport);
//! let outcome = dispatch("nailgun", &Verb::Id, &mut executor).unwrap();
//! ```

pub mod cli;
pub mod docker;
pub mod error;
pub mod node;
pub mod registry;
pub mod remote;
pub mod session;
pub mod sync;

pub use docker::{dispatch, Verb};
pub use error::{DockhandError, Result};
pub use registry::{resolve, ContainerDescriptor};
pub use remote::{Exec, Outcome, RemoteExecutor, SystemTransport, Transport};
pub use session::{RemoteTarget, SessionManager};
