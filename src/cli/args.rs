//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::docker::Verb;
use crate::node::DEFAULT_VM;
use crate::session::DEFAULT_HOST;

#[derive(Parser)]
#[command(name = "dockhand")]
#[command(author, version, about = "Manage the service containers of the master node VM", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: SubCommand,

    /// Address of the master node
    #[arg(long, global = true, default_value = DEFAULT_HOST)]
    pub ip: String,

    /// SSH identity file for passwordless login (default: ~/.ssh/id_rsa)
    #[arg(long, global = true, value_name = "FILE")]
    pub ssh_identity_file: Option<PathBuf>,

    /// Do not use an identity file; the terminal handles auth prompts
    #[arg(long, global = true, conflicts_with = "ssh_identity_file")]
    pub no_ssh_identity_file: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum SubCommand {
    /// Run a verb against one of the service containers
    Docker {
        /// Logical container name (see `info` for the catalog)
        #[arg(long, short)]
        container: String,

        #[command(subcommand)]
        action: DockerAction,
    },

    /// Print the remote target and the container catalog
    Info,

    /// Sync puppet modules to the master node and into running containers
    Puppet {
        /// Local puppet module sources
        #[arg(long, default_value = "puppet/modules")]
        modules: PathBuf,
    },

    /// Install the local public key on the master node
    SendIdentity,

    /// Open an interactive SSH session on the master node
    Ssh {
        /// Optional command to run instead of a login shell
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Start or stop the VirtualBox master node VM
    Node {
        #[command(subcommand)]
        action: NodeAction,
    },
}

/// Container verbs; mirrored onto `docker::Verb` for dispatch.
#[derive(Subcommand)]
pub enum DockerAction {
    /// Print the container's current runtime ID
    Id,
    /// Pretty-print the container's runtime configuration
    Config,
    /// Print the container's root filesystem directory on the host
    Dir,
    /// Print the tail of the container's log files
    Log {
        /// Number of lines to fetch
        #[arg(short = 'n', long, default_value_t = 100)]
        lines: usize,

        /// Log names without the .log suffix (default: all)
        names: Vec<String>,
    },
    /// Follow the container's log files in the terminal
    Tail {
        /// Log names without the .log suffix (default: all)
        names: Vec<String>,
    },
    /// Restart the container
    Restart,
    /// Start the container
    Start,
    /// Stop the container
    Stop,
    /// Open an interactive shell inside the container
    Shell,
    /// Sync source trees into the container and restart it
    Rsync,
    /// Build the static-asset bundle and sync it into the container
    RsyncStatic,
    /// Print the volumes section of the runtime configuration
    Volumes,
}

impl From<DockerAction> for Verb {
    fn from(action: DockerAction) -> Self {
        match action {
            DockerAction::Id => Verb::Id,
            DockerAction::Config => Verb::Config,
            DockerAction::Dir => Verb::Dir,
            DockerAction::Log { lines, names } => Verb::Log { lines, names },
            DockerAction::Tail { names } => Verb::Tail { names },
            DockerAction::Restart => Verb::Restart,
            DockerAction::Start => Verb::Start,
            DockerAction::Stop => Verb::Stop,
            DockerAction::Shell => Verb::Shell,
            DockerAction::Rsync => Verb::Rsync,
            DockerAction::RsyncStatic => Verb::RsyncStatic,
            DockerAction::Volumes => Verb::Volumes,
        }
    }
}

#[derive(Subcommand)]
pub enum NodeAction {
    /// Start the VM headless
    Start {
        /// VirtualBox VM name
        #[arg(long, default_value = DEFAULT_VM)]
        name: String,
    },
    /// Power the VM off
    Stop {
        /// VirtualBox VM name
        #[arg(long, default_value = DEFAULT_VM)]
        name: String,
    },
}
