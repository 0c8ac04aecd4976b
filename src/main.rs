//! Dockhand CLI - manage the master node's service containers over SSH

use std::os::unix::process::CommandExt;
use std::process::Command;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use dockhand::cli::{Args, NodeAction, SubCommand};
use dockhand::docker::{self, Verb};
use dockhand::node;
use dockhand::registry;
use dockhand::remote::{Outcome, RemoteExecutor, SystemTransport};
use dockhand::session::{self, RemoteTarget};
use dockhand::sync;

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> anyhow::Result<()> {
    let identity = if args.no_ssh_identity_file {
        None
    } else {
        args.ssh_identity_file
            .clone()
            .or_else(session::default_identity_file)
    };
    let target = RemoteTarget::new(args.ip.clone(), identity);
    let transport = SystemTransport;
    let mut executor = RemoteExecutor::new(target, &transport);

    match args.command {
        SubCommand::Docker { container, action } => {
            let verb = Verb::from(action);
            let outcome = docker::dispatch(&container, &verb, &mut executor)?;
            finish(outcome)
        }

        SubCommand::Info => {
            println!("{}", render_info(executor.target()));
            Ok(())
        }

        SubCommand::Puppet { modules } => {
            sync::sync_puppet_modules(&mut executor, &modules, registry::all())?;
            println!("Puppet modules synced to {}", executor.target().host);
            Ok(())
        }

        SubCommand::SendIdentity => {
            executor.send_identity()?;
            println!("Public key installed on {}", executor.target().host);
            Ok(())
        }

        SubCommand::Ssh { command } => {
            let command = if command.is_empty() {
                None
            } else {
                Some(command.join(" "))
            };
            finish(Outcome::Handoff(executor.interactive(command.as_deref())))
        }

        SubCommand::Node { action } => {
            let output = match action {
                NodeAction::Start { name } => node::start(&name, &transport)?,
                NodeAction::Stop { name } => node::stop(&name, &transport)?,
            };
            if !output.is_empty() {
                println!("{output}");
            }
            Ok(())
        }
    }
}

/// Print or hand off the dispatch outcome. A handoff replaces the current
/// process image and only returns on spawn failure.
fn finish(outcome: Outcome) -> anyhow::Result<()> {
    match outcome {
        Outcome::Done => Ok(()),
        Outcome::Text(text) => {
            println!("{text}");
            Ok(())
        }
        Outcome::Handoff(exec) => {
            debug!(command = %exec, "handing over terminal control");
            let err = Command::new(&exec.program).args(&exec.args).exec();
            Err(anyhow::Error::new(err).context(format!("failed to exec '{exec}'")))
        }
    }
}

fn render_info(target: &RemoteTarget) -> String {
    let mut output = String::new();
    output.push_str("Master node\n-----------\n");
    output.push_str(&format!("Host:     {}\n", target.host));
    output.push_str(&format!("User:     {}\n", session::REMOTE_USER));
    match &target.identity_file {
        Some(file) => output.push_str(&format!("Identity: {}\n", file.display())),
        None => output.push_str("Identity: (disabled)\n"),
    }

    output.push_str("\nContainers:\n");
    for container in registry::all() {
        output.push_str(&format!("  {}", container.name));
        if let Some(dir) = container.log_dir {
            output.push_str(&format!(" - logs: {dir}"));
        }
        output.push('\n');
        if let Some(info) = container.extra_info {
            output.push_str(&format!("      {info}\n"));
        }
    }
    output
}
