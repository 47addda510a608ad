//! Command dispatch
//!
//! Each handler builds the services it needs from the layered settings and
//! returns the process exit code.

use std::io;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use itertools::Itertools;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{self, Settings};
use crate::domain::{CascadeOutcome, CascadeResult, Node, NodeId};
use crate::exitcode;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;
use crate::tree_traits::ForestRender;

pub fn execute_command(cli: &Cli) -> CliResult<i32> {
    let Some(command) = &cli.command else {
        Cli::command()
            .print_help()
            .map_err(|e| InfraError::io("print help", e))?;
        return Ok(exitcode::OK);
    };

    match command {
        Commands::Tree => tree(&build_container(cli)?),
        Commands::Roots => print_ids(&build_container(cli)?.hierarchy.get_roots()?),
        Commands::Children { id } => {
            print_ids(&build_container(cli)?.hierarchy.get_children(&node_id(id))?)
        }
        Commands::Descendants { id } => {
            print_ids(&build_container(cli)?.hierarchy.get_descendants(&node_id(id))?)
        }
        Commands::Ancestors { id } => {
            print_ids(&build_container(cli)?.hierarchy.get_parent_chain(&node_id(id))?)
        }
        Commands::CheckParent { id, parent } => check_parent(&build_container(cli)?, id, parent),
        Commands::SetParent { id, parent } => {
            set_parent(&build_container(cli)?, id, parent.as_deref())
        }
        Commands::Switch { id, state } => switch(&build_container(cli)?, id, state.as_bool()),
        Commands::Cascade { id, state } => {
            let result = build_container(cli)?
                .cascade
                .cascade(&node_id(id), state.as_bool())?;
            Ok(report(&format!("cascade {}", id), &result))
        }
        Commands::Bulk { state, ids } => {
            let ids: Vec<NodeId> = ids.iter().map(|id| node_id(id)).collect();
            let result = build_container(cli)?
                .cascade
                .update_many(&ids, state.as_bool())?;
            Ok(report("bulk update", &result))
        }
        Commands::Add {
            id,
            parent,
            kind,
            off,
        } => add(
            &build_container(cli)?,
            id.as_deref(),
            parent.as_deref(),
            kind.as_deref(),
            *off,
        ),
        Commands::Remove { id } => remove(&build_container(cli)?, id),
        Commands::Config { command } => config_command(cli, command),
        Commands::Completion { shell } => completion(*shell),
    }
}

fn node_id(raw: &str) -> NodeId {
    NodeId::from(raw.trim())
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let cwd = std::env::current_dir().map_err(|e| InfraError::io("resolve working directory", e))?;
    let mut settings = Settings::load(Some(&cwd))?;
    if let Some(store) = &cli.store {
        settings.store_path = store.clone();
    }
    debug!(
        "settings: store={}, kind={}",
        settings.store_path.display(),
        settings.kind
    );
    Ok(settings)
}

fn build_container(cli: &Cli) -> CliResult<ServiceContainer> {
    Ok(ServiceContainer::new(load_settings(cli)?)?)
}

fn print_ids(ids: &[NodeId]) -> CliResult<i32> {
    for id in ids {
        output::info(id);
    }
    Ok(exitcode::OK)
}

/// Summarise a cascade; partial and total failure are reported differently.
fn report(subject: &str, result: &CascadeResult) -> i32 {
    match result.outcome() {
        CascadeOutcome::NoOp => {
            output::info(&format!("{}: nothing to update", subject));
            exitcode::OK
        }
        CascadeOutcome::Complete => {
            output::success(&format!(
                "{}: updated {} node(s)",
                subject, result.success_count
            ));
            exitcode::OK
        }
        CascadeOutcome::Partial => {
            output::warning(&format!(
                "{}: {} of {} node(s) failed",
                subject,
                result.failure_count,
                result.processed()
            ));
            for failure in &result.failures {
                output::failure(failure);
            }
            exitcode::PARTIAL
        }
        CascadeOutcome::Failed => {
            output::error(&format!(
                "{}: all {} node(s) failed",
                subject,
                result.processed()
            ));
            for failure in &result.failures {
                output::failure(failure);
            }
            exitcode::UNAVAILABLE
        }
    }
}

#[instrument(skip(c))]
fn tree(c: &ServiceContainer) -> CliResult<i32> {
    let forest = c.hierarchy.forest()?;
    if forest.is_empty() {
        output::info(&format!("no {} nodes", c.hierarchy.kind()));
        return Ok(exitcode::OK);
    }
    debug!("tree: {} nodes, depth {}", forest.len(), forest.depth());

    for tree in forest.to_trees(output::node_label) {
        print!("{}", tree);
    }

    let looped = forest.unreachable();
    if !looped.is_empty() {
        output::warning(&format!(
            "nodes caught in a parent loop: {}",
            looped.iter().join(", ")
        ));
    }
    Ok(exitcode::OK)
}

#[instrument(skip(c))]
fn check_parent(c: &ServiceContainer, id: &str, parent: &str) -> CliResult<i32> {
    let (id, parent) = (node_id(id), node_id(parent));
    if c.hierarchy.would_create_cycle(&id, &parent)? {
        output::warning(&format!("moving {} under {} would create a cycle", id, parent));
        Ok(exitcode::DATAERR)
    } else {
        output::success(&format!("{} can be moved under {}", id, parent));
        Ok(exitcode::OK)
    }
}

#[instrument(skip(c))]
fn set_parent(c: &ServiceContainer, id: &str, parent: Option<&str>) -> CliResult<i32> {
    let id = node_id(id);
    let parent = parent.map(node_id);
    c.topology.reparent(&id, parent.as_ref())?;
    match &parent {
        Some(p) => output::action("Moved", &format!("{} -> {}", id, p)),
        None => output::action("Moved", &format!("{} -> (root)", id)),
    }
    Ok(exitcode::OK)
}

#[instrument(skip(c))]
fn switch(c: &ServiceContainer, id: &str, state: bool) -> CliResult<i32> {
    let id = node_id(id);
    let result = c.cascade.switch(&id, state)?;
    output::action("Switched", &format!("{} {}", id, output::state(state)));
    Ok(report("cascade", &result))
}

#[instrument(skip(c))]
fn add(
    c: &ServiceContainer,
    id: Option<&str>,
    parent: Option<&str>,
    kind: Option<&str>,
    off: bool,
) -> CliResult<i32> {
    if c.store.init()? {
        output::action("Created", &c.store.path().display());
    }

    let id = id
        .map(node_id)
        .unwrap_or_else(|| NodeId::new(Uuid::new_v4().to_string()));
    let kind = kind.unwrap_or(&c.settings.kind);
    let mut node = Node::new(id.clone()).with_kind(kind).with_state(!off);

    if let Some(parent) = parent.map(node_id) {
        // parent links stay within the configured kind
        if kind != c.hierarchy.kind() {
            return Err(CliError::InvalidArgs(format!(
                "a {} node cannot have a parent; only {} nodes form the hierarchy",
                kind,
                c.hierarchy.kind()
            )));
        }
        if c.hierarchy.get_node(&parent)?.is_none() {
            return Err(CliError::InvalidArgs(format!("unknown parent: {}", parent)));
        }
        node = node.with_parent(parent);
    }

    c.store.insert(node)?;
    output::action("Added", &id);
    Ok(exitcode::OK)
}

#[instrument(skip(c))]
fn remove(c: &ServiceContainer, id: &str) -> CliResult<i32> {
    let id = node_id(id);
    let orphaned = c.topology.orphan_children(&id)?;
    c.store.remove(&id)?;
    output::action("Removed", &id);
    for child in orphaned {
        output::detail(&format!("{} is now a root", child));
    }
    Ok(exitcode::OK)
}

fn config_command(cli: &Cli, command: &ConfigCommands) -> CliResult<i32> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            output::header("Config files");
            match config::global_config_path() {
                Some(path) => output::detail(&format!("global: {}", path.display())),
                None => output::detail("global: (no config directory)"),
            }
            let cwd =
                std::env::current_dir().map_err(|e| InfraError::io("resolve working directory", e))?;
            output::detail(&format!(
                "local:  {}",
                config::local_config_path(&cwd).display()
            ));
            let settings = load_settings(cli)?;
            output::detail(&format!("store:  {}", settings.store_path.display()));
        }
    }
    Ok(exitcode::OK)
}

fn completion(shell: Shell) -> CliResult<i32> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(exitcode::OK)
}
