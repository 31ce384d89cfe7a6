use crate::storage::KeyValueStore;
use crate::summary::{completed_summary, pending_summary};
use crate::task::Task;
use crate::task_board::TaskBoard;
use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

/// A small task garden: plant tasks, finish them, replant them.
#[derive(Debug, Parser)]
#[command(name = "todo-garden", version, about)]
pub struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory holding the task data (overrides the config file).
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Open the interactive board (default).
    Tui,

    /// Add a pending task.
    Add {
        /// Task text; multiple words are joined with spaces.
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Print the task lists.
    List {
        /// Only show pending tasks.
        #[arg(long, conflicts_with = "completed")]
        pending: bool,
        /// Only show completed tasks.
        #[arg(long)]
        completed: bool,
    },

    /// Mark a pending task as done.
    Complete {
        /// Task id or unique id prefix.
        id: String,
    },

    /// Move a completed task back to pending.
    Restore {
        /// Task id or unique id prefix.
        id: String,
    },

    /// Delete a task from either list.
    Delete {
        /// Task id or unique id prefix.
        id: String,
    },
}

/// Runs a one-shot command against `board`, writing its output to `out`.
pub fn run<S: KeyValueStore>(
    command: Command,
    board: &mut TaskBoard<S>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match command {
        Command::Tui => bail!("the interactive board needs a terminal"),
        Command::Add { text } => match board.add_task(&text.join(" "))? {
            Some(id) => writeln!(out, "{id}")?,
            None => bail!("task text is empty"),
        },
        Command::List { pending, completed } => {
            write_lists(board, !completed, !pending, out)?;
        }
        Command::Complete { id } => {
            let id = resolve(board, &id)?;
            if !board.complete_task(&id)? {
                bail!("task {id} is not pending");
            }
        }
        Command::Restore { id } => {
            let id = resolve(board, &id)?;
            if !board.restore_task(&id)? {
                bail!("task {id} is not completed");
            }
        }
        Command::Delete { id } => {
            let id = resolve(board, &id)?;
            board.delete_task(&id)?;
        }
    }
    Ok(())
}

fn resolve<S: KeyValueStore>(board: &TaskBoard<S>, id: &str) -> anyhow::Result<String> {
    board
        .resolve_id(id)
        .with_context(|| format!("no single task matches id {id:?}"))
}

fn write_lists<S: KeyValueStore>(
    board: &TaskBoard<S>,
    show_pending: bool,
    show_completed: bool,
    out: &mut impl Write,
) -> std::io::Result<()> {
    let pending = board.pending();
    let completed = board.completed();

    if show_pending {
        writeln!(out, "{}", pending_summary(pending.len(), completed.len()))?;
        for task in pending {
            write_task(task, out)?;
        }
    }
    if show_pending && show_completed {
        writeln!(out)?;
    }
    if show_completed {
        writeln!(out, "{}", completed_summary(completed.len()))?;
        for task in completed {
            write_task(task, out)?;
        }
    }
    Ok(())
}

fn write_task(task: &Task, out: &mut impl Write) -> std::io::Result<()> {
    let short_id: String = task.id.chars().take(8).collect();
    match task.completed_date() {
        Some(done) => writeln!(out, "  [x] {short_id}  {}  (done {done})", task.text),
        None => writeln!(out, "  [ ] {short_id}  {}  ({})", task.text, task.created_date()),
    }
}
