use std::collections::HashSet;
use std::io::Write;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::models::{Priority, Status, StatusFilter, Task};
use crate::store::{StoreError, TaskEdit, TaskStore};
use crate::Config;
use crate::utils::{default_due_date, today};

#[derive(Parser)]
#[command(name = "traker")]
#[command(about = "Task tracker with due dates, priorities and overdue tracking")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Task file to use instead of the configured one
    #[arg(short, long)]
    pub file: Option<String>,

    /// Use development mode (uses separate dev config and task file)
    #[arg(long)]
    pub dev: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch interactive TUI (default if no subcommand)
    Tui,
    /// Add a new task
    Add {
        /// Task description
        description: String,
        /// Due date (YYYY-MM-DD), defaults to the configured offset from today
        #[arg(long)]
        due: Option<String>,
        /// low, medium or high
        #[arg(long)]
        priority: Option<Priority>,
    },
    /// List tasks with their current status
    List {
        /// all, active, completed or overdue
        #[arg(long, default_value = "all")]
        filter: StatusFilter,
    },
    /// Mark tasks as completed
    Done {
        #[arg(required = true)]
        ids: Vec<u64>,
    },
    /// Delete tasks
    Delete {
        #[arg(required = true)]
        ids: Vec<u64>,
    },
    /// Edit a task; omitted fields keep their value
    Edit {
        id: u64,
        #[arg(long)]
        description: Option<String>,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
        /// low, medium or high
        #[arg(long)]
        priority: Option<Priority>,
        /// active, completed or overdue
        #[arg(long)]
        status: Option<Status>,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// Print the one-time startup warnings for a non-interactive command
pub fn report_startup(store: &TaskStore, err: &mut impl Write) -> Result<(), CliError> {
    if let Some(warning) = store.load_warning() {
        writeln!(err, "Warning: {}", warning)?;
    }
    let overdue = store.count_overdue(today());
    if overdue > 0 {
        writeln!(err, "You have {} overdue task(s)!", overdue)?;
    }
    Ok(())
}

/// Handle the add command
pub fn handle_add(
    description: String,
    due: Option<String>,
    priority: Option<Priority>,
    default_due_days: i64,
    default_priority: Priority,
    store: &mut TaskStore,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let due = due.unwrap_or_else(|| default_due_date(default_due_days));
    let task = store.add_task(&description, &due, priority.unwrap_or(default_priority))?;
    writeln!(out, "Task created successfully (ID: {})", task.id)?;
    Ok(())
}

/// Handle the list command
pub fn handle_list(filter: StatusFilter, store: &mut TaskStore, out: &mut impl Write) -> Result<(), CliError> {
    let today = today();
    store.refresh_statuses(today);
    store.flush()?;

    let tasks = store.filtered(filter, today);
    if tasks.is_empty() {
        writeln!(out, "No tasks ({})", filter)?;
        return Ok(());
    }
    write_table(&tasks, today, out)?;
    Ok(())
}

fn write_table(tasks: &[&Task], today: NaiveDate, out: &mut impl Write) -> std::io::Result<()> {
    let width = tasks
        .iter()
        .map(|t| t.description.chars().count())
        .max()
        .unwrap_or(0)
        .max("Description".len());

    writeln!(out, "{:>4}  {:<width$}  {:<10}  {:<8}  {}", "ID", "Description", "Due", "Priority", "Status")?;
    for task in tasks {
        writeln!(
            out,
            "{:>4}  {:<width$}  {:<10}  {:<8}  {}",
            task.id,
            task.description,
            task.due_date.to_string(),
            task.priority.label(),
            task.display_status(today).label(),
        )?;
    }
    Ok(())
}

/// Handle the done command
pub fn handle_done(ids: Vec<u64>, store: &mut TaskStore, out: &mut impl Write) -> Result<(), CliError> {
    let ids: HashSet<u64> = ids.into_iter().collect();
    let changed = store.mark_done(&ids)?;
    writeln!(out, "{} task(s) marked as completed", changed)?;
    Ok(())
}

/// Handle the delete command
pub fn handle_delete(ids: Vec<u64>, store: &mut TaskStore, out: &mut impl Write) -> Result<(), CliError> {
    let ids: HashSet<u64> = ids.into_iter().collect();
    let removed = store.delete_tasks(&ids)?;
    writeln!(out, "{} task(s) deleted", removed)?;
    Ok(())
}

/// Handle the edit command
pub fn handle_edit(
    id: u64,
    description: Option<String>,
    due: Option<String>,
    priority: Option<Priority>,
    status: Option<Status>,
    store: &mut TaskStore,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let current = store.get(id).ok_or(StoreError::TaskNotFound(id))?;
    let edit = TaskEdit {
        description: description.unwrap_or_else(|| current.description.clone()),
        due_date: due.unwrap_or_else(|| current.due_date.to_string()),
        priority: priority.unwrap_or(current.priority),
        status: status.unwrap_or(current.status),
    };
    store.edit_task(id, edit)?;
    writeln!(out, "Task {} updated", id)?;
    Ok(())
}

/// Run a one-shot command against `store`.
///
/// Startup warnings (unreadable record, overdue count) go to `err` before any
/// command runs, so a command never silently works on a recovered empty list.
pub fn run_command(
    command: Commands,
    config: &Config,
    store: &mut TaskStore,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<(), CliError> {
    report_startup(store, err)?;
    match command {
        // The interactive UI is started by the binary; nothing to do here
        Commands::Tui => Ok(()),
        Commands::Add { description, due, priority } => handle_add(
            description,
            due,
            priority,
            config.default_due_days,
            config.default_priority,
            store,
            out,
        ),
        Commands::List { filter } => handle_list(filter, store, out),
        Commands::Done { ids } => handle_done(ids, store, out),
        Commands::Delete { ids } => handle_delete(ids, store, out),
        Commands::Edit { id, description, due, priority, status } => {
            handle_edit(id, description, due, priority, status, store, out)
        }
    }
}
