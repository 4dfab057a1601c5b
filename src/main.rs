use clap::{Parser, Subcommand};
use colored::{ColoredString, Colorize};
use eyre::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use taskboard::config::{self, EXPORT_FILE_NAME, STORE_PATH_ENV};
use taskboard::models::parse_tags;
use taskboard::{Board, Priority, SqliteStorage, TagHighlight, Task, TaskDraft, TaskPatch, codec};

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(about = "Taskboard CLI - local kanban board with JSON import/export")]
#[command(version)]
struct Cli {
    /// Directory holding the board (default: user data directory)
    #[arg(short, long, env = STORE_PATH_ENV)]
    store_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the board, column by column
    List {
        /// Highlight tasks with this tag (repeatable); others are dimmed
        #[arg(short, long)]
        tag: Vec<String>,
    },

    /// Add a task to the end of a column
    Add {
        title: String,
        #[arg(short, long, default_value = "To Do")]
        status: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// Low, Medium or High
        #[arg(short, long, default_value = "")]
        priority: String,
        /// Due date (YYYY-MM-DD)
        #[arg(long, default_value = "")]
        due: String,
        /// Semicolon-separated tags, e.g. "work;urgent"
        #[arg(long, default_value = "")]
        tags: String,
    },

    /// Change fields of a task
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Set the column name only; ranks are not adjusted (use `move` to change columns)
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        tags: Option<String>,
    },

    /// Delete a task
    Delete { id: String },

    /// Move a task to a position in a column
    Move { id: String, status: String, index: usize },

    /// Move the task at one position of a column to another
    Reorder { status: String, from: usize, to: usize },

    /// Remove all Done tasks and write them to a file
    Archive {
        /// Output file ("-" for stdout; default archived-tasks-<date>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace the board with tasks from a JSON file
    Import { file: PathBuf },

    /// Write the board to a JSON file
    Export {
        /// Output file ("-" for stdout)
        #[arg(short, long, default_value = EXPORT_FILE_NAME)]
        output: PathBuf,
    },

    /// Delete every task and the stored board
    Reset,
}

fn main() -> Result<()> {
    // Setup tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let mutates = cli.command.mutates();
    let store_path = cli.store_path.unwrap_or_else(config::default_store_dir);
    let storage = SqliteStorage::open(&store_path)?;
    let mut board = Board::open(storage);

    match cli.command {
        Commands::List { tag } => {
            let highlight: TagHighlight = tag.iter().collect();
            print_board(&board, &highlight);
        }
        Commands::Add {
            title,
            status,
            description,
            priority,
            due,
            tags,
        } => {
            let id = board.add(TaskDraft {
                title,
                description,
                status,
                priority: Priority::parse(&priority),
                due_date: due,
                tags: parse_tags(&tags),
            });
            println!("Added task {}", id);
        }
        Commands::Update {
            id,
            title,
            description,
            status,
            priority,
            due,
            tags,
        } => {
            let patch = TaskPatch {
                title,
                description,
                status,
                priority: priority.as_deref().map(Priority::parse),
                due_date: due,
                tags: tags.as_deref().map(parse_tags),
                order: None,
            };
            report(board.update(&id, patch), &id, "Updated");
        }
        Commands::Delete { id } => {
            report(board.delete(&id), &id, "Deleted");
        }
        Commands::Move { id, status, index } => {
            if board.get(&id).is_none() {
                println!("No task with id {}", id);
            } else if board.move_task(&id, &status, index) {
                println!("Moved task {} to {} at position {}", id, status, index);
            } else {
                println!("Task {} is already there", id);
            }
        }
        Commands::Reorder { status, from, to } => {
            if board.reorder_task(&status, from, to) {
                println!("Reordered {}", status);
            } else {
                println!("Nothing to reorder");
            }
        }
        Commands::Archive { output } => {
            let output = output
                .unwrap_or_else(|| PathBuf::from(config::archive_file_name(chrono::Local::now().date_naive())));
            // Done tasks leave the board only after the archive file is written
            let archived = board.archive_done_with(|tasks| write_tasks(&output, tasks))?;
            if archived.is_empty() {
                println!("No Done tasks to archive");
            } else if !is_stdout(&output) {
                println!("Archived {} tasks to {}", archived.len(), output.display());
            }
        }
        Commands::Import { file } => {
            let raw = fs::read_to_string(&file).with_context(|| format!("Failed to read {}", file.display()))?;
            let loaded = board.load_from_json_with_progress(&raw, |current, total| {
                println!("Importing... {}/{}", current, total);
            });
            if loaded == 0 {
                println!("No tasks found in {}, board unchanged", file.display());
            } else {
                println!("Imported {} tasks", loaded);
            }
        }
        Commands::Export { output } => {
            write_tasks(&output, board.tasks())?;
            if !is_stdout(&output) {
                println!("Exported {} tasks to {}", board.len(), output.display());
            }
        }
        Commands::Reset => {
            board.reset();
            println!("Board reset");
            return Ok(());
        }
    }

    if mutates { board.close() } else { Ok(()) }
}

impl Commands {
    /// Whether the command can change the board and needs a final save
    fn mutates(&self) -> bool {
        !matches!(self, Commands::List { .. } | Commands::Export { .. })
    }
}

fn report(found: bool, id: &str, verb: &str) {
    if found {
        println!("{} task {}", verb, id);
    } else {
        println!("No task with id {}", id);
    }
}

fn is_stdout(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// Write tasks in the exchange format to a file, or stdout for "-"
fn write_tasks(path: &Path, tasks: &[Task]) -> Result<()> {
    if is_stdout(path) {
        println!("{}", codec::encode(tasks)?);
        return Ok(());
    }
    codec::write_file(path, tasks)
}

fn print_board(board: &Board<SqliteStorage>, highlight: &TagHighlight) {
    for column in board.columns() {
        println!("{} ({})", column.name.bold(), column.tasks.len());
        for (position, task) in column.tasks.iter().enumerate() {
            let line = format_task(position, task);
            if highlight.is_dimmed(task) {
                println!("  {}", line.dimmed());
            } else {
                println!("  {}", line);
            }
        }
        println!();
    }
}

fn format_task(position: usize, task: &Task) -> String {
    let mut line = format!("{}. {}", position, task.title);
    if task.priority != Priority::None {
        line.push_str(&format!(" [{}]", priority_label(task.priority)));
    }
    if !task.due_date.is_empty() {
        line.push_str(&format!(" due {}", task.due_date));
    }
    for tag in &task.tags {
        line.push_str(&format!(" #{}", tag));
    }
    line.push_str(&format!(" {}", task.id.dimmed()));
    line
}

fn priority_label(priority: Priority) -> ColoredString {
    match priority {
        Priority::High => priority.as_str().red(),
        Priority::Medium => priority.as_str().yellow(),
        Priority::Low => priority.as_str().green(),
        Priority::None => "".normal(),
    }
}
