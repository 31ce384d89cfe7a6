use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::{self, OpenOptions};
use std::io::{self, Stdout};
use std::sync::Mutex;
use todo_garden::cli::{self, Cli, Command};
use todo_garden::config::GardenConfig;
use todo_garden::ui::{self, App};
use todo_garden::{FileStore, TaskBoard};
use tracing_subscriber::EnvFilter;

/// Owns the terminal while the board is on screen and puts it back on drop.
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self> {
        enable_raw_mode()?;

        let mut stdout = io::stdout();
        if let Err(err) = execute!(stdout, EnterAlternateScreen, EnableMouseCapture) {
            let _ = disable_raw_mode();
            return Err(err.into());
        }

        let backend = CrosstermBackend::new(stdout);
        match Terminal::new(backend) {
            Ok(terminal) => Ok(Self { terminal }),
            Err(err) => {
                let _ = disable_raw_mode();
                let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
                Err(err.into())
            }
        }
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        );
        let _ = self.terminal.show_cursor();
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let mut config = GardenConfig::load(args.config.as_deref())?;
    if let Some(dir) = args.data_dir.clone() {
        config.data_dir = Some(dir);
    }
    init_logging(&config);

    let store = FileStore::new(config.data_dir());
    tracing::debug!(dir = %store.dir().display(), "opening task store");
    let mut board = TaskBoard::open(store);

    match args.command.unwrap_or(Command::Tui) {
        Command::Tui => run_tui(board),
        command => cli::run(command, &mut board, &mut io::stdout().lock()),
    }
}

/// Sends `tracing` output to the log file, since the board owns the terminal.
/// Logging is skipped if the file cannot be opened.
fn init_logging(config: &GardenConfig) {
    let path = config.log_file();
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let file = match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("warning: cannot open log file {}: {}", path.display(), err);
            return;
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

fn run_tui(board: TaskBoard<FileStore>) -> Result<()> {
    let mut app = App::new(board);
    let mut session = TerminalSession::new().context("failed to set up terminal")?;
    ui::run_app(&mut session.terminal, &mut app)?;
    Ok(())
}
