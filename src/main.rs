use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use log::{info, warn};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin, Write},
    path::PathBuf,
};

use timestables::{
    app::{App, Control},
    app_dirs::AppDirs,
    config::{ConfigStore, FileConfigStore},
    game::Game,
    leaderboard::{Leaderboard, LeaderboardEntry},
    logging::init_file_logger,
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner, FRAME_INTERVAL},
    store::{KvStore, MemoryKvStore, SqliteKvStore},
    timer::SessionTimer,
    ui::format::{format_clock, format_date},
};

/// multiplication table practice with a timer and a local top-10 leaderboard
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Practice multiplication tables from 1 to 15 against the clock. Finished sessions can be saved to a ranked top-10 leaderboard stored locally."
)]
pub struct Cli {
    /// path to the leaderboard database (default: ~/.local/state/timestables/leaderboard.db)
    #[clap(long)]
    db: Option<PathBuf>,

    /// log level written to the log file; RUST_LOG takes precedence
    #[clap(long)]
    log_level: Option<String>,

    /// print the leaderboard to stdout and exit
    #[clap(long)]
    print_leaderboard: bool,

    /// remove every leaderboard entry and exit
    #[clap(long, conflicts_with = "print_leaderboard")]
    clear_leaderboard: bool,
}

impl Cli {
    fn db_path(&self) -> Option<PathBuf> {
        self.db.clone().or_else(AppDirs::db_path)
    }
}

/// Open the configured database, falling back to a throwaway in-memory store
fn open_store(path: Option<PathBuf>) -> Box<dyn KvStore> {
    match path {
        Some(path) => match SqliteKvStore::open(&path) {
            Ok(store) => {
                info!("leaderboard database at {}", path.display());
                Box::new(store)
            }
            Err(e) => {
                warn!(
                    "could not open {} ({}), scores will not be saved",
                    path.display(),
                    e
                );
                Box::new(MemoryKvStore::new())
            }
        },
        None => {
            warn!("no state directory, scores will not be saved");
            Box::new(MemoryKvStore::new())
        }
    }
}

fn write_leaderboard<W: Write>(out: &mut W, entries: &[LeaderboardEntry]) -> io::Result<()> {
    if entries.is_empty() {
        return writeln!(out, "No scores yet!");
    }
    writeln!(
        out,
        "{:>4}  {:<20}  {:>7}  {:>4}  {:>6}  date",
        "rank", "name", "score", "acc", "time"
    )?;
    for (idx, e) in entries.iter().enumerate() {
        writeln!(
            out,
            "{:>4}  {:<20}  {:>7}  {:>3}%  {:>6}  {}",
            idx + 1,
            e.player_name,
            format!("{}/{}", e.score, e.total_questions),
            e.accuracy,
            format_clock(e.time_completed),
            format_date(&e.date)
        )?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config_store = FileConfigStore::new();
    let config = config_store.load();
    let level = cli.log_level.clone().unwrap_or(config.log_level);
    if let Some(log_path) = AppDirs::log_path() {
        // best effort; the game runs without a log file
        let _ = init_file_logger(&log_path, &level);
    }

    let mut leaderboard = Leaderboard::open(open_store(cli.db_path()));

    if cli.clear_leaderboard {
        leaderboard.clear();
        println!("Leaderboard cleared.");
        return Ok(());
    }
    if cli.print_leaderboard {
        write_leaderboard(&mut io::stdout().lock(), leaderboard.entries())?;
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let mut app = App::new(Game::new(), SessionTimer::new(), leaderboard)
        .with_config_store(config_store);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let outcome = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    outcome
}

fn run_app<B: Backend, S: KvStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::new(FRAME_INTERVAL));

    loop {
        // redraw every frame so the clock keeps moving
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        match runner.step() {
            AppEvent::Key(key) => {
                if app.on_key(key) == Control::Quit {
                    break;
                }
            }
            AppEvent::Resize | AppEvent::Tick => {}
        }
    }

    app.timer.stop();
    Ok(())
}
