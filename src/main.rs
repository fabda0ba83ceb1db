use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    sync::mpsc,
    time::{Duration, Instant},
};

use precision_timer::{
    app::App,
    app_dirs::AppDirs,
    config::{ConfigStore, FileConfigStore, GameConfig},
    logging,
    runtime::{
        spawn_terminal_reader, Cadence, ChannelEventSource, GameEvent, Runner, ThreadCadence,
        FRAME_RATE_MS, TICK_RATE_MS,
    },
    session::Session,
};

/// stop the countdown as close to zero as you dare
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal reaction game: each attempt starts a countdown, and stopping it late in the window scores points, with bonuses for hitting the last 2% and 1%."
)]
pub struct Cli {
    /// seconds on the countdown of each attempt
    #[clap(short = 't', long)]
    initial_time: Option<f64>,

    /// number of attempts per session
    #[clap(short = 'a', long)]
    max_attempts: Option<u32>,

    /// store the effective settings as the new defaults
    #[clap(long)]
    save_config: bool,

    /// config file to read (and write with --save-config)
    #[clap(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// file to write logs to
    #[clap(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// print the final session as JSON on exit
    #[clap(long)]
    print_summary: bool,
}

impl Cli {
    fn config_store(&self) -> FileConfigStore {
        match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        }
    }

    fn resolve_config<S: ConfigStore>(&self, store: &S) -> GameConfig {
        store
            .load()
            .with_overrides(self.initial_time, self.max_attempts)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let log_path = cli.log_file.clone().unwrap_or_else(AppDirs::log_path);
    if let Err(err) = logging::init_file_logging(&log_path) {
        eprintln!("warning: logging disabled ({}): {}", log_path.display(), err);
    }

    let store = cli.config_store();
    let config = cli.resolve_config(&store);
    if let Err(err) = config.validate() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::ValueValidation, err).exit();
    }
    if cli.save_config {
        store.save(&config)?;
        tracing::info!(path = %store.path().display(), "saved config");
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    spawn_terminal_reader(tx.clone());
    let cadence = ThreadCadence::new(tx, Duration::from_millis(TICK_RATE_MS));
    let mut app = App::new(Session::new(&config, cadence));
    let runner = Runner::new(
        ChannelEventSource::new(rx),
        Duration::from_millis(FRAME_RATE_MS),
    );

    let result = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result?;

    if cli.print_summary {
        println!("{}", serde_json::to_string_pretty(&app.session.snapshot())?);
    }

    Ok(())
}

fn start_tui<B: Backend, C: Cadence>(
    terminal: &mut Terminal<B>,
    app: &mut App<C>,
    runner: &Runner<ChannelEventSource>,
) -> Result<(), Box<dyn Error>> {
    draw(terminal, app)?;

    while let Some(event) = runner.step() {
        let idle_frame = event == GameEvent::Frame;
        app.handle_event(event, Instant::now());
        if app.should_quit {
            break;
        }

        if !idle_frame || app.needs_redraw() {
            draw(terminal, app)?;
        }
    }

    tracing::info!(
        score = app.session.score(),
        high_score = app.session.high_score(),
        "exiting"
    );
    Ok(())
}

fn draw<B: Backend, C: Cadence>(
    terminal: &mut Terminal<B>,
    app: &mut App<C>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| {
        app.viewport = f.area();
        f.render_widget(&*app, f.area());
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use precision_timer::config::{INITIAL_TIME, MAX_ATTEMPTS};
    use ratatui::backend::TestBackend;
    use tempfile::tempdir;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["precision-timer"]);

        assert_eq!(cli.initial_time, None);
        assert_eq!(cli.max_attempts, None);
        assert!(!cli.save_config);
        assert!(!cli.print_summary);
        assert_eq!(cli.config, None);
        assert_eq!(cli.log_file, None);
    }

    #[test]
    fn test_cli_initial_time() {
        let cli = Cli::parse_from(["precision-timer", "-t", "5"]);
        assert_eq!(cli.initial_time, Some(5.0));

        let cli = Cli::parse_from(["precision-timer", "--initial-time", "2.5"]);
        assert_eq!(cli.initial_time, Some(2.5));
    }

    #[test]
    fn test_cli_max_attempts() {
        let cli = Cli::parse_from(["precision-timer", "-a", "3"]);
        assert_eq!(cli.max_attempts, Some(3));

        let cli = Cli::parse_from(["precision-timer", "--max-attempts", "20"]);
        assert_eq!(cli.max_attempts, Some(20));
    }

    #[test]
    fn test_cli_rejects_bad_numbers() {
        assert!(Cli::try_parse_from(["precision-timer", "-a", "-1"]).is_err());
        assert!(Cli::try_parse_from(["precision-timer", "-t", "soon"]).is_err());
    }

    #[test]
    fn test_cli_flags_and_paths() {
        let cli = Cli::parse_from([
            "precision-timer",
            "--save-config",
            "--print-summary",
            "--config",
            "/tmp/pt.json",
            "--log-file",
            "/tmp/pt.log",
        ]);
        assert!(cli.save_config);
        assert!(cli.print_summary);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/pt.json")));
        assert_eq!(cli.log_file, Some(PathBuf::from("/tmp/pt.log")));
    }

    #[test]
    fn test_resolve_config_defaults_when_file_missing() {
        let dir = tempdir().unwrap();
        let cli = Cli::parse_from(["precision-timer"]);
        let store = FileConfigStore::with_path(dir.path().join("missing.json"));

        let config = cli.resolve_config(&store);
        assert_eq!(config.initial_time_secs, INITIAL_TIME);
        assert_eq!(config.max_attempts, MAX_ATTEMPTS);
    }

    #[test]
    fn test_resolve_config_cli_overrides_file() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        store
            .save(&GameConfig {
                initial_time_secs: 4.0,
                max_attempts: 6,
            })
            .unwrap();

        let cli = Cli::parse_from(["precision-timer", "-a", "2"]);
        let config = cli.resolve_config(&store);
        assert_eq!(config.initial_time_secs, 4.0);
        assert_eq!(config.max_attempts, 2);
    }

    #[test]
    fn test_config_store_uses_cli_path() {
        let cli = Cli::parse_from(["precision-timer", "--config", "/tmp/custom.json"]);
        assert_eq!(
            cli.config_store().path(),
            PathBuf::from("/tmp/custom.json").as_path()
        );
    }

    #[test]
    fn test_draw_records_viewport() {
        let backend = TestBackend::new(60, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut app = App::manual(&GameConfig::default());

        draw(&mut terminal, &mut app).unwrap();
        assert_eq!(app.viewport, ratatui::layout::Rect::new(0, 0, 60, 20));
    }
}
