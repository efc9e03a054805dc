// brokerscope - live MQTT broker topology in the terminal
// Draws nodes around their broker and animates every message as it flows

mod app;
mod engine;
mod feed;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::{
    config::{DEFAULT_FPS, DEFAULT_REPLAY_RATE, IDLE_POLL_INTERVAL},
    event::handle_key_event,
    AppConfig, AppState, FeedSource,
};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use engine::TickOutcome;
use feed::DemoConfig;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::time::Instant;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Live MQTT broker topology with animated message flow
#[derive(Parser, Debug)]
#[command(name = "brokerscope", version, about)]
struct Cli {
    /// Replay a recorded dashboard session (newline-delimited JSON)
    #[arg(long, value_name = "FILE")]
    replay: Option<PathBuf>,

    /// Replay speed in records per second (at most 10000)
    #[arg(long, default_value_t = DEFAULT_REPLAY_RATE)]
    replay_rate: f64,

    /// Number of simulated nodes in demo mode
    #[arg(long, default_value_t = 6)]
    demo_nodes: usize,

    /// Seed for the demo simulation
    #[arg(long, default_value_t = 7, env = "BROKERSCOPE_SEED")]
    seed: u64,

    /// Target frame rate
    #[arg(long, default_value_t = DEFAULT_FPS)]
    fps: u32,

    /// Log file path
    #[arg(long, default_value = "/tmp/brokerscope.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn app_config(&self) -> AppConfig {
        let feed = match &self.replay {
            Some(path) => FeedSource::Replay {
                path: path.clone(),
                rate: self.replay_rate,
            },
            None => FeedSource::Demo(DemoConfig {
                nodes: self.demo_nodes,
                seed: self.seed,
                ..DemoConfig::default()
            }),
        };
        AppConfig {
            feed,
            fps: self.fps,
        }
    }
}

/// Log to a file; stdout belongs to the TUI. The guard must live until exit
/// so buffered records are flushed.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("brokerscope={log_level}")));

    let log_dir = cli
        .log_file
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(std::path::Path::new("."));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("brokerscope.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    guard
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = setup_tracing(&cli);

    let config = cli.app_config();
    tracing::info!(?config, "starting brokerscope");

    // Build the app before touching the terminal so feed errors print normally
    let app = AppState::new(&config).context("failed to start feed")?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "brokerscope exited with an error");
        println!("Error: {:?}", err);
    }
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, mut app: AppState) -> Result<()> {
    loop {
        let now = Instant::now();
        app.pump_feed(now);
        terminal.draw(|f| ui::draw(f, &mut app, now))?;

        if !app.running {
            return Ok(());
        }

        // Sleep until the next scheduled frame, or idle-poll for input
        let timeout = match app.last_outcome {
            Some(TickOutcome::Scheduled(deadline)) => deadline.saturating_duration_since(Instant::now()),
            Some(TickOutcome::Stopped) => return Ok(()),
            Some(TickOutcome::Idle) | None => IDLE_POLL_INTERVAL,
        };

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if !handle_key_event(&mut app, key.code) {
                        return Ok(());
                    }
                }
                // The next draw lays out the new size; the engine remaps on its next tick
                Event::Resize(cols, rows) => tracing::debug!(cols, rows, "terminal resized"),
                _ => {}
            }
        }
    }
}
