use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use color_eyre::Result;
use crossterm::event::{Event as CEvent, EventStream};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use futures::StreamExt;
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, error, info};

use travelform::config::Config;
use travelform::core::FormSubmission;
use travelform::services::{FileLoader, LoadEvent};
use travelform::tui::App;
use travelform::Side;

/// Fill in the inputs for a travel-time analysis and print them as JSON
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable file logging at the given level (overrides RUST_LOG)
    #[arg(long = "logging", value_enum)]
    logging: Option<LogLevel>,
    /// Log file path (defaults to travelform.log in the working directory)
    #[arg(long = "log-file", value_name = "PATH")]
    log_file: Option<PathBuf>,
    /// Path to a config file (overrides default config discovery)
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf>,
    /// Origin file to load on startup
    #[arg(long = "origin", value_name = "PATH")]
    origin: Option<PathBuf>,
    /// Destination file to load on startup
    #[arg(long = "destination", value_name = "PATH")]
    destination: Option<PathBuf>,
    /// Write the submitted form here instead of stdout
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    output: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    travelform::logging::init_with(args.log_file.clone(), args.logging.map(Into::into))?;

    let cfg = Config::from_path(args.config.as_ref())?;
    let (tx, rx) = mpsc::unbounded_channel();
    let mut app = App::new(&cfg.form, FileLoader::new(tx));
    app.set_theme(cfg.theme());
    app.set_keybindings(cfg.keybindings());

    if let Some(path) = &args.origin {
        app.open_file(Side::Origin, path);
    }
    if let Some(path) = &args.destination {
        app.open_file(Side::Destination, path);
    }

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, rx).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = res {
        error!("Error: {e}");
        return Err(e);
    }

    match app.take_submission() {
        Some(submission) => write_submission(&submission, args.output.as_ref())?,
        None => info!("Exited without submitting"),
    }
    Ok(())
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    mut loads: UnboundedReceiver<LoadEvent>,
) -> Result<()> {
    let mut events = EventStream::new();
    let mut tick = tokio::time::interval(Duration::from_millis(250));

    loop {
        terminal.draw(|f| app.render(f))?;

        tokio::select! {
            maybe_event = events.next() => match maybe_event {
                Some(Ok(CEvent::Key(key))) => app.handle_key_event(key)?,
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => break,
            },
            Some(load) = loads.recv() => {
                let outcome = app.handle_load_event(load);
                debug!("Load finished: {:?}", outcome);
            }
            _ = tick.tick() => app.update()?,
        }

        if app.should_quit() {
            break;
        }
    }
    Ok(())
}

fn write_submission(submission: &FormSubmission, output: Option<&PathBuf>) -> Result<()> {
    let json = submission.to_json()?;
    match output {
        Some(path) => {
            std::fs::write(path, format!("{json}\n"))?;
            info!("Submission written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
