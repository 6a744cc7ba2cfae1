//! AID TUI: terminal stock tracker.
//!
//! Screens:
//! 1. Companies: swipeable company cards (mouse drag or arrow keys)
//! 2. Favourites: starred companies
//! 3. Details: price chart with range picker and pointer, analytics results

mod app;
mod input;
mod theme;
mod ui;
mod worker;

use std::fs::{self, File};
use std::io::{self, stdout};
use std::path::Path;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use aid_core::config::AppConfig;
use aid_core::provider::{MarketProvider, SyntheticProvider};

use crate::app::AppState;
use crate::worker::WorkerCommand;

fn main() -> Result<()> {
    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), DisableMouseCapture, LeaveAlternateScreen);
        default_hook(info);
    }));

    let config_path = AppConfig::default_path();
    init_logging(config_path.parent().unwrap_or_else(|| Path::new(".")))?;

    let config = AppConfig::load(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;
    info!(path = %config_path.display(), "configuration loaded");

    // Worker channels
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();
    let provider: Arc<dyn MarketProvider> = Arc::new(SyntheticProvider::from_config(&config.provider));
    let worker_handle = worker::spawn_worker(cmd_rx, resp_tx, provider).context("spawning fetch worker")?;

    let mut app = AppState::new(config, cmd_tx.clone(), resp_rx);
    app.request_companies();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app);
    if let Err(e) = &result {
        error!(error = %e, "event loop failed");
    }

    // Shutdown worker
    let _ = cmd_tx.send(WorkerCommand::Shutdown);
    let _ = worker_handle.join();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("exiting");
    result
}

/// Log to `<config dir>/aid.log`; the terminal belongs to the UI.
fn init_logging(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let log_path = dir.join("aid.log");
    let file = File::create(&log_path).with_context(|| format!("creating {}", log_path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut AppState) -> Result<()> {
    loop {
        // 1. Render, then size the carousel pages to what was drawn.
        terminal.draw(|f| ui::draw(f, app))?;
        let carousel = app.hit_areas.get().carousel;
        app.carousel.set_page_width(f64::from(carousel.width));

        // 2. Drain worker responses (non-blocking)
        while let Ok(resp) = app.worker_rx.try_recv() {
            app.handle_worker_response(resp);
        }

        // 3. Poll for input events (50ms timeout for ~20 FPS tick)
        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => input::handle_key(app, key),
                Event::Mouse(mouse) => input::handle_mouse(app, mouse),
                _ => {}
            }
        }

        // 4. Settle finished animations
        app.tick(Instant::now());

        // 5. Check quit
        if !app.running {
            break;
        }
    }
    Ok(())
}
