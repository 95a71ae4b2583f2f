//! Agrar Dashboard - Harvest readiness from live weather
//!
//! A terminal UI application that fetches current weather and the forecast
//! for a location and shows whether field crops can be harvested today and
//! tomorrow.

use std::fs::{self, OpenOptions};
use std::io;
use std::panic;
use std::path::Path;
use std::process;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use agrardash::app::App;
use agrardash::cache::LocationCache;
use agrardash::cli::{Cli, StartupConfig};
use agrardash::data::{WeatherClient, WeatherGateway};
use agrardash::refresh::{try_recv, RefreshConfig, RefreshHandle, RefreshMessage};
use agrardash::ui;

/// Filter used when RUST_LOG is not set
const DEFAULT_LOG_FILTER: &str = "agrardash=info";

/// Log file name inside the cache directory
const LOG_FILE: &str = "agrardash.log";

/// Upper bound for a single weather request
const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// Installs the tracing subscriber
///
/// One-shot mode logs to stderr. The dashboard logs to a file so output
/// never lands on the alternate screen.
fn init_logging(once: bool, log_dir: &Path) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    if once {
        registry.with(fmt::layer().with_writer(io::stderr)).init();
        return;
    }

    let file = fs::create_dir_all(log_dir).and_then(|_| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_dir.join(LOG_FILE))
    });
    match file {
        Ok(file) => registry
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .init(),
        Err(_) => registry.with(fmt::layer().with_writer(io::sink)).init(),
    }
}

/// Sets up a panic hook that restores the terminal before printing the panic message.
/// This ensures the terminal is usable even if the application panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Attempt to restore the terminal
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}

/// Fetches once, prints the report and exits non-zero without data
async fn run_once(mut app: App, gateway: Arc<dyn WeatherGateway>) {
    if let Some(request) = app.request_load(false) {
        let result = gateway.fetch(&request.location.query).await;
        app.apply_fetch(request, result);
    }

    print!("{}", ui::render_text(&app));

    if app.report.is_none() {
        process::exit(1);
    }
}

/// Runs the interactive dashboard until the user quits
async fn run_dashboard(
    mut app: App,
    gateway: Arc<dyn WeatherGateway>,
    refresh_interval: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    setup_panic_hook();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut refresh = RefreshHandle::spawn(
        RefreshConfig {
            interval: refresh_interval,
            enabled: true,
        },
        gateway,
    );

    app.reload(false);

    // Main event loop
    loop {
        while let Some(message) = try_recv(&mut refresh) {
            match message {
                RefreshMessage::Fetched { request, result } => {
                    app.apply_fetch(request, result);
                }
                RefreshMessage::AutoRefreshTick => app.on_auto_refresh(),
            }
        }

        if let Some(request) = app.take_pending_fetch() {
            refresh.dispatch(request);
        }

        terminal.draw(|f| ui::render(f, &app))?;

        // Poll for keyboard events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    refresh.shutdown().await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(2);
        }
    };

    let cache = LocationCache::new();
    init_logging(config.once, cache.dir());
    tracing::info!(
        location = %config.location.query,
        cache_dir = %cache.dir().display(),
        "starting agrardash"
    );

    let http = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;
    let gateway: Arc<dyn WeatherGateway> = Arc::new(
        WeatherClient::with_client(http, config.endpoint.clone())
            .with_forecast_days(config.forecast_days),
    );
    let app = App::with_parts(&config, cache, StdRng::from_entropy());

    if config.once {
        run_once(app, gateway).await;
        return Ok(());
    }

    run_dashboard(app, gateway, config.refresh_interval).await
}
