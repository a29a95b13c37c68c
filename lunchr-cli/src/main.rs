//! `lunchr`: today's lunch menus in the terminal.

mod app;
mod input;
mod report;
mod ui;

use std::{io, sync::Arc, time::Duration};

use anyhow::Result;
use clap::{Parser, ValueEnum};
use crossterm::{
    event::{self, Event as CEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ipnet::IpNet;
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use lunchr_core::{
    CacheStore, EngineConfig, LunchService, MemoryStore, MenuOutcome, MenuRequest, Orchestrator,
    SortOrder, SourceRegistry,
};

use crate::app::App;
use crate::input::Action;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    /// Restaurants with a menu first, failures last
    Failure,
    /// Fastest restaurants first
    Elapsed,
    /// Alphabetically
    Title,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Failure => SortOrder::Failure,
            SortArg::Elapsed => SortOrder::Elapsed,
            SortArg::Title => SortOrder::Title,
        }
    }
}

/// Command-line arguments for lunchr
#[derive(Parser, Debug)]
#[command(name = "lunchr")]
#[command(about = "Today's lunch menus of nearby restaurants")]
#[command(version)]
struct Args {
    /// Only collect these restaurants (comma separated ids, see --list)
    #[arg(long, value_delimiter = ',', env = "LUNCHR_ONLY")]
    only: Vec<String>,

    /// Order of the restaurants
    #[arg(long, value_enum, default_value_t = SortArg::Failure)]
    sort: SortArg,

    /// Print the menus and exit instead of opening the terminal UI
    #[arg(long)]
    plain: bool,

    /// Refetch even if today's menus are cached
    #[arg(long)]
    refresh: bool,

    /// List the bundled restaurants and exit
    #[arg(long)]
    list: bool,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 20, env = "LUNCHR_TIMEOUT")]
    timeout: u64,

    /// Minimum number of seconds between two refetches
    #[arg(long, default_value_t = 180, env = "LUNCHR_THROTTLE_SECS")]
    throttle_secs: u64,

    /// Client networks not counted as visits (defaults to loopback)
    #[arg(long, value_delimiter = ',', env = "LUNCHR_EXCLUDE")]
    exclude: Vec<IpNet>,

    /// Redis server holding the daily cache, e.g. redis://localhost/
    #[cfg(feature = "redis")]
    #[arg(long, env = "LUNCHR_REDIS_URL")]
    redis_url: Option<String>,
}

impl Args {
    fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig {
            fetch_timeout: Duration::from_secs(self.timeout),
            throttle_window: Duration::from_secs(self.throttle_secs),
            ..EngineConfig::default()
        };
        if !self.exclude.is_empty() {
            config.excluded_networks.clone_from(&self.exclude);
        }
        config
    }
}

fn init_tracing(plain: bool) {
    // The terminal UI owns the screen; only log there when explicitly asked to.
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) if plain => EnvFilter::new("lunchr=info,lunchr_core=info,lunchr_sources=info"),
        Err(_) => EnvFilter::new("off"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(io::stderr))
        .init();
}

#[cfg(feature = "redis")]
async fn open_store(args: &Args) -> Result<Arc<dyn CacheStore>> {
    if let Some(url) = &args.redis_url {
        let store = lunchr_core::RedisStore::connect(url).await?;
        tracing::info!(url, "using redis cache store");
        return Ok(Arc::new(store));
    }
    Ok(Arc::new(MemoryStore::new()))
}

#[cfg(not(feature = "redis"))]
#[expect(clippy::unused_async, reason = "matches the signature of the redis variant")]
async fn open_store(_args: &Args) -> Result<Arc<dyn CacheStore>> {
    Ok(Arc::new(MemoryStore::new()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.list {
        for source in lunchr_sources::default_registry().all() {
            println!("{:<18} {}  {}", source.id.0, source.title, source.url);
        }
        return Ok(());
    }

    init_tracing(args.plain);

    // Registry + service setup
    let config = args.engine_config();
    let registry = restrict(lunchr_sources::default_registry(), &args.only);
    tracing::debug!(sources = registry.len(), "registry ready");
    let orchestrator = Orchestrator::new(&config)?;
    let store = open_store(&args).await?;
    let service = Arc::new(LunchService::new(
        Arc::new(registry),
        orchestrator,
        store,
        &config,
    ));

    let first_request = MenuRequest {
        refresh: args.refresh,
        client: None,
    };

    if args.plain {
        return run_plain(&service, first_request, args.sort.into()).await;
    }

    // App state
    let mut app = App::new(Arc::clone(&service), args.sort.into());

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run event loop
    let res = match load(&mut terminal, &mut app, first_request).await {
        Ok(()) => run(&mut terminal, app).await,
        Err(err) => Err(err),
    };

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

/// Apply `--only`; unknown ids are ignored and an allow-list that matches
/// nothing leaves every restaurant in.
fn restrict(registry: SourceRegistry, only: &[String]) -> SourceRegistry {
    let restricted = registry.restricted(Some(only));
    if restricted.is_empty() {
        if !only.is_empty() {
            tracing::warn!(only = %only.join(","), "no restaurant matches --only, showing all");
        }
        return registry;
    }
    restricted
}

async fn run_plain(service: &LunchService, request: MenuRequest, sort: SortOrder) -> Result<()> {
    match service.today(request).await? {
        MenuOutcome::Menus(mut daily) => {
            lunchr_core::sort_menus(&mut daily.menus, sort);
            print!("{}", report::render(&daily));
        }
        MenuOutcome::Throttled => {
            println!("Menus were refreshed a moment ago, try again in a few minutes.");
        }
    }
    Ok(())
}

type Term = Terminal<CrosstermBackend<io::Stdout>>;

/// Ask the service for today's menus while showing the loading state.
async fn load(terminal: &mut Term, app: &mut App, request: MenuRequest) -> Result<()> {
    app.is_loading = true;
    app.error_message = None;
    terminal.draw(|frame| ui::draw(frame, app))?;

    let res = app.service.today(request).await;

    app.is_loading = false;
    match res {
        Ok(outcome) => app.apply(outcome),
        Err(err) => app.error_message = Some(format!("Failed to load menus: {err}")),
    }
    Ok(())
}

async fn run(terminal: &mut Term, mut app: App) -> Result<()> {
    loop {
        // Draw current UI
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Poll for input (non-blocking, small timeout to keep CPU low)
        if event::poll(Duration::from_millis(100))?
            && let CEvent::Key(key) = event::read()?
        {
            match input::handle_key_event(key, &mut app) {
                Action::Quit => break,
                Action::None => {}
                Action::Refresh => {
                    let request = MenuRequest {
                        refresh: true,
                        client: None,
                    };
                    load(terminal, &mut app, request).await?;
                }
            }
        }
    }

    Ok(())
}
