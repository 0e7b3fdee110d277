//! haulboard-cli: Command-line access to shipper and trucker search.

mod output;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use haulboard_core::{paths, Config, SearchSettings, Session};
use haulboard_search::{HttpLookup, LookupService, QueryController, QueryState};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "haulboard")]
#[command(about = "Search shippers and truckers on a haulboard backend", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single search
    Search {
        /// Free text: name, unique ID, email, or phone
        query: String,

        /// Output format (table, json, plain)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Search as you type: each stdin line replaces the query, an empty line clears it
    Interactive {
        /// Reuse successful results for repeated queries
        #[arg(long)]
        cache: bool,
    },

    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Manage the saved API token
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },

    /// Print build information
    Version,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the configuration file location
    Path,
}

#[derive(Subcommand)]
enum SessionAction {
    /// Save an API token for later commands
    Login { token: String },
    /// Forget the saved token
    Logout,
    /// Show the backend and whether a token is present
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        haulboard_core::logging::init_with_level("debug");
    } else {
        haulboard_core::logging::init();
    }

    match cli.command {
        Some(Commands::Search { query, format }) => search(&query, &format).await?,
        Some(Commands::Interactive { cache }) => interactive(cache).await?,
        Some(Commands::Config { action }) => config(action)?,
        Some(Commands::Session { action }) => session(action)?,
        Some(Commands::Version) => {
            println!(
                "{}",
                haulboard_core::build_info::BUILD_INFO.version_line("haulboard")
            );
        }
        None => {
            println!("haulboard v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

fn connect(config: &Config) -> Result<HttpLookup> {
    let lookup = HttpLookup::new(Session::from_config(config)?, config.api.timeout())?;
    tracing::debug!("Using {:?}", lookup.session());
    Ok(lookup)
}

async fn search(query: &str, format: &str) -> Result<()> {
    let config = Config::load_or_default()?;
    // Nothing to coalesce for a single query.
    let settings = SearchSettings {
        debounce: Duration::ZERO,
        cache_results: false,
    };
    let controller = QueryController::new(connect(&config)?, settings);

    match run_once(&controller, query).await {
        QueryState::Success(results) => output::print_results(&results, format)?,
        QueryState::Error(message) => bail!("Search failed: {message}"),
        QueryState::Idle | QueryState::Loading => println!("No query"),
    }

    Ok(())
}

/// Submit one query and wait until it settles.
async fn run_once<L: LookupService>(controller: &QueryController<L>, query: &str) -> QueryState {
    let mut rx = controller.subscribe();
    controller.set_query(query);

    loop {
        let state = rx.borrow_and_update().clone();
        match state {
            QueryState::Success(_) | QueryState::Error(_) => return state,
            QueryState::Idle if query.trim().is_empty() => return state,
            _ => {}
        }
        if rx.changed().await.is_err() {
            return controller.current_state();
        }
    }
}

async fn interactive(cache: bool) -> Result<()> {
    let config = Config::load_or_default()?;
    let mut settings = config.search.settings();
    settings.cache_results |= cache;
    let controller = QueryController::new(connect(&config)?, settings);
    tracing::debug!("Interactive search with {:?}", controller.settings());

    let mut rx = controller.subscribe();
    let printer = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            println!("{}", output::describe_state(&state));
        }
    });

    eprintln!("Type to search; an empty line clears, Ctrl-D exits.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            controller.clear();
        } else {
            controller.set_query(line);
        }
    }

    // Give the last query a chance to settle before shutting down.
    let debounce = controller.settings().debounce;
    let settle = debounce + config.api.timeout();
    let mut rx = controller.subscribe();
    let _ = tokio::time::timeout(settle, async {
        tokio::time::sleep(debounce).await;
        while rx.borrow_and_update().is_loading() {
            if rx.changed().await.is_err() {
                break;
            }
        }
    })
    .await;

    // Disposing aborts every lookup still running, which drops the last
    // state sender and ends the printer.
    controller.dispose();
    drop(controller);
    let _ = printer.await;
    Ok(())
}

fn config(action: ConfigAction) -> Result<()> {
    let path = paths::config_path();

    match action {
        ConfigAction::Show => {
            let config = Config::load_or_default()?;
            let source = if path.exists() {
                path.display().to_string()
            } else {
                "built-in defaults".to_string()
            };
            println!("# {source}");
            print!(
                "{}",
                toml::to_string_pretty(&config).context("Failed to render config")?
            );
        }
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            Config::default().save(&path)?;
            println!("Wrote {}", path.display());
        }
        ConfigAction::Path => println!("{}", path.display()),
    }

    Ok(())
}

fn session(action: SessionAction) -> Result<()> {
    let config = Config::load_or_default()?;

    match action {
        SessionAction::Login { token } => {
            let session = Session::new(config.api.base_url.clone(), Some(token));
            if !session.is_authenticated() {
                bail!("Token must not be empty");
            }
            session.save()?;
            println!("Saved token for {}", session.base_url());
        }
        SessionAction::Logout => {
            if Session::clear_saved()? {
                println!("Saved token removed");
            } else {
                println!("No saved token");
            }
        }
        SessionAction::Show => {
            let session = Session::from_config(&config)?;
            println!("Backend: {}", session.base_url());
            println!(
                "Token:   {}",
                if session.is_authenticated() {
                    "present"
                } else {
                    "none"
                }
            );
        }
    }

    Ok(())
}
