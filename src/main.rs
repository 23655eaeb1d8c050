//! Cadastro CEP service entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use strum::IntoEnumIterator;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cadastro_cep::api::{create_router, AppState};
use cadastro_cep::config::Config;
use cadastro_cep::lookup::{Cep, CepLookup, LookupOutcome, ViaCepClient};
use cadastro_cep::metrics;
use cadastro_cep::store::{RecordKind, RecordStore};
use cadastro_cep::utils::shutdown_signal;

/// Cliente and endereço registry enriched by CEP lookup.
#[derive(Parser, Debug)]
#[command(name = "cadastro-cep")]
#[command(about = "HTTP service storing clientes and endereços resolved from a CEP")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP server port (overrides PORT).
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Serve {
        /// HTTP server port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration validity.
    CheckConfig,

    /// Create the database file and tables, then exit.
    InitDb,

    /// Resolve one CEP against the provider (diagnostic).
    Lookup {
        /// CEP, with or without the hyphen.
        cep: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging from RUST_LOG / VERBOSE, falling back to defaults
    let env = Config::load().unwrap_or_default();
    let filter = if args.verbose || env.verbose {
        EnvFilter::new("cadastro_cep=debug,info")
    } else {
        EnvFilter::try_new(&env.rust_log).unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // Handle subcommands
    match args.command {
        Some(Command::CheckConfig) => cmd_check_config().await,
        Some(Command::InitDb) => cmd_init_db().await,
        Some(Command::Lookup { cep }) => cmd_lookup(&cep).await,
        Some(Command::Serve { port }) => cmd_serve(port.or(args.port)).await,
        None => cmd_serve(args.port).await,
    }
}

fn load_config() -> anyhow::Result<Config> {
    let config = Config::load()?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;
    Ok(config)
}

/// Check configuration validity.
async fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("CADASTRO CEP - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("\n1. Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(e.into());
        }
    };

    print!("\n2. Validating configuration... ");
    if let Err(e) = config.validate() {
        println!("FAILED");
        println!("  Error: {}", e);
        return Err(anyhow::anyhow!(e));
    }
    println!("OK");

    print!("\n3. Building CEP client... ");
    if let Err(e) = ViaCepClient::new(&config) {
        println!("FAILED");
        println!("  Error: {}", e);
        return Err(e.into());
    }
    println!("OK");

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Database: {}", config.database_url);
    println!("  Pool Size: {}", config.db_max_connections);
    println!("  CEP Provider: {}", config.lookup_base());
    match config.http_timeout_ms {
        Some(ms) => println!("  HTTP Timeout: {}ms", ms),
        None => println!("  HTTP Timeout: library default"),
    }
    println!("  Port: {}", config.port);
    println!("  Metrics: {}", if config.metrics_enabled { "Enabled" } else { "Disabled" });
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Create the database and its tables.
async fn cmd_init_db() -> anyhow::Result<()> {
    let config = load_config()?;

    let store = RecordStore::from_config(&config).await?;
    store.init_schema().await?;

    for kind in RecordKind::iter() {
        println!("Table ready: {}", kind.table());
    }
    Ok(())
}

/// Resolve one CEP and print the result.
async fn cmd_lookup(raw: &str) -> anyhow::Result<()> {
    let config = load_config()?;
    let client = ViaCepClient::new(&config)?;
    let cep = Cep::parse(raw)?;

    match client.lookup(&cep).await? {
        LookupOutcome::Resolved(fields) => {
            println!("CEP {}", cep);
            println!("  Logradouro: {}", fields.street.as_deref().unwrap_or("-"));
            println!("  Bairro:     {}", fields.neighborhood.as_deref().unwrap_or("-"));
            println!("  Localidade: {}", fields.city.as_deref().unwrap_or("-"));
            println!("  UF:         {}", fields.state.as_deref().unwrap_or("-"));
        }
        LookupOutcome::NotFound => {
            println!("CEP {} not found", cep);
        }
    }
    Ok(())
}

/// Run the HTTP server until a shutdown signal arrives.
async fn cmd_serve(port_override: Option<u16>) -> anyhow::Result<()> {
    let config = load_config()?;
    let port = port_override.unwrap_or(config.port);

    info!("Starting cadastro-cep");
    info!("  Database: {}", config.database_url);
    info!("  CEP provider: {}", config.lookup_base());

    let store = RecordStore::from_config(&config).await?;
    store.init_schema().await?;

    let lookup: Arc<dyn CepLookup> = Arc::new(ViaCepClient::new(&config)?);
    let mut state = AppState::new(store.clone(), lookup);

    if config.metrics_enabled {
        match metrics::install_recorder() {
            Ok(handle) => state = state.with_metrics(handle),
            Err(e) => warn!("Metrics disabled, recorder install failed: {}", e),
        }
    }

    let app = create_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.pool().close().await;
    info!("Server stopped");
    Ok(())
}
