use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use identity_sync::{config::IdentitySyncConfig, IdentitySync};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs, DatabaseConfig};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use std::path::{Path, PathBuf};
use std::time::Duration;

mod shutdown;
mod web;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const DEFAULT_MAX_CONNS: u32 = 10;

/// Expand a sqlite DSN into an absolute-path DSN using a base directory.
/// - Keeps "sqlite::memory:" as-is.
/// - Normalizes backslashes into forward slashes (important on Windows).
/// - Adds `mode=rwc` when no query is given so a fresh file gets created.
fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path, create_dirs: bool) -> Result<String> {
    if dsn.eq_ignore_ascii_case("sqlite::memory:") || dsn.eq_ignore_ascii_case("sqlite://:memory:")
    {
        return Ok("sqlite::memory:".to_string());
    }
    let db_path = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| anyhow!("DSN must start with sqlite:// (got: {})", dsn))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };

    let mut p = PathBuf::from(path_str);
    if p.as_os_str().is_empty() {
        return Err(anyhow!("Empty SQLite path in DSN"));
    }
    if p.is_relative() {
        p = base_dir.join(p);
    }

    if let Some(dir) = p.parent() {
        if create_dirs {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
    }

    // Rebuild DSN with absolute path and normalized slashes
    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    out.push('?');
    out.push_str(query.unwrap_or("mode=rwc"));
    Ok(out)
}

/// Identity Sync Server - keeps the users table in step with identity provider webhooks
#[derive(Parser)]
#[command(name = "identity-sync-server")]
#[command(about = "Identity Sync Server - keeps the users table in step with identity provider webhooks")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory SQLite database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
    /// Apply database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // CLI args passed down to config/app
    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;

    // Apply CLI overrides (port / verbosity / mock)
    config.apply_cli_overrides(&args);

    // Print config and exit if requested
    if cli.print_config {
        println!("{}", redacted(&config).to_yaml()?);
        return Ok(());
    }

    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, &config.home_dir());
    tracing::info!("Identity Sync Server starting");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(config),
        Commands::Migrate => migrate(config).await,
    }
}

/// Copy of the config safe to print: the webhook secret is masked.
fn redacted(config: &AppConfig) -> AppConfig {
    let mut out = config.clone();
    if let Some(secret) = out
        .modules
        .get_mut(IdentitySync::MODULE_NAME)
        .and_then(|m| m.get_mut("webhook_secret"))
    {
        if secret.as_str().is_some_and(|s| !s.is_empty()) {
            *secret = serde_json::Value::String("[REDACTED]".to_string());
        }
    }
    out
}

/// Typed and validated identity_sync section. Fails when the secret is missing.
fn identity_sync_config(config: &AppConfig) -> Result<IdentitySyncConfig> {
    let cfg: IdentitySyncConfig = config.module_config(IdentitySync::MODULE_NAME)?;
    cfg.validate().with_context(|| {
        format!(
            "invalid configuration for module '{}'",
            IdentitySync::MODULE_NAME
        )
    })?;
    Ok(cfg)
}

fn database_config(config: &AppConfig) -> Result<&DatabaseConfig> {
    let db = config
        .database
        .as_ref()
        .ok_or_else(|| anyhow!("Database configuration is required"))?;
    if db.url.trim().is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }
    Ok(db)
}

async fn connect_db(config: &AppConfig) -> Result<DatabaseConnection> {
    let db_config = database_config(config)?;

    let mut dsn = db_config.url.trim().to_owned();
    // Absolutize sqlite DSNs to avoid cwd issues
    if dsn.starts_with("sqlite:") {
        dsn = absolutize_sqlite_dsn(&dsn, &config.home_dir(), true)?;
    }

    let mut opts = ConnectOptions::new(dsn.clone());
    opts.max_connections(db_config.max_conns.unwrap_or(DEFAULT_MAX_CONNS))
        .acquire_timeout(Duration::from_secs(5))
        .sqlx_logging(false);
    if dsn == "sqlite::memory:" {
        // The in-memory database lives only as long as its single connection.
        let forever = Duration::from_secs(u64::from(u32::MAX));
        opts.min_connections(1)
            .idle_timeout(forever)
            .max_lifetime(forever);
    }

    // The DSN may carry credentials; it is never logged.
    tracing::info!("Connecting to database");
    let db = Database::connect(opts)
        .await
        .context("failed to connect to database")?;
    tracing::info!(backend = ?db.get_database_backend(), "Connected to database");
    Ok(db)
}

async fn run_server(config: AppConfig) -> Result<()> {
    // Fail fast on a missing secret before touching the database.
    let module_cfg = identity_sync_config(&config)?;

    let db = connect_db(&config).await?;
    let module = IdentitySync::default();
    module.migrate(&db).await?;
    module.init(&module_cfg, db)?;

    let routes = module.register_rest(axum::Router::new())?;
    let router = web::build_router(&config.server, routes);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(addr = %addr, path = %module_cfg.webhook_path, "HTTP server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = shutdown::wait_for_shutdown().await {
                tracing::error!(error = %e, "Signal handler failed; shutting down");
            }
        })
        .await
        .context("HTTP server failed")?;

    tracing::info!("Identity Sync Server stopped");
    Ok(())
}

fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    identity_sync_config(&config)?;
    database_config(&config)?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("{}", redacted(&config).to_yaml()?);
    Ok(())
}

async fn migrate(config: AppConfig) -> Result<()> {
    let db = connect_db(&config).await?;
    IdentitySync::default().migrate(&db).await?;
    println!("Migrations applied");
    Ok(())
}
