use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use ts_calendar::cli::{self, CliMode, CliOptions};
use ts_calendar::storage::config::{Config, LoggingConfig};
use ts_calendar::{Database, Services, http};

#[tokio::main]
async fn main() -> Result<()> {
    let options = match cli::parse_cli_mode() {
        Ok(CliMode::Help) => {
            println!("{}", cli::USAGE);
            return Ok(());
        }
        Ok(CliMode::Serve(options)) | Ok(CliMode::InitDb(options)) => options,
        Err(err) => {
            eprintln!("Error: {}", err);
            println!("{}", cli::USAGE);
            return Ok(());
        }
    };

    let config = load_config(&options)?;
    setup_logging(&config.logging);

    let db = Database::open(&config.database.path).with_context(|| {
        format!("failed to open database at {}", config.database.path.display())
    })?;

    if options.init_db {
        println!("Database initialized at {}", db.path().display());
        return Ok(());
    }

    let app = http::router(Services::new(db));
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!("ts-calendar listening on http://{}", addr);
    println!("ts-calendar listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

fn load_config(options: &CliOptions) -> Result<Config> {
    let mut config = match &options.config {
        Some(path) => Config::load_or_create_at(path),
        None => Config::load_or_create(),
    }
    .context("failed to load configuration")?;

    if let Some(port) = options.port {
        config.server.port = port;
    }
    if let Some(database) = &options.database {
        config.database.path = database.clone();
    }
    Ok(config)
}

fn setup_logging(logging: &LoggingConfig) {
    std::fs::create_dir_all(&logging.directory).ok();

    let file_appender = tracing_appender::rolling::daily(&logging.directory, &logging.file_prefix);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false)
        .init();

    std::mem::forget(_guard);

    tracing::info!("ts-calendar started");
}
