//! GuessShot server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered under
//! `GUESSSHOT_*` environment variables, opens the SQLite store, starts the
//! broadcast scheduler, and serves the JSON API over HTTP.
//!
//! # Password hash generation
//!
//! ```
//! cargo run -p guessshot-server -- --hash-password
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::Parser;
use guessshot_api::{AppState, AuthConfig};
use guessshot_catalog::FileCatalog;
use guessshot_server::{
  ServerConfig,
  config::expand_tilde,
  locale::Locales,
  scheduler,
  transport::{LogTransport, Transport, WebhookTransport},
};
use guessshot_store_sqlite::SqliteStore;
use rand_core::OsRng;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "GuessShot quiz server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  if cli.hash_password {
    let password = read_password()?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
      .to_string();
    println!("{hash}");
    return Ok(());
  }

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(
      config::Environment::with_prefix("GUESSSHOT")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true),
    )
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;
  let quiz = Arc::new(server_cfg.quiz.clone());

  let store_path = expand_tilde(&server_cfg.store_path);
  if let Some(parent) = store_path.parent().filter(|p| !p.as_os_str().is_empty()) {
    tokio::fs::create_dir_all(parent)
      .await
      .with_context(|| format!("failed to create {parent:?}"))?;
  }
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let catalog = FileCatalog::new(expand_tilde(&server_cfg.catalog_dir));

  let locales = Arc::new(
    Locales::load(
      &expand_tilde(&server_cfg.locales_dir),
      &quiz.locales,
      &quiz.default_locale,
    )
    .await,
  );

  let transport = match &server_cfg.webhook_url {
    Some(url) => Transport::Webhook(
      WebhookTransport::new(url.clone(), Arc::clone(&locales))
        .context("failed to build HTTP client")?,
    ),
    None => {
      tracing::warn!("no webhook_url configured; outbound messages are only logged");
      Transport::Log(LogTransport::new(Arc::clone(&locales)))
    }
  };

  let state = AppState {
    store:     Arc::new(store),
    catalog:   Arc::new(catalog),
    transport: Arc::new(transport),
    config:    quiz,
    auth:      Arc::new(AuthConfig {
      username:      server_cfg.auth_username.clone(),
      password_hash: server_cfg.auth_password_hash.clone(),
    }),
  };

  let jobs = scheduler::spawn(state.clone(), server_cfg.schedule.clone());
  tracing::info!(jobs = jobs.len(), "scheduler started");

  let app = guessshot_api::api_router(state).layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Read a password line from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\n', '\r']).to_owned())
}
