//! `topics-server`: serves the topic submission API.
//!
//! Settings come from a TOML file (`--config`, default `config.toml`, may be
//! absent) overlaid with `TOPICS_*` environment variables. The process runs
//! until ctrl-c, then drains in-flight requests and closes the database.
//!
//! Generate the `admin_password_hash` value with:
//!
//! ```text
//! topics-server --hash-password
//! ```

use std::{
  io::{self, BufRead as _, Write as _},
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::Parser;
use rand_core::OsRng;
use tokio::net::TcpListener;
use topics_api::{AppState, ServerConfig};
use topics_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Topic submission server")]
struct Cli {
  /// TOML settings file; missing files are ignored.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Hash a password read from stdin, print the PHC string and exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  init_tracing();
  let cli = Cli::parse();

  if cli.hash_password {
    println!("{}", hash_stdin_password()?);
    return Ok(());
  }

  let settings = load_settings(&cli.config)?;
  run(settings).await
}

fn init_tracing() {
  let filter = EnvFilter::builder()
    .with_default_directive(LevelFilter::INFO.into())
    .from_env_lossy();
  tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_settings(file: &Path) -> anyhow::Result<ServerConfig> {
  config::Config::builder()
    .add_source(config::File::from(file).required(false))
    .add_source(config::Environment::with_prefix("TOPICS"))
    .build()
    .and_then(|c| c.try_deserialize())
    .with_context(|| format!("invalid settings (file {file:?}, env TOPICS_*)"))
}

async fn run(settings: ServerConfig) -> anyhow::Result<()> {
  let auth = settings.auth().context("invalid admin settings")?;
  if auth.token_secret.len() < 32 {
    tracing::warn!("token_secret is shorter than 32 bytes");
  }

  let db_path = with_home(&settings.store_path);
  if let Some(dir) = db_path.parent().filter(|d| !d.as_os_str().is_empty()) {
    std::fs::create_dir_all(dir).with_context(|| format!("cannot create {dir:?}"))?;
  }
  let store = SqliteStore::open(&db_path)
    .await
    .with_context(|| format!("cannot open database {db_path:?}"))?;

  let app = topics_api::router(AppState {
    store: Arc::new(store.clone()),
    auth:  Arc::new(auth),
  });

  let bind_to = (settings.host.as_str(), settings.port);
  let listener = TcpListener::bind(bind_to)
    .await
    .with_context(|| format!("cannot bind {}:{}", settings.host, settings.port))?;
  tracing::info!(
    addr = %listener.local_addr()?,
    db = %db_path.display(),
    "serving topic submissions"
  );

  axum::serve(listener, app)
    .with_graceful_shutdown(ctrl_c())
    .await
    .context("server error")?;

  store.close().await.context("cannot close database")?;
  tracing::info!("stopped");
  Ok(())
}

async fn ctrl_c() {
  match tokio::signal::ctrl_c().await {
    Ok(()) => tracing::info!("ctrl-c received, draining"),
    Err(e) => {
      tracing::error!(error = %e, "ctrl-c handler unavailable; running until killed");
      std::future::pending::<()>().await;
    }
  }
}

fn hash_stdin_password() -> anyhow::Result<String> {
  eprint!("Password: ");
  io::stderr().flush()?;

  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  let password = line.trim_end_matches(['\r', '\n']);
  anyhow::ensure!(!password.is_empty(), "empty password");

  let salt = SaltString::generate(&mut OsRng);
  let phc = Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map_err(|e| anyhow::anyhow!("argon2: {e}"))?;
  Ok(phc.to_string())
}

/// Resolve a leading `~` component against `$HOME`.
fn with_home(path: &Path) -> PathBuf {
  match (path.strip_prefix("~"), std::env::var_os("HOME")) {
    (Ok(rest), Some(home)) => PathBuf::from(home).join(rest),
    _ => path.to_path_buf(),
  }
}
