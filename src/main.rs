use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use datastore_prefs::logging::init_tracing;
use datastore_prefs::ui::{self, AppConfig};
use datastore_prefs::user::PREFERENCES_NAME;
use datastore_prefs::DataStore;

/// Edit a user's name and VIP flag, save them, and read them back.
#[derive(Debug, Parser)]
#[command(name = "datastore-example", version, about)]
struct Args {
    /// Namespace used to locate the per-user configuration directory.
    #[arg(long, default_value = "com.example.datastoreexample")]
    namespace: String,

    /// Store preferences in this directory instead.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Milliseconds to wait between saving and reading back.
    #[arg(long, default_value_t = 500)]
    delay_ms: u64,

    /// Milliseconds a notification stays on screen.
    #[arg(long, default_value_t = 2000)]
    toast_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if let Some(log) = init_tracing() {
        tracing::info!(log = %log.display(), "logging enabled");
    }

    let store = match &args.data_dir {
        Some(dir) => DataStore::open_in(dir, PREFERENCES_NAME),
        None => DataStore::open(&args.namespace, PREFERENCES_NAME),
    }
    .context("failed to open preferences")?;
    tracing::info!(path = %store.file_path(), "starting");

    let config = AppConfig {
        delay: Duration::from_millis(args.delay_ms),
        toast_duration: Duration::from_millis(args.toast_ms),
    };
    ui::run(store, config).await
}
