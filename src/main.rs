use anyhow::Context;
use tracing_subscriber::EnvFilter;

use sqlite_snapshot::{connect, Fetcher, SnapshotConfig};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = SnapshotConfig::default();

    Fetcher::from_config(&config)?
        .download(&config.url, &config.db_path)
        .with_context(|| format!("downloading {}", config.url))?;

    // Connection failures are already reported by `connect`.
    let Ok(db) = connect(&config.db_path) else {
        return Ok(());
    };

    let tables = db.load_all_tables().context("loading tables")?;
    for table in tables.iter() {
        println!("\nTable: {}", table.name);
        println!("{}", table.head(config.preview_rows));
    }

    db.close()?;
    Ok(())
}
