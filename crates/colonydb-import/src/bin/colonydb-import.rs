//! Import colony animals from a tab-separated export.
//!
//! ```text
//! colonydb-import mice.tsv --database /srv/vivarium/colony.db
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use colonydb_core::config::ColonyConfig;
use colonydb_core::Database;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "colonydb-import", version, about = "Import animals from a TSV export")]
struct Args {
    /// Tab-separated file with a header row
    file: PathBuf,

    /// Colony database to import into [default: $COLONYDB_DATABASE or colony.db]
    #[arg(long)]
    database: Option<PathBuf>,
}

fn init_tracing(config: &ColonyConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> anyhow::Result<()> {
    let config = ColonyConfig::from_env();
    init_tracing(&config);
    let args = Args::parse();

    let database = args.database.unwrap_or(config.database_path);
    let mut db = Database::open(&database)
        .with_context(|| format!("opening database {}", database.display()))?;
    let report = colonydb_import::import_file(&mut db, &args.file)
        .with_context(|| format!("importing {}", args.file.display()))?;

    println!(
        "Imported {} animals ({} duplicate IDs skipped, {} rows without ID skipped)",
        report.imported, report.skipped_duplicates, report.skipped_missing_id
    );
    Ok(())
}
