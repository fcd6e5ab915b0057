//! CLI entry point for the faculty search engine.
//!
//! Provides offline snapshot generation (`index`), ad-hoc queries
//! (`search`), and settings inspection (`config`). The HTTP service that
//! fronts the engine in production lives outside this crate; this binary
//! is the operational tooling around the snapshot.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use facsearch::{
    CorpusLoader, FastEmbedEncoder, JsonFacultyStore, SearchEngine, Settings, SnapshotStore,
};

#[derive(Parser)]
#[command(name = "facsearch", version, about = "Hybrid semantic search over faculty profiles")]
struct Cli {
    /// Path to a custom settings.toml file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the vector snapshot from a faculty data file
    Index {
        /// JSON file containing an array of faculty rows
        #[arg(long)]
        data: PathBuf,

        /// Rebuild even if a snapshot already exists
        #[arg(long)]
        force: bool,
    },

    /// Query the index (builds it first if no snapshot exists)
    Search {
        /// Free-text query
        #[arg(short, long)]
        query: String,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<usize>,

        /// JSON file to fall back to when no snapshot exists
        #[arg(long)]
        data: Option<PathBuf>,
    },

    /// Display active settings
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
    .context("failed to load settings")?;

    let default_level = if settings.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Index { data, force } => build_index(&settings, &data, force),
        Commands::Search { query, limit, data } => {
            let limit = limit.unwrap_or(settings.search.default_limit);
            run_search(&settings, &query, limit, data.as_deref())
        }
        Commands::Config => {
            print!("{}", toml::to_string_pretty(&settings)?);
            Ok(())
        }
    }
}

fn build_index(settings: &Settings, data: &std::path::Path, force: bool) -> Result<()> {
    let snapshot = SnapshotStore::from_settings(settings);
    if snapshot.exists() && !force {
        anyhow::bail!(
            "snapshot already exists at '{}', use --force to rebuild",
            settings.data_dir.display()
        );
    }

    let store = JsonFacultyStore::new(data);
    let encoder = FastEmbedEncoder::new(settings).context("embedding model initialization")?;
    let loader = CorpusLoader::new(&store, &encoder, &snapshot, settings.corpus.truncate_chars);

    let start = Instant::now();
    let index = loader.rebuild().context("building index")?;
    snapshot.save(&index).context("persisting snapshot")?;

    println!(
        "Indexed {} records ({} dimensions) in {:.1?}",
        index.len(),
        index.dimension().get(),
        start.elapsed()
    );
    Ok(())
}

fn run_search(
    settings: &Settings,
    query: &str,
    limit: usize,
    data: Option<&std::path::Path>,
) -> Result<()> {
    let snapshot = SnapshotStore::from_settings(settings);
    let encoder = Arc::new(FastEmbedEncoder::new(settings).context("embedding model initialization")?);

    let index = match data {
        Some(path) => {
            let store = JsonFacultyStore::new(path);
            CorpusLoader::new(
                &store,
                encoder.as_ref(),
                &snapshot,
                settings.corpus.truncate_chars,
            )
            .load()?
        }
        None => snapshot.load().context(
            "no snapshot found; run 'facsearch index --data <rows.json>' first or pass --data",
        )?,
    };

    let engine = SearchEngine::new(Arc::new(index), encoder);
    let hits = engine.search(query, limit)?;

    if hits.is_empty() {
        println!("No matches.");
        return Ok(());
    }
    for (rank, hit) in hits.iter().enumerate() {
        println!("{:>2}. faculty {} (score {:.4})", rank + 1, hit.id, hit.score);
    }
    Ok(())
}
