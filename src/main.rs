use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tokio::sync::watch;
use trellis_core::config::{Config, resolve_config_path};
use trellis_core::{Engine, RecordKind, SearchOptions};

/// Hierarchical code indexing with hybrid vector, structural, and graph search.
#[derive(Debug, Parser)]
#[command(name = "trellis", version)]
struct Cli {
    /// Config file [default: $TRELLIS_CONFIG, then config/default.toml]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Summarize a directory tree without indexing it
    Hierarchy { root: PathBuf },
    /// Index a codebase and/or documents into a collection
    Index {
        #[arg(long)]
        collection: String,
        #[arg(long)]
        codebase: Option<PathBuf>,
        /// External document; repeat for several
        #[arg(long = "doc")]
        docs: Vec<PathBuf>,
    },
    /// Run a hybrid search
    Search {
        query: String,
        #[arg(long)]
        collection: Option<String>,
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        threshold: Option<f32>,
    },
    /// Delete every record of a collection
    Clear { collection: String },
    /// Record counts per family
    Stats {
        #[arg(long)]
        collection: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum KindArg {
    Codebase,
    ExternalDoc,
    Reference,
}

impl From<KindArg> for RecordKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Codebase => Self::Codebase,
            KindArg::ExternalDoc => Self::ExternalDoc,
            KindArg::Reference => Self::Reference,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_subscriber();

    let config_path = resolve_config_path(cli.config.as_deref());
    let config = Config::load(&config_path)?;
    config
        .validate()
        .with_context(|| format!("invalid config {}", config_path.display()))?;
    ensure_store_dir(&config)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {e:#}");
            return;
        }
        tracing::info!("received shutdown signal");
        let _ = shutdown_tx.send(true);
    });

    let engine = Engine::open(&config)
        .await
        .with_context(|| format!("failed to open store {}", config.store.sqlite_path))?
        .with_shutdown(shutdown_rx);

    run(&engine, cli.command).await
}

async fn run(engine: &Engine, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Hierarchy { root } => {
            let summary = engine
                .build_hierarchy(&root)
                .await
                .with_context(|| format!("failed to build hierarchy for {}", root.display()))?;
            print_json(&summary)
        }
        Command::Index {
            collection,
            codebase,
            docs,
        } => {
            let report = engine
                .index_collection(&collection, codebase, docs)
                .await
                .with_context(|| format!("failed to index collection {collection}"))?;
            print_json(&report)
        }
        Command::Search {
            query,
            collection,
            kind,
            limit,
            threshold,
        } => {
            let options = SearchOptions {
                collection_id: collection,
                kind: kind.map(RecordKind::from),
                limit,
                threshold,
            };
            let results = engine.search(&query, options).await.context("search failed")?;
            print_json(&results)
        }
        Command::Clear { collection } => {
            let removed = engine
                .clear_collection(&collection)
                .await
                .with_context(|| format!("failed to clear collection {collection}"))?;
            print_json(&removed)
        }
        Command::Stats { collection } => {
            let counts = engine.counts(collection.as_deref()).await?;
            print_json(&counts)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn ensure_store_dir(config: &Config) -> anyhow::Result<()> {
    let path = &config.store.sqlite_path;
    if path == ":memory:" {
        return Ok(());
    }
    if let Some(parent) = std::path::Path::new(path).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    Ok(())
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_subscriber() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_index_with_repeated_docs() {
        let cli = Cli::try_parse_from([
            "trellis",
            "index",
            "--collection",
            "proj",
            "--codebase",
            "src",
            "--doc",
            "a.md",
            "--doc",
            "b.md",
        ])
        .unwrap();
        let Command::Index {
            collection,
            codebase,
            docs,
        } = cli.command
        else {
            panic!("expected index command");
        };
        assert_eq!(collection, "proj");
        assert_eq!(codebase, Some(PathBuf::from("src")));
        assert_eq!(docs, vec![PathBuf::from("a.md"), PathBuf::from("b.md")]);
    }

    #[test]
    fn parses_search_options() {
        let cli = Cli::try_parse_from([
            "trellis",
            "--config",
            "custom.toml",
            "search",
            "auth flow",
            "--kind",
            "external-doc",
            "--limit",
            "3",
            "--threshold",
            "0.2",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        let Command::Search {
            query, kind, limit, ..
        } = cli.command
        else {
            panic!("expected search command");
        };
        assert_eq!(query, "auth flow");
        assert_eq!(kind.map(RecordKind::from), Some(RecordKind::ExternalDoc));
        assert_eq!(limit, Some(3));
    }

    #[test]
    fn index_requires_collection() {
        assert!(Cli::try_parse_from(["trellis", "index", "--codebase", "src"]).is_err());
    }

    #[test]
    fn memory_store_needs_no_directory() {
        let mut config = Config::default();
        config.store.sqlite_path = ":memory:".into();
        assert!(ensure_store_dir(&config).is_ok());
    }
}
