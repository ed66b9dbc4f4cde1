//! `roost` — command-line front end for the validation grid.
//!
//! # Usage
//!
//! ```
//! roost --store grid.db init entities.json
//! roost --store grid.db ingest "Catalyst Midtown" "Catalyst is better than SQ5"
//! roost --store grid.db report --top 5
//! ```
//!
//! The backend is picked from the store path: a `.json` extension opens the
//! single-document JSON store, anything else opens SQLite.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use roost_core::{
  alias::{AliasConfig, AliasGenerator, AliasIndex},
  grid::{GridStore, ValidationStatus},
  matcher::find_best_match,
  mention::{find_mentions, has_housing_context},
  scan::{SourcedText, scan},
  terms::search_terms,
};
use roost_store_json::JsonStore;
use roost_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "roost", about = "Alias generation and validation grid CLI")]
struct Cli {
  /// Store path. A `.json` extension selects the JSON backend.
  #[arg(short, long, default_value = "roost.db")]
  store: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Register the entity universe from a JSON array of names.
  Init {
    /// File containing `["Name One", "Name Two", ...]`.
    entities: PathBuf,
  },

  /// Print every generated alias for a name, with confidence.
  Aliases { name: String },

  /// Print the prioritized search terms for a name.
  Terms { name: String },

  /// Fuzzy-match a query against the registered entities.
  Match {
    query: String,

    /// Minimum similarity score (0..=100).
    #[arg(long, default_value_t = 80)]
    threshold: u8,
  },

  /// Detect which registered entities a text mentions.
  Mentions { text: String },

  /// Scan a comment gathered for one entity and record any cross-references.
  Ingest {
    /// The entity the comment was collected for.
    source: String,
    text:   String,

    #[arg(long)]
    post_id: Option<String>,

    #[arg(long)]
    comment_id: Option<String>,
  },

  /// Mark a pending record as verified.
  Verify { record_id: String },

  /// Mark a pending record as invalid.
  Invalidate { record_id: String },

  /// Summarize the grid: entity count and the most-commented pairs.
  Report {
    #[arg(long, default_value_t = 10)]
    top: usize,
  },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  if cli.store.extension().is_some_and(|ext| ext == "json") {
    let store = JsonStore::open(&cli.store)
      .await
      .with_context(|| format!("opening {}", cli.store.display()))?;
    run(store, cli.command).await
  } else {
    let store = SqliteStore::open(&cli.store)
      .await
      .with_context(|| format!("opening {}", cli.store.display()))?;
    run(store, cli.command).await
  }
}

// ─── Commands ─────────────────────────────────────────────────────────────────

async fn run<S: GridStore>(store: S, command: Command) -> Result<()> {
  match command {
    Command::Init { entities } => {
      let raw = std::fs::read_to_string(&entities)
        .with_context(|| format!("reading {}", entities.display()))?;
      let names: Vec<String> =
        serde_json::from_str(&raw).context("parsing entity list")?;
      let count = names.len();
      store.register_entities(names).await?;
      println!("registered {count} entities");
    }

    Command::Aliases { name } => {
      let set = generator().generate(&name);
      for (alias, confidence) in set.iter() {
        println!("{confidence:.2}  {alias}");
      }
    }

    Command::Terms { name } => {
      let set = generator().generate(&name);
      for (term, confidence) in search_terms(&name, &set) {
        println!("{confidence:.2}  {term}");
      }
    }

    Command::Match { query, threshold } => {
      let universe = universe(&store).await?;
      let candidates = find_best_match(&query, &universe, threshold);
      if candidates.is_empty() {
        println!("no match");
      }
      for c in candidates {
        println!("{:>3}  {}  (via {:?})", c.score, c.entity, c.alias);
      }
    }

    Command::Mentions { text } => {
      let universe = universe(&store).await?;
      if !has_housing_context(&text) {
        println!("(no housing context)");
      }
      for (entity, confidence) in find_mentions(&text, &universe) {
        println!("{confidence:.2}  {entity}");
      }
    }

    Command::Ingest { source, text, post_id, comment_id } => {
      let universe = universe(&store).await?;
      let snippet = SourcedText { source_entity: source, text, post_id, comment_id };
      let result = scan(&snippet, &universe);

      if !result.has_cross_references() {
        println!("no cross-references recorded");
        return Ok(());
      }
      for validation in result.validations {
        let record = store.record_validation(validation).await?;
        println!(
          "{}  {} -> {}  ({:.2})",
          record.id,
          record.source_entity,
          record.mentioned_entity,
          record.confidence_score
        );
      }
    }

    Command::Verify { record_id } => {
      let record = store
        .set_status(&record_id, ValidationStatus::Verified)
        .await?;
      println!("{} is now {}", record.id, record.status.as_str());
    }

    Command::Invalidate { record_id } => {
      let record = store
        .set_status(&record_id, ValidationStatus::Invalid)
        .await?;
      println!("{} is now {}", record.id, record.status.as_str());
    }

    Command::Report { top } => {
      let entities = store.list_entities().await?;
      println!("entities: {}", entities.len());

      let pairs = store.top_pairs(top).await?;
      if pairs.is_empty() {
        println!("no validated pairs yet");
        return Ok(());
      }
      println!("top pairs by comment count:");
      for p in pairs {
        println!(
          "  {} -> {}: {} comments, {} verified, avg confidence {:.2}",
          p.source,
          p.mentioned,
          p.cell.comment_count,
          p.cell.verified_count,
          p.cell.average_confidence
        );
      }
    }
  }

  Ok(())
}

fn generator() -> AliasGenerator { AliasGenerator::new(AliasConfig::default()) }

/// Build the alias index over every registered entity.
async fn universe<S: GridStore>(store: &S) -> Result<AliasIndex> {
  let entities = store.list_entities().await?;
  Ok(AliasIndex::build(
    entities.iter().map(|e| e.name.as_str()),
    &generator(),
  ))
}
