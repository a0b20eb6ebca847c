//! LEXIVEC Query Binary
//!
//! One-shot batch lookup: load an embedding file, print the ranked
//! neighbor list for the query terms, exit.

use clap::Parser;
use lexivec::{load_embeddings, LookupConfig, SimilarityLookup};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

/// LEXIVEC Query - Batch Nearest-Neighbor Lookup
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to the embedding file (`<word> <d1> ... <dD>` per line)
    embeddings: PathBuf,

    /// Query terms; absent words are skipped
    #[arg(required = true)]
    terms: Vec<String>,

    /// Number of neighbors to print
    #[arg(short = 'k', long, default_value_t = 10)]
    top_k: usize,

    /// Drop the query terms themselves from the results
    #[arg(long, default_value_t = false)]
    exclude_query: bool,

    /// Drop results scoring below this similarity
    #[arg(long)]
    min_score: Option<f32>,
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("lexivec=info".parse()?))
        .init();

    let args = Args::parse();

    let mut config = LookupConfig::default().with_exclude_query(args.exclude_query);
    if let Some(min) = args.min_score {
        config = config.with_min_score(min);
    }

    let table = load_embeddings(&args.embeddings)?;
    let lookup = SimilarityLookup::with_config(table, config);

    let terms: Vec<&str> = args.terms.iter().map(String::as_str).collect();
    let neighbors = lookup.most_similar_terms(&terms, args.top_k)?;

    for (rank, n) in neighbors.iter().enumerate() {
        println!("{:>3}. {:<24} {:.4}", rank + 1, n.token, n.score);
    }

    Ok(())
}
