//! LEXIVEC CLI
//!
//! Interactive explorer for pre-trained word embeddings.

use clap::Parser;
use lexivec::{load_embeddings, LookupConfig, Neighbor, QueryError, SimilarityLookup};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

/// LEXIVEC CLI - Interactive Embedding Explorer
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to the embedding file (`<word> <d1> ... <dD>` per line)
    embeddings: PathBuf,

    /// Number of neighbors for SIM and ANALOGY
    #[arg(short = 'k', long, default_value_t = 10)]
    top_k: usize,

    /// Drop the query words themselves from SIM results
    #[arg(long, default_value_t = false)]
    exclude_query: bool,
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("lexivec=info".parse()?))
        .init();

    let args = Args::parse();

    println!("Loading embeddings from {}...", args.embeddings.display());
    let table = load_embeddings(&args.embeddings)?;
    println!("{} vectors, dimension {}.", table.len(), table.dim());

    let config = LookupConfig::default().with_exclude_query(args.exclude_query);
    let lookup = SimilarityLookup::with_config(table, config);

    println!("Type 'help' for available commands, 'quit' to exit.\n");

    loop {
        print!("lexivec> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("exit") {
            println!("Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("help") {
            print_help();
            continue;
        }

        if let Err(e) = run_command(&lookup, input, args.top_k) {
            eprintln!("Error: {}", e);
        }
    }

    Ok(())
}

fn run_command(lookup: &SimilarityLookup, input: &str, top_k: usize) -> anyhow::Result<()> {
    let parts: Vec<&str> = input.split_whitespace().collect();

    if parts.is_empty() {
        anyhow::bail!("Empty command");
    }

    let cmd = parts[0].to_uppercase();

    match cmd.as_str() {
        "VEC" => {
            if parts.len() != 2 {
                anyhow::bail!("VEC requires a word: VEC <word>");
            }
            match lookup.vector(parts[1]) {
                Some(v) => println!("{}", format_vector(v)),
                None => println!("(not found)"),
            }
        }

        "NVEC" => {
            if parts.len() != 2 {
                anyhow::bail!("NVEC requires a word: NVEC <word>");
            }
            match lookup.normalized_vector(parts[1]) {
                Some(v) => println!("{}", format_vector(v)),
                None => println!("(not found)"),
            }
        }

        "SIM" => {
            if parts.len() < 2 {
                anyhow::bail!("SIM requires at least one word: SIM <word> [word ...]");
            }
            match lookup.most_similar_terms(&parts[1..], top_k) {
                Ok(neighbors) => print_neighbors(&neighbors),
                Err(QueryError::NoResolvableTerms) => println!("(no resolvable query terms)"),
            }
        }

        "ANALOGY" => {
            if parts.len() != 4 {
                anyhow::bail!("ANALOGY requires three words: ANALOGY <a> <b> <c> (a is to b as c is to ?)");
            }
            match lookup.analogy(&[parts[2], parts[3]], &[parts[1]], top_k) {
                Ok(neighbors) => print_neighbors(&neighbors),
                Err(QueryError::NoResolvableTerms) => println!("(no resolvable query terms)"),
            }
        }

        "DIST" => {
            if parts.len() != 3 {
                anyhow::bail!("DIST requires two words: DIST <w1> <w2>");
            }
            match lookup.similarity(parts[1], parts[2]) {
                Some(score) => println!("{:.4}", score),
                None => println!("(not found)"),
            }
        }

        "INFO" => {
            println!("{} vectors, dimension {}", lookup.len(), lookup.dim());
        }

        _ => anyhow::bail!("Unknown command: {}. Type 'help' for available commands.", cmd),
    }

    Ok(())
}

fn format_vector(v: &[f32]) -> String {
    let coords: Vec<String> = v.iter().map(|x| format!("{:.4}", x)).collect();
    format!("[{}]", coords.join(", "))
}

fn print_neighbors(neighbors: &[Neighbor]) {
    for (rank, n) in neighbors.iter().enumerate() {
        println!("{:>3}. {:<24} {:.4}", rank + 1, n.token, n.score);
    }
}

fn print_help() {
    println!(
        r#"
Available commands:

  VEC <word>              - Print the raw embedding vector
  NVEC <word>             - Print the unit-normalized vector
  SIM <word> [word ...]   - Nearest neighbors of a word (or an averaged set)
  ANALOGY <a> <b> <c>     - a is to b as c is to ?
  DIST <w1> <w2>          - Cosine similarity between two words
  INFO                    - Vocabulary size and dimension

  help                    - Show this help
  quit / exit             - Exit the CLI

Examples:
  SIM king
  SIM king queen
  ANALOGY man king woman
  DIST cat dog
"#
    );
}
