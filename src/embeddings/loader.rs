//! Embedding File Loader
//!
//! Parses whitespace-delimited `<word> <d1> <d2> ... <dD>` text files.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use thiserror::Error;
use tracing::info;

use super::table::EmbeddingTable;
use super::vocab::Vocabulary;

/// Errors raised while reading an embedding file.
///
/// Corrupt input is fatal at construction; nothing is loaded partially.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("i/o error reading embeddings: {0}")]
    Io(#[from] std::io::Error),

    #[error("embedding file contains no vectors")]
    Empty,

    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("line {line}: expected {expected} coordinates, got {got}")]
    DimensionMismatch {
        line: usize,
        expected: usize,
        got: usize,
    },

    #[error("line {line}: duplicate token {token:?}")]
    DuplicateToken { line: usize, token: String },
}

/// Load an embedding table from a file path.
pub fn load_embeddings(path: impl AsRef<Path>) -> Result<EmbeddingTable, LoadError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let table = read_embeddings(BufReader::new(file))?;
    info!(
        path = %path.display(),
        vectors = table.len(),
        dimension = table.dim(),
        "Loaded embeddings"
    );
    Ok(table)
}

/// Read an embedding table from a buffered reader.
///
/// One vector per line, UTF-8: `<word> <d1> <d2> ... <dD>`. The dimension
/// is inferred from the first data line and enforced on every later line.
/// Blank lines are skipped.
pub fn read_embeddings<R: BufRead>(reader: R) -> Result<EmbeddingTable, LoadError> {
    let mut vocab = Vocabulary::new();
    let mut data: Vec<f32> = Vec::new();
    let mut dim: Option<usize> = None;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        let mut parts = line.split_whitespace();

        let token = match parts.next() {
            Some(token) => token,
            None => continue,
        };

        let start = data.len();
        for part in parts {
            let value: f32 = part.parse().map_err(|_| LoadError::Malformed {
                line: line_no,
                reason: format!("invalid coordinate {part:?}"),
            })?;
            // NaN/inf parse as valid f32 but would break score ordering
            if !value.is_finite() {
                return Err(LoadError::Malformed {
                    line: line_no,
                    reason: format!("non-finite coordinate {part:?}"),
                });
            }
            data.push(value);
        }
        let got = data.len() - start;

        match dim {
            None => {
                if got == 0 {
                    return Err(LoadError::Malformed {
                        line: line_no,
                        reason: "no coordinates after token".to_string(),
                    });
                }
                dim = Some(got);
            }
            Some(expected) if got != expected => {
                return Err(LoadError::DimensionMismatch {
                    line: line_no,
                    expected,
                    got,
                });
            }
            Some(_) => {}
        }

        if vocab.push(token).is_none() {
            return Err(LoadError::DuplicateToken {
                line: line_no,
                token: token.to_string(),
            });
        }
    }

    match dim {
        Some(dim) => Ok(EmbeddingTable::new(vocab, data, dim)),
        None => Err(LoadError::Empty),
    }
}
