//! Embedding Matrix
//!
//! Row-major storage of fixed-dimension word vectors, one row per
//! vocabulary id.

use super::vocab::Vocabulary;

/// Immutable word-vector table.
///
/// Row i holds the vector for vocabulary id i; the backing storage is a
/// single contiguous buffer with a `dim` stride.
#[derive(Debug, Clone)]
pub struct EmbeddingTable {
    vocab: Vocabulary,
    data: Vec<f32>,
    dim: usize,
}

impl EmbeddingTable {
    /// Invariant: `data.len() == vocab.len() * dim`, upheld by the loader.
    pub(crate) fn new(vocab: Vocabulary, data: Vec<f32>, dim: usize) -> Self {
        debug_assert_eq!(data.len(), vocab.len() * dim);
        Self { vocab, data, dim }
    }

    /// Vector dimension D
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of stored vectors
    pub fn len(&self) -> usize {
        self.vocab.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.vocab.is_empty()
    }

    /// The vocabulary index backing this table
    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Row for a vocabulary id
    pub fn row(&self, id: usize) -> Option<&[f32]> {
        if id >= self.len() {
            return None;
        }
        let start = id * self.dim;
        Some(&self.data[start..start + self.dim])
    }

    /// Raw embedding vector for a word, `None` when the word is absent
    pub fn vector(&self, word: &str) -> Option<&[f32]> {
        self.row(self.vocab.id(word)?)
    }

    /// Iterate rows in vocabulary-id order
    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.dim)
    }
}
