//! LEXIVEC - Word Embedding Similarity Lookup
//!
//! Loads pre-trained word vectors from whitespace-delimited text files
//! (`<word> <d1> <d2> ... <dD>` per line) and answers nearest-neighbor
//! queries by cosine similarity over a unit-normalized copy of the matrix.

pub mod embeddings;
pub mod similarity;

pub use embeddings::{load_embeddings, read_embeddings, EmbeddingTable, LoadError, Vocabulary};
pub use similarity::{
    cosine_similarity, dot_product, LookupConfig, Neighbor, QueryError, SimilarityLookup,
};
