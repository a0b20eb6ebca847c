//! Embeddings Module
//!
//! Vocabulary index, embedding matrix, and the text-format loader.

mod loader;
mod table;
mod vocab;

pub use loader::{load_embeddings, read_embeddings, LoadError};
pub use table::EmbeddingTable;
pub use vocab::Vocabulary;
