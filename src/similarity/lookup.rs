//! Similarity Lookup
//!
//! Nearest-neighbor queries by cosine similarity over a normalized copy of
//! the embedding matrix.

use thiserror::Error;
use tracing::debug;

use super::ops::{dot_product, l2_norm};
use crate::embeddings::EmbeddingTable;

/// A ranked lookup result
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    /// Vocabulary id of the matched word
    pub id: usize,
    /// The matched word
    pub token: String,
    /// Cosine similarity against the query vector
    pub score: f32,
}

/// Lookup configuration
#[derive(Debug, Clone)]
pub struct LookupConfig {
    /// Drop the query words themselves from the result list
    pub exclude_query: bool,
    /// Drop results scoring below this similarity
    pub min_score: Option<f32>,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            exclude_query: false,
            min_score: None,
        }
    }
}

impl LookupConfig {
    pub fn with_exclude_query(mut self, exclude: bool) -> Self {
        self.exclude_query = exclude;
        self
    }

    pub fn with_min_score(mut self, min: f32) -> Self {
        self.min_score = Some(min);
        self
    }
}

/// Query failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Every query term was absent from the vocabulary
    #[error("no resolvable query terms")]
    NoResolvableTerms,
}

/// Cosine-similarity index over an immutable embedding table.
///
/// Construction derives a unit-normalized copy of the matrix; queries are
/// linear dot-product scans against it.
#[derive(Debug, Clone)]
pub struct SimilarityLookup {
    table: EmbeddingTable,
    normalized: Vec<f32>,
    config: LookupConfig,
}

impl SimilarityLookup {
    /// Create a lookup with default configuration
    pub fn new(table: EmbeddingTable) -> Self {
        Self::with_config(table, LookupConfig::default())
    }

    /// Create a lookup with custom configuration
    pub fn with_config(table: EmbeddingTable, config: LookupConfig) -> Self {
        let mut normalized = Vec::with_capacity(table.len() * table.dim());
        for row in table.rows() {
            let norm = l2_norm(row);
            if norm > 0.0 {
                normalized.extend(row.iter().map(|x| x / norm));
            } else {
                normalized.extend_from_slice(row);
            }
        }

        Self {
            table,
            normalized,
            config,
        }
    }

    /// The underlying embedding table
    pub fn table(&self) -> &EmbeddingTable {
        &self.table
    }

    /// Lookup configuration
    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    /// Vocabulary size
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Vector dimension D
    pub fn dim(&self) -> usize {
        self.table.dim()
    }

    /// Raw embedding vector for a word, `None` when absent
    pub fn vector(&self, word: &str) -> Option<&[f32]> {
        self.table.vector(word)
    }

    /// Unit-normalized vector for a word, `None` when absent
    pub fn normalized_vector(&self, word: &str) -> Option<&[f32]> {
        let id = self.table.vocab().id(word)?;
        Some(self.normalized_row(id))
    }

    /// Cosine similarity of two in-vocabulary words, `None` if either is absent
    pub fn similarity(&self, a: &str, b: &str) -> Option<f32> {
        let a = self.normalized_vector(a)?;
        let b = self.normalized_vector(b)?;
        Some(dot_product(a, b))
    }

    /// Top-k nearest neighbors of a single word.
    ///
    /// Fails with [`QueryError::NoResolvableTerms`] when the word is absent.
    pub fn most_similar(&self, word: &str, k: usize) -> Result<Vec<Neighbor>, QueryError> {
        self.most_similar_terms(&[word], k)
    }

    /// Top-k nearest neighbors of the average of a term set.
    ///
    /// Absent terms are skipped; the normalized vectors of the remaining
    /// terms are averaged and scanned against every row. Fails when no term
    /// resolves.
    pub fn most_similar_terms(&self, terms: &[&str], k: usize) -> Result<Vec<Neighbor>, QueryError> {
        let (mut query, resolved) = self.sum_terms(terms, &[])?;
        let count = resolved.len() as f32;
        for x in query.iter_mut() {
            *x /= count;
        }

        let exclude = if self.config.exclude_query {
            resolved
        } else {
            Vec::new()
        };
        Ok(self.rank(&query, k, &exclude))
    }

    /// Top-k results for an analogy query (`b - a + c` exploration).
    ///
    /// Normalized vectors of resolvable positive terms are added and
    /// negative terms subtracted. The input words are always excluded from
    /// the results. Fails when no term on either side resolves.
    pub fn analogy(
        &self,
        positive: &[&str],
        negative: &[&str],
        k: usize,
    ) -> Result<Vec<Neighbor>, QueryError> {
        let (query, resolved) = self.sum_terms(positive, negative)?;
        Ok(self.rank(&query, k, &resolved))
    }

    /// Signed sum of normalized term vectors, skipping absent words.
    /// Returns the ids of every resolved term alongside the sum.
    fn sum_terms(
        &self,
        positive: &[&str],
        negative: &[&str],
    ) -> Result<(Vec<f32>, Vec<usize>), QueryError> {
        let mut acc = vec![0.0f32; self.table.dim()];
        let mut resolved = Vec::new();

        for (terms, sign) in [(positive, 1.0f32), (negative, -1.0f32)] {
            for &term in terms {
                match self.table.vocab().id(term) {
                    Some(id) => {
                        for (a, x) in acc.iter_mut().zip(self.normalized_row(id)) {
                            *a += sign * x;
                        }
                        resolved.push(id);
                    }
                    None => debug!(term, "Skipping out-of-vocabulary query term"),
                }
            }
        }

        if resolved.is_empty() {
            return Err(QueryError::NoResolvableTerms);
        }
        Ok((acc, resolved))
    }

    /// Scan the query vector against every normalized row and keep the top k.
    /// Ties on score rank by ascending vocabulary id.
    fn rank(&self, query: &[f32], k: usize, exclude: &[usize]) -> Vec<Neighbor> {
        let mut scored: Vec<(usize, f32)> = (0..self.table.len())
            .filter(|id| !exclude.contains(id))
            .map(|id| (id, dot_product(query, self.normalized_row(id))))
            .collect();

        if let Some(min) = self.config.min_score {
            scored.retain(|(_, score)| *score >= min);
        }

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored.truncate(k);

        scored
            .into_iter()
            .filter_map(|(id, score)| {
                self.table.vocab().token(id).map(|token| Neighbor {
                    id,
                    token: token.to_string(),
                    score,
                })
            })
            .collect()
    }

    fn normalized_row(&self, id: usize) -> &[f32] {
        let dim = self.table.dim();
        &self.normalized[id * dim..(id + 1) * dim]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::read_embeddings;

    // Small 2-d vocabulary with known geometry: east/ene point the same
    // general direction, north is orthogonal to east, west opposite.
    const CORPUS: &[u8] = b"east 1.0 0.0\nene 0.9 0.1\nnorth 0.0 1.0\nwest -1.0 0.0\n";

    fn lookup() -> SimilarityLookup {
        SimilarityLookup::new(read_embeddings(CORPUS).unwrap())
    }

    #[test]
    fn test_vector_dimensions() {
        let lookup = lookup();

        for word in ["east", "ene", "north", "west"] {
            assert_eq!(lookup.vector(word).map(<[f32]>::len), Some(2));
        }
        assert_eq!(lookup.vector("southeast"), None);
        assert_eq!(lookup.normalized_vector("southeast"), None);
    }

    #[test]
    fn test_normalized_rows_are_unit_norm() {
        let lookup = lookup();

        for word in ["east", "ene", "north", "west"] {
            let v = lookup.normalized_vector(word).unwrap();
            assert!((crate::similarity::l2_norm(v) - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_most_similar_includes_self_at_one() {
        let lookup = lookup();

        let neighbors = lookup.most_similar("east", 4).unwrap();
        assert_eq!(neighbors[0].token, "east");
        assert!((neighbors[0].score - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_scores_non_increasing() {
        let lookup = lookup();

        let neighbors = lookup.most_similar("east", 4).unwrap();
        assert_eq!(neighbors.len(), 4);
        for pair in neighbors.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        // known geometry: ene next, then north, then west
        let tokens: Vec<&str> = neighbors.iter().map(|n| n.token.as_str()).collect();
        assert_eq!(tokens, vec!["east", "ene", "north", "west"]);
    }

    #[test]
    fn test_singleton_set_matches_single_word() {
        let lookup = lookup();

        let single = lookup.most_similar("ene", 4).unwrap();
        let set = lookup.most_similar_terms(&["ene"], 4).unwrap();
        assert_eq!(single, set);
    }

    #[test]
    fn test_absent_terms_skipped_in_set_query() {
        let lookup = lookup();

        let with_noise = lookup.most_similar_terms(&["east", "zzz"], 4).unwrap();
        let clean = lookup.most_similar_terms(&["east"], 4).unwrap();
        assert_eq!(with_noise, clean);
    }

    #[test]
    fn test_all_absent_terms_fail() {
        let lookup = lookup();

        assert_eq!(
            lookup.most_similar("zzz", 4),
            Err(QueryError::NoResolvableTerms)
        );
        assert_eq!(
            lookup.most_similar_terms(&["zzz", "yyy"], 4),
            Err(QueryError::NoResolvableTerms)
        );
    }

    #[test]
    fn test_ties_rank_by_ascending_id() {
        // two distinct tokens sharing one direction, plus a filler row
        let input = b"twin_a 2.0 0.0\nfiller 0.0 1.0\ntwin_b 5.0 0.0\n";
        let lookup = SimilarityLookup::new(read_embeddings(&input[..]).unwrap());

        let neighbors = lookup.most_similar_terms(&["twin_a", "twin_b"], 3).unwrap();
        assert_eq!(neighbors[0].token, "twin_a");
        assert_eq!(neighbors[1].token, "twin_b");
        assert!((neighbors[0].score - neighbors[1].score).abs() < 1e-6);
    }

    #[test]
    fn test_k_larger_than_vocabulary() {
        let lookup = lookup();

        let neighbors = lookup.most_similar("east", 100).unwrap();
        assert_eq!(neighbors.len(), 4);
    }

    #[test]
    fn test_exclude_query_config() {
        let table = read_embeddings(CORPUS).unwrap();
        let config = LookupConfig::default().with_exclude_query(true);
        let lookup = SimilarityLookup::with_config(table, config);

        let neighbors = lookup.most_similar("east", 4).unwrap();
        assert_eq!(neighbors.len(), 3);
        assert_eq!(neighbors[0].token, "ene");
        assert!(neighbors.iter().all(|n| n.token != "east"));
    }

    #[test]
    fn test_min_score_config() {
        let table = read_embeddings(CORPUS).unwrap();
        let config = LookupConfig::default().with_min_score(0.5);
        let lookup = SimilarityLookup::with_config(table, config);

        let neighbors = lookup.most_similar("east", 4).unwrap();
        assert!(neighbors.iter().all(|n| n.score >= 0.5));
        assert!(neighbors.iter().all(|n| n.token != "west"));
    }

    #[test]
    fn test_similarity_pairs() {
        let lookup = lookup();

        assert!((lookup.similarity("east", "east").unwrap() - 1.0).abs() < 1e-6);
        assert!(lookup.similarity("east", "north").unwrap().abs() < 1e-6);
        assert!((lookup.similarity("east", "west").unwrap() + 1.0).abs() < 1e-6);
        assert_eq!(lookup.similarity("east", "zzz"), None);
    }

    #[test]
    fn test_analogy() {
        // man:king :: woman:? -> queen
        let input = b"man 1.0 0.0\nwoman 0.0 1.0\nking 1.0 1.0\nqueen -0.1 1.4\nturnip 0.5 -1.0\n";
        let lookup = SimilarityLookup::new(read_embeddings(&input[..]).unwrap());

        let neighbors = lookup.analogy(&["king", "woman"], &["man"], 2).unwrap();
        assert_eq!(neighbors[0].token, "queen");
        // analogy inputs never come back as results
        assert!(neighbors
            .iter()
            .all(|n| !["king", "woman", "man"].contains(&n.token.as_str())));
    }

    #[test]
    fn test_analogy_all_absent_fails() {
        let lookup = lookup();

        assert_eq!(
            lookup.analogy(&["zzz"], &["yyy"], 3),
            Err(QueryError::NoResolvableTerms)
        );
    }
}
