//! Similarity query types and nearest-neighbor selection

use crate::domain::embedding::similarity_score;
use crate::domain::fingerprint::Fingerprint;

use super::CacheEntry;

/// A nearest-neighbor lookup scoped to one fingerprint partition
#[derive(Debug, Clone)]
pub struct SimilarityQuery {
    pub embedding: Vec<f32>,
    pub fingerprint: Fingerprint,
    /// Hard cutoff: the nearest entry is discarded when it scores below this
    pub score_threshold: f32,
}

impl SimilarityQuery {
    pub fn new(embedding: Vec<f32>, fingerprint: Fingerprint, score_threshold: f32) -> Self {
        Self {
            embedding,
            fingerprint,
            score_threshold,
        }
    }
}

/// The entry a query resolved to and its similarity score
#[derive(Debug, Clone)]
pub struct SemanticMatch {
    pub entry: CacheEntry,
    /// Similarity score (0.0 to 1.0)
    pub score: f32,
}

impl SemanticMatch {
    pub fn new(entry: CacheEntry, score: f32) -> Self {
        Self { entry, score }
    }
}

/// Select the best candidate for a query
///
/// Candidates carry their insertion sequence. Entries outside the query's
/// partition are skipped; equal top scores go to the most recently inserted
/// entry; a best score under the threshold yields no match.
pub fn select_nearest<'a, I>(candidates: I, query: &SimilarityQuery) -> Option<(&'a CacheEntry, f32)>
where
    I: IntoIterator<Item = (u64, &'a CacheEntry)>,
{
    let mut best: Option<(u64, &'a CacheEntry, f32)> = None;

    for (sequence, entry) in candidates {
        if entry.fingerprint() != &query.fingerprint {
            continue;
        }

        let score = similarity_score(&query.embedding, entry.embedding());

        let replace = match best {
            None => true,
            Some((best_sequence, _, best_score)) => {
                score > best_score || (score == best_score && sequence > best_sequence)
            }
        };

        if replace {
            best = Some((sequence, entry, score));
        }
    }

    best.filter(|(_, _, score)| *score >= query.score_threshold)
        .map(|(_, entry, score)| (entry, score))
}
