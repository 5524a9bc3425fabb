//! Semantic search over a campaign's chunks.
//!
//! Brute force by design: embed the query, load every chunk for the campaign,
//! score with cosine similarity, stable-sort descending, truncate. Realistic
//! campaigns stay in the low thousands of chunks, where this is faster than
//! maintaining an ANN structure would be worth. Search never mutates the
//! store and is safe for concurrent callers.

use rusqlite::{params, Connection};
use serde::Serialize;
use tracing::warn;

use crate::campaign::types::SourceType;
use crate::embedding::EmbeddingProvider;
use crate::error::Result;

/// A chunk with its similarity score for one query.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredChunk {
    pub chunk_id: i64,
    pub source_type: SourceType,
    pub source_id: i64,
    pub text: String,
    pub score: f64,
}

/// Rank a campaign's chunks against a query, most relevant first.
///
/// Provider failures propagate as [`crate::Error::Provider`] and are not
/// retried here. An empty result is valid (empty campaign or corpus). Ties
/// keep insertion order; stored vectors whose dimensionality differs from
/// the query vector are never compared and are skipped with a warning.
pub fn search(
    conn: &Connection,
    provider: &dyn EmbeddingProvider,
    query: &str,
    campaign_id: i64,
    limit: usize,
) -> Result<Vec<ScoredChunk>> {
    let query_vec = provider.embed(query)?;
    let query_norm = norm(&query_vec);

    let mut stmt = conn.prepare(
        "SELECT id, source_type, source_id, text_content, embedding \
         FROM chunks WHERE campaign_id = ?1 ORDER BY id",
    )?;
    let rows = stmt
        .query_map(params![campaign_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut scored: Vec<ScoredChunk> = Vec::with_capacity(rows.len());
    for (chunk_id, source_type, source_id, text, embedding_json) in rows {
        let source_type: SourceType = match source_type.parse() {
            Ok(st) => st,
            Err(_) => continue,
        };
        let vec: Vec<f32> = match serde_json::from_str(&embedding_json) {
            Ok(v) => v,
            Err(e) => {
                warn!(chunk_id, error = %e, "unreadable embedding, chunk skipped");
                continue;
            }
        };
        if vec.len() != query_vec.len() {
            warn!(
                chunk_id,
                stored = vec.len(),
                query = query_vec.len(),
                "dimension mismatch, chunk skipped"
            );
            continue;
        }

        scored.push(ScoredChunk {
            chunk_id,
            source_type,
            source_id,
            text,
            score: cosine_similarity(&vec, &query_vec, query_norm),
        });
    }

    // Stable sort: equal scores keep insertion order.
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(limit);
    Ok(scored)
}

fn norm(v: &[f32]) -> f64 {
    v.iter().map(|x| (*x as f64) * (*x as f64)).sum::<f64>().sqrt()
}

/// Cosine similarity with a zero-norm guard: either vector having zero norm
/// yields 0.0 rather than dividing by zero.
fn cosine_similarity(v: &[f32], q: &[f32], q_norm: f64) -> f64 {
    let denom = norm(v) * q_norm;
    if denom == 0.0 {
        return 0.0;
    }
    let dot: f64 = v.iter().zip(q).map(|(a, b)| (*a as f64) * (*b as f64)).sum();
    dot / denom
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let v = vec![0.5f32, 0.5, 0.0];
        let q_norm = norm(&v);
        let sim = cosine_similarity(&v, &v, q_norm);
        assert!((sim - 1.0).abs() < 1e-9);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        let a = vec![1.0f32, 0.0];
        let b = vec![0.0f32, 1.0];
        let sim = cosine_similarity(&a, &b, norm(&b));
        assert!(sim.abs() < 1e-9);
    }

    #[test]
    fn zero_norm_guard_returns_zero() {
        let zero = vec![0.0f32, 0.0];
        let q = vec![1.0f32, 0.0];
        assert_eq!(cosine_similarity(&zero, &q, norm(&q)), 0.0);
        assert_eq!(cosine_similarity(&q, &zero, norm(&zero)), 0.0);
    }
}
