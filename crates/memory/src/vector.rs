//! Vector similarity utilities.
//!
//! The index reports squared Euclidean distance between normalised vectors
//! (`2 - 2 * similarity`), so results sort ascending and stay in `[0, 4]`.
//! Distance thresholds in the config are on this scale.

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 = identical, 0 = orthogonal, -1 = opposite.
/// Returns 0.0 if either vector is zero-length or empty.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }

    (dot / denom) as f32
}

/// Squared L2 distance between `a` and `b` after scaling both to unit length.
///
/// Orthogonal vectors are `2.0` apart, opposite ones `4.0`.
pub fn squared_l2_distance(a: &[f32], b: &[f32]) -> f64 {
    (2.0 - 2.0 * cosine_similarity(a, b) as f64).clamp(0.0, 4.0)
}

/// The `limit` items closest to `query`, nearest first, paired with their distance.
///
/// Ties keep insertion order.
pub fn nearest<'a, T>(
    items: &'a [T],
    embedding_of: impl Fn(&T) -> &[f32],
    query: &[f32],
    limit: usize,
) -> Vec<(f64, &'a T)> {
    let mut scored: Vec<(f64, &T)> = items
        .iter()
        .map(|item| (squared_l2_distance(embedding_of(item), query), item))
        .collect();

    scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(limit);
    scored
}
