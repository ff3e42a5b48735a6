//! Shared numeric helpers for weighting and feature-space distances.

/// Normalize raw weights so they sum to 1.0.
///
/// Falls back to a uniform distribution when the weights do not sum to a
/// positive, finite number (all zeros, for example).
///
/// # Arguments
/// * `weights` - Raw, non-negative weights
///
/// # Returns
/// A vector of the same length whose entries sum to 1.0 (or an empty vector)
pub fn normalize_weights(weights: &[f32]) -> Vec<f32> {
    if weights.is_empty() {
        return Vec::new();
    }

    let sum: f32 = weights.iter().sum();
    if sum > 0.0 && sum.is_finite() {
        weights.iter().map(|w| w / sum).collect()
    } else {
        let uniform = 1.0 / weights.len() as f32;
        vec![uniform; weights.len()]
    }
}

/// Weighted Euclidean distance between two points of equal dimension.
///
/// Returns `f32::INFINITY` if the slices have different lengths.
pub fn weighted_distance(a: &[f32], b: &[f32], weights: &[f32]) -> f32 {
    if a.len() != b.len() || a.len() != weights.len() {
        return f32::INFINITY;
    }

    a.iter()
        .zip(b.iter())
        .zip(weights.iter())
        .map(|((x, y), w)| w * (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

/// Map `value` from `[min, max]` onto `[0, 1]`.
pub fn unit_scale(value: f32, min: f32, max: f32) -> f32 {
    let span = max - min;
    if span <= 0.0 {
        return 0.0;
    }
    (value - min) / span
}
