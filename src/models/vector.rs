//! Vector math shared by the encoder and downstream consumers.
//!
//! Sums of squares are accumulated in `f64`: squaring large or tiny `f32`
//! components overflows or underflows in `f32`.

fn sum_of_squares(vector: &[f32]) -> f64 {
    vector.iter().map(|&x| f64::from(x) * f64::from(x)).sum()
}

/// Euclidean norm of a vector
pub fn l2_norm(vector: &[f32]) -> f32 {
    sum_of_squares(vector).sqrt() as f32
}

/// Scale a vector in place to unit length.
///
/// Returns `false` and leaves the vector untouched when its norm is zero or
/// not finite, since no unit vector exists for it.
pub fn l2_normalize(vector: &mut [f32]) -> bool {
    let norm = sum_of_squares(vector).sqrt();
    if norm == 0.0 || !norm.is_finite() {
        return false;
    }

    let inv_norm = norm.recip();
    for x in vector.iter_mut() {
        *x = (f64::from(*x) * inv_norm) as f32;
    }
    true
}

/// Cosine similarity between two vectors.
///
/// Mismatched lengths, empty input and zero magnitudes all yield `0.0`.
/// For unit-normalized embeddings this equals the dot product.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    for (&x, &y) in a.iter().zip(b) {
        dot += f64::from(x) * f64::from(y);
    }
    let (mag_a, mag_b) = (sum_of_squares(a), sum_of_squares(b));

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    (dot / (mag_a.sqrt() * mag_b.sqrt())) as f32
}
