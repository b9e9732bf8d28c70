pub mod model;
pub mod store;
pub mod huffman;
pub mod skipgram;

pub mod prelude {
    pub use super::cosine_similarity;

    pub use super::model::EmbeddingModel;
    pub use super::huffman::HuffmanTree;
    pub use super::skipgram::{SkipGram, SliceTrainingReport};
}

/// Calculate cosine similarity between two vectors.
///
/// Result is within `[-1.0, 1.0]`. Zero length vectors
/// have zero similarity with any other vector.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0;
    let mut len_a = 0.0;
    let mut len_b = 0.0;

    for (a, b) in a.iter().zip(b) {
        let a = *a as f64;
        let b = *b as f64;

        dot += a * b;

        len_a += a * a;
        len_b += b * b;
    }

    if len_a == 0.0 || len_b == 0.0 {
        return 0.0;
    }

    // Rounding errors must not move identical vectors away from 1.0.
    if a == b {
        return 1.0;
    }

    (dot / (len_a * len_b).sqrt()).clamp(-1.0, 1.0)
}

#[test]
fn test_cosine_similarity() {
    assert_eq!(cosine_similarity(&[0.3, -1.2, 4.0], &[0.3, -1.2, 4.0]), 1.0);
    assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 2.0]), 0.0);
    assert_eq!(cosine_similarity(&[1.0, 2.0], &[-2.0, -4.0]), -1.0);
    assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);

    let similarity = cosine_similarity(&[1.0, 2.0, 3.0], &[1.0, 2.0, 4.0]);

    assert!(similarity > 0.99 && similarity < 1.0);
}
