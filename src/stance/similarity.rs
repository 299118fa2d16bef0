//! Text similarity collaborator.
//!
//! Any embedding backend can be plugged in through [`Similarity`]; the crate
//! ships a bag-of-words cosine ([`TermVectorSimilarity`]) so the model path
//! is usable without external services.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimilarityError {
    #[error("similarity backend unavailable: {0}")]
    Unavailable(String),
    #[error("similarity backend returned a non-finite score")]
    NonFinite,
}

/// Cosine-style similarity in [-1, 1].
pub trait Similarity: Send + Sync {
    fn similarity(&self, a: &str, b: &str) -> Result<f32, SimilarityError>;

    /// Backend name for logs.
    fn name(&self) -> &'static str;
}

pub type DynSimilarity = Arc<dyn Similarity>;

/// Cosine over lower-cased term frequencies, stopwords removed.
#[derive(Debug, Clone, Copy, Default)]
pub struct TermVectorSimilarity;

impl Similarity for TermVectorSimilarity {
    fn similarity(&self, a: &str, b: &str) -> Result<f32, SimilarityError> {
        let va = term_vector(a);
        let vb = term_vector(b);
        if va.is_empty() || vb.is_empty() {
            return Ok(0.0);
        }

        let dot: f32 = va
            .iter()
            .filter_map(|(t, x)| vb.get(t).map(|y| x * y))
            .sum();
        let na = va.values().map(|x| x * x).sum::<f32>().sqrt();
        let nb = vb.values().map(|y| y * y).sum::<f32>().sqrt();

        let cos = dot / (na * nb).max(f32::EPSILON);
        if cos.is_finite() {
            Ok(cos.clamp(-1.0, 1.0))
        } else {
            Err(SimilarityError::NonFinite)
        }
    }

    fn name(&self) -> &'static str {
        "term_vector"
    }
}

fn term_vector(text: &str) -> HashMap<String, f32> {
    let mut out = HashMap::new();
    for tok in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .filter(|t| !is_stopword(t))
    {
        *out.entry(tok).or_insert(0.0) += 1.0;
    }
    out
}

fn is_stopword(tok: &str) -> bool {
    matches!(
        tok,
        "a" | "an"
            | "the"
            | "and"
            | "or"
            | "of"
            | "in"
            | "on"
            | "to"
            | "for"
            | "with"
            | "by"
            | "is"
            | "are"
            | "was"
            | "were"
            | "be"
            | "it"
            | "this"
            | "that"
            | "as"
            | "at"
            | "from"
    )
}
