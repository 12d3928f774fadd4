//! Embedding service interface.
//!
//! Semantic search is the only consumer: the question text is embedded and the
//! resulting vector is matched against the vectors stored on indexed nodes.

pub mod ollama;

use std::{error::Error, fmt, future::Future};

pub use ollama::OllamaEmbedder;

#[derive(Debug)]
pub enum EmbedError {
    Request(String),
    Status(u16),
    Response(String),
    DimensionMismatch { expected: usize, actual: usize },
}

impl fmt::Display for EmbedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request(message) => write!(f, "embedding request failed: {message}"),
            Self::Status(status) => write!(f, "embedding service returned status {status}"),
            Self::Response(message) => write!(f, "invalid embedding response: {message}"),
            Self::DimensionMismatch { expected, actual } => write!(
                f,
                "embedding has {actual} dimensions, expected {expected}"
            ),
        }
    }
}

impl Error for EmbedError {}

/// Turns text into a fixed-length vector matching the graph's vector index.
pub trait Embedder: Send + Sync + 'static {
    /// Width of the vectors produced by `embed`.
    fn dimensions(&self) -> usize;

    /// Embeds a single text.
    fn embed(&self, text: &str) -> impl Future<Output = Result<Vec<f32>, EmbedError>> + Send;
}
