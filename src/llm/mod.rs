//! Language-model access for paper analysis.
//!
//! This module provides the model seam, the Ollama client behind it and
//! the per-paper analyzer.

pub mod analyzer;
pub mod ollama;

use async_trait::async_trait;
use thiserror::Error;

pub use analyzer::PaperAnalyzer;
pub use ollama::{OllamaClient, OllamaConfig};

/// Errors from a completion call.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Cannot connect to Ollama at {0}")]
    Connect(String),

    #[error("Failed to send request: {0}")]
    Request(String),

    #[error("Ollama API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to parse Ollama response: {0}")]
    Decode(String),
}

/// A single-turn text completion backend.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Identifier of the model answering prompts.
    fn model_name(&self) -> &str;

    async fn complete(&self, prompt: &str) -> Result<String, ModelError>;
}
