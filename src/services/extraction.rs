use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("unsupported document type '{0}'")]
    UnsupportedType(String),

    #[error("document '{name}' could not be read: {reason}")]
    Unreadable { name: String, reason: String },
}

/// An uploaded document. `kind` is the lowercase file extension.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SourceDocument {
    pub name: String,
    pub kind: String,
    pub content: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    fn supports(&self, kind: &str) -> bool;

    async fn extract_text(&self, document: &SourceDocument) -> Result<String, ExtractionError>;
}

/// Handles documents that already carry their text.
pub struct PlainTextExtractor;

#[async_trait]
impl DocumentExtractor for PlainTextExtractor {
    fn supports(&self, kind: &str) -> bool {
        matches!(kind, "txt" | "md" | "text")
    }

    async fn extract_text(&self, document: &SourceDocument) -> Result<String, ExtractionError> {
        if document.content.contains('\0') {
            return Err(ExtractionError::Unreadable {
                name: document.name.clone(),
                reason: "content is binary".to_string(),
            });
        }
        Ok(document.content.trim().to_string())
    }
}

/// Routes documents to the first extractor that supports their kind.
#[derive(Clone)]
pub struct ExtractionService {
    extractors: Vec<Arc<dyn DocumentExtractor>>,
}

impl Default for ExtractionService {
    fn default() -> Self {
        Self::new(vec![Arc::new(PlainTextExtractor)])
    }
}

impl ExtractionService {
    pub fn new(extractors: Vec<Arc<dyn DocumentExtractor>>) -> Self {
        Self { extractors }
    }

    pub async fn extract(&self, document: &SourceDocument) -> Result<String, ExtractionError> {
        let kind = document.kind.to_lowercase();
        let extractor = self
            .extractors
            .iter()
            .find(|e| e.supports(&kind))
            .ok_or_else(|| ExtractionError::UnsupportedType(kind.clone()))?;
        extractor.extract_text(document).await
    }

    /// Extracts every document in order. Failures are logged and the
    /// document is left out; empty texts are dropped as well.
    pub async fn extract_all(&self, documents: &[SourceDocument]) -> Vec<String> {
        let mut texts = Vec::with_capacity(documents.len());
        for document in documents {
            match self.extract(document).await {
                Ok(text) if !text.is_empty() => texts.push(text),
                Ok(_) => log::warn!("Document '{}' has no text", document.name),
                Err(e) => log::warn!("Skipping document '{}': {}", document.name, e),
            }
        }
        texts
    }
}
