mod simulated;

pub use simulated::SimulatedTranslator;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::document::Document;
use crate::languages::{LanguageOption, LanguagePair};

#[derive(Debug, Clone, Error)]
pub enum TranslateError {
    #[error("translator reported an error: {0}")]
    Failure(String),
    #[error("could not read the document: {0}")]
    Extraction(String),
    #[error("translation task ended unexpectedly: {0}")]
    Aborted(String),
}

/// Everything a translator receives for one call.
#[derive(Debug, Clone)]
pub struct TranslateRequest {
    pub document: Arc<Document>,
    pub source: &'static LanguageOption,
    pub target: &'static LanguageOption,
}

impl TranslateRequest {
    pub fn new(document: Arc<Document>, pair: LanguagePair) -> Self {
        Self {
            document,
            source: pair.source,
            target: pair.target,
        }
    }
}

/// External translation service: document and languages in, text out.
///
/// A call is a single opaque operation with no partial progress. Swap in a
/// real service by implementing this trait; the workflow does not change.
#[async_trait]
pub trait DocumentTranslator: Send + Sync {
    fn name(&self) -> &str;

    async fn translate(&self, request: TranslateRequest) -> Result<String, TranslateError>;
}
