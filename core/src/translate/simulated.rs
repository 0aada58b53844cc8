use std::time::Duration;

use async_trait::async_trait;
use log::debug;

use super::{DocumentTranslator, TranslateError, TranslateRequest};
use crate::config::SimulatorOptions;
use crate::extract::extract_text;

/// Stand-in for the model-backed service. Waits, extracts the document's
/// text and wraps it in a canned template for the target language.
#[derive(Debug, Clone)]
pub struct SimulatedTranslator {
    latency: Duration,
}

impl SimulatedTranslator {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    pub fn from_options(options: &SimulatorOptions) -> Self {
        Self::new(Duration::from_millis(options.latency_ms))
    }
}

impl Default for SimulatedTranslator {
    fn default() -> Self {
        Self::from_options(&SimulatorOptions::default())
    }
}

#[async_trait]
impl DocumentTranslator for SimulatedTranslator {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn translate(&self, request: TranslateRequest) -> Result<String, TranslateError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let extracted = extract_text(&request.document)
            .map_err(|err| TranslateError::Extraction(format!("{err:#}")))?;

        debug!(
            "simulated translation of {} from {} to {}",
            request.document.name(),
            request.source.code,
            request.target.code
        );

        Ok(render_template(request.target.code, &extracted))
    }
}

fn render_template(target_code: &str, extracted: &str) -> String {
    match target_code {
        "ar" => format!(
            "[الترجمة العربية]\n\n\
             هذا نص مترجم تجريبي للمستند الطبي. في بيئة الإنتاج، سيتم استخدام واجهة برمجة تطبيقات Gemini لترجمة المحتوى الفعلي.\n\n\
             المحتوى الأصلي:\n{extracted}"
        ),
        _ => format!(
            "[English Translation]\n\n\
             This is a simulated translation for the medical document. In a production environment, \
             the Gemini API would be used to translate the actual content.\n\n\
             Original content:\n{extracted}"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::languages::{LanguagePair, LANGUAGES};
    use std::sync::Arc;

    fn request(name: &str, content: &[u8], pair: LanguagePair) -> TranslateRequest {
        TranslateRequest::new(Arc::new(Document::new(name, content.to_vec())), pair)
    }

    #[tokio::test]
    async fn arabic_target_uses_arabic_template() {
        let translator = SimulatedTranslator::new(Duration::ZERO);
        let text = translator
            .translate(request("note.txt", b"BP 120/80", LanguagePair::default()))
            .await
            .unwrap();
        assert!(text.starts_with("[الترجمة العربية]"));
        assert!(text.ends_with("BP 120/80"));
    }

    #[tokio::test]
    async fn english_target_uses_english_template() {
        let translator = SimulatedTranslator::new(Duration::ZERO);
        let pair = LanguagePair::new(&LANGUAGES[1], &LANGUAGES[0]);
        let text = translator
            .translate(request("note.md", b"line one\nline two", pair))
            .await
            .unwrap();
        assert!(text.starts_with("[English Translation]\n\n"));
        assert!(text.ends_with("Original content:\nline one\nline two"));
    }

    #[tokio::test]
    async fn unreadable_docx_is_an_extraction_error() {
        let translator = SimulatedTranslator::new(Duration::ZERO);
        let err = translator
            .translate(request("bad.docx", b"nope", LanguagePair::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, TranslateError::Extraction(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn waits_for_configured_latency() {
        let translator = SimulatedTranslator::from_options(&SimulatorOptions { latency_ms: 2_000 });
        let started = tokio::time::Instant::now();
        translator
            .translate(request("a.txt", b"x", LanguagePair::default()))
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_millis(2_000));
    }
}
