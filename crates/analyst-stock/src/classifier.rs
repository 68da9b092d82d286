//! Request classification
//!
//! One LLM call labels a free-text request as "specific" or "general".
//! The call is bounded by its own deadline, and every failure mode —
//! timeout, provider error, malformed reply — falls open to the default
//! "general" classification: a broken classifier degrades the request to
//! the cheaper path instead of failing it.

use crate::config::AnalystConfig;
use crate::error::{AnalystError, Result};
use crate::models::RequestClassification;
use crate::prompts;
use analyst_llm::{CompletionRequest, LlmProvider, Message};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Classifies free-text requests into a handling path
pub struct RequestClassifier {
    provider: Arc<dyn LlmProvider>,
    model: String,
    timeout: Duration,
    max_tokens: usize,
}

impl RequestClassifier {
    /// Create a classifier from the shared pipeline configuration
    pub fn new(provider: Arc<dyn LlmProvider>, config: &AnalystConfig) -> Self {
        Self {
            provider,
            model: config.model.clone(),
            timeout: config.classify_timeout,
            max_tokens: config.classify_max_tokens,
        }
    }

    /// Classify a request, falling open to "general" on any failure
    pub async fn classify(&self, user_input: &str) -> RequestClassification {
        match self.try_classify(user_input).await {
            Ok(classification) => {
                info!(
                    category = ?classification.category,
                    confidence = classification.confidence,
                    "Request classified"
                );
                classification
            }
            Err(e) => {
                warn!(error = %e, "Request classification failed, defaulting to general");
                RequestClassification::fallback()
            }
        }
    }

    async fn try_classify(&self, user_input: &str) -> Result<RequestClassification> {
        let request = CompletionRequest::new(
            &self.model,
            vec![Message::user(format!("Classify this request: '{user_input}'"))],
        )
        .with_system(prompts::CLASSIFIER_SYSTEM_PROMPT)
        .with_max_tokens(self.max_tokens);

        let response = tokio::time::timeout(self.timeout, self.provider.complete(request))
            .await
            .map_err(|_| AnalystError::UpstreamTimeout)?
            .map_err(|e| AnalystError::ClassificationFailure(e.to_string()))?;

        let text = response
            .message
            .text()
            .ok_or_else(|| AnalystError::ClassificationFailure("empty response".to_string()))?;

        parse_classification(text)
    }
}

/// Parse a classification reply
///
/// Accepts a bare JSON object or one wrapped in prose/code fences; the
/// object is whatever sits between the first `{` and the last `}`.
fn parse_classification(text: &str) -> Result<RequestClassification> {
    let start = text
        .find('{')
        .ok_or_else(|| AnalystError::ClassificationFailure("no JSON object in reply".to_string()))?;
    let end = text
        .rfind('}')
        .ok_or_else(|| AnalystError::ClassificationFailure("no JSON object in reply".to_string()))?;
    if end < start {
        return Err(AnalystError::ClassificationFailure(
            "no JSON object in reply".to_string(),
        ));
    }

    serde_json::from_str(&text[start..=end])
        .map_err(|e| AnalystError::ClassificationFailure(e.to_string()))
}
