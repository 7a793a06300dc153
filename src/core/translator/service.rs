use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use super::types::{LingvaBody, TranslationRequest, TranslationResponse};
use super::TranslationProvider;
use crate::shared::error::{AppError, AppResult};
use crate::shared::settings::ProviderSettings;

/// Lingva front end for the public translation endpoint
pub struct LingvaTranslator {
    http: Client,
    base_url: String,
}

impl LingvaTranslator {
    pub fn new(settings: &ProviderSettings) -> AppResult<Self> {
        let http = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| AppError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// `{base}/api/v1/{source}/{target}/{text}` with every segment percent-encoded
    pub fn request_url(&self, req: &TranslationRequest) -> String {
        format!(
            "{}/api/v1/{}/{}/{}",
            self.base_url,
            urlencoding::encode(&req.source),
            urlencoding::encode(&req.target),
            urlencoding::encode(&req.text)
        )
    }
}

#[async_trait]
impl TranslationProvider for LingvaTranslator {
    async fn translate(&self, req: &TranslationRequest) -> AppResult<TranslationResponse> {
        let url = self.request_url(req);
        debug!(source = %req.source, target = %req.target, chars = req.text.chars().count(), "requesting translation");

        let res = self.http.get(&url).send().await?;
        if !res.status().is_success() {
            warn!(status = %res.status(), "translation provider returned an error");
            return Err(AppError::Network(format!("Translation API error: {}", res.status())));
        }

        let body = res.text().await?;
        let parsed: LingvaBody = serde_json::from_str(&body)
            .map_err(|e| AppError::Parse(format!("Failed to parse translation API response: {}", e)))?;

        Ok(parsed.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::settings::AppSettings;

    fn translator(base_url: &str) -> LingvaTranslator {
        let mut settings = AppSettings::default().provider;
        settings.base_url = base_url.to_string();
        LingvaTranslator::new(&settings).unwrap()
    }

    #[test]
    fn test_request_url_encodes_text() {
        let t = translator("https://lingva.ml/");
        let url = t.request_url(&TranslationRequest::new("Hello world/?", "en", "pt"));
        assert_eq!(url, "https://lingva.ml/api/v1/en/pt/Hello%20world%2F%3F");
    }

    #[test]
    fn test_request_url_with_auto_source() {
        let t = translator("http://localhost:3000");
        let url = t.request_url(&TranslationRequest::new("Olá", "auto", "en"));
        assert_eq!(url, "http://localhost:3000/api/v1/auto/en/Ol%C3%A1");
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_network_failure() {
        // Nothing listens on the discard port
        let t = translator("http://127.0.0.1:9");
        let err = t.translate(&TranslationRequest::new("Hello", "en", "pt")).await.unwrap_err();
        assert!(matches!(err, AppError::Network(_) | AppError::Timeout(_)));
    }

    #[tokio::test]
    #[ignore] // Hits the public endpoint
    async fn test_live_translation() {
        let t = translator("https://lingva.ml");
        let res = t.translate(&TranslationRequest::new("Hello", "en", "pt")).await.unwrap();
        println!("Translated: {}", res.translated);
        assert!(!res.translated.is_empty());
    }
}
