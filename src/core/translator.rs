//! Translator feature
//!
//! The translation provider is an external collaborator; this module defines
//! the seam the session talks to and the Lingva HTTP implementation behind it.

pub mod service;
pub mod types;

use async_trait::async_trait;

use crate::shared::error::AppResult;
pub use service::LingvaTranslator;
pub use types::{TranslationRequest, TranslationResponse};

/// External translation service
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Translate `request.text`. A response without a translation is an
    /// empty string, not an error.
    async fn translate(&self, request: &TranslationRequest) -> AppResult<TranslationResponse>;
}
