use serde::{Deserialize, Serialize};

/// What gets sent to the provider, keyed by `(source, target, text)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub text: String,
    pub source: String,
    pub target: String,
}

impl TranslationRequest {
    pub fn new(text: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: source.into(),
            target: target.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResponse {
    pub translated: String,
}

/// Body returned by `GET /api/v1/{source}/{target}/{text}`
#[derive(Debug, Default, Deserialize)]
pub(crate) struct LingvaBody {
    #[serde(default)]
    pub translation: Option<String>,
}

impl From<LingvaBody> for TranslationResponse {
    fn from(body: LingvaBody) -> Self {
        Self {
            translated: body.translation.unwrap_or_default(),
        }
    }
}
