use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

/// Sentinel source language meaning "let the provider detect it"
pub const AUTO_DETECT: &str = "auto";

/// Hard cap on source text length, in characters
pub const MAX_CHARACTERS: usize = 5000;

/// Minimum trimmed length, in characters, for a submission to be dispatched
pub const MIN_CHARACTERS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LanguageEntry {
    pub code: String,
    pub display_name: String,
    pub icon: String,
}

impl LanguageEntry {
    pub fn new(code: impl Into<String>, display_name: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            display_name: display_name.into(),
            icon: icon.into(),
        }
    }

    pub fn is_auto_detect(&self) -> bool {
        self.code == AUTO_DETECT
    }

    /// `"<icon> <name>"`, as shown in selectors and history headers
    pub fn label(&self) -> String {
        format!("{} {}", self.icon, self.display_name)
    }
}

/// One retained exchange. Field names on the wire match the browser
/// `localStorage` layout so existing logs load unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TranslationRecord {
    #[serde(deserialize_with = "deserialize_record_id")]
    pub id: String,
    pub source_text: String,
    #[serde(rename = "translation")]
    #[serde(alias = "translatedText")]
    pub translated_text: String,
    pub source_language: String,
    pub target_language: String,
    #[serde(rename = "timestamp")]
    #[serde(alias = "createdAt")]
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

impl TranslationRecord {
    pub fn new(
        source_text: impl Into<String>,
        translated_text: impl Into<String>,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            source_text: source_text.into(),
            translated_text: translated_text.into(),
            source_language: source_language.into(),
            target_language: target_language.into(),
            created_at: Utc::now(),
        }
    }
}

/// Older logs used millisecond timestamps as numeric ids.
fn deserialize_record_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(id) => id,
        RawId::Number(id) => id.to_string(),
    })
}

/// Ephemeral state of the current exchange. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SessionState {
    pub source_text: String,
    pub translated_text: String,
    pub source_language_code: String,
    pub target_language_code: String,
    pub is_translating: bool,
    pub last_error: Option<String>,
}

impl SessionState {
    pub fn new(source_language_code: impl Into<String>, target_language_code: impl Into<String>) -> Self {
        Self {
            source_text: String::new(),
            translated_text: String::new(),
            source_language_code: source_language_code.into(),
            target_language_code: target_language_code.into(),
            is_translating: false,
            last_error: None,
        }
    }

    /// Live character counter value
    pub fn char_count(&self) -> usize {
        self.source_text.chars().count()
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(AUTO_DETECT, "pt")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_roundtrips_browser_layout() {
        let json = r#"{
            "id": 1717171717171,
            "sourceText": "Hello",
            "translation": "Olá",
            "sourceLanguage": "en",
            "targetLanguage": "pt",
            "timestamp": "2024-05-31T12:00:00.000Z"
        }"#;

        let record: TranslationRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, "1717171717171");
        assert_eq!(record.translated_text, "Olá");
        assert_eq!(record.source_language, "en");

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["translation"], "Olá");
        assert_eq!(value["sourceText"], "Hello");
        assert!(value.get("timestamp").is_some());
    }

    #[test]
    fn test_record_accepts_field_name_aliases() {
        let json = r#"{
            "id": "abc",
            "sourceText": "Bonjour",
            "translatedText": "Hello",
            "sourceLanguage": "fr",
            "targetLanguage": "en",
            "createdAt": "2024-05-31T12:00:00Z"
        }"#;

        let record: TranslationRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.translated_text, "Hello");
        assert_eq!(record.created_at.to_rfc3339(), "2024-05-31T12:00:00+00:00");
    }

    #[test]
    fn test_new_records_get_unique_ids() {
        let a = TranslationRecord::new("a", "b", "en", "pt");
        let b = TranslationRecord::new("a", "b", "en", "pt");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_char_count_counts_chars_not_bytes() {
        let mut state = SessionState::default();
        state.source_text = "Olá".to_string();
        assert_eq!(state.char_count(), 3);
    }

    #[test]
    fn test_language_label() {
        let entry = LanguageEntry::new("en", "English", "🇺🇸");
        assert_eq!(entry.label(), "🇺🇸 English");
        assert!(!entry.is_auto_detect());
    }
}
