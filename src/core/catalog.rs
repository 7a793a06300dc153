//! Language catalog
//!
//! Static mapping of language code to display metadata. `"auto"` is a valid
//! source selection only.

use isolang::Language;
use tracing::debug;

use crate::shared::types::{LanguageEntry, AUTO_DETECT};

const BUILTIN_LANGUAGES: &[(&str, &str, &str)] = &[
    (AUTO_DETECT, "Detect language", "🌍"),
    ("en", "English", "🇺🇸"),
    ("pt", "Portuguese", "🇵🇹"),
    ("fr", "French", "🇫🇷"),
    ("es", "Spanish", "🇪🇸"),
    ("zh", "Chinese", "🇨🇳"),
    ("ru", "Russian", "🇷🇺"),
    ("ar", "Arabic", "🇸🇦"),
    ("de", "German", "🇩🇪"),
    ("it", "Italian", "🇮🇹"),
    ("ja", "Japanese", "🇯🇵"),
    ("ko", "Korean", "🇰🇷"),
    ("hi", "Hindi", "🇮🇳"),
    ("nl", "Dutch", "🇳🇱"),
    ("pl", "Polish", "🇵🇱"),
    ("tr", "Turkish", "🇹🇷"),
];

const FALLBACK_ICON: &str = "🌐";

#[derive(Debug, Clone)]
pub struct LanguageCatalog {
    entries: Vec<LanguageEntry>,
}

impl LanguageCatalog {
    pub fn builtin() -> Self {
        let entries = BUILTIN_LANGUAGES
            .iter()
            .map(|(code, name, icon)| LanguageEntry::new(*code, *name, *icon))
            .collect();
        Self { entries }
    }

    /// Extend the catalog with ISO 639-1 codes, naming them from the ISO tables.
    /// Unknown and duplicate codes are skipped.
    pub fn with_extra_codes<S: AsRef<str>>(mut self, codes: &[S]) -> Self {
        for code in codes {
            let code = code.as_ref().trim().to_ascii_lowercase();
            if self.resolve(&code).is_some() {
                continue;
            }
            match Language::from_639_1(&code) {
                Some(lang) => {
                    self.entries
                        .push(LanguageEntry::new(code.as_str(), lang.to_name(), FALLBACK_ICON));
                }
                None => debug!(code = %code, "skipping unknown language code"),
            }
        }
        self
    }

    pub fn resolve(&self, code: &str) -> Option<&LanguageEntry> {
        self.entries.iter().find(|entry| entry.code == code)
    }

    /// Every entry, `"auto"` included
    pub fn list_sources(&self) -> Vec<&LanguageEntry> {
        self.entries.iter().collect()
    }

    /// Every entry except `"auto"`
    pub fn list_targets(&self) -> Vec<&LanguageEntry> {
        self.entries.iter().filter(|entry| !entry.is_auto_detect()).collect()
    }

    pub fn is_valid_source(&self, code: &str) -> bool {
        self.resolve(code).is_some()
    }

    pub fn is_valid_target(&self, code: &str) -> bool {
        code != AUTO_DETECT && self.resolve(code).is_some()
    }

    /// `"<icon> <name>"` for known codes, the raw code otherwise
    pub fn display_label(&self, code: &str) -> String {
        self.resolve(code)
            .map(LanguageEntry::label)
            .unwrap_or_else(|| code.to_string())
    }
}

impl Default for LanguageCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_unique() {
        let catalog = LanguageCatalog::builtin();
        let mut codes: Vec<_> = catalog.list_sources().iter().map(|e| e.code.clone()).collect();
        let total = codes.len();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), total);
    }

    #[test]
    fn test_auto_is_source_only() {
        let catalog = LanguageCatalog::builtin();
        assert!(catalog.list_sources().iter().any(|e| e.code == AUTO_DETECT));
        assert!(catalog.list_targets().iter().all(|e| e.code != AUTO_DETECT));
        assert_eq!(catalog.list_targets().len(), catalog.list_sources().len() - 1);
        assert!(catalog.is_valid_source(AUTO_DETECT));
        assert!(!catalog.is_valid_target(AUTO_DETECT));
    }

    #[test]
    fn test_resolve() {
        let catalog = LanguageCatalog::builtin();
        assert_eq!(catalog.resolve("pt").unwrap().display_name, "Portuguese");
        assert!(catalog.resolve("xx").is_none());
    }

    #[test]
    fn test_display_label_falls_back_to_code() {
        let catalog = LanguageCatalog::builtin();
        assert_eq!(catalog.display_label("en"), "🇺🇸 English");
        assert_eq!(catalog.display_label("xx"), "xx");
    }

    #[test]
    fn test_extra_codes() {
        let catalog = LanguageCatalog::builtin().with_extra_codes(&["sv", "EN", "zz"]);
        let swedish = catalog.resolve("sv").unwrap();
        assert_eq!(swedish.display_name, "Swedish");
        assert!(catalog.resolve("zz").is_none());
        assert_eq!(
            catalog.list_sources().iter().filter(|e| e.code == "en").count(),
            1
        );
    }
}
