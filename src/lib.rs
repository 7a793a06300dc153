//! Interactive translation session
//!
//! The presentation layer issues intents (submit, swap, copy, speak, clear,
//! delete) to a [`TranslationSession`] and re-renders from the events it
//! publishes. Translation and speech are delegated to external services.

pub mod core;
pub mod shared;
pub mod system;

pub use crate::core::catalog::LanguageCatalog;
pub use crate::core::history::{HistoryStore, HISTORY_KEY, MAX_HISTORY_SIZE};
pub use crate::core::session::{
    OutcomeDisposition, Peripherals, SessionConfig, TranslationOutcome, TranslationOutcomes,
    TranslationSession,
};
pub use crate::core::translator::{LingvaTranslator, TranslationProvider, TranslationRequest, TranslationResponse};
pub use crate::shared::error::{AppError, AppResult};
pub use crate::shared::events::AppEvent;
pub use crate::shared::settings::AppSettings;
pub use crate::shared::types::{LanguageEntry, SessionState, TranslationRecord, AUTO_DETECT, MAX_CHARACTERS};

use std::sync::Arc;

/// Wire up a session from settings with the system clipboard, platform
/// speech, the Lingva provider and the on-disk history.
pub fn build_session(settings: &AppSettings) -> AppResult<(TranslationSession, TranslationOutcomes)> {
    let catalog = LanguageCatalog::builtin().with_extra_codes(&settings.preferences.extra_languages);
    let history = HistoryStore::open(&settings.history_db_path()?);
    let provider = Arc::new(LingvaTranslator::new(&settings.provider)?);

    Ok(TranslationSession::new(
        SessionConfig::from_settings(settings),
        catalog,
        history,
        provider,
        Peripherals::system(),
    ))
}
