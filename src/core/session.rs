//! Translation session manager
//!
//! Owns the current exchange (input text, output text, language pair, loading
//! flag) and orchestrates the provider call. Every intent from the
//! presentation layer lands here and runs to completion; the provider call is
//! the only thing that suspends.
//!
//! Each submission is tagged with a monotonic sequence number and spawned on
//! the tokio runtime. Its result comes back through [`TranslationOutcomes`]
//! and is fed to [`TranslationSession::apply_outcome`], which drops any result
//! that is not for the latest submission. A new submission also aborts the
//! task of the one it supersedes.

pub mod indicator;

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::core::catalog::LanguageCatalog;
use crate::core::history::HistoryStore;
use crate::core::translator::{TranslationProvider, TranslationRequest, TranslationResponse};
use crate::shared::emit::EventEmitter;
use crate::shared::error::{AppError, AppResult};
use crate::shared::events::AppEvent;
use crate::shared::settings::AppSettings;
use crate::shared::types::{
    SessionState, TranslationRecord, AUTO_DETECT, MAX_CHARACTERS, MIN_CHARACTERS,
};
use crate::system::clipboard::{ClipboardWriter, SystemClipboard};
use crate::system::speech::{PlatformSpeech, SpeechSynthesizer, Utterance};
pub use indicator::CopyIndicator;

pub const ERROR_PLACEHOLDER: &str = "Translation failed. Please try again.";

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub source_language: String,
    pub target_language: String,
    pub request_timeout: Duration,
    pub speech_rate: f32,
    pub copied_indicator: Duration,
    pub error_placeholder: String,
}

impl SessionConfig {
    pub fn from_settings(settings: &AppSettings) -> Self {
        Self {
            source_language: settings.preferences.default_source_lang.clone(),
            target_language: settings.preferences.default_target_lang.clone(),
            request_timeout: settings.request_timeout(),
            speech_rate: settings.preferences.speech_rate,
            copied_indicator: Duration::from_millis(settings.preferences.copied_indicator_ms),
            error_placeholder: ERROR_PLACEHOLDER.to_string(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from_settings(&AppSettings::default())
    }
}

/// Clipboard and speech collaborators
#[derive(Clone)]
pub struct Peripherals {
    pub clipboard: Arc<dyn ClipboardWriter>,
    pub speech: Arc<dyn SpeechSynthesizer>,
}

impl Peripherals {
    pub fn system() -> Self {
        Self {
            clipboard: Arc::new(SystemClipboard),
            speech: Arc::new(PlatformSpeech::new()),
        }
    }
}

/// Resolution of one dispatched request
#[derive(Debug, Clone)]
pub struct TranslationOutcome {
    pub sequence: u64,
    pub request: TranslationRequest,
    pub result: AppResult<TranslationResponse>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeDisposition {
    Applied,
    /// Superseded by a newer submission; state untouched
    Stale,
}

/// Receiving end for request resolutions
pub struct TranslationOutcomes {
    rx: mpsc::UnboundedReceiver<TranslationOutcome>,
}

impl TranslationOutcomes {
    pub async fn recv(&mut self) -> Option<TranslationOutcome> {
        self.rx.recv().await
    }

    /// Wait for the next resolution and apply it
    pub async fn settle(&mut self, session: &mut TranslationSession) -> Option<OutcomeDisposition> {
        let outcome = self.recv().await?;
        Some(session.apply_outcome(outcome))
    }

    /// Apply resolutions until nothing is in flight
    pub async fn settle_latest(&mut self, session: &mut TranslationSession) {
        while session.state().is_translating {
            if self.settle(session).await.is_none() {
                break;
            }
        }
    }
}

/// Whether a submission passes the pre-dispatch checks
pub fn is_submittable(text: &str, target: &str) -> bool {
    target != AUTO_DETECT
        && text.trim().chars().count() >= MIN_CHARACTERS
        && text.chars().count() <= MAX_CHARACTERS
}

pub struct TranslationSession {
    state: SessionState,
    history: HistoryStore,
    catalog: LanguageCatalog,
    provider: Arc<dyn TranslationProvider>,
    peripherals: Peripherals,
    events: EventEmitter,
    copied: CopyIndicator,
    config: SessionConfig,
    sequence: u64,
    in_flight: Option<JoinHandle<()>>,
    outcomes_tx: mpsc::UnboundedSender<TranslationOutcome>,
}

impl TranslationSession {
    pub fn new(
        config: SessionConfig,
        catalog: LanguageCatalog,
        history: HistoryStore,
        provider: Arc<dyn TranslationProvider>,
        peripherals: Peripherals,
    ) -> (Self, TranslationOutcomes) {
        let source = if catalog.is_valid_source(&config.source_language) {
            config.source_language.clone()
        } else {
            warn!(code = %config.source_language, "unknown default source language, using auto-detect");
            AUTO_DETECT.to_string()
        };
        let target = if catalog.is_valid_target(&config.target_language) {
            config.target_language.clone()
        } else {
            let fallback = catalog
                .list_targets()
                .first()
                .map(|entry| entry.code.clone())
                .unwrap_or_else(|| "en".to_string());
            warn!(code = %config.target_language, fallback = %fallback, "invalid default target language");
            fallback
        };

        let (outcomes_tx, rx) = mpsc::unbounded_channel();
        let session = Self {
            state: SessionState::new(source, target),
            history,
            catalog,
            provider,
            peripherals,
            events: EventEmitter::new(),
            copied: CopyIndicator::new(),
            config,
            sequence: 0,
            in_flight: None,
            outcomes_tx,
        };

        (session, TranslationOutcomes { rx })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Retained exchanges, newest first
    pub fn history(&self) -> &[TranslationRecord] {
        self.history.records()
    }

    pub fn is_history_durable(&self) -> bool {
        self.history.is_durable()
    }

    pub fn catalog(&self) -> &LanguageCatalog {
        &self.catalog
    }

    pub fn events(&self) -> &EventEmitter {
        &self.events
    }

    pub fn copied(&self) -> bool {
        self.copied.is_set()
    }

    /// Submit control enablement
    pub fn can_submit(&self) -> bool {
        !self.state.source_text.is_empty() && !self.state.is_translating
    }

    /// Swap control enablement
    pub fn can_swap(&self) -> bool {
        self.state.source_language_code != AUTO_DETECT
    }

    pub fn char_count(&self) -> usize {
        self.state.char_count()
    }

    /// Editing intent. Input beyond the character cap is cut off.
    pub fn set_source_text(&mut self, text: &str) {
        self.state.source_text = if text.chars().count() > MAX_CHARACTERS {
            text.chars().take(MAX_CHARACTERS).collect()
        } else {
            text.to_string()
        };
        self.publish_state();
    }

    pub fn set_source_language(&mut self, code: &str) -> AppResult<()> {
        if !self.catalog.is_valid_source(code) {
            return Err(AppError::Validation(format!("Unknown source language: {}", code)));
        }
        self.state.source_language_code = code.to_string();
        self.publish_state();
        Ok(())
    }

    pub fn set_target_language(&mut self, code: &str) -> AppResult<()> {
        if code == AUTO_DETECT {
            return Err(AppError::Validation(
                "Language detection is only available for the source language".to_string(),
            ));
        }
        if !self.catalog.is_valid_target(code) {
            return Err(AppError::Validation(format!("Unknown target language: {}", code)));
        }
        self.state.target_language_code = code.to_string();
        self.publish_state();
        Ok(())
    }

    /// Submit the current input with the current language pair
    pub fn submit_current(&mut self) -> Option<u64> {
        let text = self.state.source_text.clone();
        let source = self.state.source_language_code.clone();
        let target = self.state.target_language_code.clone();
        self.submit_translation(&text, &source, &target)
    }

    /// Dispatch a translation request. Invalid input is skipped silently and
    /// clears any stale output. Returns the sequence number of the dispatched
    /// request. Must run inside a tokio runtime.
    pub fn submit_translation(&mut self, text: &str, source: &str, target: &str) -> Option<u64> {
        if !is_submittable(text, target) {
            debug!(chars = text.chars().count(), target, "submission skipped");
            self.state.translated_text.clear();
            self.publish_state();
            return None;
        }

        if let Some(handle) = self.in_flight.take() {
            handle.abort();
            debug!(superseded = self.sequence, "aborting superseded request");
        }

        self.sequence += 1;
        let sequence = self.sequence;
        let request = TranslationRequest::new(text, source, target);

        self.state.is_translating = true;
        self.state.last_error = None;

        let provider = Arc::clone(&self.provider);
        let tx = self.outcomes_tx.clone();
        let timeout = self.config.request_timeout;
        self.in_flight = Some(tokio::spawn(async move {
            let result = match tokio::time::timeout(timeout, provider.translate(&request)).await {
                Ok(result) => result,
                Err(elapsed) => Err(AppError::from(elapsed)),
            };
            // The receiver only goes away with the session
            let _ = tx.send(TranslationOutcome { sequence, request, result });
        }));

        info!(sequence, source, target, "translation dispatched");
        self.publish_state();
        Some(sequence)
    }

    /// Fold a request resolution into the session
    pub fn apply_outcome(&mut self, outcome: TranslationOutcome) -> OutcomeDisposition {
        if outcome.sequence != self.sequence || !self.state.is_translating {
            debug!(sequence = outcome.sequence, latest = self.sequence, "discarding stale translation response");
            return OutcomeDisposition::Stale;
        }

        self.in_flight = None;
        self.state.is_translating = false;
        // Input resets after every resolution, success or not
        self.state.source_text.clear();

        match outcome.result {
            Ok(response) => {
                let request = outcome.request;
                let record = TranslationRecord::new(
                    request.text,
                    response.translated.clone(),
                    request.source,
                    request.target,
                );
                info!(sequence = outcome.sequence, id = %record.id, "translation applied");

                self.state.translated_text = response.translated;
                self.state.last_error = None;
                self.history.append(record);
                self.publish_history();
            }
            Err(e) => {
                warn!(sequence = outcome.sequence, error = %e, "translation failed");
                self.state.translated_text = self.config.error_placeholder.clone();
                self.state.last_error = Some(e.to_string());
            }
        }

        self.publish_state();
        OutcomeDisposition::Applied
    }

    /// Exchange the language pair and the two texts. No-op while the source is auto-detect.
    pub fn swap_languages(&mut self) -> bool {
        if !self.can_swap() {
            debug!("swap ignored, source language is auto-detect");
            return false;
        }

        let state = &mut self.state;
        std::mem::swap(&mut state.source_language_code, &mut state.target_language_code);
        std::mem::swap(&mut state.source_text, &mut state.translated_text);
        self.publish_state();
        true
    }

    pub fn clear_current_exchange(&mut self) {
        self.state.source_text.clear();
        self.state.translated_text.clear();
        self.publish_state();
    }

    pub fn delete_history_record(&mut self, id: &str) -> bool {
        let removed = self.history.remove(id);
        if removed {
            self.publish_history();
        }
        removed
    }

    pub fn clear_all_history(&mut self) {
        self.history.clear();
        self.publish_history();
    }

    /// Copy `text` and flash the copied indicator. Failures are logged only.
    pub fn copy_text(&self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        match self.peripherals.clipboard.write_text(text) {
            Ok(()) => {
                self.copied.flash(self.config.copied_indicator, &self.events);
                true
            }
            Err(e) => {
                warn!(error = %e, "copy failed");
                false
            }
        }
    }

    /// Read `text` aloud in `language_code`. Failures are logged only.
    pub fn speak(&self, text: &str, language_code: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        let utterance = Utterance::new(text, language_code, self.config.speech_rate);
        match self.peripherals.speech.speak(&utterance) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, lang = %utterance.language_tag, "speech failed");
                false
            }
        }
    }

    fn publish_state(&self) {
        self.events.emit_event(AppEvent::SessionUpdated(self.state.clone()));
    }

    fn publish_history(&self) {
        self.events.emit_event(AppEvent::HistoryUpdated(self.history.records().to_vec()));
    }
}

impl Drop for TranslationSession {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}
