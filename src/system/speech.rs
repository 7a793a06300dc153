//! Speech playback through the platform's synthesizer
//!
//! macOS ships `say`; other unix systems usually have `spd-say` (speech
//! dispatcher) or `espeak`. Starting a new utterance cancels the one still
//! playing.

use std::io::ErrorKind;
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;
use tracing::{debug, warn};

use crate::shared::error::{AppError, AppResult};
use crate::shared::types::AUTO_DETECT;

/// Default speaking rate of the command line synthesizers, in words per minute
const BASE_WORDS_PER_MINUTE: f32 = 175.0;

/// Map a provider language code to the tag handed to the synthesizer
pub fn speech_language_tag(code: &str) -> String {
    match code {
        "pt" => "pt-BR".to_string(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub language_tag: String,
    /// Multiplier on the synthesizer's default rate
    pub rate: f32,
}

impl Utterance {
    pub fn new(text: impl Into<String>, language_code: &str, rate: f32) -> Self {
        Self {
            text: text.into(),
            language_tag: speech_language_tag(language_code),
            rate,
        }
    }

    fn has_language(&self) -> bool {
        !self.language_tag.is_empty() && self.language_tag != AUTO_DETECT
    }
}

pub trait SpeechSynthesizer: Send + Sync {
    fn speak(&self, utterance: &Utterance) -> AppResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Unix,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Unix
        }
    }
}

/// A synthesizer invocation, tried in order until one starts
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechCommand {
    pub program: &'static str,
    pub args: Vec<String>,
}

pub fn speech_commands(platform: Platform, utterance: &Utterance) -> Vec<SpeechCommand> {
    let words_per_minute = (BASE_WORDS_PER_MINUTE * utterance.rate).round() as u32;

    match platform {
        Platform::MacOs => {
            vec![SpeechCommand {
                program: "say",
                args: vec![
                    "-r".to_string(),
                    words_per_minute.to_string(),
                    "--".to_string(),
                    utterance.text.clone(),
                ],
            }]
        }
        Platform::Unix => {
            // spd-say takes a relative rate in -100..=100
            let relative = ((utterance.rate - 1.0) * 100.0).round().clamp(-100.0, 100.0) as i32;
            let mut spd_args = vec!["-r".to_string(), relative.to_string()];
            let mut espeak_args = vec!["-s".to_string(), words_per_minute.to_string()];
            if utterance.has_language() {
                // spd-say only understands the primary subtag
                let primary = utterance.language_tag.split('-').next().unwrap_or_default();
                spd_args.extend(["-l".to_string(), primary.to_string()]);
                espeak_args.extend(["-v".to_string(), utterance.language_tag.to_lowercase()]);
            }
            spd_args.extend(["--".to_string(), utterance.text.clone()]);
            espeak_args.extend(["--".to_string(), utterance.text.clone()]);

            vec![
                SpeechCommand { program: "spd-say", args: spd_args },
                SpeechCommand { program: "espeak", args: espeak_args },
            ]
        }
    }
}

/// Platform speech through the command line synthesizers
pub struct PlatformSpeech {
    platform: Platform,
    current: Mutex<Option<Child>>,
}

impl PlatformSpeech {
    pub fn new() -> Self {
        Self {
            platform: Platform::current(),
            current: Mutex::new(None),
        }
    }

    /// Stop whatever is still playing
    pub fn cancel(&self) {
        let mut current = match self.current.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("speech mutex poisoned, recovering");
                poisoned.into_inner()
            }
        };
        if let Some(mut child) = current.take() {
            if let Ok(None) = child.try_wait() {
                let _ = child.kill();
                debug!("cancelled previous utterance");
            }
            let _ = child.wait();
        }
    }
}

impl Default for PlatformSpeech {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeechSynthesizer for PlatformSpeech {
    fn speak(&self, utterance: &Utterance) -> AppResult<()> {
        self.cancel();

        for cmd in speech_commands(self.platform, utterance) {
            let spawned = Command::new(cmd.program)
                .args(&cmd.args)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn();

            match spawned {
                Ok(child) => {
                    debug!(program = cmd.program, lang = %utterance.language_tag, "speaking");
                    if let Ok(mut current) = self.current.lock() {
                        *current = Some(child);
                    }
                    return Ok(());
                }
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(AppError::Speech(format!("Failed to start {}: {}", cmd.program, e))),
            }
        }

        Err(AppError::Speech("No speech synthesizer available".to_string()))
    }
}
