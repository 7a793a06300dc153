//! Platform peripherals the session delegates to

pub mod clipboard;
pub mod speech;

pub use clipboard::{ClipboardWriter, SystemClipboard};
pub use speech::{PlatformSpeech, SpeechSynthesizer, Utterance};
