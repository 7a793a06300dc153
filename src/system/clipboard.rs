use cli_clipboard::{ClipboardContext, ClipboardProvider};
use tracing::debug;

use crate::shared::error::{AppError, AppResult};

/// Something text can be copied to
pub trait ClipboardWriter: Send + Sync {
    fn write_text(&self, text: &str) -> AppResult<()>;
}

/// System-level clipboard
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl ClipboardWriter for SystemClipboard {
    fn write_text(&self, text: &str) -> AppResult<()> {
        let mut ctx = ClipboardContext::new()
            .map_err(|e| AppError::Clipboard(format!("Failed to open clipboard: {}", e)))?;
        ctx.set_contents(text.to_owned())
            .map_err(|e| AppError::Clipboard(format!("Failed to write to clipboard: {}", e)))?;
        debug!(chars = text.chars().count(), "copied to clipboard");
        Ok(())
    }
}
