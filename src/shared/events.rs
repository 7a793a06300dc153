use serde::{Serialize, Deserialize};
use ts_rs::TS;
use super::types::{SessionState, TranslationRecord};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "event", content = "payload")] // Tagged enum for easier frontend parsing
#[ts(export)]
pub enum AppEvent {
    #[serde(rename = "session://updated")]
    SessionUpdated(SessionState),

    #[serde(rename = "history://updated")]
    HistoryUpdated(Vec<TranslationRecord>),

    #[serde(rename = "clipboard://copied")]
    CopiedChanged(bool),
}

impl AppEvent {
    /// Channel name the event is published under
    pub fn channel(&self) -> &'static str {
        match self {
            AppEvent::SessionUpdated(_) => "session://updated",
            AppEvent::HistoryUpdated(_) => "history://updated",
            AppEvent::CopiedChanged(_) => "clipboard://copied",
        }
    }
}
