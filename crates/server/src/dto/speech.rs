use bustrack::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct LineDto {
    pub text: String,
    #[serde(flatten)]
    pub dialog: Dialog,
}

impl LineDto {
    pub fn from(dialog: Dialog) -> Self {
        Self {
            text: dialog.to_string(),
            dialog,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SpeechDto {
    pub lines: Vec<LineDto>,
}

impl SpeechDto {
    pub fn from(lines: Vec<Dialog>) -> Self {
        Self {
            lines: lines.into_iter().map(LineDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IntentDto {
    pub slots: Slots,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplyDto {
    pub utterance: String,
}
