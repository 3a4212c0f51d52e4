use serde::{Deserialize, Serialize};

/// Coarse category of a failed submission, for hosts that style or
/// report failures differently per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Validation,
    Transport,
    Service,
    Decoding,
}

/// User-facing failure: a category plus the message shown verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReport {
    pub code: ErrorCode,
    pub message: String,
}

impl FailureReport {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}
