use shared::error::{ErrorCode, FailureReport};
use thiserror::Error;

use crate::validation::ValidationError;

const TRANSPORT_MESSAGE: &str = "The recommendation request failed. Please try again.";
const DECODING_MESSAGE: &str = "The recommendation response could not be read.";

/// Every way a submission can end without a recommendation.
///
/// The `Display` output carries diagnostic detail for logs. What the user
/// sees comes from [`SubmissionError::user_message`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("recommendation service returned HTTP status {status}")]
    Service { status: u16 },
    #[error("undecodable response body: {0}")]
    Decoding(String),
}

impl SubmissionError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SubmissionError::Validation(_) => ErrorCode::Validation,
            SubmissionError::Transport(_) => ErrorCode::Transport,
            SubmissionError::Service { .. } => ErrorCode::Service,
            SubmissionError::Decoding(_) => ErrorCode::Decoding,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            SubmissionError::Validation(err) => err.to_string(),
            SubmissionError::Transport(_) => TRANSPORT_MESSAGE.to_string(),
            SubmissionError::Service { status } => {
                format!("The recommendation service returned an error (HTTP status {status}).")
            }
            SubmissionError::Decoding(_) => DECODING_MESSAGE.to_string(),
        }
    }

    pub fn report(&self) -> FailureReport {
        FailureReport::new(self.code(), self.user_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_messages_hide_raw_detail() {
        let err = SubmissionError::Transport("tcp connect error: 127.0.0.1:9".into());
        assert!(!err.user_message().contains("127.0.0.1"));
        assert!(err.to_string().contains("127.0.0.1"));

        let err = SubmissionError::Decoding("missing field `message`".into());
        assert_eq!(err.user_message(), DECODING_MESSAGE);
    }

    #[test]
    fn service_message_includes_status() {
        let report = SubmissionError::Service { status: 503 }.report();
        assert_eq!(report.code, ErrorCode::Service);
        assert!(report.message.contains("503"));
    }

    #[test]
    fn validation_message_is_verbatim() {
        let report = SubmissionError::from(ValidationError::NoRamenType).report();
        assert_eq!(report.code, ErrorCode::Validation);
        assert_eq!(report.message, "select at least one ramen type.");
    }
}
