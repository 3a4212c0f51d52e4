use serde::Serialize;
use shared::{error::FailureReport, protocol::RecommendRequest};
use tracing::{debug, info, warn};

use crate::{
    error::SubmissionError,
    form::FormState,
    transport::RecommendationService,
    validation::{validate, ValidationError},
};

/// Shown by hosts while a request is in flight.
pub const PENDING_NOTICE: &str = "Picking the best bowls for you… 🍜";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    #[default]
    Idle,
    Pending,
    Success(String),
    Failure(FailureReport),
}

impl SubmissionOutcome {
    pub fn is_pending(&self) -> bool {
        matches!(self, SubmissionOutcome::Pending)
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            SubmissionOutcome::Success(text) => Some(text),
            _ => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            SubmissionOutcome::Failure(report) => Some(&report.message),
            _ => None,
        }
    }
}

/// A validated request waiting to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub sequence: u64,
    pub request: RecommendRequest,
}

impl Ticket {
    pub async fn dispatch(self, service: &dyn RecommendationService) -> Resolution {
        let result = service.recommend(&self.request).await;
        Resolution {
            sequence: self.sequence,
            result,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub sequence: u64,
    pub result: Result<String, SubmissionError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitDecision {
    Rejected(ValidationError),
    Issued(Ticket),
}

/// Every `submit` consumes the next sequence number; a resolution is applied
/// only when it carries the latest one.
#[derive(Debug, Default)]
pub struct SubmissionController {
    latest_sequence: u64,
    outcome: SubmissionOutcome,
}

impl SubmissionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outcome(&self) -> &SubmissionOutcome {
        &self.outcome
    }

    pub fn latest_sequence(&self) -> u64 {
        self.latest_sequence
    }

    /// Validates `form` synchronously. A rejection moves straight to
    /// `Failure`; a pass moves to `Pending` and hands back the ticket the
    /// caller must dispatch exactly once.
    pub fn submit(&mut self, form: &FormState) -> SubmitDecision {
        self.latest_sequence += 1;
        let sequence = self.latest_sequence;

        match validate(form) {
            Err(err) => {
                warn!(sequence, reason = %err, "submission rejected");
                self.outcome = SubmissionOutcome::Failure(SubmissionError::from(err).report());
                SubmitDecision::Rejected(err)
            }
            Ok(request) => {
                info!(
                    sequence,
                    districts = request.districts.len(),
                    ramen_types = request.ramen_types.len(),
                    min_price = request.min_price,
                    max_price = request.max_price,
                    "submission issued"
                );
                self.outcome = SubmissionOutcome::Pending;
                SubmitDecision::Issued(Ticket { sequence, request })
            }
        }
    }

    /// Applies a finished request. Returns `false` when it was superseded.
    pub fn apply(&mut self, resolution: Resolution) -> bool {
        if resolution.sequence != self.latest_sequence || !self.outcome.is_pending() {
            debug!(
                sequence = resolution.sequence,
                latest = self.latest_sequence,
                "discarding stale recommendation response"
            );
            return false;
        }

        self.outcome = match resolution.result {
            Ok(text) => {
                info!(sequence = resolution.sequence, "submission succeeded");
                SubmissionOutcome::Success(text)
            }
            Err(err) => {
                warn!(sequence = resolution.sequence, error = %err, "submission failed");
                SubmissionOutcome::Failure(err.report())
            }
        };
        true
    }
}

#[cfg(test)]
#[path = "tests/submission_tests.rs"]
mod tests;
