pub mod config;
pub mod error;
pub mod form;
pub mod price;
pub mod render;
pub mod selection;
pub mod session;
pub mod submission;
pub mod transport;
pub mod validation;

pub use config::{load_settings, Settings};
pub use error::SubmissionError;
pub use form::FormState;
pub use price::{PriceError, PriceRange};
pub use render::{render, to_html, ContentBlock, Inline, RenderedContent};
pub use selection::SelectionSet;
pub use session::{DispatchError, FormSession, SessionCommand, SessionSnapshot};
pub use submission::{SubmissionController, SubmissionOutcome, SubmitDecision, PENDING_NOTICE};
pub use transport::{HttpRecommendationService, RecommendationService};
pub use validation::{validate, ValidationError};

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
