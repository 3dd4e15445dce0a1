//! The `PlanGenerator` trait: the seam between plan creation and whichever
//! generative backend produces the raw plan document.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generator is not configured: {0}")]
    NotConfigured(String),

    #[error("request to generator failed: {0}")]
    Transport(String),

    #[error("generator returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("generator returned no content")]
    EmptyResponse,
}

/// Produces the raw text of a plan document for a prompt.
///
/// Output is untrusted; callers parse and validate it with
/// [`super::schema::validate_plan_document`] before storing anything.
#[async_trait]
pub trait PlanGenerator: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

const _: () = {
    fn _assert_object_safe(_: &dyn PlanGenerator) {}
};
