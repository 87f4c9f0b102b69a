//! Language model gateway.
//!
//! [`ModelGateway`] is the seam between the itinerary orchestrator and the
//! hosted text-generation endpoint. The endpoint keeps no conversation state,
//! so every call carries the full prompt.

mod error;
pub mod gemini;

pub use error::LlmError;
pub use gemini::GeminiClient;

use async_trait::async_trait;

/// Reply text used when the endpoint answers successfully but carries no
/// candidate text.
pub const NO_RESPONSE: &str = "No response";

#[async_trait]
pub trait ModelGateway: Send + Sync + std::fmt::Debug {
    /// Send `prompt` as a single-turn request and return the raw reply text.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}
