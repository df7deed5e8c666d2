use crate::generation::GenerationConfig;
use accessimind_core::ProviderError;
use async_trait::async_trait;

/// Trait for text-generation transports.
///
/// The generator never talks to the network itself. A provider issues one
/// call against one model and reports either the generated text or a
/// [`ProviderError`]; retrying, classification and model fallback happen
/// above this seam.
///
/// The credential arrives with every call, taken from the caller's current
/// settings snapshot. Providers must not hold on to a key of their own.
///
/// To plug in a transport:
/// 1. Implement `TextGenerationProvider` for your client
/// 2. Hand it to `ResilientGenerator::new` wrapped in an `Arc`
#[async_trait]
pub trait TextGenerationProvider: Send + Sync {
    /// Generate text for `prompt` with the given credential, model and parameters.
    async fn generate(
        &self,
        api_key: &str,
        model: &str,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<String, ProviderError>;
}

