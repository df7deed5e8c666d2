use crate::resilience::RetryPolicy;
use accessimind_core::{AccessiMindError, AccessiMindResult, Settings};
use serde::{Deserialize, Serialize};

/// Settings plus retry tuning, loadable from TOML.
///
/// ```toml
/// [settings]
/// apiKey = "AIza..."
/// model = "gemini-2.0-pro"
/// temperature = 0.4
///
/// [retry]
/// max_attempts_per_model = 2
/// attempt_timeout_ms = 30000
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssistantConfig {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl AssistantConfig {
    /// Parse a TOML document. Out-of-range settings values are dropped so
    /// that defaults apply.
    pub fn from_toml_str(source: &str) -> AccessiMindResult<Self> {
        let mut config: AssistantConfig =
            toml::from_str(source).map_err(|e| AccessiMindError::Config(e.to_string()))?;
        config.settings = config.settings.normalized();
        Ok(config)
    }
}
