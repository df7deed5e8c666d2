use accessimind_core::Settings;
use serde::{Deserialize, Serialize};

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
/// Default output token cap.
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 2048;
/// Default nucleus sampling mass.
pub const DEFAULT_TOP_P: f64 = 0.8;
/// Default top-k cutoff.
pub const DEFAULT_TOP_K: u32 = 40;

/// Lower bound for `max_output_tokens` on retry attempts.
pub const TIGHTENED_MIN_OUTPUT_TOKENS: u32 = 256;
/// Upper bound for `max_output_tokens` on retry attempts.
pub const TIGHTENED_MAX_OUTPUT_TOKENS: u32 = 1024;

/// Per-call generation parameters sent to the provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f64,
    pub max_output_tokens: u32,
    pub top_p: f64,
    pub top_k: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            top_p: DEFAULT_TOP_P,
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl GenerationConfig {
    /// Derives the call parameters from a settings snapshot.
    ///
    /// Absent values (including ones that failed numeric coercion) fall back
    /// to the defaults. With `tighten`, `max_output_tokens` is clamped into
    /// `[256, 1024]` to shorten retries; the other fields are untouched.
    pub fn build(settings: &Settings, tighten: bool) -> Self {
        let mut config = Self {
            temperature: settings.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_output_tokens: settings
                .max_output_tokens
                .unwrap_or(DEFAULT_MAX_OUTPUT_TOKENS),
            top_p: settings.top_p.unwrap_or(DEFAULT_TOP_P),
            top_k: settings.top_k.unwrap_or(DEFAULT_TOP_K),
        };

        if tighten {
            config.max_output_tokens = config
                .max_output_tokens
                .clamp(TIGHTENED_MIN_OUTPUT_TOKENS, TIGHTENED_MAX_OUTPUT_TOKENS);
        }

        config
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings(value: serde_json::Value) -> Settings {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn empty_settings_use_defaults() {
        assert_eq!(
            GenerationConfig::build(&Settings::default(), false),
            GenerationConfig::default()
        );
    }

    #[test]
    fn bad_temperature_falls_back() {
        let config = GenerationConfig::build(&settings(json!({"temperature": "bad"})), false);
        assert_eq!(config.temperature, 0.7);
    }

    #[test]
    fn configured_values_pass_through() {
        let s = Settings::new("k")
            .with_temperature(0.2)
            .with_max_output_tokens(4000)
            .with_top_p(0.95)
            .with_top_k(10);
        let config = GenerationConfig::build(&s, false);
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.max_output_tokens, 4000);
        assert_eq!(config.top_p, 0.95);
        assert_eq!(config.top_k, 10);
    }

    #[test]
    fn tighten_clamps_output_tokens() {
        let high = settings(json!({"maxOutputTokens": 5000}));
        assert_eq!(GenerationConfig::build(&high, true).max_output_tokens, 1024);
        assert_eq!(GenerationConfig::build(&high, false).max_output_tokens, 5000);

        let low = Settings::default().with_max_output_tokens(100);
        assert_eq!(GenerationConfig::build(&low, true).max_output_tokens, 256);

        let mid = Settings::default().with_max_output_tokens(700);
        assert_eq!(GenerationConfig::build(&mid, true).max_output_tokens, 700);

        // default 2048 is tightened too
        assert_eq!(
            GenerationConfig::build(&Settings::default(), true).max_output_tokens,
            1024
        );
    }

    #[test]
    fn tighten_leaves_other_fields() {
        let s = Settings::default().with_temperature(0.1).with_top_k(5);
        let config = GenerationConfig::build(&s, true);
        assert_eq!(config.temperature, 0.1);
        assert_eq!(config.top_k, 5);
        assert_eq!(config.top_p, DEFAULT_TOP_P);
    }

    #[test]
    fn serializes_in_provider_shape() {
        let value = serde_json::to_value(GenerationConfig::default()).unwrap();
        assert_eq!(value["maxOutputTokens"], 2048);
        assert_eq!(value["topK"], 40);
    }
}
