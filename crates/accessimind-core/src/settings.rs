use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::ops::RangeInclusive;

/// Model used when the settings do not name one.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Accepted range for `temperature`.
pub const TEMPERATURE_RANGE: RangeInclusive<f64> = 0.0..=1.0;
/// Accepted range for `maxOutputTokens`.
pub const MAX_OUTPUT_TOKENS_RANGE: RangeInclusive<u32> = 100..=8192;
/// Accepted range for `topP`.
pub const TOP_P_RANGE: RangeInclusive<f64> = 0.0..=1.0;
/// Accepted range for `topK`.
pub const TOP_K_RANGE: RangeInclusive<u32> = 1..=100;

/// A read-only snapshot of the user's AI settings.
///
/// Numeric fields are optional: a value that is missing or cannot be coerced
/// to a number deserializes to `None` instead of failing, and downstream
/// consumers substitute their defaults.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Provider credential.
    #[serde(default)]
    pub api_key: String,
    /// Preferred model identifier; blank means [`DEFAULT_MODEL`].
    #[serde(default)]
    pub model: String,
    /// Sampling temperature, expected in [`TEMPERATURE_RANGE`].
    #[serde(
        default,
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub temperature: Option<f64>,
    /// Output token cap, expected in [`MAX_OUTPUT_TOKENS_RANGE`].
    #[serde(
        default,
        deserialize_with = "lenient_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_output_tokens: Option<u32>,
    /// Nucleus sampling mass, expected in [`TOP_P_RANGE`].
    #[serde(
        default,
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub top_p: Option<f64>,
    /// Top-k sampling cutoff, expected in [`TOP_K_RANGE`].
    #[serde(
        default,
        deserialize_with = "lenient_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub top_k: Option<u32>,
}

impl Settings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }

    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k);
        self
    }

    /// The configured model, or [`DEFAULT_MODEL`] when blank.
    pub fn model_or_default(&self) -> &str {
        let model = self.model.trim();
        if model.is_empty() {
            DEFAULT_MODEL
        } else {
            model
        }
    }

    /// Whether an API key has been entered at all.
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Returns a copy with every out-of-range numeric value dropped, so that
    /// defaults apply in its place.
    pub fn normalized(&self) -> Self {
        Self {
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            temperature: self.temperature.filter(|v| TEMPERATURE_RANGE.contains(v)),
            max_output_tokens: self
                .max_output_tokens
                .filter(|v| MAX_OUTPUT_TOKENS_RANGE.contains(v)),
            top_p: self.top_p.filter(|v| TOP_P_RANGE.contains(v)),
            top_k: self.top_k.filter(|v| TOP_K_RANGE.contains(v)),
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &mask_api_key(&self.api_key))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("top_p", &self.top_p)
            .field("top_k", &self.top_k)
            .finish()
    }
}

/// Checks the shape of a Google AI API key (`AIza...`, longer than 20 chars).
pub fn is_valid_api_key(key: &str) -> bool {
    key.starts_with("AIza") && key.chars().count() > 20
}

/// Renders an API key for logs: the first four characters, the rest hidden.
pub fn mask_api_key(key: &str) -> String {
    if key.is_empty() {
        return String::new();
    }
    if key.chars().count() <= 8 {
        return "****".to_string();
    }
    let prefix: String = key.chars().take(4).collect();
    format!("{prefix}****")
}

/// Coerces a loosely typed value into a finite float.
///
/// Numbers pass through, numeric strings are parsed after trimming, anything
/// else is treated as absent.
pub fn coerce_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Coerces a loosely typed value into a non-negative integer, truncating fractions.
pub fn coerce_u32(value: &Value) -> Option<u32> {
    coerce_f64(value)
        .filter(|v| *v >= 0.0 && *v <= f64::from(u32::MAX))
        .map(|v| v.trunc() as u32)
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_f64))
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_u32))
}

/// Supplies the current settings snapshot.
///
/// Implementations are owned by the configuration layer; the core never
/// caches what they return.
pub trait SettingsSource: Send + Sync {
    /// Returns the settings as they are right now.
    fn current(&self) -> Settings;
}

/// A [`SettingsSource`] over a fixed snapshot.
#[derive(Debug, Clone, Default)]
pub struct StaticSettings(pub Settings);

impl SettingsSource for StaticSettings {
    fn current(&self) -> Settings {
        self.0.clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn non_numeric_values_become_absent() {
        let s: Settings = serde_json::from_value(json!({
            "temperature": "bad",
            "maxOutputTokens": true,
            "topP": null
        }))
        .unwrap();
        assert_eq!(s.temperature, None);
        assert_eq!(s.max_output_tokens, None);
        assert_eq!(s.top_p, None);
        assert_eq!(s.top_k, None);
    }

    #[test]
    fn numeric_strings_are_coerced() {
        let s: Settings = serde_json::from_value(json!({
            "apiKey": "AIzaSyExampleExampleExample",
            "model": "gemini-1.5-pro",
            "temperature": "0.4",
            "maxOutputTokens": " 1500.9 ",
            "topP": 0.9,
            "topK": 12
        }))
        .unwrap();
        assert_eq!(s.temperature, Some(0.4));
        assert_eq!(s.max_output_tokens, Some(1500));
        assert_eq!(s.top_p, Some(0.9));
        assert_eq!(s.top_k, Some(12));
        assert_eq!(s.model_or_default(), "gemini-1.5-pro");
    }

    #[test]
    fn negative_integer_is_absent() {
        assert_eq!(coerce_u32(&json!(-5)), None);
        assert_eq!(coerce_f64(&json!("NaN")), None);
    }

    #[test]
    fn normalized_drops_out_of_range() {
        let s = Settings::new("k")
            .with_temperature(1.5)
            .with_max_output_tokens(50)
            .with_top_p(0.5)
            .with_top_k(101)
            .normalized();
        assert_eq!(s.temperature, None);
        assert_eq!(s.max_output_tokens, None);
        assert_eq!(s.top_p, Some(0.5));
        assert_eq!(s.top_k, None);
    }

    #[test]
    fn blank_model_uses_default() {
        assert_eq!(Settings::default().model_or_default(), DEFAULT_MODEL);
        assert_eq!(Settings::default().with_model("  ").model_or_default(), DEFAULT_MODEL);
    }

    #[test]
    fn api_key_checks() {
        assert!(is_valid_api_key("AIzaSyA1234567890abcdefg"));
        assert!(!is_valid_api_key("AIza-short"));
        assert!(!is_valid_api_key("sk-1234567890abcdefghijkl"));
        assert!(!Settings::new("   ").has_api_key());
    }

    #[test]
    fn debug_masks_api_key() {
        let s = Settings::new("AIzaSyA1234567890abcdefg");
        let dbg = format!("{s:?}");
        assert!(dbg.contains("AIza****"));
        assert!(!dbg.contains("1234567890"));
    }

    #[test]
    fn static_source_returns_snapshot() {
        let source = StaticSettings(Settings::new("key").with_model("m"));
        assert_eq!(source.current().model, "m");
    }
}
