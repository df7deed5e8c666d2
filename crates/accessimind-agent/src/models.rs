use serde::{Deserialize, Serialize};

/// Models tried, in order, after the preferred one.
pub const FALLBACK_MODELS: [&str; 4] = [
    "gemini-2.5-flash",
    "gemini-2.0-pro",
    "gemini-1.5-flash",
    "gemini-1.5-pro",
];

/// Ordered, duplicate-free list of models to try for one call.
///
/// Never empty: the fallback roster is always appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCandidates(Vec<String>);

impl ModelCandidates {
    /// Builds the candidate list: `preferred` first (when non-blank), then the
    /// roster minus anything already present.
    pub fn plan(preferred: Option<&str>) -> Self {
        let mut models: Vec<String> = Vec::with_capacity(FALLBACK_MODELS.len() + 1);

        if let Some(model) = preferred.map(str::trim).filter(|m| !m.is_empty()) {
            models.push(model.to_string());
        }

        for model in FALLBACK_MODELS {
            if !models.iter().any(|m| m == model) {
                models.push(model.to_string());
            }
        }

        Self(models)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl<'a> IntoIterator for &'a ModelCandidates {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Display metadata for a selectable model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Human-readable name.
    pub name: String,
    /// Identifier sent to the provider.
    pub value: String,
    /// Short description for the settings screen.
    pub description: String,
}

/// The models offered in the settings screen, in roster order.
pub fn available_models() -> Vec<ModelInfo> {
    [
        ("Gemini 2.5 Flash", FALLBACK_MODELS[0], "Recommended, fast and efficient"),
        ("Gemini 2.0 Pro", FALLBACK_MODELS[1], "Advanced capabilities"),
        ("Gemini 1.5 Flash", FALLBACK_MODELS[2], "Balanced performance"),
        ("Gemini 1.5 Pro", FALLBACK_MODELS[3], "Most capable model"),
    ]
    .into_iter()
    .map(|(name, value, description)| ModelInfo {
        name: name.to_string(),
        value: value.to_string(),
        description: description.to_string(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_preference_yields_roster() {
        let plan = ModelCandidates::plan(None);
        assert_eq!(plan.as_slice(), FALLBACK_MODELS);
    }

    #[test]
    fn roster_member_is_hoisted() {
        let plan = ModelCandidates::plan(Some("gemini-1.5-flash"));
        assert_eq!(
            plan.as_slice(),
            ["gemini-1.5-flash", "gemini-2.5-flash", "gemini-2.0-pro", "gemini-1.5-pro"]
        );
    }

    #[test]
    fn unknown_model_is_prepended() {
        let plan = ModelCandidates::plan(Some("gemini-exp-1206"));
        assert_eq!(plan.len(), 5);
        assert_eq!(plan.as_slice()[0], "gemini-exp-1206");
        assert_eq!(&plan.as_slice()[1..], FALLBACK_MODELS);
    }

    #[test]
    fn preferred_appears_exactly_once() {
        for preferred in FALLBACK_MODELS.iter().copied().chain(["custom-model"]) {
            let plan = ModelCandidates::plan(Some(preferred));
            assert_eq!(plan.iter().filter(|m| *m == preferred).count(), 1);
            assert_eq!(plan.as_slice()[0], preferred);
            let expected = if FALLBACK_MODELS.contains(&preferred) { 4 } else { 5 };
            assert_eq!(plan.len(), expected);
        }
    }

    #[test]
    fn blank_preference_is_ignored() {
        assert_eq!(ModelCandidates::plan(Some("   ")), ModelCandidates::plan(None));
        assert!(!ModelCandidates::plan(Some("")).is_empty());
    }

    #[test]
    fn available_models_follow_roster() {
        let values: Vec<String> = available_models().into_iter().map(|m| m.value).collect();
        assert_eq!(values, FALLBACK_MODELS);
    }
}
