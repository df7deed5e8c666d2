use accessimind_core::AccessiMindError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, warn};

#[allow(clippy::expect_used)]
static JSON_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)```[ \t]*json\s*(.*?)```").expect("valid regex"));

#[allow(clippy::expect_used)]
static ANY_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[ \t]*[A-Za-z0-9_+-]*\s*(.*?)```").expect("valid regex"));

#[allow(clippy::expect_used)]
static ACTION_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""action"\s*:\s*"([^"]+)""#).expect("valid regex"));

#[allow(clippy::expect_used)]
static PARAMS_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)"params"\s*:\s*(\{.*?\})"#).expect("valid regex"));

#[allow(clippy::expect_used)]
static EXPLANATION_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)"explanation"\s*:\s*"(.*?)""#).expect("valid regex"));

/// The closed set of browsing actions the executor accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentActionKind {
    /// Follow the link whose text matches `params.text`.
    ClickLinkByText,
    ScrollDown,
    ScrollUp,
    /// Fill the input matching `params.query` with `params.value` and submit.
    TypeInInputAndSubmit,
    /// Pause for `params.ms` milliseconds.
    Wait,
    /// The goal is reached.
    Done,
}

impl AgentActionKind {
    /// Every allowed action.
    pub const ALL: [AgentActionKind; 6] = [
        AgentActionKind::ClickLinkByText,
        AgentActionKind::ScrollDown,
        AgentActionKind::ScrollUp,
        AgentActionKind::TypeInInputAndSubmit,
        AgentActionKind::Wait,
        AgentActionKind::Done,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentActionKind::ClickLinkByText => "CLICK_LINK_BY_TEXT",
            AgentActionKind::ScrollDown => "SCROLL_DOWN",
            AgentActionKind::ScrollUp => "SCROLL_UP",
            AgentActionKind::TypeInInputAndSubmit => "TYPE_IN_INPUT_AND_SUBMIT",
            AgentActionKind::Wait => "WAIT",
            AgentActionKind::Done => "DONE",
        }
    }

    /// Looks up an action by its exact uppercase name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for AgentActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated browsing step proposed by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentAction {
    pub action: AgentActionKind,
    #[serde(default)]
    pub params: Map<String, Value>,
    #[serde(default)]
    pub explanation: String,
}

impl AgentAction {
    /// A string parameter, if present.
    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(Value::as_str)
    }

    /// A non-negative integer parameter, if present.
    pub fn param_u64(&self, key: &str) -> Option<u64> {
        self.params.get(key).and_then(Value::as_u64)
    }
}

/// Which parsing path produced an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodePath {
    /// The (possibly fenced) text was a well-formed JSON object.
    Strict,
    /// Fields were pulled out individually from malformed JSON.
    Recovered,
}

/// Why a model response could not be turned into an action.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("agent response is empty")]
    Empty,

    #[error("agent response contains no action object")]
    Unparseable {
        /// The full model response.
        raw: String,
    },

    #[error("agent action {action:?} is not allowed")]
    InvalidAction {
        /// The action name after trimming and uppercasing.
        action: String,
        /// The full model response.
        raw: String,
    },
}

impl From<DecodeError> for AccessiMindError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::InvalidAction { action, raw } => {
                AccessiMindError::InvalidAction { action, raw }
            }
            other => AccessiMindError::Decode(other.to_string()),
        }
    }
}

/// Decode a model response into an allow-listed [`AgentAction`].
pub fn decode(raw: &str) -> Result<AgentAction, DecodeError> {
    decode_traced(raw).map(|(action, _)| action)
}

/// Like [`decode`], also reporting whether pattern recovery was needed.
///
/// Strict JSON is tried first on the fenced block (or the whole text when no
/// fence exists). If that fails, `action`, `params` and `explanation` are
/// extracted independently; `action` is required. The action name must be in
/// the allow-list, otherwise the response is rejected.
pub fn decode_traced(raw: &str) -> Result<(AgentAction, DecodePath), DecodeError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DecodeError::Empty);
    }

    let body = fenced_block(trimmed).unwrap_or(trimmed);

    let (object, path) = match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => (map, DecodePath::Strict),
        Ok(other) => {
            debug!(kind = json_kind(&other), "Agent response is JSON but not an object");
            return Err(DecodeError::Unparseable {
                raw: raw.to_string(),
            });
        }
        Err(e) => match recover_fields(body) {
            Some(map) => {
                warn!(error = %e, "Agent response was not valid JSON, recovered fields by pattern");
                (map, DecodePath::Recovered)
            }
            None => {
                debug!(error = %e, "Agent response has no recoverable action");
                return Err(DecodeError::Unparseable {
                    raw: raw.to_string(),
                });
            }
        },
    };

    validate(object, raw).map(|action| (action, path))
}

fn fenced_block(text: &str) -> Option<&str> {
    JSON_FENCE
        .captures(text)
        .or_else(|| ANY_FENCE.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

fn recover_fields(text: &str) -> Option<Map<String, Value>> {
    let action = ACTION_FIELD.captures(text)?.get(1)?.as_str().to_string();

    let params = PARAMS_FIELD
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| serde_json::from_str::<Value>(m.as_str()).ok())
        .filter(Value::is_object)
        .unwrap_or_else(|| Value::Object(Map::new()));

    let explanation = EXPLANATION_FIELD
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    let mut map = Map::new();
    map.insert("action".into(), Value::String(action));
    map.insert("params".into(), params);
    map.insert("explanation".into(), Value::String(explanation));
    Some(map)
}

fn validate(mut object: Map<String, Value>, raw: &str) -> Result<AgentAction, DecodeError> {
    let name = match object.remove("action") {
        Some(Value::String(s)) => s.trim().to_uppercase(),
        None | Some(Value::Null) => String::new(),
        Some(other) => other.to_string().to_uppercase(),
    };

    let Some(action) = AgentActionKind::from_name(&name) else {
        warn!(action = %name, "Agent proposed an action outside the allow-list");
        return Err(DecodeError::InvalidAction {
            action: name,
            raw: raw.to_string(),
        });
    };

    let params = match object.remove("params") {
        Some(Value::Object(params)) => params,
        _ => Map::new(),
    };
    let explanation = match object.remove("explanation") {
        Some(Value::String(s)) => s,
        _ => String::new(),
    };

    Ok(AgentAction {
        action,
        params,
        explanation,
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fenced_json_block() {
        let raw = "```json\n{\"action\":\"WAIT\",\"params\":{\"ms\":500},\"explanation\":\"pause\"}\n```";
        let (action, path) = decode_traced(raw).unwrap();
        assert_eq!(action.action, AgentActionKind::Wait);
        assert_eq!(Value::Object(action.params.clone()), json!({"ms": 500}));
        assert_eq!(action.explanation, "pause");
        assert_eq!(action.param_u64("ms"), Some(500));
        assert_eq!(path, DecodePath::Strict);
    }

    #[test]
    fn prose_around_fence_is_discarded() {
        let raw = "Sure! Here is the next step:\n```\n{\"action\": \"scroll_down\"}\n```\nLet me know.";
        let action = decode(raw).unwrap();
        assert_eq!(action.action, AgentActionKind::ScrollDown);
        assert!(action.params.is_empty());
        assert_eq!(action.explanation, "");
    }

    #[test]
    fn json_fence_preferred_over_other_fence() {
        let raw = "```text\nnot this\n```\n```JSON\n{\"action\":\"DONE\"}\n```";
        assert_eq!(decode(raw).unwrap().action, AgentActionKind::Done);
    }

    #[test]
    fn recovery_stays_inside_the_fence() {
        let raw = "Do not pick {\"action\":\"DONE\"} yet.\n```json\n{\"action\":\"WAIT\", oops}\n```";
        let (action, path) = decode_traced(raw).unwrap();
        assert_eq!(action.action, AgentActionKind::Wait);
        assert_eq!(path, DecodePath::Recovered);
    }

    #[test]
    fn spaced_fence_label_parses_strictly() {
        let (action, path) = decode_traced("``` json\n{\"action\":\"DONE\"}\n```").unwrap();
        assert_eq!(action.action, AgentActionKind::Done);
        assert_eq!(path, DecodePath::Strict);

        let (action, path) =
            decode_traced("```  javascript\n{\"action\":\"SCROLL_UP\"}\n```").unwrap();
        assert_eq!(action.action, AgentActionKind::ScrollUp);
        assert_eq!(path, DecodePath::Strict);
    }

    #[test]
    fn bare_json_object() {
        let action = decode(
            r#"  {"action":"CLICK_LINK_BY_TEXT","params":{"text":"Contact"},"explanation":"open contact"}  "#,
        )
        .unwrap();
        assert_eq!(action.action, AgentActionKind::ClickLinkByText);
        assert_eq!(action.param_str("text"), Some("Contact"));
    }

    #[test]
    fn malformed_json_is_recovered() {
        let raw = r#"Next: {"action": "TYPE_IN_INPUT_AND_SUBMIT", "params": {"query": "search", "value": "wcag"}, "explanation": "search it",}"#;
        let (action, path) = decode_traced(raw).unwrap();
        assert_eq!(path, DecodePath::Recovered);
        assert_eq!(action.action, AgentActionKind::TypeInInputAndSubmit);
        assert_eq!(action.param_str("value"), Some("wcag"));
        assert_eq!(action.explanation, "search it");
    }

    #[test]
    fn recovered_params_default_to_empty() {
        let raw = r#"{"action": "wait", "params": {"ms": }, "explanation": "hold on""#;
        let (action, path) = decode_traced(raw).unwrap();
        assert_eq!(path, DecodePath::Recovered);
        assert_eq!(action.action, AgentActionKind::Wait);
        assert!(action.params.is_empty());
        assert_eq!(action.explanation, "hold on");
    }

    #[test]
    fn unknown_action_is_rejected() {
        let err = decode(r#"{"action":"DELETE_EVERYTHING"}"#).unwrap_err();
        match err {
            DecodeError::InvalidAction { action, raw } => {
                assert_eq!(action, "DELETE_EVERYTHING");
                assert!(raw.contains("DELETE_EVERYTHING"));
            }
            other => panic!("Expected InvalidAction, got {other:?}"),
        }
    }

    #[test]
    fn recovered_unknown_action_is_rejected() {
        let err = decode(r#"{"action": "format_disk", oops"#).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidAction { ref action, .. } if action == "FORMAT_DISK"));
    }

    #[test]
    fn missing_action_is_rejected() {
        let err = decode(r#"{"params":{}}"#).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidAction { ref action, .. } if action.is_empty()));
        let err = decode(r#"{"action": 7}"#).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidAction { ref action, .. } if action == "7"));
    }

    #[test]
    fn plain_text_fails() {
        assert!(matches!(
            decode("no json here at all"),
            Err(DecodeError::Unparseable { .. })
        ));
    }

    #[test]
    fn empty_fails() {
        assert_eq!(decode("   \n"), Err(DecodeError::Empty));
    }

    #[test]
    fn non_object_json_fails() {
        assert!(matches!(decode(r#"["WAIT"]"#), Err(DecodeError::Unparseable { .. })));
        assert!(matches!(decode(r#""WAIT""#), Err(DecodeError::Unparseable { .. })));
    }

    #[test]
    fn non_object_params_and_explanation_are_normalized() {
        let action = decode(r#"{"action":"SCROLL_UP","params":[1,2],"explanation":42}"#).unwrap();
        assert_eq!(action.action, AgentActionKind::ScrollUp);
        assert!(action.params.is_empty());
        assert_eq!(action.explanation, "");
    }

    #[test]
    fn errors_convert_to_top_level() {
        let err: AccessiMindError = decode(r#"{"action":"RM"}"#).unwrap_err().into();
        assert!(matches!(err, AccessiMindError::InvalidAction { .. }));
        let err: AccessiMindError = decode("nothing").unwrap_err().into();
        assert!(matches!(err, AccessiMindError::Decode(_)));
    }

    #[test]
    fn action_names_round_trip() {
        for kind in AgentActionKind::ALL {
            assert_eq!(AgentActionKind::from_name(kind.as_str()), Some(kind));
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{kind}\""));
        }
        assert_eq!(AgentActionKind::from_name("wait"), None);
    }
}
