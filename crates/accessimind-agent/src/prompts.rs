//! Prompt builders for every task the assistant can run.
//!
//! All builders are pure: they truncate page content to a fixed character
//! budget and wrap it in fixed task instructions. Rejecting empty input is the
//! caller's job.

use crate::sanitizer::{truncate_chars, PromptSanitizer};
use serde::{Deserialize, Serialize};

/// Content budget for summaries.
pub const SUMMARY_CONTENT_CHARS: usize = 8000;
/// Content budget for question answering.
pub const QUESTION_CONTENT_CHARS: usize = 8000;
/// Content budget for content analysis.
pub const ANALYSIS_CONTENT_CHARS: usize = 5000;
/// HTML budget for accessibility audits.
pub const WCAG_HTML_CHARS: usize = 8000;
/// Visible-text budget for accessibility audits.
pub const WCAG_TEXT_CHARS: usize = 6000;
/// Serialized accessibility-snapshot budget for audits.
pub const WCAG_SNAPSHOT_CHARS: usize = 8000;
/// Content budget for free-form page actions.
pub const ACTION_CONTENT_CHARS: usize = 8000;
/// Page-text excerpt budget for an agent step.
pub const AGENT_TEXT_CHARS: usize = 2000;
/// Maximum number of links offered to the agent.
pub const AGENT_MAX_LINKS: usize = 30;

/// Output-language instruction appended to every free-text task.
pub const RESPONSE_LANGUAGE: &str = "Respond in Turkish, in plain language.";

/// Reply the model is told to give when a page action is impossible.
pub const ACTION_NOT_POSSIBLE: &str = "This task cannot be done with the page content.";

/// The task families the assistant runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Summarize,
    Ask,
    Analyze,
    Wcag,
    /// Free-form task performed on the page content.
    Action,
    AgentStep,
}

/// Summary flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SummaryKind {
    #[default]
    Brief,
    Detailed,
    KeyPoints,
}

impl SummaryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryKind::Brief => "brief",
            SummaryKind::Detailed => "detailed",
            SummaryKind::KeyPoints => "key-points",
        }
    }
}

impl From<&str> for SummaryKind {
    /// Unknown names fall back to [`SummaryKind::Brief`].
    fn from(value: &str) -> Self {
        match value.trim() {
            "detailed" => SummaryKind::Detailed,
            "key-points" => SummaryKind::KeyPoints,
            _ => SummaryKind::Brief,
        }
    }
}

/// Content analysis flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    #[default]
    General,
    Sentiment,
    Keypoints,
    Structure,
}

impl AnalysisKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::General => "general",
            AnalysisKind::Sentiment => "sentiment",
            AnalysisKind::Keypoints => "keypoints",
            AnalysisKind::Structure => "structure",
        }
    }
}

impl From<&str> for AnalysisKind {
    /// Unknown names fall back to [`AnalysisKind::General`].
    fn from(value: &str) -> Self {
        match value.trim() {
            "sentiment" => AnalysisKind::Sentiment,
            "keypoints" => AnalysisKind::Keypoints,
            "structure" => AnalysisKind::Structure,
            _ => AnalysisKind::General,
        }
    }
}

/// Accessibility audit output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WcagMode {
    /// Element-by-element audit listing problems.
    #[default]
    Elements,
    /// Actionable fixes for element-level problems.
    Improvements,
}

impl From<&str> for WcagMode {
    fn from(value: &str) -> Self {
        match value.trim() {
            "improvements" => WcagMode::Improvements,
            _ => WcagMode::Elements,
        }
    }
}

/// Page data for an accessibility audit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WcagInput {
    pub url: String,
    pub html: String,
    pub text: String,
    /// Accessibility snapshot gathered by the page scraper; `null` when absent.
    pub snapshot: serde_json::Value,
    pub mode: WcagMode,
}

/// A link visible on the current page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageLink {
    pub text: String,
    pub href: String,
}

/// What the agent sees when planning its next step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentStepContext {
    pub goal: String,
    pub url: String,
    pub text: String,
    pub links: Vec<PageLink>,
}

/// A prompt request keyed by task type.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptTask {
    Summarize {
        kind: SummaryKind,
        content: String,
        url: String,
    },
    Ask {
        question: String,
        content: String,
        url: String,
    },
    Analyze {
        kind: AnalysisKind,
        content: String,
        url: String,
    },
    Wcag(WcagInput),
    Action {
        action: String,
        content: String,
        url: String,
    },
    AgentStep(AgentStepContext),
}

impl PromptTask {
    pub fn kind(&self) -> TaskKind {
        match self {
            PromptTask::Summarize { .. } => TaskKind::Summarize,
            PromptTask::Ask { .. } => TaskKind::Ask,
            PromptTask::Analyze { .. } => TaskKind::Analyze,
            PromptTask::Wcag(_) => TaskKind::Wcag,
            PromptTask::Action { .. } => TaskKind::Action,
            PromptTask::AgentStep(_) => TaskKind::AgentStep,
        }
    }

    /// Render the provider prompt for this task.
    pub fn build(&self) -> String {
        match self {
            PromptTask::Summarize { kind, content, url } => summarize(*kind, content, url),
            PromptTask::Ask {
                question,
                content,
                url,
            } => ask(question, content, url),
            PromptTask::Analyze { kind, content, url } => analyze(*kind, content, url),
            PromptTask::Wcag(input) => wcag(input),
            PromptTask::Action {
                action,
                content,
                url,
            } => execute_action(action, content, url),
            PromptTask::AgentStep(context) => agent_step(context),
        }
    }
}

fn url_header(url: &str) -> String {
    if url.is_empty() {
        String::new()
    } else {
        format!("URL: {url}\n\n")
    }
}

pub fn summarize(kind: SummaryKind, content: &str, url: &str) -> String {
    let header = url_header(url);
    let body = truncate_chars(content, SUMMARY_CONTENT_CHARS);
    match kind {
        SummaryKind::Detailed => format!(
            "{header}Summarize the following web page content in detail.\n\n\
             Content (first {SUMMARY_CONTENT_CHARS} characters):\n{body}\n\n\
             Requirements:\n- Split into sections\n- Highlight the important points\n\
             - Add examples and explanations\n- {RESPONSE_LANGUAGE}"
        ),
        SummaryKind::KeyPoints => format!(
            "{header}Extract the key points of the following content as a bulleted list.\n\n\
             Content (first {SUMMARY_CONTENT_CHARS} characters):\n{body}\n\n\
             Requirements:\n- Short, clear bullets\n- At most 10 bullets\n- {RESPONSE_LANGUAGE}"
        ),
        SummaryKind::Brief => format!(
            "{header}Summarize the following web page briefly and clearly.\n\n\
             Content (first {SUMMARY_CONTENT_CHARS} characters):\n{body}\n\n\
             Requirements:\n- 3-5 sentences\n- {RESPONSE_LANGUAGE}"
        ),
    }
}

pub fn ask(question: &str, content: &str, url: &str) -> String {
    let header = url_header(url);
    let body = truncate_chars(content, QUESTION_CONTENT_CHARS);
    format!(
        "{header}Answer the question using only the web page content below.\n\n\
         Question:\n{question}\n\n\
         Content (first {QUESTION_CONTENT_CHARS} characters):\n{body}\n\n\
         Requirements:\n- A clear, accurate answer\n- Cite evidence or quotes from the content\n\
         - If the page does not contain the answer, say so\n- {RESPONSE_LANGUAGE}"
    )
}

pub fn analyze(kind: AnalysisKind, content: &str, url: &str) -> String {
    let header = url_header(url);
    let body = truncate_chars(content, ANALYSIS_CONTENT_CHARS);
    let (task, requirements) = match kind {
        AnalysisKind::Sentiment => (
            "Perform a sentiment analysis of the following content (positive/negative/neutral).",
            "- Sentiment classification\n- Short justification",
        ),
        AnalysisKind::Keypoints => (
            "Extract the key points of the following content.",
            "- Bulleted, short and to the point",
        ),
        AnalysisKind::Structure => (
            "Analyze the structure of the following content (headings, sections, flow).",
            "- Structural overview\n- Assessment of the logical flow",
        ),
        AnalysisKind::General => (
            "Write a general analysis of the following web page content.",
            "- Topic, purpose, notable points",
        ),
    };
    format!(
        "{header}{task}\n\n\
         Content (first {ANALYSIS_CONTENT_CHARS} characters):\n{body}\n\n\
         Requirements:\n{requirements}\n- {RESPONSE_LANGUAGE}"
    )
}

pub fn wcag(input: &WcagInput) -> String {
    let sanitizer = PromptSanitizer::default();
    let header = format!(
        "URL: {}\nWCAG target level: AA\n\n",
        sanitizer.sanitize(&input.url)
    );
    let (title, task) = match input.mode {
        WcagMode::Improvements => (
            "WCAG Improvement Suggestions",
            "Produce actionable improvement suggestions for element-level problems.",
        ),
        WcagMode::Elements => (
            "WCAG Element Analysis",
            "Perform an element-level WCAG 2.1 audit and identify the problems.",
        ),
    };

    let html = truncate_chars(&input.html, WCAG_HTML_CHARS);
    let text = truncate_chars(&input.text, WCAG_TEXT_CHARS);
    let html_part = if html.is_empty() {
        String::new()
    } else {
        format!("HTML (first {WCAG_HTML_CHARS}):\n{html}\n\n")
    };
    let text_part = if text.is_empty() {
        String::new()
    } else {
        format!("Text (first {WCAG_TEXT_CHARS}):\n{text}\n\n")
    };
    let snapshot_part = if input.snapshot.is_null() {
        String::new()
    } else {
        let snapshot = input.snapshot.to_string();
        format!(
            "Accessibility snapshot (summary):\n{}\n\n",
            truncate_chars(&snapshot, WCAG_SNAPSHOT_CHARS)
        )
    };

    format!(
        "{header}Task: {task}\n\
         Context: this is an accessibility-focused browser. {RESPONSE_LANGUAGE}\n\n\
         {html_part}{text_part}{snapshot_part}\
         Required output format:\n\
         - Title: \"{title}\"\n\
         - A bulleted list of problems/suggestions\n\
         - For each item: Element (tag/role/id or text), related WCAG criterion (e.g. 1.1.1, 2.4.4), \
         Impact (High/Medium/Low), Explanation, Recommendation\n\
         - A short summary and prioritized to-do list\n\
         Limitations: do not guess colour contrast values that are not given; judge from the text and snapshot."
    )
}

/// Carry out a free-form task (`action`) against the page content.
pub fn execute_action(action: &str, content: &str, url: &str) -> String {
    let header = url_header(url);
    let body = truncate_chars(content, ACTION_CONTENT_CHARS);
    format!(
        "{header}Perform the requested task on the web page content below.\n\n\
         Requested task:\n{action}\n\n\
         Content (first {ACTION_CONTENT_CHARS} characters):\n{body}\n\n\
         Requirements:\n- Give the result directly, without step-by-step narration\n\
         - If the task cannot be done with this page content, reply \"{ACTION_NOT_POSSIBLE}\"\n\
         - Keep the result clear and actionable\n- {RESPONSE_LANGUAGE}",
        action = action.trim(),
    )
}

pub fn agent_step(context: &AgentStepContext) -> String {
    let sanitizer = PromptSanitizer::default();
    let links = context
        .links
        .iter()
        .take(AGENT_MAX_LINKS)
        .enumerate()
        .map(|(i, link)| {
            format!(
                "- [{}] {} => {}",
                i + 1,
                sanitizer.sanitize(&link.text),
                sanitizer.sanitize(&link.href)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    let links = if links.is_empty() {
        "- (no links found)".to_string()
    } else {
        links
    };
    let excerpt =
        PromptSanitizer::new(AGENT_TEXT_CHARS).sanitize(truncate_chars(&context.text, AGENT_TEXT_CHARS));

    format!(
        "You are an accessibility-focused web browsing agent. Goal: \"{goal}\".\n\
         URL: {url}\n\
         Page text (first ~{AGENT_TEXT_CHARS} characters):\n{excerpt}\n\n\
         Available links (first {AGENT_MAX_LINKS}):\n{links}\n\n\
         Plan only the next action and return it as JSON. Do NOT add any other text.\n\
         Available actions and params:\n\
         - CLICK_LINK_BY_TEXT {{ \"text\": \"...\" }}\n\
         - SCROLL_DOWN {{}}\n\
         - SCROLL_UP {{}}\n\
         - TYPE_IN_INPUT_AND_SUBMIT {{ \"query\": \"field name/placeholder/label\", \"value\": \"...\" }}\n\
         - WAIT {{ \"ms\": 800 }}\n\
         - DONE {{}}\n\
         Response schema:\n\
         {{ \"action\": \"...\", \"params\": {{ ... }}, \"explanation\": \"(short reason and expected result)\" }}\n\
         Selection criterion: choose the single step that advances the goal the most.",
        goal = sanitizer.sanitize(&context.goal),
        url = sanitizer.sanitize(&context.url),
    )
}
