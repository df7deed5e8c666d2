use crate::config::AssistantConfig;
use crate::decoder::{self, AgentAction};
use crate::prompts::{AgentStepContext, AnalysisKind, PromptTask, SummaryKind, TaskKind, WcagInput};
use crate::provider::TextGenerationProvider;
use crate::resilience::{Generation, ResilientGenerator};
use accessimind_core::{
    is_valid_api_key, AccessiMindError, AccessiMindResult, Settings, SettingsSource, StaticSettings,
};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Number of completed tasks kept in memory.
pub const HISTORY_LIMIT: usize = 20;

const MISSING_API_KEY: &str = "API key is not configured. Add your Google AI key in settings.";
const INVALID_API_KEY: &str = "API key format is invalid. Google AI keys start with \"AIza\".";
const EMPTY_CONTENT: &str = "Page content is empty.";
const EMPTY_QUESTION: &str = "Question is empty.";
const WCAG_MISSING_URL: &str = "WCAG audit needs a page URL.";
const WCAG_MISSING_PAGE: &str = "WCAG audit needs page HTML or text.";
const EMPTY_ACTION: &str = "Action description is empty.";
const EMPTY_GOAL: &str = "Agent goal is empty.";

/// A decoded agent step and the model that proposed it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStep {
    pub action: AgentAction,
    pub model_used: String,
}

/// One completed task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: Uuid,
    pub kind: TaskKind,
    pub url: String,
    /// Task flavour, question, action or goal, depending on `kind`.
    pub detail: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// Length of the page input in characters.
    pub input_length: usize,
    pub output: String,
    pub model_used: String,
}

impl HistoryEntry {
    fn new(
        kind: TaskKind,
        url: &str,
        detail: Option<String>,
        input_length: usize,
        output: String,
        model_used: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            url: url.to_string(),
            detail,
            timestamp: Utc::now(),
            input_length,
            output,
            model_used,
        }
    }
}

/// Bounded in-memory task log, oldest first.
pub struct TaskHistory {
    entries: Mutex<VecDeque<HistoryEntry>>,
    limit: usize,
}

impl Default for TaskHistory {
    fn default() -> Self {
        Self::with_limit(HISTORY_LIMIT)
    }
}

impl TaskHistory {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(limit)),
            limit: limit.max(1),
        }
    }

    /// Append an entry, evicting the oldest beyond the limit.
    pub fn record(&self, entry: HistoryEntry) {
        let mut entries = self.entries.lock();
        entries.push_back(entry);
        while entries.len() > self.limit {
            entries.pop_front();
        }
    }

    pub fn snapshot(&self) -> Vec<HistoryEntry> {
        self.entries.lock().iter().cloned().collect()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

/// Readiness summary for the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantStatus {
    pub model: String,
    pub has_api_key: bool,
    pub history_count: usize,
}

/// Caller-facing entry point for page tasks.
///
/// Every operation reads a fresh settings snapshot, validates its input
/// before any provider call, builds the prompt, runs the resilient generator
/// and records the result in the task history.
pub struct PageAssistant {
    generator: ResilientGenerator,
    settings: Arc<dyn SettingsSource>,
    history: TaskHistory,
}

impl PageAssistant {
    pub fn new(generator: ResilientGenerator, settings: Arc<dyn SettingsSource>) -> Self {
        Self {
            generator,
            settings,
            history: TaskHistory::default(),
        }
    }

    /// Build an assistant over a fixed configuration.
    pub fn from_config(provider: Arc<dyn TextGenerationProvider>, config: AssistantConfig) -> Self {
        let generator = ResilientGenerator::with_policy(provider, config.retry);
        Self::new(generator, Arc::new(StaticSettings(config.settings)))
    }

    pub async fn summarize(
        &self,
        kind: SummaryKind,
        content: &str,
        url: &str,
    ) -> AccessiMindResult<Generation> {
        let settings = self.ready_settings()?;
        require(content, EMPTY_CONTENT)?;

        let task = PromptTask::Summarize {
            kind,
            content: content.to_string(),
            url: url.to_string(),
        };
        let generation = self.run(&settings, &task).await?;
        self.history.record(HistoryEntry::new(
            TaskKind::Summarize,
            url,
            Some(kind.as_str().to_string()),
            content.chars().count(),
            generation.text.clone(),
            generation.model_used.clone(),
        ));
        Ok(generation)
    }

    pub async fn ask(&self, question: &str, content: &str, url: &str) -> AccessiMindResult<Generation> {
        let settings = self.ready_settings()?;
        require(question, EMPTY_QUESTION)?;
        require(content, EMPTY_CONTENT)?;

        let task = PromptTask::Ask {
            question: question.trim().to_string(),
            content: content.to_string(),
            url: url.to_string(),
        };
        let generation = self.run(&settings, &task).await?;
        self.history.record(HistoryEntry::new(
            TaskKind::Ask,
            url,
            Some(question.trim().to_string()),
            content.chars().count(),
            generation.text.clone(),
            generation.model_used.clone(),
        ));
        Ok(generation)
    }

    pub async fn analyze(
        &self,
        kind: AnalysisKind,
        content: &str,
        url: &str,
    ) -> AccessiMindResult<Generation> {
        let settings = self.ready_settings()?;
        require(content, EMPTY_CONTENT)?;

        let task = PromptTask::Analyze {
            kind,
            content: content.to_string(),
            url: url.to_string(),
        };
        let generation = self.run(&settings, &task).await?;
        self.history.record(HistoryEntry::new(
            TaskKind::Analyze,
            url,
            Some(kind.as_str().to_string()),
            content.chars().count(),
            generation.text.clone(),
            generation.model_used.clone(),
        ));
        Ok(generation)
    }

    /// Accessibility audit of a page.
    pub async fn audit_wcag(&self, input: &WcagInput) -> AccessiMindResult<Generation> {
        let settings = self.ready_settings()?;
        require(&input.url, WCAG_MISSING_URL)?;
        if input.html.trim().is_empty() && input.text.trim().is_empty() {
            return Err(AccessiMindError::Validation(WCAG_MISSING_PAGE.to_string()));
        }

        let url = input.url.clone();
        let input_length = input.html.chars().count() + input.text.chars().count();
        let task = PromptTask::Wcag(input.clone());
        let generation = self.run(&settings, &task).await?;
        self.history.record(HistoryEntry::new(
            TaskKind::Wcag,
            &url,
            None,
            input_length,
            generation.text.clone(),
            generation.model_used.clone(),
        ));
        Ok(generation)
    }

    /// Carry out a free-form task described by `action` on the page content.
    pub async fn execute_action(
        &self,
        action: &str,
        content: &str,
        url: &str,
    ) -> AccessiMindResult<Generation> {
        let settings = self.ready_settings()?;
        require(action, EMPTY_ACTION)?;
        require(content, EMPTY_CONTENT)?;

        let task = PromptTask::Action {
            action: action.trim().to_string(),
            content: content.to_string(),
            url: url.to_string(),
        };
        let generation = self.run(&settings, &task).await?;
        self.history.record(HistoryEntry::new(
            TaskKind::Action,
            url,
            Some(action.trim().to_string()),
            content.chars().count(),
            generation.text.clone(),
            generation.model_used.clone(),
        ));
        Ok(generation)
    }

    /// Ask the model for the next browsing action towards `context.goal`.
    pub async fn agent_step(&self, context: &AgentStepContext) -> AccessiMindResult<AgentStep> {
        let settings = self.ready_settings()?;
        require(&context.goal, EMPTY_GOAL)?;

        let task = PromptTask::AgentStep(context.clone());
        let generation = self.run(&settings, &task).await?;

        let action = decoder::decode(&generation.text).map_err(|e| {
            warn!(model = %generation.model_used, error = %e, "Agent response rejected");
            AccessiMindError::from(e)
        })?;

        info!(
            action = %action.action,
            model = %generation.model_used,
            "Agent step decoded"
        );
        self.history.record(HistoryEntry::new(
            TaskKind::AgentStep,
            &context.url,
            Some(context.goal.trim().to_string()),
            context.text.chars().count(),
            action.action.as_str().to_string(),
            generation.model_used.clone(),
        ));

        Ok(AgentStep {
            action,
            model_used: generation.model_used,
        })
    }

    /// Completed tasks, oldest first.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history.snapshot()
    }

    pub fn clear_history(&self) {
        self.history.clear();
    }

    pub fn status(&self) -> AssistantStatus {
        let settings = self.settings.current();
        AssistantStatus {
            model: settings.model_or_default().to_string(),
            has_api_key: settings.has_api_key(),
            history_count: self.history.len(),
        }
    }

    fn ready_settings(&self) -> AccessiMindResult<Settings> {
        let settings = self.settings.current();
        if !settings.has_api_key() {
            return Err(AccessiMindError::Validation(MISSING_API_KEY.to_string()));
        }
        if !is_valid_api_key(settings.api_key.trim()) {
            return Err(AccessiMindError::Validation(INVALID_API_KEY.to_string()));
        }
        Ok(settings)
    }

    async fn run(&self, settings: &Settings, task: &PromptTask) -> AccessiMindResult<Generation> {
        let prompt = task.build();
        self.generator.generate(settings, &prompt).await.map_err(|e| {
            warn!(task = ?task.kind(), error = %e, "Page task failed");
            e
        })
    }
}

fn require(value: &str, message: &str) -> AccessiMindResult<()> {
    if value.trim().is_empty() {
        Err(AccessiMindError::Validation(message.to_string()))
    } else {
        Ok(())
    }
}
