//! Resilient text generation and page assistance for AccessiMind.
//!
//! A call flows from a prompt builder into the [`ResilientGenerator`], which
//! plans candidate models, classifies provider failures and retries with
//! jittered backoff. Agent flows then hand the model text to the
//! [`decoder`], which only lets allow-listed browsing actions through.
//!
//! The network transport is injected through [`TextGenerationProvider`].

pub mod assistant;
pub mod classify;
pub mod config;
pub mod decoder;
pub mod generation;
pub mod models;
pub mod prompts;
pub mod provider;
pub mod resilience;
pub mod sanitizer;

pub use assistant::{AgentStep, AssistantStatus, HistoryEntry, PageAssistant, TaskHistory};
pub use classify::{classify, ErrorClass};
pub use config::AssistantConfig;
pub use decoder::{decode, decode_traced, AgentAction, AgentActionKind, DecodeError, DecodePath};
pub use generation::GenerationConfig;
pub use models::{available_models, ModelCandidates, ModelInfo, FALLBACK_MODELS};
pub use prompts::{
    AgentStepContext, AnalysisKind, PageLink, PromptTask, SummaryKind, TaskKind, WcagInput, WcagMode,
};
pub use provider::TextGenerationProvider;
pub use resilience::{AttemptResult, Generation, ResilientGenerator, RetryPolicy};
pub use sanitizer::PromptSanitizer;
