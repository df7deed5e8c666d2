//! Core types and error definitions for the AccessiMind AI crates.
//!
//! This crate provides the foundational types shared by the generation and
//! agent layers: the error taxonomy surfaced to the browsing shell and the
//! settings snapshot every AI call is made with.
//!
//! # Main types
//!
//! - [`AccessiMindError`] — Unified error enum for generation, decoding and validation.
//! - [`AccessiMindResult`] — Convenience alias for `Result<T, AccessiMindError>`.
//! - [`ProviderError`] — A single failed call to the text-generation provider.
//! - [`Settings`] — Immutable snapshot of the user's AI settings.
//! - [`SettingsSource`] — Supplier of the current settings snapshot.

/// Error taxonomy.
pub mod error;
/// Settings snapshot, lenient numeric coercion and validation helpers.
pub mod settings;

pub use error::{
    AccessiMindError, AccessiMindResult, ProviderError, AGENT_RESPONSE_MESSAGE,
    SERVICE_BUSY_MESSAGE,
};
pub use settings::{is_valid_api_key, Settings, SettingsSource, StaticSettings, DEFAULT_MODEL};
