//! Scriptwright Core Library
//!
//! Gathers public video, article and encyclopedia context for a title and
//! drafts a long-form narration script with a generative model.

pub mod config;
pub mod error;
pub mod format;
pub mod pipeline;
pub mod prompt;
pub mod provider;
pub mod research;
pub mod sanitize;
pub mod sources;
pub mod types;

// Re-export commonly used items at crate root
pub use config::Config;
pub use error::{Result, ScriptwrightError};
pub use format::{format_result_readable, format_source_breakdown};
pub use pipeline::{FALLBACK_ANALYSIS, NoopObserver, Pipeline, RunObserver, Stage};
pub use provider::{GeminiClient, GenerationParams, GenerativeModel};
pub use research::{Researcher, derive_keywords};
pub use sanitize::{clean, collapse_paragraph, word_count};
pub use sources::{Outcome, SourceRegistry};
pub use types::{ArticleHit, RunRequest, RunResult, Snippet, SnippetSource, VideoHit};
