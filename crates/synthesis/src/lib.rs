//! Case description synthesis
//!
//! Turns the extracted legal issue into a professional intake summary:
//! - `OpenAiGenerator`: single chat-completions request, no retry
//! - `fallback::basic_description`: deterministic local template
//! - `synthesize`: the composition the session controller calls; falls back
//!   on any generation failure and therefore never fails itself

pub mod fallback;
pub mod openai;
pub mod prompt;

pub use fallback::basic_description;
pub use openai::{OpenAiConfig, OpenAiGenerator};
pub use prompt::PromptTemplate;

use lexai_core::TextGenerator;
use thiserror::Error;

/// Synthesis errors
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("API error: {0}")]
    Api(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("empty completion")]
    EmptyCompletion,

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        GenerationError::Network(err.to_string())
    }
}

impl From<GenerationError> for lexai_core::Error {
    fn from(err: GenerationError) -> Self {
        lexai_core::Error::Generation(err.to_string())
    }
}

/// Produce a professional case description for the extracted issue
///
/// Uses the configured generator when present; any failure or empty
/// completion falls back to the deterministic local template. This is the
/// terminal recovery path and never fails.
pub async fn synthesize(
    generator: Option<&dyn TextGenerator>,
    template: &PromptTemplate,
    issue: &str,
) -> String {
    let Some(generator) = generator else {
        tracing::debug!("no generation credential configured, using local template");
        return basic_description(template, issue);
    };

    match generator
        .generate(&template.system_prompt(), &template.user_prompt(issue))
        .await
    {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => {
            tracing::warn!(model = %generator.model_name(), "empty completion, using local template");
            metrics::counter!("lexai_generation_fallbacks_total").increment(1);
            basic_description(template, issue)
        }
        Err(e) => {
            tracing::warn!(model = %generator.model_name(), error = %e, "generation failed, using local template");
            metrics::counter!("lexai_generation_fallbacks_total").increment(1);
            basic_description(template, issue)
        }
    }
}
