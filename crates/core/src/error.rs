use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScriptwrightError {
    #[error("Please enter a title")]
    EmptyTitle,

    #[error("Missing API key: {env_var} environment variable is not set")]
    MissingApiKey { env_var: String },

    #[error("Model API error {status}: {body}")]
    ModelApi { status: u16, body: String },

    #[error("Unexpected model response: {dump}")]
    UnexpectedResponse { dump: String },

    #[error("Script generation failed: {reason}")]
    ScriptFailed { reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, ScriptwrightError>;
