use std::time::Duration;

use crate::error::{Result, ScriptwrightError};

pub const GEMINI_KEY_VAR: &str = "GEMINI_API_KEY";
pub const GEMINI_MODEL_VAR: &str = "GEMINI_MODEL";
pub const YOUTUBE_KEY_VAR: &str = "YOUTUBE_API_KEY";
pub const CSE_KEY_VAR: &str = "GOOGLE_CSE_API_KEY";
pub const CSE_ID_VAR: &str = "GOOGLE_CSE_ID";

pub const DEFAULT_MODEL: &str = "gemini-pro";

/// Timeout for search and lookup requests.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(15);
/// Timeout for generation requests.
pub const GENERATION_TIMEOUT: Duration = Duration::from_secs(120);

/// Remote endpoints. Production defaults; tests point these at local stubs.
#[derive(Clone, Debug)]
pub struct Endpoints {
    pub youtube_search: String,
    pub youtube_watch: String,
    pub custom_search: String,
    pub duckduckgo_html: String,
    pub wikipedia_summary: String,
    pub gemini_api: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            youtube_search: "https://www.googleapis.com/youtube/v3/search".to_string(),
            youtube_watch: "https://www.youtube.com/watch".to_string(),
            custom_search: "https://www.googleapis.com/customsearch/v1".to_string(),
            duckduckgo_html: "https://html.duckduckgo.com/html/".to_string(),
            wikipedia_summary: "https://en.wikipedia.org/api/rest_v1/page/summary".to_string(),
            gemini_api: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        }
    }
}

/// Credentials and endpoints injected at startup.
///
/// A missing key disables the capability that needs it rather than failing
/// the run; only the generation key is mandatory.
#[derive(Clone, Debug)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub youtube_api_key: Option<String>,
    pub cse_api_key: Option<String>,
    pub cse_id: Option<String>,
    /// Program used to discover caption tracks.
    pub yt_dlp: String,
    pub endpoints: Endpoints,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_model: DEFAULT_MODEL.to_string(),
            youtube_api_key: None,
            cse_api_key: None,
            cse_id: None,
            yt_dlp: "yt-dlp".to_string(),
            endpoints: Endpoints::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            gemini_api_key: env_value(GEMINI_KEY_VAR),
            gemini_model: env_value(GEMINI_MODEL_VAR).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            youtube_api_key: env_value(YOUTUBE_KEY_VAR),
            cse_api_key: env_value(CSE_KEY_VAR),
            cse_id: env_value(CSE_ID_VAR),
            ..Self::default()
        }
    }

    /// Validate that the generation key is set
    pub fn require_gemini_key(&self) -> Result<&str> {
        self.gemini_api_key
            .as_deref()
            .ok_or_else(|| ScriptwrightError::MissingApiKey {
                env_var: GEMINI_KEY_VAR.to_string(),
            })
    }

    /// Key and engine id for the keyed web search, if both are configured.
    pub fn custom_search_credentials(&self) -> Option<(&str, &str)> {
        match (self.cse_api_key.as_deref(), self.cse_id.as_deref()) {
            (Some(key), Some(cx)) => Some((key, cx)),
            _ => None,
        }
    }
}

fn env_value(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_gemini_key() {
        let config = Config::default();
        let err = config.require_gemini_key().unwrap_err();
        assert!(err.to_string().contains(GEMINI_KEY_VAR));

        let config = Config {
            gemini_api_key: Some("k".to_string()),
            ..Config::default()
        };
        assert_eq!(config.require_gemini_key().unwrap(), "k");
    }

    #[test]
    fn test_custom_search_needs_both_values() {
        let mut config = Config {
            cse_api_key: Some("key".to_string()),
            ..Config::default()
        };
        assert!(config.custom_search_credentials().is_none());
        config.cse_id = Some("cx".to_string());
        assert_eq!(config.custom_search_credentials(), Some(("key", "cx")));
    }
}
