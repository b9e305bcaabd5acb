use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const API_KEY_ENV_VAR: &str = "OPENAI_API_KEY";
pub const MODEL_ENV_VAR: &str = "OPENAI_MODEL";
pub const BASE_URL_ENV_VAR: &str = "OPENAI_BASE_URL";
pub const PORT_ENV_VAR: &str = "PORT";
pub const RECIPES_PATH_ENV_VAR: &str = "RECIPES_PATH";
pub const SEARCH_LIMIT_ENV_VAR: &str = "RASOIBOT_SEARCH_LIMIT";
pub const RAW_SNIPPET_ENV_VAR: &str = "RASOIBOT_RAW_SNIPPET_CHARS";
pub const RATE_LIMIT_MAX_ENV_VAR: &str = "RASOIBOT_RATE_LIMIT_MAX";
pub const RATE_LIMIT_WINDOW_ENV_VAR: &str = "RASOIBOT_RATE_LIMIT_WINDOW_SECS";

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_PORT: u16 = 5175;
pub const DEFAULT_RECIPES_PATH: &str = "recipes.json";
pub const DEFAULT_API_URL: &str = "http://localhost:5175";
pub const MAX_OUTPUT_TOKENS: u32 = 600;

#[derive(Debug, Clone, PartialEq)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub max_output_tokens: u32,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_output_tokens: MAX_OUTPUT_TOKENS,
        }
    }
}

/// Tunable limits. The defaults match the values the service has always shipped with.
#[derive(Debug, Clone, PartialEq)]
pub struct Limits {
    /// How many recipes an empty query returns.
    pub search_default_limit: usize,
    /// How much of the raw model output goes back in a 502 body, in characters.
    pub raw_snippet_chars: usize,
    pub rate_limit_max: u32,
    pub rate_limit_window: Duration,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            search_default_limit: 10,
            raw_snippet_chars: 300,
            rate_limit_max: 10,
            rate_limit_window: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    pub recipes_path: PathBuf,
    pub openai: OpenAiConfig,
    pub limits: Limits,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            recipes_path: PathBuf::from(DEFAULT_RECIPES_PATH),
            openai: OpenAiConfig::default(),
            limits: Limits::default(),
        }
    }
}

impl ServerConfig {
    /// Reads the server configuration from the process environment.
    /// Call `dotenv::dotenv()` first if a `.env` file should be honoured.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] but with an arbitrary variable source.
    /// Unparsable numeric values fall back to their defaults with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ServerConfig::default();
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let openai = OpenAiConfig {
            api_key: non_empty(API_KEY_ENV_VAR),
            model: non_empty(MODEL_ENV_VAR).unwrap_or(defaults.openai.model),
            base_url: non_empty(BASE_URL_ENV_VAR)
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.openai.base_url),
            max_output_tokens: defaults.openai.max_output_tokens,
        };

        let limits = Limits {
            search_default_limit: parse_or(
                non_empty(SEARCH_LIMIT_ENV_VAR),
                SEARCH_LIMIT_ENV_VAR,
                defaults.limits.search_default_limit,
            ),
            raw_snippet_chars: parse_or(
                non_empty(RAW_SNIPPET_ENV_VAR),
                RAW_SNIPPET_ENV_VAR,
                defaults.limits.raw_snippet_chars,
            ),
            rate_limit_max: parse_or(
                non_empty(RATE_LIMIT_MAX_ENV_VAR),
                RATE_LIMIT_MAX_ENV_VAR,
                defaults.limits.rate_limit_max,
            ),
            rate_limit_window: Duration::from_secs(parse_or(
                non_empty(RATE_LIMIT_WINDOW_ENV_VAR),
                RATE_LIMIT_WINDOW_ENV_VAR,
                defaults.limits.rate_limit_window.as_secs(),
            )),
        };

        ServerConfig {
            port: parse_or(non_empty(PORT_ENV_VAR), PORT_ENV_VAR, defaults.port),
            recipes_path: non_empty(RECIPES_PATH_ENV_VAR)
                .map(PathBuf::from)
                .unwrap_or(defaults.recipes_path),
            openai,
            limits,
        }
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, key: &str, default: T) -> T {
    match value {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(variable = key, value = %raw, "Ignoring unparsable value, using default");
            default
        }),
        None => default,
    }
}
