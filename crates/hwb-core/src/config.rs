use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{domain::ChatId, errors::Error, Result};

pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";
pub const DEFAULT_RETRY_PERIOD: Duration = Duration::from_secs(600);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_LOG_FILE: &str = "homework_bot.log";

/// Shown to the operator when the process refuses to start.
pub const MISSING_TOKENS_HINT: &str = "Проверьте, заданы ли все токены";

const REQUIRED_VARS: [&str; 3] = ["PRACTICUM_TOKEN", "TELEGRAM_TOKEN", "TELEGRAM_CHAT_ID"];

/// Typed configuration, read once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    // Secrets
    pub practicum_token: String,
    pub telegram_bot_token: String,
    pub telegram_chat_id: ChatId,

    // Practicum API
    pub endpoint: String,
    pub request_timeout: Duration,

    // Poll loop
    pub retry_period: Duration,
}

impl Config {
    /// Load from the process environment, after merging `.env` if present.
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(env_str)
    }

    /// Build a config from an arbitrary variable lookup.
    ///
    /// Blank values count as missing. Every missing required variable is
    /// reported in a single error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).and_then(non_empty);

        let missing = missing_required(&get);
        if !missing.is_empty() {
            return Err(Error::Config(format!(
                "required environment variables are missing: {}. {MISSING_TOKENS_HINT}",
                missing.join(", ")
            )));
        }

        // Presence was checked above.
        let practicum_token = get("PRACTICUM_TOKEN").unwrap_or_default();
        let telegram_bot_token = get("TELEGRAM_TOKEN").unwrap_or_default();
        let raw_chat_id = get("TELEGRAM_CHAT_ID").unwrap_or_default();
        let telegram_chat_id = raw_chat_id
            .trim()
            .parse::<i64>()
            .map(ChatId)
            .map_err(|_| {
                Error::Config(format!(
                    "TELEGRAM_CHAT_ID must be a numeric chat id, got {raw_chat_id:?}"
                ))
            })?;

        let endpoint = get("PRACTICUM_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let request_timeout = parse_secs(get("REQUEST_TIMEOUT_SECS"), DEFAULT_REQUEST_TIMEOUT);
        let retry_period = parse_secs(get("RETRY_PERIOD_SECS"), DEFAULT_RETRY_PERIOD);

        Ok(Self {
            practicum_token,
            telegram_bot_token,
            telegram_chat_id,
            endpoint,
            request_timeout,
            retry_period,
        })
    }
}

/// Log file location (`LOG_FILE`), resolved before `Config::load()` so that
/// configuration failures are already written to it.
pub fn log_file_from_env() -> PathBuf {
    load_dotenv_if_present(Path::new(".env"));
    env_str("LOG_FILE")
        .and_then(non_empty)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE))
}

fn missing_required(get: &impl Fn(&str) -> Option<String>) -> Vec<&'static str> {
    REQUIRED_VARS
        .into_iter()
        .filter(|key| get(*key).is_none())
        .collect()
}

fn parse_secs(v: Option<String>, default: Duration) -> Duration {
    v.and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or(default)
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // process env wins
        }

        env::set_var(key, unquote(v.trim()));
    }
}

fn unquote(val: &str) -> &str {
    if val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')))
    {
        &val[1..val.len() - 1]
    } else {
        val
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
