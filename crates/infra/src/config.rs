//! Process configuration, read once at startup from the environment.

use std::path::PathBuf;

/// Runtime settings for the pantry service.
///
/// Every field has a default so a bare `cargo run` starts an in-memory instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Socket address the HTTP server binds to.
    pub bind_addr: String,
    /// Postgres connection string; `None` selects the in-memory document store.
    pub database_url: Option<String>,
    /// Directory for uploaded images; `None` selects the in-memory blob store.
    pub blob_dir: Option<PathBuf>,
    /// Public prefix of blob URLs handed out to clients.
    pub blob_base_url: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub chat_model: String,
    pub system_prompt: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            database_url: None,
            blob_dir: None,
            blob_base_url: "http://localhost:8080/blobs".to_string(),
            openai_api_key: None,
            openai_base_url: "https://api.openai.com/v1".to_string(),
            chat_model: "gpt-3.5-turbo".to_string(),
            system_prompt: "You are a helpful assistant.".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let config = Self {
            bind_addr: get("PANTRY_BIND_ADDR").unwrap_or(defaults.bind_addr),
            database_url: get("DATABASE_URL"),
            blob_dir: get("PANTRY_BLOB_DIR").map(PathBuf::from),
            blob_base_url: get("PANTRY_BLOB_BASE_URL").unwrap_or(defaults.blob_base_url),
            openai_api_key: get("OPENAI_API_KEY"),
            openai_base_url: get("OPENAI_BASE_URL").unwrap_or(defaults.openai_base_url),
            chat_model: get("OPENAI_MODEL").unwrap_or(defaults.chat_model),
            system_prompt: get("PANTRY_SYSTEM_PROMPT").unwrap_or(defaults.system_prompt),
        };

        if config.openai_api_key.is_none() {
            tracing::warn!("OPENAI_API_KEY not set; chat requests will be rejected upstream");
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        assert_eq!(AppConfig::from_lookup(lookup(&[])), AppConfig::default());
    }

    #[test]
    fn reads_overrides_and_ignores_blank_values() {
        let config = AppConfig::from_lookup(lookup(&[
            ("PANTRY_BIND_ADDR", "127.0.0.1:3000"),
            ("DATABASE_URL", "postgres://localhost/pantry"),
            ("PANTRY_BLOB_DIR", "/var/lib/pantry/blobs"),
            ("OPENAI_API_KEY", "  "),
            ("OPENAI_MODEL", "gpt-4o-mini"),
        ]));

        assert_eq!(config.bind_addr, "127.0.0.1:3000");
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/pantry"));
        assert_eq!(config.blob_dir, Some(PathBuf::from("/var/lib/pantry/blobs")));
        assert_eq!(config.openai_api_key, None);
        assert_eq!(config.chat_model, "gpt-4o-mini");
        assert_eq!(config.system_prompt, "You are a helpful assistant.");
    }
}
