use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Persisted tool configuration.
///
/// The endpoint base URLs exist so every provider call can be pointed at a
/// forwarding proxy (the browser-based ancestor of this tool routed through
/// a Vite dev proxy to dodge CORS); they default to the real API hosts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub claude_api_key: String,
    pub openai_api_key: String,
    pub gemini_api_key: String,

    pub claude_model: String,
    pub openai_model: String,
    pub gemini_model: String,

    pub anthropic_base_url: String,
    pub openai_base_url: String,
    pub gemini_base_url: String,

    pub claude_max_tokens: u32,
    pub openai_max_tokens: u32,
    pub gemini_max_output_tokens: u32,
    pub gemini_temperature: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            claude_api_key: String::new(),
            openai_api_key: String::new(),
            gemini_api_key: String::new(),
            claude_model: "claude-sonnet-4-20250514".to_string(),
            openai_model: "gpt-4o".to_string(),
            gemini_model: "gemini-2.5-flash".to_string(),
            anthropic_base_url: "https://api.anthropic.com".to_string(),
            openai_base_url: "https://api.openai.com".to_string(),
            gemini_base_url: "https://generativelanguage.googleapis.com".to_string(),
            claude_max_tokens: 2000,
            openai_max_tokens: 2000,
            gemini_max_output_tokens: 8000,
            gemini_temperature: 0.1,
        }
    }
}

impl AppConfig {
    /// Default config file location (`<user config dir>/image-checker/config.json`).
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("image-checker").join("config.json"))
    }

    /// Load from a config file, falling back to defaults when it is missing
    /// or unreadable, then apply environment-variable key overrides.
    pub fn load(path: &Path) -> Self {
        let mut config = if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                    log::warn!("ignoring malformed config {}: {e}", path.display());
                    Self::default()
                }),
                Err(_) => Self::default(),
            }
        } else {
            Self::default()
        };

        // Keys from the environment win over the file (keeps them out of
        // plain-text config).
        if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
            if !key.is_empty() {
                config.claude_api_key = key;
            }
        }
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.is_empty() {
                config.openai_api_key = key;
            }
        }
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            if !key.is_empty() {
                config.gemini_api_key = key;
            }
        }

        config
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self).expect("config serializes");
        std::fs::write(path, content)
    }

    /// The stored key for one provider, if any.
    pub fn api_key_for(&self, provider: crate::check::Provider) -> &str {
        match provider {
            crate::check::Provider::Claude => &self.claude_api_key,
            crate::check::Provider::OpenAI => &self.openai_api_key,
            crate::check::Provider::Gemini => &self.gemini_api_key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_the_real_api_hosts() {
        let config = AppConfig::default();
        assert_eq!(config.anthropic_base_url, "https://api.anthropic.com");
        assert_eq!(config.openai_base_url, "https://api.openai.com");
        assert_eq!(
            config.gemini_base_url,
            "https://generativelanguage.googleapis.com"
        );
        assert_eq!(config.openai_model, "gpt-4o");
    }

    #[test]
    fn round_trips_through_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = AppConfig::default();
        config.gemini_model = "gemini-exp".to_string();
        config.openai_base_url = "http://localhost:5173/openai".to_string();
        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path);
        assert_eq!(loaded.gemini_model, "gemini-exp");
        assert_eq!(loaded.openai_base_url, "http://localhost:5173/openai");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("nope.json"));
        assert_eq!(config.claude_max_tokens, 2000);
    }

    #[test]
    fn unknown_or_missing_fields_are_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"openai_model":"gpt-4o-mini","future_field":1}"#).unwrap();

        let config = AppConfig::load(&path);
        assert_eq!(config.openai_model, "gpt-4o-mini");
        assert_eq!(config.gemini_max_output_tokens, 8000);
    }
}
