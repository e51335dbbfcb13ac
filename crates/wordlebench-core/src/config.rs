use crate::engine::scheduler::DEFAULT_PARALLEL;
use crate::errors::ConfigError;
use crate::providers::llm::openai::DEFAULT_BASE_URL;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub mod path_resolver;
pub mod sources;

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;

pub const ENV_PARALLEL: &str = "WORDLEBENCH_PARALLEL";
pub const ENV_DB: &str = "WORDLEBENCH_DB";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchConfig {
    #[serde(default = "default_version", alias = "configVersion")]
    pub version: u32,
    #[serde(default = "default_db")]
    pub db: String,
    #[serde(default = "default_words_file")]
    pub words_file: String,
    #[serde(default)]
    pub prompts: PromptPaths,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub settings: Settings,
    pub models: Vec<String>,
}

fn default_version() -> u32 {
    SUPPORTED_CONFIG_VERSION
}

fn default_db() -> String {
    "games.db".into()
}

fn default_words_file() -> String {
    "words.txt".into()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptPaths {
    pub system: String,
    pub user: String,
}

impl Default for PromptPaths {
    fn default() -> Self {
        Self {
            system: "prompts/system_prompt.md".into(),
            user: "prompts/user_prompt.md".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl ProviderConfig {
    pub fn api_key(&self) -> Result<String, ConfigError> {
        match std::env::var(&self.api_key_env) {
            Ok(k) if !k.trim().is_empty() => Ok(k),
            _ => Err(ConfigError(format!(
                "environment variable {} is not set",
                self.api_key_env
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallel: Option<usize>,
    /// Per-completion timeout; unset means wait indefinitely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
}

impl BenchConfig {
    pub fn parallel(&self) -> usize {
        self.settings.parallel.unwrap_or(DEFAULT_PARALLEL).max(1)
    }

    pub fn turn_timeout(&self) -> Option<Duration> {
        self.settings.timeout_seconds.map(Duration::from_secs)
    }
}

/// Loads and validates a config file, then applies environment overrides.
///
/// Unknown keys fail in `strict` mode and are logged otherwise.
pub fn load_config(path: &Path, strict: bool) -> Result<BenchConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError(format!("failed to read config {}: {}", path.display(), e)))?;

    let mut cfg = parse_config(&raw, strict)
        .map_err(|e| ConfigError(format!("{} (file: {})", e.0, path.display())))?;

    let r = path_resolver::PathResolver::new(path);
    r.resolve_str(&mut cfg.db);
    r.resolve_str(&mut cfg.words_file);
    r.resolve_str(&mut cfg.prompts.system);
    r.resolve_str(&mut cfg.prompts.user);

    apply_env_overrides(&mut cfg, |k| std::env::var(k).ok())?;
    Ok(cfg)
}

pub fn parse_config(raw: &str, strict: bool) -> Result<BenchConfig, ConfigError> {
    let mut ignored_keys = std::collections::BTreeSet::new();
    let deserializer = serde_yaml::Deserializer::from_str(raw);
    let cfg: BenchConfig = serde_ignored::deserialize(deserializer, |path| {
        ignored_keys.insert(path.to_string());
    })
    .map_err(|e| ConfigError(format!("failed to parse YAML: {}", e)))?;

    let meaningful: Vec<_> = ignored_keys
        .iter()
        .filter(|k| !k.starts_with('_') && !k.starts_with("x-"))
        .collect();
    if !meaningful.is_empty() {
        if strict {
            return Err(ConfigError(format!(
                "unknown fields in strict mode: {:?}",
                meaningful
            )));
        }
        tracing::warn!(event = "config.unknown_fields", fields = ?meaningful);
    }

    validate(&cfg)?;
    Ok(cfg)
}

fn validate(cfg: &BenchConfig) -> Result<(), ConfigError> {
    // 0 is accepted as an alias for configs written before versioning.
    if cfg.version != 0 && cfg.version != SUPPORTED_CONFIG_VERSION {
        return Err(ConfigError(format!(
            "unsupported config version {} (supported: 0, {})",
            cfg.version, SUPPORTED_CONFIG_VERSION
        )));
    }
    if cfg.models.iter().all(|m| m.trim().is_empty()) {
        return Err(ConfigError("config has no models".into()));
    }
    if cfg.settings.parallel == Some(0) {
        return Err(ConfigError("settings.parallel must be at least 1".into()));
    }
    Ok(())
}

/// `WORDLEBENCH_PARALLEL` and `WORDLEBENCH_DB` take precedence over the file.
pub fn apply_env_overrides<F>(cfg: &mut BenchConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup(ENV_PARALLEL) {
        let n: usize = v
            .trim()
            .parse()
            .map_err(|_| ConfigError(format!("{ENV_PARALLEL}={v:?} is not a number")))?;
        if n == 0 {
            return Err(ConfigError(format!("{ENV_PARALLEL} must be at least 1")));
        }
        cfg.settings.parallel = Some(n);
    }
    if let Some(v) = lookup(ENV_DB).filter(|v| !v.trim().is_empty()) {
        cfg.db = v;
    }
    Ok(())
}

pub const SAMPLE_CONFIG: &str = r#"version: 1
db: games.db
words_file: words.txt
prompts:
  system: prompts/system_prompt.md
  user: prompts/user_prompt.md
provider:
  base_url: https://openrouter.ai/api/v1
  api_key_env: OPENAI_API_KEY
settings:
  parallel: 25
  timeout_seconds: 600
models:
  - openai/gpt-5-mini
  - anthropic/claude-haiku-4.5
  - google/gemini-2.5-flash
"#;

pub fn write_sample_config(path: &Path) -> Result<(), ConfigError> {
    std::fs::write(path, SAMPLE_CONFIG)
        .map_err(|e| ConfigError(format!("failed to write sample config: {}", e)))
}
