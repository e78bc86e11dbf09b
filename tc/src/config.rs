//! task-cli configuration types and loading
//!
//! Configuration is read once per process. The binary calls [`init`] with the
//! optional `--config` path; everything else reads the cached value through
//! [`get`]. The cached value is never mutated after it is stored.

use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "TASK_CLI_";

/// Inclusive bounds for `conversation.max-questions`
pub const MAX_QUESTIONS_RANGE: std::ops::RangeInclusive<u32> = 1..=10;

static GLOBAL: RwLock<Option<Arc<Config>>> = RwLock::new(None);

/// Main task-cli configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Question-phase limits
    pub conversation: ConversationConfig,

    /// Where saved plans live
    pub storage: StorageConfig,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

impl Config {
    /// Check value bounds. Does not look at credentials; see [`LlmConfig::api_key`].
    pub fn validate(&self) -> Result<()> {
        if !MAX_QUESTIONS_RANGE.contains(&self.conversation.max_questions) {
            return Err(eyre!(
                "max-questions must be between {} and {}, got {}",
                MAX_QUESTIONS_RANGE.start(),
                MAX_QUESTIONS_RANGE.end(),
                self.conversation.max_questions
            ));
        }
        if self.llm.max_tokens == 0 {
            return Err(eyre!("max-tokens must be greater than zero"));
        }
        Ok(())
    }

    /// Load configuration with fallback chain, then apply environment overrides
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        debug!(?config_path, "Config::load: called");
        let mut config = Self::load_file_chain(config_path)?;
        load_dotenv(Path::new(".env"));
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn load_file_chain(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, it must load
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Project-local config: .task-cli.yml
        let local_config = PathBuf::from(".task-cli.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // User config: ~/.config/task-cli/task-cli.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("task-cli").join("task-cli.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Read only the log level, before logging is set up
    ///
    /// Errors are swallowed: the full load reports them later.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        Self::load_file_chain(config_path).ok().and_then(|c| c.log_level)
    }

    /// Apply `TASK_CLI_*` overrides using `lookup` to read variables
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        if let Some(model) = var("MODEL_NAME") {
            debug!(%model, "apply_overrides: model");
            self.llm.model = model;
        }
        if let Some(raw) = var("MAX_TOKENS") {
            self.llm.max_tokens = raw
                .trim()
                .parse()
                .map_err(|_| eyre!("{ENV_PREFIX}MAX_TOKENS must be a positive integer, got '{}'", raw))?;
        }
        if let Some(raw) = var("MAX_QUESTIONS") {
            self.conversation.max_questions = raw
                .trim()
                .parse()
                .map_err(|_| eyre!("{ENV_PREFIX}MAX_QUESTIONS must be an integer, got '{}'", raw))?;
        }
        if let Some(dir) = var("PLANS_DIR") {
            self.storage.plans_dir = dir;
        }
        Ok(())
    }
}

/// Read `KEY=value` pairs from a `.env` file into the process environment.
///
/// Variables already set in the environment win. A missing file is not an
/// error; an unreadable one is logged and skipped.
pub fn load_dotenv(path: &Path) -> bool {
    match dotenvy::from_path(path) {
        Ok(()) => {
            debug!(?path, "load_dotenv: loaded");
            true
        }
        Err(e) if e.not_found() => false,
        Err(e) => {
            warn!(?path, error = %e, "load_dotenv: skipped");
            false
        }
    }
}

/// Load the process-wide configuration once and cache it
///
/// Later calls return the cached value and ignore `config_path`.
pub fn init(config_path: Option<&PathBuf>) -> Result<Arc<Config>> {
    if let Some(config) = GLOBAL.read().map_err(|_| eyre!("config lock poisoned"))?.as_ref() {
        return Ok(Arc::clone(config));
    }

    let mut slot = GLOBAL.write().map_err(|_| eyre!("config lock poisoned"))?;
    if let Some(config) = slot.as_ref() {
        return Ok(Arc::clone(config));
    }
    let config = Arc::new(Config::load(config_path)?);
    *slot = Some(Arc::clone(&config));
    Ok(config)
}

/// The process-wide configuration, loading defaults on first access
pub fn get() -> Result<Arc<Config>> {
    init(None)
}

/// Drop the cached configuration. Test isolation only.
pub fn reset() {
    if let Ok(mut slot) = GLOBAL.write() {
        *slot = None;
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl LlmConfig {
    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env).ok().filter(|k| !k.trim().is_empty())
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-5-20250929".to_string(),
            api_key_env: format!("{ENV_PREFIX}ANTHROPIC_API_KEY"),
            base_url: "https://api.anthropic.com".to_string(),
            max_tokens: 4096,
            timeout_ms: 120_000,
        }
    }
}

/// Question-phase configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    /// Hard cap on clarifying questions per session
    #[serde(rename = "max-questions")]
    pub max_questions: u32,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self { max_questions: 5 }
    }
}

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for saved plans (`~/` is expanded)
    #[serde(rename = "plans-dir")]
    pub plans_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            plans_dir: "~/.task-cli/plans".to_string(),
        }
    }
}

impl StorageConfig {
    /// Expand `~/` against the home directory
    pub fn expanded_plans_dir(&self) -> PathBuf {
        match self.plans_dir.strip_prefix("~/") {
            Some(rest) => dirs::home_dir()
                .map(|home| home.join(rest))
                .unwrap_or_else(|| PathBuf::from(rest)),
            None => PathBuf::from(&self.plans_dir),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.llm.model.contains("sonnet"));
        assert_eq!(config.llm.max_tokens, 4096);
        assert_eq!(config.llm.api_key_env, "TASK_CLI_ANTHROPIC_API_KEY");
        assert_eq!(config.conversation.max_questions, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
llm:
  model: claude-opus-4
  api-key-env: MY_API_KEY
  base-url: https://api.example.com
  max-tokens: 8192
  timeout-ms: 60000

conversation:
  max-questions: 3

storage:
  plans-dir: /tmp/plans

log-level: debug
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.llm.model, "claude-opus-4");
        assert_eq!(config.llm.api_key_env, "MY_API_KEY");
        assert_eq!(config.llm.max_tokens, 8192);
        assert_eq!(config.conversation.max_questions, 3);
        assert_eq!(config.storage.expanded_plans_dir(), PathBuf::from("/tmp/plans"));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
llm:
  model: claude-haiku
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.llm.model, "claude-haiku");
        assert_eq!(config.llm.api_key_env, "TASK_CLI_ANTHROPIC_API_KEY");
        assert_eq!(config.conversation.max_questions, 5);
    }

    #[test]
    fn test_validate_bounds() {
        let mut config = Config::default();
        config.conversation.max_questions = 0;
        assert!(config.validate().is_err());
        config.conversation.max_questions = 11;
        assert!(config.validate().is_err());
        config.conversation.max_questions = 10;
        assert!(config.validate().is_ok());
        config.llm.max_tokens = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = Config::default();
        config
            .apply_overrides(lookup(&[
                ("TASK_CLI_MODEL_NAME", "claude-haiku"),
                ("TASK_CLI_MAX_TOKENS", "1024"),
                ("TASK_CLI_MAX_QUESTIONS", " 2 "),
                ("TASK_CLI_PLANS_DIR", "/srv/plans"),
            ]))
            .unwrap();

        assert_eq!(config.llm.model, "claude-haiku");
        assert_eq!(config.llm.max_tokens, 1024);
        assert_eq!(config.conversation.max_questions, 2);
        assert_eq!(config.storage.plans_dir, "/srv/plans");
    }

    #[test]
    fn test_apply_overrides_rejects_garbage() {
        let mut config = Config::default();
        assert!(
            config
                .apply_overrides(lookup(&[("TASK_CLI_MAX_QUESTIONS", "many")]))
                .is_err()
        );
    }

    #[test]
    fn test_expanded_plans_dir_home() {
        let storage = StorageConfig::default();
        let expanded = storage.expanded_plans_dir();
        assert!(expanded.ends_with(".task-cli/plans"));
        assert!(!expanded.starts_with("~"));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("task-cli.yml");
        fs::write(&path, "conversation:\n  max-questions: 4\n").unwrap();

        let config = Config::load_file_chain(Some(&path)).unwrap();
        assert_eq!(config.conversation.max_questions, 4);
        assert_eq!(Config::load_log_level(Some(&path)), None);
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let path = PathBuf::from("/definitely/not/here/task-cli.yml");
        assert!(Config::load_file_chain(Some(&path)).is_err());
    }

    #[test]
    #[serial]
    fn test_global_init_is_cached_until_reset() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.yml");
        let second = dir.path().join("second.yml");
        fs::write(&first, "conversation:\n  max-questions: 2\n").unwrap();
        fs::write(&second, "conversation:\n  max-questions: 7\n").unwrap();

        reset();
        let a = init(Some(&first)).unwrap();
        let b = init(Some(&second)).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&a, &get().unwrap()));

        reset();
        let c = init(Some(&second)).unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
        reset();
    }

    #[test]
    #[serial]
    fn test_dotenv_fills_missing_vars_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(
            &path,
            "TASK_CLI_DOTENV_TEST_KEY=sk-from-file\nTASK_CLI_DOTENV_TEST_MODEL=file-model\n",
        )
        .unwrap();

        // SAFETY: serial test, no other thread reads these variables
        unsafe {
            std::env::remove_var("TASK_CLI_DOTENV_TEST_KEY");
            std::env::set_var("TASK_CLI_DOTENV_TEST_MODEL", "shell-model");
        }

        assert!(load_dotenv(&path));
        assert_eq!(std::env::var("TASK_CLI_DOTENV_TEST_KEY").unwrap(), "sk-from-file");
        assert_eq!(std::env::var("TASK_CLI_DOTENV_TEST_MODEL").unwrap(), "shell-model");

        let llm = LlmConfig {
            api_key_env: "TASK_CLI_DOTENV_TEST_KEY".to_string(),
            ..LlmConfig::default()
        };
        assert_eq!(llm.api_key().as_deref(), Some("sk-from-file"));

        unsafe {
            std::env::remove_var("TASK_CLI_DOTENV_TEST_KEY");
            std::env::remove_var("TASK_CLI_DOTENV_TEST_MODEL");
        }
    }

    #[test]
    fn test_dotenv_missing_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!load_dotenv(&dir.path().join(".env")));
    }
}
