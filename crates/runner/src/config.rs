use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use sandbox::{DEFAULT_MAX_CODE_BYTES, DEFAULT_MAX_OUTPUT_BYTES, DEFAULT_TIMEOUT, Language};
use serde::{Deserialize, Serialize};

use crate::error::{RunnerError, RunnerResult};

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunnerConfig {
    #[serde(default)]
    pub sandbox: SandboxConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub language: Language,
    pub interpreter: Option<PathBuf>,
    pub timeout_secs: u64,
    pub max_code_bytes: usize,
    pub max_output_bytes: usize,
    pub staging_dir: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            language: Language::default(),
            interpreter: None,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            max_code_bytes: DEFAULT_MAX_CODE_BYTES,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
            staging_dir: None,
            env: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// JSONL file executions are appended to. No history is kept when unset.
    pub path: Option<PathBuf>,
}

/// Load and validate a runner config from a YAML file.
///
/// Relative paths in the config are resolved against the config file's parent directory.
pub async fn load(path: &Path) -> RunnerResult<RunnerConfig> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| RunnerError::Config(format!("read {}: {e}", path.display())))?;
    let mut config: RunnerConfig = serde_yaml_ng::from_str(&content)
        .map_err(|e| RunnerError::Config(format!("parse {}: {e}", path.display())))?;
    if let Some(config_dir) = path.parent() {
        config.resolve_relative_paths(config_dir);
    }
    config
        .sandbox_config(None)
        .validate()
        .map_err(|e| RunnerError::Config(format!("{}: {e}", path.display())))?;
    Ok(config)
}

/// Load `path` when given, otherwise fall back to defaults.
pub async fn load_or_default(path: Option<&Path>) -> RunnerResult<RunnerConfig> {
    match path {
        Some(path) => load(path).await,
        None => Ok(RunnerConfig::default()),
    }
}

impl RunnerConfig {
    fn resolve_relative_paths(&mut self, config_dir: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = config_dir.join(&*p);
            }
        };
        if let Some(staging_dir) = &mut self.sandbox.staging_dir {
            resolve(staging_dir);
        }
        if let Some(history) = &mut self.history.path {
            resolve(history);
        }
        // Bare interpreter names ("python3") are looked up on PATH, not resolved.
        match &mut self.sandbox.interpreter {
            Some(interpreter) if interpreter.components().count() > 1 => resolve(interpreter),
            _ => {}
        }
    }

    /// Build the backend config, optionally overriding the configured language.
    ///
    /// An explicit interpreter only applies to the configured language.
    pub fn sandbox_config(&self, language: Option<Language>) -> sandbox::SandboxConfig {
        let section = &self.sandbox;
        let language = language.unwrap_or(section.language);
        let interpreter = if language == section.language {
            section.interpreter.clone()
        } else {
            None
        };
        sandbox::SandboxConfig {
            language,
            interpreter,
            timeout: Duration::from_secs(section.timeout_secs),
            max_code_bytes: section.max_code_bytes,
            max_output_bytes: section.max_output_bytes,
            staging_dir: section.staging_dir.clone(),
            env: section
                .env
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}
