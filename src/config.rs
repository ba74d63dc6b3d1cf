use crate::error::ConfigError;
use glob::Pattern;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_ENV: &str = "WORD2MD_CONFIG";
const APP_DIR: &str = "word2md";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploaderConfig {
    pub api_base: String,
    pub repo: String,
    pub branch: String,
    pub uploads_dir: String,
    pub converted_dir: String,
    pub converted_extension: String,
    /// Glob patterns matched against file names. Empty accepts everything.
    pub accepted_patterns: Vec<String>,
    pub credential_path: PathBuf,
    /// Upper bound on a single API request, in seconds.
    pub request_timeout_secs: u64,
    pub poll: PollPolicy,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            repo: "Word2MD".to_string(),
            branch: "main".to_string(),
            uploads_dir: "uploads".to_string(),
            converted_dir: "converted".to_string(),
            converted_extension: "md".to_string(),
            accepted_patterns: vec!["*.docx".to_string(), "*.doc".to_string()],
            credential_path: default_dir(dirs::data_dir()).join("credential"),
            request_timeout_secs: 30,
            poll: PollPolicy::default(),
        }
    }
}

/// Bounded retry policy for conversion probes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollPolicy {
    pub initial_delay_secs: u64,
    pub interval_secs: u64,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_delay_secs: 15,
            interval_secs: 10,
            max_attempts: 30,
        }
    }
}

impl PollPolicy {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_secs(self.initial_delay_secs)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// How long a single probe may take before it counts as a failed attempt.
    pub fn probe_timeout(&self) -> Duration {
        self.interval().max(Duration::from_secs(1))
    }
}

impl UploaderConfig {
    /// Loads from `$WORD2MD_CONFIG`, else the per-user config file. A missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| default_dir(dirs::config_dir()).join("config.toml"));

        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Self::default()
        };

        if let Ok(repo) = std::env::var("WORD2MD_REPO") {
            config.repo = repo;
        }
        if let Ok(branch) = std::env::var("WORD2MD_BRANCH") {
            config.branch = branch;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.patterns().map(|_| ())
    }

    fn patterns(&self) -> Result<Vec<Pattern>, ConfigError> {
        self.accepted_patterns
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|source| ConfigError::Pattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect()
    }

    pub fn is_accepted(&self, file_name: &str) -> bool {
        if self.accepted_patterns.is_empty() {
            return true;
        }
        let lowered = file_name.to_lowercase();
        self.accepted_patterns.iter().any(|pattern| {
            Pattern::new(&pattern.to_lowercase())
                .map(|p| p.matches(&lowered))
                .unwrap_or(false)
        })
    }

    pub fn upload_path(&self, file_name: &str) -> String {
        format!("{}/{}", self.uploads_dir, file_name)
    }

    /// `report.docx` becomes `report.md`. Names without an extension keep their full name.
    pub fn converted_name(&self, file_name: &str) -> String {
        let stem = match file_name.rfind('.') {
            Some(idx) if idx > 0 => &file_name[..idx],
            _ => file_name,
        };
        format!("{}.{}", stem, self.converted_extension)
    }

    pub fn converted_path(&self, file_name: &str) -> String {
        format!("{}/{}", self.converted_dir, self.converted_name(file_name))
    }
}

fn default_dir(base: Option<PathBuf>) -> PathBuf {
    base.unwrap_or_else(|| PathBuf::from(".")).join(APP_DIR)
}
