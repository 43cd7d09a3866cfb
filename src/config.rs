use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

pub const ENV_GITHUB_USER: &str = "GITHUB_USER";
pub const ENV_ACCESS_TOKEN: &str = "ACCESS_TOKEN";
pub const ENV_REPO_PREFIX: &str = "REPO_PREFIX";
pub const ENV_SOURCE_ORG_ID: &str = "SOURCE_ORG_ID";
pub const ENV_SKIP_RENAME: &str = "SKIP_RENAME";
pub const ENV_SKIP_ARCHIVE: &str = "SKIP_ARCHIVE";
pub const ENV_GRAPHQL_URL: &str = "GITHUB_GRAPHQL_URL";
pub const ENV_MUTATION_DELAY_MS: &str = "MUTATION_DELAY_MS";
pub const ENV_DATA_DIR: &str = "FORK_ARCHIVER_DATA_DIR";

/// Lambda School's organization node id.
pub const DEFAULT_SOURCE_ORG_ID: &str = "MDEyOk9yZ2FuaXphdGlvbjI0NzgwMTE0";
pub const DEFAULT_GRAPHQL_URL: &str = "https://api.github.com/graphql";
pub const DEFAULT_MUTATION_DELAY_MS: u64 = 50;
pub const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration: {}. See README.md for instructions.", .0.join(", "))]
    Missing(Vec<&'static str>),
    #[error("invalid `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
    #[error("failed to load config file `{}`", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Global switches that suppress one kind of forward mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipSwitches {
    pub rename: bool,
    pub archive: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub username: String,
    pub token: String,
    pub prefix: String,
    pub source_org_id: String,
    pub skip: SkipSwitches,
    pub api_url: String,
    pub mutation_delay: Duration,
    pub data_dir: PathBuf,
}

/// Shape of the optional `--config` TOML file. Every key is optional here;
/// requiredness is checked after all layers are merged.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    github_user: Option<String>,
    access_token: Option<String>,
    repo_prefix: Option<String>,
    source_org_id: Option<String>,
    skip_rename: Option<bool>,
    skip_archive: Option<bool>,
    api_url: Option<String>,
    mutation_delay_ms: Option<u64>,
    data_dir: Option<PathBuf>,
}

/// CLI-level overrides, applied last.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub skip_rename: bool,
    pub skip_archive: bool,
    pub data_dir: Option<PathBuf>,
}

impl Config {
    /// Resolve the file layer, then the environment (via `lookup`), then CLI
    /// overrides.
    pub fn load<F>(
        file: Option<&Path>,
        lookup: F,
        overrides: &Overrides,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file_cfg = match file {
            Some(path) => read_file_config(path)?,
            None => FileConfig::default(),
        };
        let env = |key: &str| non_blank(lookup(key));

        let username = env(ENV_GITHUB_USER).or(non_blank(file_cfg.github_user));
        let token = env(ENV_ACCESS_TOKEN).or(non_blank(file_cfg.access_token));
        let prefix = env(ENV_REPO_PREFIX).or(non_blank(file_cfg.repo_prefix));

        let mut missing = Vec::new();
        if username.is_none() {
            missing.push(ENV_GITHUB_USER);
        }
        if token.is_none() {
            missing.push(ENV_ACCESS_TOKEN);
        }
        if prefix.is_none() {
            missing.push(ENV_REPO_PREFIX);
        }
        let (Some(username), Some(token), Some(prefix)) = (username, token, prefix) else {
            return Err(ConfigError::Missing(missing));
        };
        validate_prefix(&prefix)?;

        let skip_rename = match env(ENV_SKIP_RENAME) {
            Some(raw) => parse_bool(ENV_SKIP_RENAME, &raw)?,
            None => file_cfg.skip_rename.unwrap_or(false),
        };
        let skip_archive = match env(ENV_SKIP_ARCHIVE) {
            Some(raw) => parse_bool(ENV_SKIP_ARCHIVE, &raw)?,
            None => file_cfg.skip_archive.unwrap_or(false),
        };
        let delay_ms = match env(ENV_MUTATION_DELAY_MS) {
            Some(raw) => raw.parse::<u64>().map_err(|e| ConfigError::Invalid {
                key: ENV_MUTATION_DELAY_MS,
                reason: e.to_string(),
            })?,
            None => file_cfg
                .mutation_delay_ms
                .unwrap_or(DEFAULT_MUTATION_DELAY_MS),
        };
        let data_dir = overrides
            .data_dir
            .clone()
            .or_else(|| env(ENV_DATA_DIR).map(PathBuf::from))
            .or(file_cfg.data_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        Ok(Self {
            username,
            token,
            prefix,
            source_org_id: env(ENV_SOURCE_ORG_ID)
                .or(non_blank(file_cfg.source_org_id))
                .unwrap_or_else(|| DEFAULT_SOURCE_ORG_ID.to_string()),
            skip: SkipSwitches {
                rename: skip_rename || overrides.skip_rename,
                archive: skip_archive || overrides.skip_archive,
            },
            api_url: env(ENV_GRAPHQL_URL)
                .or(non_blank(file_cfg.api_url))
                .unwrap_or_else(|| DEFAULT_GRAPHQL_URL.to_string()),
            mutation_delay: Duration::from_millis(delay_ms),
            data_dir,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let file_error = |source: Box<dyn std::error::Error + Send + Sync>| ConfigError::File {
        path: path.to_path_buf(),
        source,
    };
    let text = fs::read_to_string(path).map_err(|e| file_error(e.into()))?;
    toml::from_str(&text).map_err(|e| file_error(e.into()))
}

fn validate_prefix(prefix: &str) -> Result<(), ConfigError> {
    let re = Regex::new(r"^[A-Za-z0-9._-]+$").map_err(|e| ConfigError::Invalid {
        key: ENV_REPO_PREFIX,
        reason: e.to_string(),
    })?;
    if re.is_match(prefix) {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            key: ENV_REPO_PREFIX,
            reason: format!(
                "`{prefix}` may only contain ASCII letters, digits, `.`, `-` and `_`"
            ),
        })
    }
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid {
            key,
            reason: format!("expected a boolean, got `{other}`"),
        }),
    }
}
