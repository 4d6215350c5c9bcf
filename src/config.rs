use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::domain::branch::BranchSpec;
use crate::domain::module::ModuleMap;
use crate::error::{AppError, AppResult};

pub const DEFAULT_SETTINGS_FILE: &str = "settings.json";
pub const TOKEN_ENV: &str = "TFS_MINER_TOKEN";
const DEFAULT_API_VERSION: &str = "5.0";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub url: String,
    pub target: String,
    pub ignore: Vec<String>,
    pub mappings: ModuleMap,
    pub branches: Vec<BranchSpec>,
    pub credentials: Credentials,
    pub api_version: String,
    pub settings_path: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub user: Option<String>,
    pub token: Option<String>,
}

/// Settings file as written by the user.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct StoredConfig {
    url: Option<String>,
    target: Option<String>,
    ignore: Option<Vec<String>>,
    mappings: Option<ModuleMap>,
    branches: Option<Vec<BranchSpec>>,
    user: Option<String>,
    token: Option<String>,
    api_version: Option<String>,
}

impl AppConfig {
    pub fn load(path: &Path) -> AppResult<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::Configuration(format!(
                    "settings file {} not found",
                    path.display()
                )));
            }
            Err(err) => return Err(AppError::Io(err)),
        };

        let token_override = non_blank(env::var(TOKEN_ENV).ok());
        let mut config = Self::parse(&contents, token_override)?;
        config.settings_path = path.to_path_buf();
        Ok(config)
    }

    pub fn parse(contents: &str, token_override: Option<String>) -> AppResult<Self> {
        let stored: StoredConfig = serde_json::from_str(contents)
            .map_err(|err| AppError::Configuration(format!("invalid settings file: {err}")))?;

        let url = required(stored.url, "url")?;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(AppError::Configuration(format!(
                "`url` must be an http(s) address, got '{url}'"
            )));
        }
        let target = required(stored.target, "target")?;

        let branches = stored
            .branches
            .filter(|branches| !branches.is_empty())
            .ok_or_else(|| {
                AppError::Configuration("`branches` must list at least one branch".to_string())
            })?;
        for branch in &branches {
            if branch.path.trim().is_empty() {
                return Err(AppError::Configuration(
                    "branch `path` must not be empty".to_string(),
                ));
            }
            if branch.from > branch.to {
                return Err(AppError::Configuration(format!(
                    "branch {} has `from` ({}) greater than `to` ({})",
                    branch.path, branch.from, branch.to
                )));
            }
        }

        let ignore = required_field(stored.ignore, "ignore")?;
        if ignore.iter().any(|prefix| prefix.is_empty()) {
            return Err(AppError::Configuration(
                "`ignore` entries must not be empty".to_string(),
            ));
        }

        let mappings = required_field(stored.mappings, "mappings")?;
        if mappings.is_empty() {
            warn!("no module mappings configured; every change gets an empty module");
        }
        for (first, second) in mappings.overlapping_prefixes() {
            warn!(
                first,
                second, "module prefixes overlap; the first declared one is used"
            );
        }

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            target: target.trim_end_matches('/').to_string(),
            ignore,
            mappings,
            branches,
            credentials: Credentials {
                user: non_blank(stored.user),
                token: non_blank(token_override).or_else(|| non_blank(stored.token)),
            },
            api_version: stored
                .api_version
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            settings_path: PathBuf::from(DEFAULT_SETTINGS_FILE),
        })
    }
}

fn required(value: Option<String>, field: &str) -> AppResult<String> {
    required_field(non_blank(value), field)
}

fn required_field<T>(value: Option<T>, field: &str) -> AppResult<T> {
    value.ok_or_else(|| AppError::Configuration(format!("missing required field `{field}`")))
}

/// Blank strings count as unset.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
