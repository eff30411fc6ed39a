use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

pub const CONFIG_PATH_ENV: &str = "WASTELOG_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "wastelog.json";

const BIND_ENV: &str = "WASTELOG_BIND";
const DB_PATH_ENV: &str = "WASTELOG_DB_PATH";
const PAGE_SIZE_ENV: &str = "WASTELOG_PAGE_SIZE";

/// Service configuration, read from JSON with environment overrides.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,

    /// Written to `created_by` / `updated_by`.
    #[serde(default = "default_audit_actor")]
    pub audit_actor: String,
}

fn default_bind_address() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_database_path() -> PathBuf {
    PathBuf::from("wastelog.sqlite3")
}

fn default_page_size() -> usize {
    20
}

fn default_max_page_size() -> usize {
    100
}

fn default_audit_actor() -> String {
    "SYSTEM".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            database_path: default_database_path(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            audit_actor: default_audit_actor(),
        }
    }
}

impl Settings {
    /// Config file named by `WASTELOG_CONFIG`, falling back to `wastelog.json`.
    pub fn config_path() -> PathBuf {
        std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_file(path)?.with_overrides(|key| std::env::var(key).ok())
    }

    /// A missing file yields the defaults; a malformed one is an error.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings in {}", path.display()))
    }

    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup(BIND_ENV) {
            self.bind_address = bind;
        }
        if let Some(path) = lookup(DB_PATH_ENV) {
            self.database_path = PathBuf::from(path);
        }
        if let Some(size) = lookup(PAGE_SIZE_ENV) {
            self.default_page_size = size
                .trim()
                .parse()
                .with_context(|| format!("{PAGE_SIZE_ENV} must be a whole number, got {size:?}"))?;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();

        let settings = Settings::from_file(&dir.path().join("absent.json")).unwrap();

        assert_eq!(settings, Settings::default());
        assert_eq!(settings.audit_actor, "SYSTEM");
        assert_eq!(settings.default_page_size, 20);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wastelog.json");
        fs::write(&path, r#"{"bindAddress":"0.0.0.0:9000","maxPageSize":50}"#).unwrap();

        let settings = Settings::from_file(&path).unwrap();

        assert_eq!(settings.bind_address, "0.0.0.0:9000");
        assert_eq!(settings.max_page_size, 50);
        assert_eq!(settings.database_path, PathBuf::from("wastelog.sqlite3"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wastelog.json");
        fs::write(&path, "{ not json").unwrap();

        let err = Settings::from_file(&path).unwrap_err();

        assert!(err.to_string().contains("Failed to parse settings"));
    }

    #[test]
    fn environment_overrides_win() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("WASTELOG_BIND", "0.0.0.0:1234"),
            ("WASTELOG_DB_PATH", "/var/lib/wastelog/db.sqlite3"),
            ("WASTELOG_PAGE_SIZE", " 5 "),
        ]);

        let settings = Settings::default()
            .with_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(settings.bind_address, "0.0.0.0:1234");
        assert_eq!(
            settings.database_path,
            PathBuf::from("/var/lib/wastelog/db.sqlite3")
        );
        assert_eq!(settings.default_page_size, 5);
    }

    #[test]
    fn bad_page_size_override_is_rejected() {
        let result = Settings::default().with_overrides(|key| {
            (key == "WASTELOG_PAGE_SIZE").then(|| "lots".to_string())
        });

        assert!(result.is_err());
    }
}
