//! Configuration for stale-user reports.
//!
//! Resolution order (later wins):
//! 1. Built-in defaults
//! 2. Config file: explicit path, then `KCAUDIT_CONFIG`, then
//!    `<config dir>/kcaudit/config.toml` if present
//! 3. `KC_*` environment variables
//! 4. Command-line flags (applied by the caller)

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::report::OutputSelection;
use crate::threshold::{days_from_raw, AgeCriteria};
use crate::{Error, Result};

/// Environment variable naming an explicit config file.
pub const ENV_CONFIG: &str = "KCAUDIT_CONFIG";
pub const ENV_DB_USERNAME: &str = "KC_DB_USERNAME";
pub const ENV_DB_PASSWORD: &str = "KC_DB_PASSWORD";
pub const ENV_CLIENT_REALM: &str = "KC_CLIENT_REALM";
pub const ENV_MAX_AGE_IN_DAYS: &str = "KC_MAX_AGE_IN_DAYS";
pub const ENV_MAX_AGE_IN_DATE: &str = "KC_MAX_AGE_IN_DATE";

/// Connection settings for the Keycloak PostgreSQL database.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub dbname: String,

    /// Schema holding Keycloak's tables.
    pub schema: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            username: "keycloak".to_string(),
            password: "password".to_string(),
            host: "localhost".to_string(),
            port: 5432,
            dbname: "keycloak".to_string(),
            schema: "public".to_string(),
        }
    }
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("username", &self.username)
            .field("password", &"********")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .field("schema", &self.schema)
            .finish()
    }
}

impl DatabaseConfig {
    /// libpq keyword/value connection string.
    pub fn conninfo(&self) -> String {
        format!(
            "host={} port={} dbname={} user={} password={}",
            conninfo_value(&self.host),
            self.port,
            conninfo_value(&self.dbname),
            conninfo_value(&self.username),
            conninfo_value(&self.password),
        )
    }
}

/// Quote a libpq connection value when it is empty or contains spaces or quotes.
fn conninfo_value(value: &str) -> String {
    if !value.is_empty() && !value.chars().any(|c| c.is_whitespace() || c == '\'' || c == '\\') {
        return value.to_string();
    }
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{}'", escaped)
}

/// Full run configuration. Built once at startup, then read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Keycloak realm to report on.
    pub realm: String,

    pub database: DatabaseConfig,

    pub criteria: AgeCriteria,

    pub output: OutputSelection,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            realm: default_realm(),
            database: DatabaseConfig::default(),
            criteria: AgeCriteria::default(),
            output: OutputSelection::default(),
        }
    }
}

fn default_realm() -> String {
    "master".to_string()
}

impl Config {
    /// Load config file and environment overrides from the process environment.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::load_with(explicit, |key| std::env::var(key).ok())
    }

    /// Load using `lookup` in place of the process environment.
    pub fn load_with<F>(explicit: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match resolve_config_path(explicit, &lookup) {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };
        config.apply_env(&lookup)?;
        Ok(config)
    }

    /// Load a config file. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config {}: {}", path.display(), e)))
    }

    /// Save config as TOML.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply `KC_*` environment overrides. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(username) = get(ENV_DB_USERNAME) {
            self.database.username = username;
        }
        if let Some(password) = get(ENV_DB_PASSWORD) {
            self.database.password = password;
        }
        if let Some(realm) = get(ENV_CLIENT_REALM) {
            self.realm = realm;
        }
        if let Some(days) = get(ENV_MAX_AGE_IN_DAYS) {
            let raw: i64 = days.trim().parse().map_err(|e| {
                Error::Config(format!("Invalid {} '{}': {}", ENV_MAX_AGE_IN_DAYS, days, e))
            })?;
            self.criteria.days = days_from_raw(raw)?;
        }
        if let Some(date) = get(ENV_MAX_AGE_IN_DATE) {
            self.criteria.date = Some(date);
        }
        Ok(())
    }
}

/// Pick the config file to read, if any.
fn resolve_config_path<F>(explicit: Option<&Path>, lookup: &F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    // 1. Explicit path (must exist; load_from reports it otherwise)
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    // 2. Environment variable
    if let Some(path) = lookup(ENV_CONFIG).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }

    // 3. XDG config directory, only when the file exists
    ProjectDirs::from("", "", "kcaudit")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .filter(|path| path.exists())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.realm, "master");
        assert_eq!(config.database.host, "localhost");
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.database.dbname, "keycloak");
        assert_eq!(config.database.username, "keycloak");
        assert!(config.criteria.is_unset());
        assert_eq!(config.output, OutputSelection::default());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env(env(&[
                (ENV_DB_USERNAME, "auditor"),
                (ENV_DB_PASSWORD, "s3cret"),
                (ENV_CLIENT_REALM, "customers"),
                (ENV_MAX_AGE_IN_DAYS, "90"),
                (ENV_MAX_AGE_IN_DATE, "2024-01-15"),
            ]))
            .unwrap();
        assert_eq!(config.database.username, "auditor");
        assert_eq!(config.database.password, "s3cret");
        assert_eq!(config.realm, "customers");
        assert_eq!(config.criteria.days, Some(90));
        assert_eq!(config.criteria.date(), Some("2024-01-15"));
    }

    #[test]
    fn test_env_empty_values_ignored() {
        let mut config = Config::default();
        config.apply_env(env(&[(ENV_CLIENT_REALM, ""), (ENV_MAX_AGE_IN_DAYS, "")])).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_env_negative_days_disables() {
        let mut config = Config::default();
        config.criteria.days = Some(10);
        config.apply_env(env(&[(ENV_MAX_AGE_IN_DAYS, "-1")])).unwrap();
        assert_eq!(config.criteria.days, None);
    }

    #[test]
    fn test_env_invalid_days_rejected() {
        let mut config = Config::default();
        let err = config.apply_env(env(&[(ENV_MAX_AGE_IN_DAYS, "thirty")])).unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains(ENV_MAX_AGE_IN_DAYS)));
    }

    #[test]
    fn test_file_then_env() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
realm = "staff"

[database]
host = "db.internal"
port = 6432

[criteria]
days = 30

[output]
id = true
email = true
"#,
        )
        .unwrap();

        let config = Config::load_with(Some(path.as_path()), env(&[(ENV_CLIENT_REALM, "partners")])).unwrap();
        assert_eq!(config.realm, "partners");
        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.database.port, 6432);
        assert_eq!(config.database.dbname, "keycloak");
        assert_eq!(config.criteria.days, Some(30));
        assert!(config.output.id && config.output.email && config.output.username);
        assert!(!config.output.created_timestamp);
    }

    #[test]
    fn test_config_path_from_env() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("kc.toml");
        std::fs::write(&path, "realm = \"ops\"\n").unwrap();

        let config = Config::load_with(None, env(&[(ENV_CONFIG, path.to_str().unwrap())])).unwrap();
        assert_eq!(config.realm, "ops");
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let err = Config::load_with(Some(tmp.path().join("nope.toml").as_path()), env(&[])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_malformed_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.toml");
        std::fs::write(&path, "realm = [").unwrap();
        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_save_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");

        let mut config = Config::default();
        config.realm = "staff".to_string();
        config.criteria.date = Some("2023-12-31".to_string());
        config.output.last_name = true;
        config.save(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_conninfo_quoting() {
        let mut db = DatabaseConfig::default();
        assert_eq!(
            db.conninfo(),
            "host=localhost port=5432 dbname=keycloak user=keycloak password=password"
        );

        db.password = "it's a secret".to_string();
        db.dbname = String::new();
        assert_eq!(
            db.conninfo(),
            r"host=localhost port=5432 dbname='' user=keycloak password='it\'s a secret'"
        );
    }

    #[test]
    fn test_debug_masks_password() {
        let db = DatabaseConfig::default();
        let shown = format!("{:?}", db);
        assert!(!shown.contains("password: \"password\""));
        assert!(shown.contains("********"));
    }
}
