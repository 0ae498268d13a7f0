use crate::error::{OrgError, Result};
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "config.json";
pub const DEFAULT_API_VERSION: &str = "59.0";

pub const ENV_CONFIG_DIR: &str = "ORGCTL_CONFIG_DIR";
pub const ENV_INSTANCE_URL: &str = "ORGCTL_INSTANCE_URL";
pub const ENV_ACCESS_TOKEN: &str = "ORGCTL_ACCESS_TOKEN";
pub const ENV_API_VERSION: &str = "ORGCTL_API_VERSION";

/// A saved org login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrgEntry {
    pub instance_url: String,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default = "Utc::now")]
    pub added_at: DateTime<Utc>,
}

/// Configuration for orgctl, stored in `<config dir>/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrgConfig {
    /// Alias used when no `--target-org` is given
    #[serde(default)]
    pub default_org: Option<String>,

    /// API version for orgs that don't pin their own
    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default)]
    pub orgs: BTreeMap<String, OrgEntry>,
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

impl Default for OrgConfig {
    fn default() -> Self {
        Self {
            default_org: None,
            api_version: default_api_version(),
            orgs: BTreeMap::new(),
        }
    }
}

/// Everything needed to open a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// `None` when the credentials came from the environment
    pub alias: Option<String>,
    pub instance_url: String,
    pub access_token: String,
    pub api_version: String,
}

/// Connection settings taken from `ORGCTL_*` environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub instance_url: Option<String>,
    pub access_token: Option<String>,
    pub api_version: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        let read = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        Self {
            instance_url: read(ENV_INSTANCE_URL),
            access_token: read(ENV_ACCESS_TOKEN),
            api_version: read(ENV_API_VERSION),
        }
    }
}

/// Directory holding `config.json`: `$ORGCTL_CONFIG_DIR`, else the platform config dir.
pub fn config_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(ENV_CONFIG_DIR) {
        return Ok(PathBuf::from(dir));
    }
    ProjectDirs::from("com", "orgctl", "orgctl")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| OrgError::Config("could not determine a config directory".to_string()))
}

impl OrgConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: OrgConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, content)?;
        Ok(())
    }

    /// Pick credentials: an explicit alias wins, then a complete environment
    /// pair (instance URL + token), then the default org.
    pub fn credentials(&self, alias: Option<&str>, env: &EnvOverrides) -> Result<Credentials> {
        if alias.is_none() {
            if let (Some(url), Some(token)) = (&env.instance_url, &env.access_token) {
                return Ok(Credentials {
                    alias: None,
                    instance_url: url.clone(),
                    access_token: token.clone(),
                    api_version: env
                        .api_version
                        .clone()
                        .unwrap_or_else(|| self.api_version.clone()),
                });
            }
        }

        let alias = alias.or(self.default_org.as_deref()).ok_or_else(|| {
            OrgError::Config(format!(
                "no target org: pass --target-org, set a default with `orgctl org add --set-default`, or export {} and {}",
                ENV_INSTANCE_URL, ENV_ACCESS_TOKEN
            ))
        })?;
        let entry = self
            .orgs
            .get(alias)
            .ok_or_else(|| OrgError::Config(format!("unknown org alias '{}'", alias)))?;

        Ok(Credentials {
            alias: Some(alias.to_string()),
            instance_url: entry.instance_url.clone(),
            access_token: entry.access_token.clone(),
            api_version: env
                .api_version
                .clone()
                .or_else(|| entry.api_version.clone())
                .unwrap_or_else(|| self.api_version.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(url: &str) -> OrgEntry {
        OrgEntry {
            instance_url: url.to_string(),
            access_token: "00Dtoken".to_string(),
            api_version: None,
            added_at: Utc::now(),
        }
    }

    fn config_with_dev() -> OrgConfig {
        let mut config = OrgConfig::default();
        config.orgs.insert("dev".into(), entry("https://dev.my.salesforce.com"));
        config.default_org = Some("dev".into());
        config
    }

    #[test]
    fn test_default_config() {
        let config = OrgConfig::default();
        assert_eq!(config.api_version, "59.0");
        assert!(config.orgs.is_empty());
    }

    #[test]
    fn test_load_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = OrgConfig::load(dir.path().join("nothing-here")).unwrap();
        assert_eq!(config, OrgConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let config = config_with_dev();

        config.save(&nested).unwrap();
        let loaded = OrgConfig::load(&nested).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_gets_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), r#"{"default_org": "x"}"#).unwrap();
        let loaded = OrgConfig::load(dir.path()).unwrap();
        assert_eq!(loaded.api_version, "59.0");
        assert_eq!(loaded.default_org.as_deref(), Some("x"));
    }

    #[test]
    fn default_org_is_used_without_alias() {
        let creds = config_with_dev()
            .credentials(None, &EnvOverrides::default())
            .unwrap();
        assert_eq!(creds.alias.as_deref(), Some("dev"));
        assert_eq!(creds.instance_url, "https://dev.my.salesforce.com");
        assert_eq!(creds.api_version, "59.0");
    }

    #[test]
    fn env_pair_beats_default_org() {
        let env = EnvOverrides {
            instance_url: Some("https://env.my.salesforce.com".into()),
            access_token: Some("envtoken".into()),
            api_version: Some("61.0".into()),
        };
        let creds = config_with_dev().credentials(None, &env).unwrap();
        assert_eq!(creds.alias, None);
        assert_eq!(creds.access_token, "envtoken");
        assert_eq!(creds.api_version, "61.0");
    }

    #[test]
    fn explicit_alias_beats_env() {
        let mut config = config_with_dev();
        let mut prod = entry("https://prod.my.salesforce.com");
        prod.api_version = Some("60.0".into());
        config.orgs.insert("prod".into(), prod);
        let env = EnvOverrides {
            instance_url: Some("https://env.my.salesforce.com".into()),
            access_token: Some("envtoken".into()),
            api_version: None,
        };

        let creds = config.credentials(Some("prod"), &env).unwrap();

        assert_eq!(creds.instance_url, "https://prod.my.salesforce.com");
        assert_eq!(creds.api_version, "60.0");
    }

    #[test]
    fn half_an_env_pair_is_ignored() {
        let env = EnvOverrides {
            instance_url: Some("https://env.my.salesforce.com".into()),
            ..Default::default()
        };
        let creds = config_with_dev().credentials(None, &env).unwrap();
        assert_eq!(creds.alias.as_deref(), Some("dev"));
    }

    #[test]
    fn missing_target_is_config_error() {
        let err = OrgConfig::default()
            .credentials(None, &EnvOverrides::default())
            .unwrap_err();
        assert!(matches!(err, OrgError::Config(_)));

        let err = config_with_dev()
            .credentials(Some("nope"), &EnvOverrides::default())
            .unwrap_err();
        assert!(err.to_string().contains("unknown org alias 'nope'"));
    }
}
