//! Shared configuration for the ibmtf CLI.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `ibmtf_core::ProviderConfig`. The CLI layers its
//! global flags on top of what this crate resolves.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use ibmtf_core::config::{DEFAULT_CONSOLE_URL, DEFAULT_REGION};
use ibmtf_core::{Credentials, ProviderConfig};

/// Keyring service name; entries are keyed `<profile>/api-key`.
pub const KEYRING_SERVICE: &str = "ibmtf";

/// Variables the IBM Cloud CLI and Terraform provider already honour.
const STANDARD_API_KEY_VARS: [&str; 2] = ["IC_API_KEY", "IBMCLOUD_API_KEY"];

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named account profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Request timeout, seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Retries for throttled or failed-over requests. 0 disables them.
    #[serde(default)]
    pub max_retries: u32,

    /// Upper bound on the backoff between retries, seconds.
    #[serde(default = "default_max_retry_interval")]
    pub max_retry_interval: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            max_retries: 0,
            max_retry_interval: default_max_retry_interval(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    60
}
fn default_max_retry_interval() -> u64 {
    30
}

/// A named IBM Cloud account profile.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    #[serde(default = "default_region")]
    pub region: String,

    /// Account used by CBR list commands.
    pub account_id: Option<String>,

    /// API key (plaintext; prefer keyring or env var).
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,

    /// IAM token endpoint override.
    pub iam_url: Option<String>,

    pub cbr_endpoint: Option<String>,
    pub vpc_endpoint: Option<String>,
    pub schematics_endpoint: Option<String>,

    /// Console base URL for dashboard links.
    pub console_url: Option<String>,

    /// Override the default timeout.
    pub timeout: Option<u64>,
}

fn default_region() -> String {
    DEFAULT_REGION.into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "ibmtf", "ibmtf").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("ibmtf");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file. A missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("IBMTF_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if it can't be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Resolve an API key from the credential chain (no CLI flag step).
pub fn resolve_api_key(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    resolve_api_key_with(profile, profile_name, &|name| std::env::var(name).ok())
}

fn resolve_api_key_with(
    profile: &Profile,
    profile_name: &str,
    env: &dyn Fn(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    // 1. Profile's api_key_env → env var lookup
    if let Some(ref env_name) = profile.api_key_env {
        if let Some(val) = env(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &keyring_user(profile_name)) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Standard IBM Cloud variables
    if let Some(val) = STANDARD_API_KEY_VARS
        .iter()
        .filter_map(|name| env(name))
        .find(|v| !v.is_empty())
    {
        return Ok(SecretString::from(val));
    }

    // 4. Plaintext in config
    if let Some(ref key) = profile.api_key {
        return Ok(SecretString::from(key.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store an API key in the system keyring for `profile_name`.
pub fn store_api_key(profile_name: &str, api_key: &str) -> Result<(), ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, &keyring_user(profile_name))
        .and_then(|entry| entry.set_password(api_key))
        .map_err(|e| ConfigError::Validation {
            field: "keyring".into(),
            reason: e.to_string(),
        })
}

fn keyring_user(profile_name: &str) -> String {
    format!("{profile_name}/api-key")
}

// ── Translation ─────────────────────────────────────────────────────

fn check_url(field: &str, value: Option<&String>) -> Result<(), ConfigError> {
    if let Some(raw) = value {
        url::Url::parse(raw).map_err(|e| ConfigError::Validation {
            field: field.into(),
            reason: format!("invalid URL {raw}: {e}"),
        })?;
    }
    Ok(())
}

/// Build a `ProviderConfig` from a profile, with no CLI flag overrides.
///
/// Endpoint URLs are validated before credentials are looked up.
pub fn profile_to_provider_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ProviderConfig, ConfigError> {
    provider_config_with(profile, profile_name, defaults, &|name| std::env::var(name).ok())
}

fn provider_config_with(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
    env: &dyn Fn(&str) -> Option<String>,
) -> Result<ProviderConfig, ConfigError> {
    validate_profile(profile)?;
    let api_key = resolve_api_key_with(profile, profile_name, env)?;
    profile_to_provider_config_with_key(profile, defaults, api_key)
}

/// Build a `ProviderConfig` with an already-resolved API key (e.g. from a flag).
pub fn profile_to_provider_config_with_key(
    profile: &Profile,
    defaults: &Defaults,
    api_key: SecretString,
) -> Result<ProviderConfig, ConfigError> {
    validate_profile(profile)?;

    Ok(ProviderConfig {
        credentials: Credentials::ApiKey(api_key),
        region: profile.region.clone(),
        iam_url: profile.iam_url.clone(),
        cbr_endpoint: profile.cbr_endpoint.clone(),
        vpc_endpoint: profile.vpc_endpoint.clone(),
        schematics_endpoint: profile.schematics_endpoint.clone(),
        console_url: profile
            .console_url
            .clone()
            .unwrap_or_else(|| DEFAULT_CONSOLE_URL.into()),
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
        max_retries: defaults.max_retries,
        max_retry_interval: Duration::from_secs(defaults.max_retry_interval),
        user_agent: None,
    })
}

fn validate_profile(profile: &Profile) -> Result<(), ConfigError> {
    check_url("iam_url", profile.iam_url.as_ref())?;
    check_url("cbr_endpoint", profile.cbr_endpoint.as_ref())?;
    check_url("vpc_endpoint", profile.vpc_endpoint.as_ref())?;
    check_url("schematics_endpoint", profile.schematics_endpoint.as_ref())?;
    check_url("console_url", profile.console_url.as_ref())?;

    if profile.region.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "region".into(),
            reason: "must not be empty".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    const SAMPLE: &str = r#"
default_profile = "prod"

[defaults]
output = "json"
max_retries = 3

[profiles.prod]
region = "eu-de"
account_id = "12ab34cd"
api_key_env = "IBMTF_TEST_PROD_KEY"
cbr_endpoint = "https://private.cbr.cloud.ibm.com"
timeout = 15
"#;

    fn write_sample(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        path
    }

    #[test]
    fn loads_profiles_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&write_sample(&dir)).unwrap();

        assert_eq!(config.default_profile.as_deref(), Some("prod"));
        assert_eq!(config.defaults.output, "json");
        assert_eq!(config.defaults.max_retries, 3);
        assert_eq!(config.defaults.max_retry_interval, 30);

        let prod = &config.profiles["prod"];
        assert_eq!(prod.region, "eu-de");
        assert_eq!(prod.account_id.as_deref(), Some("12ab34cd"));
        assert_eq!(prod.timeout, Some(15));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.default_profile.as_deref(), Some("default"));
        assert!(config.profiles.is_empty());
        assert_eq!(config.defaults.timeout, 60);
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.profiles.insert(
            "dev".into(),
            Profile {
                region: "us-east".into(),
                api_key_env: Some("DEV_KEY".into()),
                ..Profile::default()
            },
        );
        save_config_to(&config, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.profiles["dev"].region, "us-east");
        assert_eq!(loaded.profiles["dev"].api_key_env.as_deref(), Some("DEV_KEY"));
    }

    fn fake_env(name: &str) -> Option<String> {
        match name {
            "IBMTF_TEST_PROD_KEY" => Some("prod-key".into()),
            "IBMCLOUD_API_KEY" => Some("standard-key".into()),
            _ => None,
        }
    }

    #[test]
    fn api_key_env_wins() {
        let profile = Profile {
            region: "us-south".into(),
            api_key: Some("from-file".into()),
            api_key_env: Some("IBMTF_TEST_PROD_KEY".into()),
            ..Profile::default()
        };

        let key = resolve_api_key_with(&profile, "default", &fake_env).unwrap();
        assert_eq!(key.expose_secret(), "prod-key");
    }

    #[test]
    fn standard_variable_beats_plaintext() {
        let profile = Profile {
            region: "us-south".into(),
            api_key: Some("from-file".into()),
            api_key_env: Some("UNSET_VARIABLE".into()),
            ..Profile::default()
        };

        let key = resolve_api_key_with(&profile, "ibmtf-test-no-such-profile", &fake_env).unwrap();
        assert_eq!(key.expose_secret(), "standard-key");
    }

    #[test]
    fn provider_config_from_profile() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&write_sample(&dir)).unwrap();

        let provider =
            provider_config_with(&config.profiles["prod"], "prod", &config.defaults, &fake_env)
                .unwrap();

        assert_eq!(provider.region, "eu-de");
        assert_eq!(
            provider.cbr_endpoint.as_deref(),
            Some("https://private.cbr.cloud.ibm.com")
        );
        assert_eq!(provider.console_url, DEFAULT_CONSOLE_URL);
        assert_eq!(provider.timeout, Duration::from_secs(15));
        assert_eq!(provider.max_retries, 3);
        assert!(matches!(provider.credentials, Credentials::ApiKey(_)));
    }

    #[test]
    fn bad_endpoint_is_rejected() {
        let profile = Profile {
            region: "us-south".into(),
            vpc_endpoint: Some("not a url".into()),
            ..Profile::default()
        };
        let err = profile_to_provider_config(&profile, "default", &Defaults::default())
            .unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation { ref field, .. } if field == "vpc_endpoint")
        );
    }
}
