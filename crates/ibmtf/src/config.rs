//! CLI configuration: a thin wrapper around `ibmtf_config`.
//!
//! Adds resolution that respects `GlobalOpts` overrides (--profile,
//! --region, --api-key, --timeout).

use std::time::Duration;

use secrecy::SecretString;

use ibmtf_core::ProviderConfig;
use ibmtf_core::config::DEFAULT_REGION;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use ibmtf_config::{
    Config, Profile, config_path, load_config_or_default, save_config, store_api_key,
};

/// Provider settings plus the account CBR list commands default to.
pub struct Resolved {
    pub provider: ProviderConfig,
    pub account_id: Option<String>,
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Names of all configured profiles, sorted, for error help.
pub fn available_profiles(config: &Config) -> String {
    let mut names: Vec<_> = config.profiles.keys().cloned().collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort();
    names.join(", ")
}

/// Build a `ProviderConfig` from the config file, profile, and CLI overrides.
///
/// Without a matching profile the flags and the standard IBM Cloud
/// variables alone must supply credentials; an explicit `--profile` that
/// doesn't exist is an error.
pub fn resolve(global: &GlobalOpts) -> Result<Resolved, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let fallback;
    let profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile,
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(&cfg),
            });
        }
        None => {
            fallback = Profile {
                region: DEFAULT_REGION.into(),
                ..Profile::default()
            };
            &fallback
        }
    };

    // Flag > profile credential chain
    let mut provider = match global.api_key {
        Some(ref key) => ibmtf_config::profile_to_provider_config_with_key(
            profile,
            &cfg.defaults,
            SecretString::from(key.clone()),
        )?,
        None => ibmtf_config::profile_to_provider_config(profile, &profile_name, &cfg.defaults)?,
    };

    if let Some(ref region) = global.region {
        provider.region.clone_from(region);
    }
    if let Some(secs) = global.timeout {
        provider.timeout = Duration::from_secs(secs);
    }
    provider.user_agent = Some(format!("ibmtf/{}", env!("CARGO_PKG_VERSION")));

    Ok(Resolved {
        provider,
        account_id: profile.account_id.clone(),
    })
}
