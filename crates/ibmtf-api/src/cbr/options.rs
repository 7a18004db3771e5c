// Per-operation inputs for the Context-Based Restrictions client.
//
// Required inputs are plain fields set by `new`; optional ones are `Option`
// and left `None` unless the caller sets them. Every struct carries
// `CallHeaders` for tracing IDs and caller-supplied overrides.

use std::fmt;

use super::models::{Address, Resource, RuleContext};
use crate::request::CallHeaders;

// ── Zones ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct CreateZoneOptions {
    pub name: Option<String>,
    pub account_id: Option<String>,
    pub description: Option<String>,
    pub addresses: Option<Vec<Address>>,
    pub excluded: Option<Vec<Address>>,
    pub headers: CallHeaders,
}

#[derive(Debug, Clone, Default)]
pub struct ListZonesOptions {
    pub account_id: String,
    pub name: Option<String>,
    pub sort: Option<String>,
    pub headers: CallHeaders,
}

impl ListZonesOptions {
    pub fn new(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GetZoneOptions {
    pub zone_id: String,
    pub headers: CallHeaders,
}

impl GetZoneOptions {
    pub fn new(zone_id: impl Into<String>) -> Self {
        Self {
            zone_id: zone_id.into(),
            headers: CallHeaders::default(),
        }
    }
}

/// Full replacement of a zone. Every field the zone should keep must be set.
#[derive(Debug, Clone, Default)]
pub struct ReplaceZoneOptions {
    pub zone_id: String,
    /// `ETag` from a prior read.
    pub if_match: String,
    pub name: Option<String>,
    pub account_id: Option<String>,
    pub description: Option<String>,
    pub addresses: Option<Vec<Address>>,
    pub excluded: Option<Vec<Address>>,
    pub headers: CallHeaders,
}

impl ReplaceZoneOptions {
    pub fn new(zone_id: impl Into<String>, if_match: impl Into<String>) -> Self {
        Self {
            zone_id: zone_id.into(),
            if_match: if_match.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeleteZoneOptions {
    pub zone_id: String,
    pub headers: CallHeaders,
}

impl DeleteZoneOptions {
    pub fn new(zone_id: impl Into<String>) -> Self {
        Self {
            zone_id: zone_id.into(),
            headers: CallHeaders::default(),
        }
    }
}

/// Filter for the serviceRef target listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceRefTargetType {
    All,
    PlatformService,
}

impl ServiceRefTargetType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::PlatformService => "platform_service",
        }
    }
}

impl fmt::Display for ServiceRefTargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListAvailableServicerefTargetsOptions {
    pub target_type: Option<ServiceRefTargetType>,
    pub headers: CallHeaders,
}

// ── Rules ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct CreateRuleOptions {
    pub description: Option<String>,
    pub contexts: Option<Vec<RuleContext>>,
    pub resources: Option<Vec<Resource>>,
    pub headers: CallHeaders,
}

#[derive(Debug, Clone, Default)]
pub struct ListRulesOptions {
    pub account_id: String,
    pub region: Option<String>,
    pub resource: Option<String>,
    pub resource_type: Option<String>,
    pub service_instance: Option<String>,
    pub service_name: Option<String>,
    pub service_type: Option<String>,
    pub zone_id: Option<String>,
    pub sort: Option<String>,
    pub headers: CallHeaders,
}

impl ListRulesOptions {
    pub fn new(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GetRuleOptions {
    pub rule_id: String,
    pub headers: CallHeaders,
}

impl GetRuleOptions {
    pub fn new(rule_id: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.into(),
            headers: CallHeaders::default(),
        }
    }
}

/// Full replacement of a rule.
#[derive(Debug, Clone, Default)]
pub struct ReplaceRuleOptions {
    pub rule_id: String,
    pub if_match: String,
    pub description: Option<String>,
    pub contexts: Option<Vec<RuleContext>>,
    pub resources: Option<Vec<Resource>>,
    pub headers: CallHeaders,
}

impl ReplaceRuleOptions {
    pub fn new(rule_id: impl Into<String>, if_match: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.into(),
            if_match: if_match.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeleteRuleOptions {
    pub rule_id: String,
    pub headers: CallHeaders,
}

impl DeleteRuleOptions {
    pub fn new(rule_id: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.into(),
            headers: CallHeaders::default(),
        }
    }
}

// ── Account settings ────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct GetAccountSettingsOptions {
    pub account_id: String,
    pub headers: CallHeaders,
}

impl GetAccountSettingsOptions {
    pub fn new(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            headers: CallHeaders::default(),
        }
    }
}
