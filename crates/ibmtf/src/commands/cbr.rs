//! Context-Based Restrictions browse handlers.
//!
//! Talks to the CBR client directly; these objects are listed and shown,
//! never staged as provider state.

use tabled::Tabled;

use ibmtf_api::cbr::{
    AccountSettings, Address, GetAccountSettingsOptions, GetRuleOptions, GetZoneOptions,
    ListAvailableServicerefTargetsOptions, ListRulesOptions, ListZonesOptions, Rule,
    ServiceRefTarget, ServiceRefTargetType, Zone, ZoneSummary,
};
use ibmtf_core::CoreError;

use crate::cli::{AccountArgs, CbrArgs, CbrCommand, CbrRulesCommand, CbrZonesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::Connection;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct ZoneRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Addresses")]
    addresses: i64,
    #[tabled(rename = "Excluded")]
    excluded: i64,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&ZoneSummary> for ZoneRow {
    fn from(z: &ZoneSummary) -> Self {
        Self {
            id: z.id.clone(),
            name: z.name.clone(),
            addresses: z.address_count,
            excluded: z.excluded_count,
            description: z.description.clone().unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct RuleRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Services")]
    services: String,
    #[tabled(rename = "Contexts")]
    contexts: usize,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&Rule> for RuleRow {
    fn from(r: &Rule) -> Self {
        Self {
            id: r.id.clone(),
            services: rule_services(r),
            contexts: r.contexts.len(),
            description: r.description.clone(),
        }
    }
}

#[derive(Tabled)]
struct TargetRow {
    #[tabled(rename = "Service")]
    service: String,
    #[tabled(rename = "Type")]
    service_type: String,
}

impl From<&ServiceRefTarget> for TargetRow {
    fn from(t: &ServiceRefTarget) -> Self {
        Self {
            service: t.service_name.clone(),
            service_type: t.service_type.clone().unwrap_or_default(),
        }
    }
}

// ── Formatting ──────────────────────────────────────────────────────

fn address_text(address: &Address) -> String {
    match address {
        Address::ServiceRef { service_ref } => format!(
            "{}:{}",
            address.kind(),
            service_ref.service_name.as_deref().unwrap_or("-")
        ),
        other => format!("{}:{}", other.kind(), other.value().unwrap_or_default()),
    }
}

fn address_list(addresses: &[Address]) -> String {
    if addresses.is_empty() {
        return "-".into();
    }
    addresses.iter().map(address_text).collect::<Vec<_>>().join(", ")
}

/// `serviceName` attribute of every protected resource.
fn rule_services(rule: &Rule) -> String {
    let names: Vec<_> = rule
        .resources
        .iter()
        .flat_map(|r| r.attributes.iter())
        .filter(|a| a.name == "serviceName")
        .map(|a| a.value.as_str())
        .collect();
    if names.is_empty() {
        "-".into()
    } else {
        names.join(", ")
    }
}

fn zone_detail(z: &Zone, color: bool) -> String {
    output::detail_lines(
        &[
            ("ID", z.id.clone()),
            ("Name", z.name.clone()),
            ("CRN", z.crn.clone()),
            ("Account", z.account_id.clone()),
            ("Description", z.description.clone()),
            ("Addresses", address_list(&z.addresses)),
            ("Excluded", address_list(&z.excluded)),
            ("Created", format!("{} by {}", z.created_at, z.created_by_id)),
            (
                "Modified",
                format!("{} by {}", z.last_modified_at, z.last_modified_by_id),
            ),
        ],
        color,
    )
}

fn rule_detail(r: &Rule, color: bool) -> String {
    let contexts = r
        .contexts
        .iter()
        .map(|c| {
            c.attributes
                .iter()
                .map(|a| format!("{}={}", a.name, a.value))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("; ");
    output::detail_lines(
        &[
            ("ID", r.id.clone()),
            ("CRN", r.crn.clone()),
            ("Description", r.description.clone()),
            ("Services", rule_services(r)),
            ("Contexts", contexts),
            ("Created", format!("{} by {}", r.created_at, r.created_by_id)),
            (
                "Modified",
                format!("{} by {}", r.last_modified_at, r.last_modified_by_id),
            ),
        ],
        color,
    )
}

fn settings_detail(s: &AccountSettings, color: bool) -> String {
    output::detail_lines(
        &[
            ("Account", s.id.clone()),
            ("CRN", s.crn.clone()),
            (
                "Rules",
                format!("{} of {}", s.current_rule_count, s.rule_count_limit),
            ),
            (
                "Zones",
                format!("{} of {}", s.current_zone_count, s.zone_count_limit),
            ),
            ("Modified", s.last_modified_at.clone()),
        ],
        color,
    )
}

// ── Helpers ─────────────────────────────────────────────────────────

/// `--account-id` or the profile's `account_id`.
fn account_id(args: AccountArgs, conn: &Connection) -> Result<String, CliError> {
    args.account_id
        .or_else(|| conn.account_id.clone())
        .ok_or_else(|| CliError::Validation {
            field: "account-id".into(),
            reason: "pass --account-id or set account_id in the profile".into(),
        })
}

fn failed(context: &'static str) -> impl Fn(ibmtf_api::Error) -> CoreError {
    move |e| CoreError::api_context(context, e)
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub async fn handle(args: CbrArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let conn = super::connect(global)?;
    let cbr = conn.session.cbr();
    let color = output::should_color(&global.color);

    let out = match args.command {
        CbrCommand::Zones { command } => match command {
            CbrZonesCommand::List {
                account,
                name,
                sort,
            } => {
                let opts = ListZonesOptions {
                    name,
                    sort,
                    ..ListZonesOptions::new(account_id(account, &conn)?)
                };
                let list = cbr
                    .list_zones(&opts)
                    .await
                    .map_err(failed("ListZones failed"))?
                    .into_result();
                output::render_list(&global.output, &list.zones, |x| ZoneRow::from(x), |z| {
                    z.id.clone()
                })?
            }
            CbrZonesCommand::Get { id } => {
                let zone = cbr
                    .get_zone(&GetZoneOptions::new(id))
                    .await
                    .map_err(failed("GetZone failed"))?
                    .into_result();
                output::render_single(&global.output, &zone, |z| zone_detail(z, color), |z| {
                    z.id.clone()
                })?
            }
        },

        CbrCommand::Rules { command } => match command {
            CbrRulesCommand::List {
                account,
                service_name,
                zone_id,
            } => {
                let opts = ListRulesOptions {
                    service_name,
                    zone_id,
                    ..ListRulesOptions::new(account_id(account, &conn)?)
                };
                let list = cbr
                    .list_rules(&opts)
                    .await
                    .map_err(failed("ListRules failed"))?
                    .into_result();
                output::render_list(&global.output, &list.rules, |x| RuleRow::from(x), |r| {
                    r.id.clone()
                })?
            }
            CbrRulesCommand::Get { id } => {
                let rule = cbr
                    .get_rule(&GetRuleOptions::new(id))
                    .await
                    .map_err(failed("GetRule failed"))?
                    .into_result();
                output::render_single(&global.output, &rule, |r| rule_detail(r, color), |r| {
                    r.id.clone()
                })?
            }
        },

        CbrCommand::Targets { platform } => {
            let opts = ListAvailableServicerefTargetsOptions {
                target_type: platform.then_some(ServiceRefTargetType::PlatformService),
                ..ListAvailableServicerefTargetsOptions::default()
            };
            let list = cbr
                .list_available_serviceref_targets(&opts)
                .await
                .map_err(failed("ListAvailableServicerefTargets failed"))?
                .into_result();
            output::render_list(&global.output, &list.targets, |x| TargetRow::from(x), |t| {
                t.service_name.clone()
            })?
        }

        CbrCommand::Settings { account } => {
            let opts = GetAccountSettingsOptions::new(account_id(account, &conn)?);
            let settings = cbr
                .get_account_settings(&opts)
                .await
                .map_err(failed("GetAccountSettings failed"))?
                .into_result();
            output::render_single(
                &global.output,
                &settings,
                |s| settings_detail(s, color),
                |s| s.id.clone(),
            )?
        }
    };

    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use ibmtf_api::cbr::ServiceRefValue;

    use super::*;

    #[test]
    fn addresses_render_by_kind() {
        let addresses = vec![
            Address::IpAddress {
                value: "169.23.56.234".into(),
            },
            Address::ServiceRef {
                service_ref: ServiceRefValue {
                    account_id: "acct".into(),
                    service_name: Some("cloud-object-storage".into()),
                    ..ServiceRefValue::default()
                },
            },
        ];
        assert_eq!(
            address_list(&addresses),
            "ipAddress:169.23.56.234, serviceRef:cloud-object-storage"
        );
        assert_eq!(address_list(&[]), "-");
    }
}
