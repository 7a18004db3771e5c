// Async client for the IBM Cloud Context-Based Restrictions API.
//
// Base URL: https://cbr.cloud.ibm.com
// Auth: IAM bearer token

use std::sync::Arc;

use reqwest::Method;
use serde::Serialize;

use super::models::{
    AccountSettings, Address, Resource, Rule, RuleContext, RuleList, ServiceRefTargetList, Zone,
    ZoneList,
};
use super::options::{
    CreateRuleOptions, CreateZoneOptions, DeleteRuleOptions, DeleteZoneOptions,
    GetAccountSettingsOptions, GetRuleOptions, GetZoneOptions,
    ListAvailableServicerefTargetsOptions, ListRulesOptions, ListZonesOptions, ReplaceRuleOptions,
    ReplaceZoneOptions,
};
use crate::Error;
use crate::auth::Authenticator;
use crate::request::{IF_MATCH_HEADER, RequestBuilder};
use crate::service::{BaseService, DetailedResponse};
use crate::transport::TransportConfig;

pub const DEFAULT_SERVICE_URL: &str = "https://cbr.cloud.ibm.com";

// ── Request bodies ───────────────────────────────────────────────────

#[derive(Serialize)]
struct ZoneBody<'a> {
    name: Option<&'a str>,
    account_id: Option<&'a str>,
    description: Option<&'a str>,
    addresses: Option<&'a [Address]>,
    excluded: Option<&'a [Address]>,
}

#[derive(Serialize)]
struct RuleBody<'a> {
    description: Option<&'a str>,
    contexts: Option<&'a [RuleContext]>,
    resources: Option<&'a [Resource]>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the Context-Based Restrictions API.
///
/// Zones group network addresses; rules bind zones (contexts) to the cloud
/// resources they may reach. Replace operations need the `ETag` of the
/// current object as `If-Match`.
#[derive(Debug, Clone)]
pub struct CbrClient {
    service: BaseService,
}

impl CbrClient {
    // ── Constructors ─────────────────────────────────────────────────

    pub fn new(
        service_url: &str,
        authenticator: Arc<dyn Authenticator>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        Ok(Self {
            service: BaseService::new(service_url, authenticator, transport)?,
        })
    }

    pub fn from_service(service: BaseService) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &BaseService {
        &self.service
    }

    // ── Zones ────────────────────────────────────────────────────────

    pub async fn create_zone(
        &self,
        opts: &CreateZoneOptions,
    ) -> Result<DetailedResponse<Zone>, Error> {
        let req = RequestBuilder::new(Method::POST, "/v1/zones")
            .call_headers(&opts.headers)
            .json_body(&ZoneBody {
                name: opts.name.as_deref(),
                account_id: opts.account_id.as_deref(),
                description: opts.description.as_deref(),
                addresses: opts.addresses.as_deref(),
                excluded: opts.excluded.as_deref(),
            })?
            .build()?;
        self.service.execute(req).await
    }

    pub async fn list_zones(
        &self,
        opts: &ListZonesOptions,
    ) -> Result<DetailedResponse<ZoneList>, Error> {
        let req = RequestBuilder::new(Method::GET, "/v1/zones")
            .required_query("account_id", &opts.account_id)?
            .query_opt("name", opts.name.as_deref())
            .query_opt("sort", opts.sort.as_deref())
            .call_headers(&opts.headers)
            .build()?;
        self.service.execute(req).await
    }

    pub async fn get_zone(&self, opts: &GetZoneOptions) -> Result<DetailedResponse<Zone>, Error> {
        let req = RequestBuilder::new(Method::GET, "/v1/zones/{zone_id}")
            .path_param("zone_id", &opts.zone_id)?
            .call_headers(&opts.headers)
            .build()?;
        self.service.execute(req).await
    }

    pub async fn replace_zone(
        &self,
        opts: &ReplaceZoneOptions,
    ) -> Result<DetailedResponse<Zone>, Error> {
        let req = RequestBuilder::new(Method::PUT, "/v1/zones/{zone_id}")
            .path_param("zone_id", &opts.zone_id)?
            .required_header(IF_MATCH_HEADER, &opts.if_match)?
            .call_headers(&opts.headers)
            .json_body(&ZoneBody {
                name: opts.name.as_deref(),
                account_id: opts.account_id.as_deref(),
                description: opts.description.as_deref(),
                addresses: opts.addresses.as_deref(),
                excluded: opts.excluded.as_deref(),
            })?
            .build()?;
        self.service.execute(req).await
    }

    pub async fn delete_zone(
        &self,
        opts: &DeleteZoneOptions,
    ) -> Result<DetailedResponse<()>, Error> {
        let req = RequestBuilder::new(Method::DELETE, "/v1/zones/{zone_id}")
            .path_param("zone_id", &opts.zone_id)?
            .call_headers(&opts.headers)
            .build()?;
        self.service.execute_empty(req).await
    }

    pub async fn list_available_serviceref_targets(
        &self,
        opts: &ListAvailableServicerefTargetsOptions,
    ) -> Result<DetailedResponse<ServiceRefTargetList>, Error> {
        let req = RequestBuilder::new(Method::GET, "/v1/zones/serviceref_targets")
            .query_opt("type", opts.target_type.map(|t| t.as_str()))
            .call_headers(&opts.headers)
            .build()?;
        self.service.execute(req).await
    }

    // ── Rules ────────────────────────────────────────────────────────

    pub async fn create_rule(
        &self,
        opts: &CreateRuleOptions,
    ) -> Result<DetailedResponse<Rule>, Error> {
        let req = RequestBuilder::new(Method::POST, "/v1/rules")
            .call_headers(&opts.headers)
            .json_body(&RuleBody {
                description: opts.description.as_deref(),
                contexts: opts.contexts.as_deref(),
                resources: opts.resources.as_deref(),
            })?
            .build()?;
        self.service.execute(req).await
    }

    pub async fn list_rules(
        &self,
        opts: &ListRulesOptions,
    ) -> Result<DetailedResponse<RuleList>, Error> {
        let req = RequestBuilder::new(Method::GET, "/v1/rules")
            .required_query("account_id", &opts.account_id)?
            .query_opt("region", opts.region.as_deref())
            .query_opt("resource", opts.resource.as_deref())
            .query_opt("resource_type", opts.resource_type.as_deref())
            .query_opt("service_instance", opts.service_instance.as_deref())
            .query_opt("service_name", opts.service_name.as_deref())
            .query_opt("service_type", opts.service_type.as_deref())
            .query_opt("zone_id", opts.zone_id.as_deref())
            .query_opt("sort", opts.sort.as_deref())
            .call_headers(&opts.headers)
            .build()?;
        self.service.execute(req).await
    }

    pub async fn get_rule(&self, opts: &GetRuleOptions) -> Result<DetailedResponse<Rule>, Error> {
        let req = RequestBuilder::new(Method::GET, "/v1/rules/{rule_id}")
            .path_param("rule_id", &opts.rule_id)?
            .call_headers(&opts.headers)
            .build()?;
        self.service.execute(req).await
    }

    pub async fn replace_rule(
        &self,
        opts: &ReplaceRuleOptions,
    ) -> Result<DetailedResponse<Rule>, Error> {
        let req = RequestBuilder::new(Method::PUT, "/v1/rules/{rule_id}")
            .path_param("rule_id", &opts.rule_id)?
            .required_header(IF_MATCH_HEADER, &opts.if_match)?
            .call_headers(&opts.headers)
            .json_body(&RuleBody {
                description: opts.description.as_deref(),
                contexts: opts.contexts.as_deref(),
                resources: opts.resources.as_deref(),
            })?
            .build()?;
        self.service.execute(req).await
    }

    pub async fn delete_rule(
        &self,
        opts: &DeleteRuleOptions,
    ) -> Result<DetailedResponse<()>, Error> {
        let req = RequestBuilder::new(Method::DELETE, "/v1/rules/{rule_id}")
            .path_param("rule_id", &opts.rule_id)?
            .call_headers(&opts.headers)
            .build()?;
        self.service.execute_empty(req).await
    }

    // ── Account settings ─────────────────────────────────────────────

    pub async fn get_account_settings(
        &self,
        opts: &GetAccountSettingsOptions,
    ) -> Result<DetailedResponse<AccountSettings>, Error> {
        let req = RequestBuilder::new(Method::GET, "/v1/account_settings/{account_id}")
            .path_param("account_id", &opts.account_id)?
            .call_headers(&opts.headers)
            .build()?;
        self.service.execute(req).await
    }
}
