// Async client for the IBM Cloud VPC infrastructure API (instance subset).
//
// Base URL: https://{region}.iaas.cloud.ibm.com/v1
// Every call carries `version` and `generation=2` query parameters.

use std::sync::Arc;

use reqwest::Method;

use super::models::{
    Instance, InstanceCollection, NetworkInterface, NetworkInterfaceUnpaginatedCollection,
};
use crate::Error;
use crate::auth::Authenticator;
use crate::pagination::collect_all;
use crate::request::{CallHeaders, RequestBuilder};
use crate::service::{BaseService, DetailedResponse};
use crate::transport::TransportConfig;

/// API version date sent as `version` on every call.
pub const DEFAULT_VERSION: &str = "2024-04-30";

const GENERATION: u8 = 2;

/// Regional endpoint for the VPC API.
pub fn regional_url(region: &str) -> String {
    format!("https://{region}.iaas.cloud.ibm.com/v1")
}

// ── Options ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct ListInstancesOptions {
    /// Cursor from the previous page's `next` link.
    pub start: Option<String>,
    pub limit: Option<u32>,
    pub name: Option<String>,
    pub headers: CallHeaders,
}

#[derive(Debug, Clone, Default)]
pub struct GetInstanceOptions {
    pub id: String,
    pub headers: CallHeaders,
}

#[derive(Debug, Clone, Default)]
pub struct ListInstanceNetworkInterfacesOptions {
    pub instance_id: String,
    pub headers: CallHeaders,
}

impl ListInstanceNetworkInterfacesOptions {
    pub fn new(instance_id: impl Into<String>) -> Self {
        Self {
            instance_id: instance_id.into(),
            headers: CallHeaders::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GetInstanceNetworkInterfaceOptions {
    pub instance_id: String,
    pub id: String,
    pub headers: CallHeaders,
}

// ── Client ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct VpcClient {
    service: BaseService,
    version: String,
}

impl VpcClient {
    pub fn new(
        service_url: &str,
        authenticator: Arc<dyn Authenticator>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        Ok(Self::from_service(BaseService::new(
            service_url,
            authenticator,
            transport,
        )?))
    }

    pub fn from_service(service: BaseService) -> Self {
        Self {
            service,
            version: DEFAULT_VERSION.to_owned(),
        }
    }

    /// Pin a different API version date.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    fn request(&self, method: Method, template: &'static str) -> RequestBuilder {
        RequestBuilder::new(method, template)
            .query("version", &self.version)
            .query("generation", GENERATION)
    }

    // ── Instances ────────────────────────────────────────────────────

    pub async fn list_instances(
        &self,
        opts: &ListInstancesOptions,
    ) -> Result<DetailedResponse<InstanceCollection>, Error> {
        let req = self
            .request(Method::GET, "/instances")
            .query_opt("start", opts.start.as_deref())
            .query_opt("limit", opts.limit)
            .query_opt("name", opts.name.as_deref())
            .call_headers(&opts.headers)
            .build()?;
        self.service.execute(req).await
    }

    /// Follow `next` cursors until every instance has been fetched.
    ///
    /// Page size and filters come from `opts`; its `start` is ignored.
    pub async fn list_all_instances(
        &self,
        opts: &ListInstancesOptions,
    ) -> Result<Vec<Instance>, Error> {
        collect_all(|start| {
            let page_opts = ListInstancesOptions {
                start,
                ..opts.clone()
            };
            async move {
                self.list_instances(&page_opts)
                    .await
                    .map(DetailedResponse::into_result)
            }
        })
        .await
    }

    pub async fn get_instance(
        &self,
        opts: &GetInstanceOptions,
    ) -> Result<DetailedResponse<Instance>, Error> {
        let req = self
            .request(Method::GET, "/instances/{id}")
            .path_param("id", &opts.id)?
            .call_headers(&opts.headers)
            .build()?;
        self.service.execute(req).await
    }

    // ── Network interfaces ───────────────────────────────────────────

    pub async fn list_instance_network_interfaces(
        &self,
        opts: &ListInstanceNetworkInterfacesOptions,
    ) -> Result<DetailedResponse<NetworkInterfaceUnpaginatedCollection>, Error> {
        let req = self
            .request(Method::GET, "/instances/{instance_id}/network_interfaces")
            .path_param("instance_id", &opts.instance_id)?
            .call_headers(&opts.headers)
            .build()?;
        self.service.execute(req).await
    }

    pub async fn get_instance_network_interface(
        &self,
        opts: &GetInstanceNetworkInterfaceOptions,
    ) -> Result<DetailedResponse<NetworkInterface>, Error> {
        let req = self
            .request(Method::GET, "/instances/{instance_id}/network_interfaces/{id}")
            .path_param("instance_id", &opts.instance_id)?
            .path_param("id", &opts.id)?
            .call_headers(&opts.headers)
            .build()?;
        self.service.execute(req).await
    }
}
