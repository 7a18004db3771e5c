// Async client for the IBM Cloud Schematics API (workspace state subset).
//
// Base URL: https://schematics.cloud.ibm.com

use std::sync::Arc;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Error;
use crate::auth::Authenticator;
use crate::request::{CallHeaders, RequestBuilder};
use crate::service::{BaseService, DetailedResponse};
use crate::transport::TransportConfig;

pub const DEFAULT_SERVICE_URL: &str = "https://schematics.cloud.ibm.com";

// ── Options ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct GetWorkspaceTemplateStateOptions {
    pub w_id: String,
    pub t_id: String,
    pub headers: CallHeaders,
}

impl GetWorkspaceTemplateStateOptions {
    pub fn new(w_id: impl Into<String>, t_id: impl Into<String>) -> Self {
        Self {
            w_id: w_id.into(),
            t_id: t_id.into(),
            headers: CallHeaders::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GetWorkspaceOptions {
    pub w_id: String,
    pub headers: CallHeaders,
}

impl GetWorkspaceOptions {
    pub fn new(w_id: impl Into<String>) -> Self {
        Self {
            w_id: w_id.into(),
            headers: CallHeaders::default(),
        }
    }
}

// ── Models ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSourceDataResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub template_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceResponse {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub template_data: Vec<TemplateSourceDataResponse>,
}

// ── Client ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SchematicsClient {
    service: BaseService,
}

impl SchematicsClient {
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

    /// Terraform state of one template in a workspace, as free-form JSON.
    pub async fn get_workspace_template_state(
        &self,
        opts: &GetWorkspaceTemplateStateOptions,
    ) -> Result<DetailedResponse<Value>, Error> {
        let req = RequestBuilder::new(
            Method::GET,
            "/v1/workspaces/{w_id}/runtime_data/{t_id}/state_store",
        )
        .path_param("w_id", &opts.w_id)?
        .path_param("t_id", &opts.t_id)?
        .call_headers(&opts.headers)
        .build()?;
        self.service.execute(req).await
    }

    pub async fn get_workspace(
        &self,
        opts: &GetWorkspaceOptions,
    ) -> Result<DetailedResponse<WorkspaceResponse>, Error> {
        let req = RequestBuilder::new(Method::GET, "/v1/workspaces/{w_id}")
            .path_param("w_id", &opts.w_id)?
            .call_headers(&opts.headers)
            .build()?;
        self.service.execute(req).await
    }
}
