// ── Client session ──
//
// One set of service clients per provider configuration. Clients share a
// single HTTP connection pool and authenticator, and are read-only after
// construction, so handlers may use them concurrently.

use std::sync::Arc;

use tracing::debug;
use url::Url;

use ibmtf_api::vpc::regional_url;
use ibmtf_api::{
    Authenticator, BaseService, BearerToken, CbrClient, IamAuthenticator, NoAuth,
    SchematicsClient, TransportConfig, VpcClient, cbr, schematics,
};

use crate::config::{Credentials, ProviderConfig};
use crate::error::CoreError;

#[derive(Debug, Clone)]
pub struct ClientSession {
    cbr: Arc<CbrClient>,
    vpc: Arc<VpcClient>,
    schematics: Arc<SchematicsClient>,
    console_url: String,
}

impl ClientSession {
    pub fn new(config: &ProviderConfig) -> Result<Self, CoreError> {
        let console_url = Url::parse(&config.console_url).map_err(|e| CoreError::Config {
            message: format!("invalid console_url {:?}: {e}", config.console_url),
        })?;

        let mut transport = TransportConfig {
            timeout: config.timeout,
            ..TransportConfig::default()
        };
        if let Some(ref ua) = config.user_agent {
            transport.user_agent.clone_from(ua);
        }
        if config.max_retries > 0 {
            transport = transport.with_retries(config.max_retries, config.max_retry_interval);
        }
        let http = transport.build_client()?;

        let authenticator: Arc<dyn Authenticator> = match &config.credentials {
            Credentials::ApiKey(key) => match &config.iam_url {
                Some(url) => Arc::new(IamAuthenticator::new(
                    http.clone(),
                    key.clone(),
                    Url::parse(url).map_err(ibmtf_api::Error::from)?,
                )),
                None => Arc::new(IamAuthenticator::with_default_url(http.clone(), key.clone())?),
            },
            Credentials::BearerToken(token) => Arc::new(BearerToken::new(token.clone())),
            Credentials::None => Arc::new(NoAuth),
        };

        let vpc_url = config
            .vpc_endpoint
            .clone()
            .unwrap_or_else(|| regional_url(&config.region));
        let cbr_url = config
            .cbr_endpoint
            .as_deref()
            .unwrap_or(cbr::DEFAULT_SERVICE_URL);
        let schematics_url = config
            .schematics_endpoint
            .as_deref()
            .unwrap_or(schematics::DEFAULT_SERVICE_URL);

        debug!(
            region = %config.region,
            cbr = %cbr_url,
            vpc = %vpc_url,
            schematics = %schematics_url,
            "building client session"
        );

        let service = |url: &str| {
            BaseService::with_client(url, http.clone(), Arc::clone(&authenticator))
                .map(|svc| svc.with_retry(transport.retry).with_timeout(transport.timeout))
        };

        Ok(Self {
            cbr: Arc::new(CbrClient::from_service(service(cbr_url)?)),
            vpc: Arc::new(VpcClient::from_service(service(&vpc_url)?)),
            schematics: Arc::new(SchematicsClient::from_service(service(schematics_url)?)),
            console_url: console_url.as_str().trim_end_matches('/').to_owned(),
        })
    }

    pub fn cbr(&self) -> &CbrClient {
        &self.cbr
    }

    pub fn vpc(&self) -> &VpcClient {
        &self.vpc
    }

    pub fn schematics(&self) -> &SchematicsClient {
        &self.schematics
    }

    /// Console base URL without a trailing slash.
    pub fn console_url(&self) -> &str {
        &self.console_url
    }
}
