// 凭证层：CredentialProvider 产出带鉴权的 HttpTransport
use super::scaling_config::RescalerConfig;
use super::scaling_error::ScalingError;
use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Request, Response, StatusCode};

pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";
pub(crate) const METADATA_FLAVOR_HEADER: &str = "Metadata-Flavor";
pub(crate) const METADATA_FLAVOR: &str = "Google";

/// Sends a prepared request. Implementations add whatever auth they carry.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, req: Request) -> Result<Response, reqwest::Error>;
}

#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn acquire_client(&self) -> Result<Box<dyn HttpTransport>, ScalingError>;
}

#[derive(Clone)]
pub struct BearerClient {
    client: reqwest::Client,
    authorization: Option<HeaderValue>,
}

impl BearerClient {
    pub fn new(client: reqwest::Client, token: Option<&str>) -> Result<Self, ScalingError> {
        let authorization = match token {
            Some(token) => {
                let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|e| ScalingError::Credential(format!("invalid access token: {}", e)))?;
                value.set_sensitive(true);
                Some(value)
            }
            None => None,
        };
        Ok(Self {
            client,
            authorization,
        })
    }
}

#[async_trait]
impl HttpTransport for BearerClient {
    async fn execute(&self, mut req: Request) -> Result<Response, reqwest::Error> {
        if let Some(value) = &self.authorization {
            req.headers_mut().insert(AUTHORIZATION, value.clone());
        }
        self.client.execute(req).await
    }
}

pub(crate) fn build_client(config: &RescalerConfig) -> Result<reqwest::Client, ScalingError> {
    reqwest::ClientBuilder::new()
        .timeout(config.request_timeout)
        .build()
        .map_err(|e| ScalingError::Credential(format!("unable to build http client: {}", e)))
}

/// Fixed token (or none), for local proxies and tests.
pub struct StaticCredentials {
    client: BearerClient,
}

impl StaticCredentials {
    pub fn new(config: &RescalerConfig, token: Option<&str>) -> Result<Self, ScalingError> {
        Ok(Self {
            client: BearerClient::new(build_client(config)?, token)?,
        })
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentials {
    async fn acquire_client(&self) -> Result<Box<dyn HttpTransport>, ScalingError> {
        Ok(Box::new(self.client.clone()))
    }
}

#[derive(serde::Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: u64,
    #[serde(default)]
    token_type: String,
}

/// Access token for the default service account, from the instance metadata server.
pub struct MetadataCredentials {
    client: reqwest::Client,
    metadata_url: String,
    scope: String,
}

impl MetadataCredentials {
    pub fn new(config: &RescalerConfig) -> Result<Self, ScalingError> {
        Ok(Self {
            client: build_client(config)?,
            metadata_url: config.metadata_url.trim_end_matches('/').to_string(),
            scope: CLOUD_PLATFORM_SCOPE.to_string(),
        })
    }

    async fn fetch_token(&self) -> Result<TokenResponse, ScalingError> {
        let url = format!(
            "{}/computeMetadata/v1/instance/service-accounts/default/token",
            self.metadata_url
        );
        let resp = self
            .client
            .get(&url)
            .query(&[("scopes", self.scope.as_str())])
            .header(METADATA_FLAVOR_HEADER, METADATA_FLAVOR)
            .send()
            .await
            .map_err(|e| ScalingError::Credential(format!("token request failed: {}", e)))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ScalingError::Credential(format!("failed to read token response: {}", e)))?;
        if status != StatusCode::OK {
            return Err(ScalingError::Credential(format!(
                "metadata server returned {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| ScalingError::Credential(format!("malformed token response: {}", e)))?;
        if token.access_token.is_empty() {
            return Err(ScalingError::Credential("metadata server returned an empty token".into()));
        }
        Ok(token)
    }
}

#[async_trait]
impl CredentialProvider for MetadataCredentials {
    async fn acquire_client(&self) -> Result<Box<dyn HttpTransport>, ScalingError> {
        let token = self.fetch_token().await?;
        log::debug!(
            "acquired {} token for {} (expires in {}s)",
            token.token_type,
            self.scope,
            token.expires_in
        );
        let client = BearerClient::new(self.client.clone(), Some(&token.access_token))?;
        Ok(Box::new(client))
    }
}
