// 项目 / 服务名解析
use super::credentials::{build_client, METADATA_FLAVOR, METADATA_FLAVOR_HEADER};
use super::scaling_config::RescalerConfig;
use super::scaling_error::ScalingError;
use async_trait::async_trait;
use reqwest::StatusCode;

/// Cloud Run sets this to the name of the running service.
pub const SERVICE_ENV_VAR: &str = "K_SERVICE";

#[async_trait]
pub trait ProjectResolver: Send + Sync {
    async fn resolve_project_id(&self) -> Result<String, ScalingError>;
}

pub trait ServiceNameResolver: Send + Sync {
    fn resolve_service_name(&self) -> Result<String, ScalingError>;
}

pub struct MetadataProjectResolver {
    client: reqwest::Client,
    metadata_url: String,
}

impl MetadataProjectResolver {
    pub fn new(config: &RescalerConfig) -> Result<Self, ScalingError> {
        let client = build_client(config)
            .map_err(|e| ScalingError::IdentityResolution(e.to_string()))?;
        Ok(Self {
            client,
            metadata_url: config.metadata_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ProjectResolver for MetadataProjectResolver {
    async fn resolve_project_id(&self) -> Result<String, ScalingError> {
        let url = format!("{}/computeMetadata/v1/project/project-id", self.metadata_url);
        let resp = self
            .client
            .get(&url)
            .header(METADATA_FLAVOR_HEADER, METADATA_FLAVOR)
            .send()
            .await
            .map_err(|e| ScalingError::IdentityResolution(format!("metadata request failed: {}", e)))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            ScalingError::IdentityResolution(format!("failed to read metadata response: {}", e))
        })?;

        match status {
            StatusCode::OK => {
                let project = body.trim();
                if project.is_empty() {
                    return Err(ScalingError::IdentityResolution(
                        "metadata server returned an empty project id".into(),
                    ));
                }
                Ok(project.to_string())
            }
            _ => Err(ScalingError::IdentityResolution(format!(
                "metadata server returned {}: {}",
                status, body
            ))),
        }
    }
}

pub struct StaticProjectResolver(pub String);

#[async_trait]
impl ProjectResolver for StaticProjectResolver {
    async fn resolve_project_id(&self) -> Result<String, ScalingError> {
        Ok(self.0.clone())
    }
}

pub struct EnvServiceName {
    var: String,
}

impl EnvServiceName {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvServiceName {
    fn default() -> Self {
        Self::new(SERVICE_ENV_VAR)
    }
}

impl ServiceNameResolver for EnvServiceName {
    fn resolve_service_name(&self) -> Result<String, ScalingError> {
        match std::env::var(&self.var) {
            Ok(name) if !name.is_empty() => Ok(name),
            _ => Err(ScalingError::IdentityResolution(format!("{} is not set", self.var))),
        }
    }
}

pub struct StaticServiceName(pub String);

impl ServiceNameResolver for StaticServiceName {
    fn resolve_service_name(&self) -> Result<String, ScalingError> {
        Ok(self.0.clone())
    }
}
