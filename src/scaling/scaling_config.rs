use super::scaling_error::ScalingError;
use reqwest::Url;
use std::time;

pub const DEFAULT_REGION: &str = "us-central1";
pub const DEFAULT_API_HOST: &str = "googleapis.com";
pub const DEFAULT_API_GROUP: &str = "knative.dev";
pub const DEFAULT_METADATA_URL: &str = "http://metadata.google.internal";
const DEFAULT_REQUEST_TIMEOUT: time::Duration = time::Duration::from_secs(30);

/// Where the Cloud Run admin API and the metadata server live.
#[derive(Debug, Clone)]
pub struct RescalerConfig {
    pub region: String,
    pub api_host: String,
    pub api_group: String,
    /// Replaces `https://<region>-run.<api_host>` when set (emulators, tests).
    pub base_url: Option<String>,
    pub metadata_url: String,
    pub request_timeout: time::Duration,
}

impl Default for RescalerConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            api_host: DEFAULT_API_HOST.to_string(),
            api_group: DEFAULT_API_GROUP.to_string(),
            base_url: None,
            metadata_url: DEFAULT_METADATA_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl RescalerConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_metadata_url(mut self, metadata_url: impl Into<String>) -> Self {
        self.metadata_url = metadata_url.into();
        self
    }

    pub fn admin_base(&self) -> String {
        match &self.base_url {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!("https://{}-run.{}", self.region, self.api_host),
        }
    }

    // 样例：https://us-central1-run.googleapis.com/apis/serving.knative.dev/v1/namespaces/my-project/services/my-service
    pub fn service_url(&self, project: &str, service: &str) -> Result<Url, ScalingError> {
        let raw = format!(
            "{}/apis/serving.{}/v1/namespaces/{}/services/{}",
            self.admin_base(),
            self.api_group,
            project,
            service
        );
        Url::parse(&raw).map_err(|e| ScalingError::InvalidUrl(format!("{}: {}", raw, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_service_url() {
        let url = RescalerConfig::default()
            .service_url("my-project", "my-service")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://us-central1-run.googleapis.com/apis/serving.knative.dev/v1/namespaces/my-project/services/my-service"
        );
    }

    #[test]
    fn test_base_url_override() {
        let config = RescalerConfig::default().with_base_url("http://127.0.0.1:1234/");
        let url = config.service_url("p", "s").unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:1234/apis/serving.knative.dev/v1/namespaces/p/services/s"
        );
    }

    #[test]
    fn test_custom_region() {
        let config = RescalerConfig {
            region: "europe-west1".to_string(),
            ..RescalerConfig::default()
        };
        assert_eq!(config.admin_base(), "https://europe-west1-run.googleapis.com");
    }

    #[test]
    fn test_invalid_base_url() {
        let config = RescalerConfig::default().with_base_url("not a url");
        let err = config.service_url("p", "s").unwrap_err();
        assert!(matches!(err, ScalingError::InvalidUrl(_)));
    }
}
