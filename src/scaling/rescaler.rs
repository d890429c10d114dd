//! Rescaler: read-modify-write of a Cloud Run service's min/max instance annotations.
//!
//! Meant to run on a cron-like schedule, ahead of traffic changes the platform
//! autoscaler can't absorb on its own. Every applied change creates a new revision.
use super::credentials::{CredentialProvider, HttpTransport, MetadataCredentials};
use super::identity::{EnvServiceName, MetadataProjectResolver, ProjectResolver, ServiceNameResolver};
use super::scaling_config::RescalerConfig;
use super::scaling_error::{ScalingError, TransportError};
use super::service_desc::ServiceDescription;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Method, Request, StatusCode, Url};
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScaleOutcome {
    /// Annotations already matched; no PUT was sent.
    Unchanged,
    Updated {
        previous_min: Option<String>,
        previous_max: Option<String>,
    },
}

pub struct Rescaler {
    config: RescalerConfig,
    credentials: Arc<dyn CredentialProvider>,
    project: Arc<dyn ProjectResolver>,
    service: Arc<dyn ServiceNameResolver>,
}

impl Rescaler {
    pub fn new(
        config: RescalerConfig,
        credentials: Arc<dyn CredentialProvider>,
        project: Arc<dyn ProjectResolver>,
        service: Arc<dyn ServiceNameResolver>,
    ) -> Self {
        Self {
            config,
            credentials,
            project,
            service,
        }
    }

    /// Metadata-server credentials and project, service name from `K_SERVICE`.
    pub fn from_environment(config: RescalerConfig) -> Result<Self, ScalingError> {
        let credentials = Arc::new(MetadataCredentials::new(&config)?);
        let project = Arc::new(MetadataProjectResolver::new(&config)?);
        Ok(Self::new(
            config,
            credentials,
            project,
            Arc::new(EnvServiceName::default()),
        ))
    }

    /// Sets minScale/maxScale on the service template to `min`/`max`.
    ///
    /// Returns [`ScaleOutcome::Unchanged`] without writing anything when the current
    /// annotations already equal the requested values. `min <= max` is left for the
    /// provider to enforce. Cancelling `ctx` aborts whichever request is in flight.
    pub async fn rescale(
        &self,
        ctx: &CancellationToken,
        min: u32,
        max: u32,
    ) -> Result<ScaleOutcome, ScalingError> {
        let client = cancellable(ctx, self.credentials.acquire_client()).await?;
        let project = cancellable(ctx, self.project.resolve_project_id()).await?;
        let service = self.service.resolve_service_name()?;
        let url = self.config.service_url(&project, &service)?;

        let mut svc = cancellable(ctx, fetch_service(client.as_ref(), &url)).await?;

        // noop if new scaling values are same as current
        let new_min = min.to_string();
        let new_max = max.to_string();
        if svc.scale_matches(&new_min, &new_max) {
            log::info!(
                "[Rescale] service={} already at min={} max={}, skipping update",
                service,
                new_min,
                new_max
            );
            return Ok(ScaleOutcome::Unchanged);
        }

        let previous_min = svc.min_scale().map(str::to_string);
        let previous_max = svc.max_scale().map(str::to_string);
        svc.apply_scale(&new_min, &new_max);

        let start = std::time::Instant::now();
        cancellable(ctx, update_service(client.as_ref(), &url, &svc)).await?;
        log::info!(
            "[Rescale] service={} min {:?} => {} max {:?} => {} took: {:.4}s",
            service,
            previous_min,
            new_min,
            previous_max,
            new_max,
            start.elapsed().as_secs_f64()
        );

        Ok(ScaleOutcome::Updated {
            previous_min,
            previous_max,
        })
    }
}

// The losing future is dropped, which aborts its request.
async fn cancellable<T, F>(ctx: &CancellationToken, fut: F) -> Result<T, ScalingError>
where
    F: Future<Output = Result<T, ScalingError>>,
{
    tokio::select! {
        biased;
        _ = ctx.cancelled() => Err(TransportError::Cancelled.into()),
        res = fut => res,
    }
}

async fn fetch_service(
    client: &dyn HttpTransport,
    url: &Url,
) -> Result<ServiceDescription, ScalingError> {
    log::debug!("GET {}", url);
    let resp = client.execute(Request::new(Method::GET, url.clone())).await?;

    let status = resp.status();
    // 读完整个 body，连接才能回到连接池
    let body = resp.bytes().await?;
    if !status.is_success() {
        return Err(ScalingError::FetchRejected(
            status,
            String::from_utf8_lossy(&body).into_owned(),
        ));
    }

    Ok(serde_json::from_slice(&body)?)
}

async fn update_service(
    client: &dyn HttpTransport,
    url: &Url,
    svc: &ServiceDescription,
) -> Result<(), ScalingError> {
    let payload = serde_json::to_vec(svc)?;

    let mut req = Request::new(Method::PUT, url.clone());
    req.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    *req.body_mut() = Some(payload.into());

    let resp = client.execute(req).await?;
    let status = resp.status();
    let body = resp.text().await?;

    match status {
        StatusCode::OK => Ok(()),
        _ => {
            log::warn!("PUT {} rejected ({}): {}", url, status, body);
            Err(ScalingError::UpdateRejected { status, body })
        }
    }
}
