// Callable adapter for RPC-style routers: input is ignored, output is always None.
use crate::scaling::rescaler::Rescaler;
use crate::scaling::scaling_error::ScalingError;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

pub type Endpoint =
    Arc<dyn Fn(CancellationToken, Value) -> BoxFuture<Result<Option<Value>, ScalingError>> + Send + Sync>;

pub fn new_endpoint(rescaler: Arc<Rescaler>, min: u32, max: u32) -> Endpoint {
    Arc::new(
        move |ctx: CancellationToken, _request: Value| -> BoxFuture<Result<Option<Value>, ScalingError>> {
            let rescaler = rescaler.clone();
            Box::pin(async move {
                rescaler.rescale(&ctx, min, max).await?;
                Ok::<_, ScalingError>(None)
            })
        },
    )
}
