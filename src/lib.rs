//! Adjusts a Cloud Run service's min/max instance annotations through the admin API.
pub mod handlers;
pub mod scaling;

pub use handlers::endpoint::{new_endpoint, Endpoint};
pub use handlers::scale_handler::scale_route;
pub use scaling::rescaler::{Rescaler, ScaleOutcome};
pub use scaling::scaling_config::RescalerConfig;
pub use scaling::scaling_error::{ScalingError, TransportError};
