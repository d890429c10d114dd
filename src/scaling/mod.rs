pub mod credentials;
pub mod identity;
pub mod rescaler;
pub mod scaling_config;
pub mod scaling_error;
pub mod service_desc;
