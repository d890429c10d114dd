pub mod endpoint;
pub mod scale_handler;
