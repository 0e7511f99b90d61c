//! HTTP server: builder, host, and route exposure

pub mod builder;
pub mod exposure;
pub mod host;
pub mod relay;
pub mod router;

pub use builder::ServerBuilder;
pub use exposure::RestExposure;
pub use host::ServerHost;
