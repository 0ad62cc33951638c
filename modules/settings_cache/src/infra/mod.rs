//! Infrastructure layer - gateway implementations

pub mod http;

pub use http::HttpSettingsGateway;
