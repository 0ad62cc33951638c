//! HTTP implementation of the remote settings gateway

pub mod dto;
pub mod gateway;
pub mod mapper;

pub use gateway::HttpSettingsGateway;
