//! MongoDB网关模块

pub mod gateway;
pub mod global;

pub use gateway::{FailureRecord, MongoGateway};
pub use global::{global_gateway, init_global_gateway, install_global_gateway, shutdown_global_gateway};
