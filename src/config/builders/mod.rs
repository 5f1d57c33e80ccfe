//! # 配置构建器模块

pub mod gateway_builder;

pub use gateway_builder::GatewayConfigBuilder;
