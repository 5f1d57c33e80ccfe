//! # 配置管理模块
//!
//! 提供网关配置的加载与构建，支持环境变量、配置文件和构建器三种来源

pub mod builders;
pub mod core;

pub use builders::GatewayConfigBuilder;
pub use self::core::{DEFAULT_FILTER_FIELD, GatewayConfig};
