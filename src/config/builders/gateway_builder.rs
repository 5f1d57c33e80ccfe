//! # 网关配置构建器模块
//!
//! 提供网关配置的构建器实现，支持链式调用和严格验证

use crate::config::core::GatewayConfig;
use crate::error::GatewayError;
use crate::types::{ConnectionSettings, UriScheme};
use rat_logger::info;
use std::collections::BTreeMap;

/// 网关配置构建器
///
/// 主机、数据库名、URI方案、appName 和过滤字段必须显式设置
#[derive(Debug)]
pub struct GatewayConfigBuilder {
    scheme: Option<UriScheme>,
    host: Option<String>,
    database: Option<String>,
    username: Option<String>,
    password: Option<String>,
    app_name: Option<String>,
    filter_field: Option<String>,
    options: BTreeMap<String, String>,
}

impl GatewayConfigBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self {
            scheme: None,
            host: None,
            database: None,
            username: None,
            password: None,
            app_name: None,
            filter_field: None,
            options: BTreeMap::new(),
        }
    }

    /// 设置URI方案
    pub fn scheme(mut self, scheme: UriScheme) -> Self {
        self.scheme = Some(scheme);
        self
    }

    /// 设置主机地址
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.host = Some(host.into());
        self
    }

    /// 设置数据库名
    pub fn database<S: Into<String>>(mut self, database: S) -> Self {
        self.database = Some(database.into());
        self
    }

    /// 设置用户名和密码
    ///
    /// # 参数
    ///
    /// * `username` - 用户名
    /// * `password` - 密码
    pub fn credentials<U: Into<String>, P: Into<String>>(mut self, username: U, password: P) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// 设置appName
    pub fn app_name<S: Into<String>>(mut self, app_name: S) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    /// 设置过滤字段
    pub fn filter_field<S: Into<String>>(mut self, filter_field: S) -> Self {
        self.filter_field = Some(filter_field.into());
        self
    }

    /// 添加额外连接选项
    pub fn option<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// 构建网关配置
    ///
    /// # 错误
    ///
    /// 如果任何必需的配置项未设置，将返回错误
    pub fn build(self) -> Result<GatewayConfig, GatewayError> {
        let scheme = self
            .scheme
            .ok_or_else(|| crate::gateway_error!(config, "URI方案必须设置"))?;

        let host = self
            .host
            .ok_or_else(|| crate::gateway_error!(config, "主机地址必须设置"))?;

        let database = self
            .database
            .ok_or_else(|| crate::gateway_error!(config, "数据库名必须设置"))?;

        let app_name = self
            .app_name
            .ok_or_else(|| crate::gateway_error!(config, "appName必须设置"))?;

        let filter_field = self
            .filter_field
            .ok_or_else(|| crate::gateway_error!(config, "过滤字段必须设置"))?;

        let config = GatewayConfig {
            connection: ConnectionSettings {
                scheme,
                host,
                database,
                username: self.username,
                password: self.password,
                app_name,
                options: self.options,
            },
            filter_field,
        };

        config.validate()?;

        info!(
            "创建网关配置: 数据库={}, 过滤字段={}",
            config.connection.database, config.filter_field
        );

        Ok(config)
    }
}

impl Default for GatewayConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
