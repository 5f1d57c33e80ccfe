//! # 配置管理模块 - 核心配置类型
//!
//! 网关配置可来自环境变量（含 `.env` 文件）、构建器或 TOML/JSON 配置文件

use crate::error::{GatewayError, GatewayResult};
use crate::security::IdentifierValidator;
use crate::types::{ConnectionSettings, DEFAULT_APP_NAME, UriScheme};
use rat_logger::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 默认的过滤字段名
pub const DEFAULT_FILTER_FIELD: &str = "searchTerm";

/// 环境变量名
pub const ENV_DB_USER: &str = "DB_USER";
pub const ENV_DB_PASSWORD: &str = "DB_PASSWORD";
pub const ENV_DB_HOST: &str = "DB_HOST";
pub const ENV_DB_NAME: &str = "DB_NAME";
pub const ENV_DB_FILTER_FIELD: &str = "DB_FILTER_FIELD";
pub const ENV_DB_APP_NAME: &str = "DB_APP_NAME";
pub const ENV_DB_URI_SCHEME: &str = "DB_URI_SCHEME";

/// 网关配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// 连接参数
    pub connection: ConnectionSettings,
    /// find/update 使用的过滤字段
    #[serde(default = "default_filter_field")]
    pub filter_field: String,
}

fn default_filter_field() -> String {
    DEFAULT_FILTER_FIELD.to_string()
}

impl GatewayConfig {
    /// 创建网关配置构建器
    pub fn builder() -> super::builders::GatewayConfigBuilder {
        super::builders::GatewayConfigBuilder::new()
    }

    /// 校验配置
    pub fn validate(&self) -> GatewayResult<()> {
        self.connection.validate()?;
        IdentifierValidator::validate_field_name(&self.filter_field)
    }

    /// 从进程环境加载配置
    ///
    /// 先尝试加载当前目录（及上级目录）中的 `.env` 文件，文件不存在时忽略
    pub fn from_env() -> GatewayResult<Self> {
        match dotenvy::dotenv() {
            Ok(path) => debug!("已加载环境文件: {:?}", path),
            Err(e) if e.not_found() => debug!("未找到.env文件，仅使用进程环境变量"),
            Err(e) => {
                return Err(crate::gateway_error!(config, format!("解析.env文件失败: {}", e)));
            }
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 通过查找函数加载配置
    ///
    /// `lookup` 对给定变量名返回其值，空字符串视为未设置
    pub fn from_lookup<F>(lookup: F) -> GatewayResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| {
                crate::gateway_error!(config, crate::i18n::tf("error.env_missing", &[("name", key)]))
            })
        };

        let host = require(ENV_DB_HOST)?;
        let database = require(ENV_DB_NAME)?;

        let scheme = match get(ENV_DB_URI_SCHEME) {
            Some(s) => UriScheme::from_str(&s)?,
            None => UriScheme::Srv,
        };

        let config = GatewayConfig {
            connection: ConnectionSettings {
                scheme,
                host,
                database,
                username: get(ENV_DB_USER),
                password: get(ENV_DB_PASSWORD),
                app_name: get(ENV_DB_APP_NAME).unwrap_or_else(|| DEFAULT_APP_NAME.to_string()),
                options: BTreeMap::new(),
            },
            filter_field: get(ENV_DB_FILTER_FIELD).unwrap_or_else(default_filter_field),
        };

        config.validate()?;
        info!("从环境变量加载网关配置: {}", config.connection.masked_uri());
        Ok(config)
    }

    /// 从配置文件加载配置
    ///
    /// # 参数
    ///
    /// * `config_path` - 配置文件路径，扩展名为 `toml` 时按TOML解析，否则按JSON解析
    pub fn from_file<P: AsRef<std::path::Path>>(config_path: P) -> GatewayResult<Self> {
        let content = std::fs::read_to_string(config_path.as_ref())
            .map_err(GatewayError::IoError)?;

        let config: GatewayConfig = if config_path.as_ref().extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::from_str(&content)
                .map_err(|e| crate::gateway_error!(config, format!("解析TOML配置文件失败: {}", e)))?
        } else {
            serde_json::from_str(&content)
                .map_err(|e| crate::gateway_error!(config, format!("解析JSON配置文件失败: {}", e)))?
        };

        config.validate()?;
        info!("从文件加载配置: {:?}", config_path.as_ref());
        Ok(config)
    }

    /// 保存配置到文件
    ///
    /// # 参数
    ///
    /// * `config_path` - 配置文件路径
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, config_path: P) -> GatewayResult<()> {
        let content = if config_path.as_ref().extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::to_string_pretty(self)
                .map_err(|e| crate::gateway_error!(config, format!("序列化TOML配置失败: {}", e)))?
        } else {
            serde_json::to_string_pretty(self)
                .map_err(|e| crate::gateway_error!(config, format!("序列化JSON配置失败: {}", e)))?
        };

        std::fs::write(config_path.as_ref(), content).map_err(GatewayError::IoError)?;

        info!("保存配置到文件: {:?}", config_path.as_ref());
        Ok(())
    }
}
