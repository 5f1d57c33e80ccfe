use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::mongo_builder::MongoUriBuilder;

/// Atlas 集群默认的 appName
pub const DEFAULT_APP_NAME: &str = "Cluster0";

/// 连接URI方案
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UriScheme {
    /// `mongodb+srv://`，通过DNS SRV记录解析集群（Atlas）
    #[default]
    Srv,
    /// `mongodb://`，直接指定 host[:port]
    Standard,
}

impl UriScheme {
    /// 获取URI前缀
    pub fn prefix(&self) -> &'static str {
        match self {
            UriScheme::Srv => "mongodb+srv://",
            UriScheme::Standard => "mongodb://",
        }
    }

    /// 从字符串解析URI方案
    pub fn from_str(s: &str) -> Result<Self, crate::error::GatewayError> {
        match s.to_lowercase().as_str() {
            "srv" | "mongodb+srv" => Ok(UriScheme::Srv),
            "standard" | "mongodb" => Ok(UriScheme::Standard),
            _ => Err(crate::gateway_error!(config, format!("不支持的URI方案: {}", s))),
        }
    }
}

/// MongoDB 连接参数
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionSettings {
    /// URI方案
    #[serde(default)]
    pub scheme: UriScheme,
    /// 主机地址（SRV方案为集群域名，标准方案可带端口）
    pub host: String,
    /// 数据库名
    pub database: String,
    /// 用户名（可选，须与密码同时提供）
    #[serde(default)]
    pub username: Option<String>,
    /// 密码（可选）
    #[serde(default)]
    pub password: Option<String>,
    /// appName 参数
    #[serde(default = "default_app_name")]
    pub app_name: String,
    /// 其他连接选项，追加在固定参数之后
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

fn default_app_name() -> String {
    DEFAULT_APP_NAME.to_string()
}

impl ConnectionSettings {
    fn uri_builder(&self) -> MongoUriBuilder {
        let mut builder = MongoUriBuilder::new(self.host.clone(), self.database.clone())
            .with_scheme(self.scheme)
            .with_app_name(self.app_name.clone());

        if let (Some(user), Some(pass)) = (&self.username, &self.password) {
            builder = builder.with_auth(user.clone(), pass.clone());
        }

        for (key, value) in &self.options {
            builder = builder.with_option(key.clone(), value.clone());
        }

        builder
    }

    /// 生成连接URI
    pub fn connection_uri(&self) -> String {
        self.uri_builder().build_uri()
    }

    /// 生成密码已遮蔽的连接URI，用于日志输出
    pub fn masked_uri(&self) -> String {
        self.uri_builder().build_masked_uri()
    }

    /// 检查连接参数的完整性
    pub fn validate(&self) -> Result<(), crate::error::GatewayError> {
        if self.host.trim().is_empty() {
            return Err(crate::gateway_error!(config, "主机地址不能为空"));
        }
        if self.database.trim().is_empty() {
            return Err(crate::gateway_error!(config, "数据库名不能为空"));
        }
        if self.database.contains(['/', '\\', '.', ' ', '"', '$', '\0']) {
            return Err(crate::gateway_error!(
                config,
                format!("数据库名包含非法字符: {}", self.database)
            ));
        }
        match (&self.username, &self.password) {
            (Some(_), None) | (None, Some(_)) => Err(crate::gateway_error!(
                config,
                "用户名和密码必须同时设置"
            )),
            _ => Ok(()),
        }
    }
}

impl std::fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("scheme", &self.scheme)
            .field("host", &self.host)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "****"))
            .field("app_name", &self.app_name)
            .field("options", &self.options)
            .finish()
    }
}
