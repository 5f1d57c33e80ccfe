//! 错误类型定义
//!
//! 网关所有操作统一返回 `GatewayResult`，错误消息经由 i18n 模块翻译

use thiserror::Error;

/// 网关错误类型
#[derive(Error, Debug)]
pub enum GatewayError {
    /// 数据库连接错误
    #[error("{}", crate::i18n::tf("error.connection", &[("message", .message.as_str())]))]
    ConnectionError { message: String },

    /// 尚未连接（或连接已关闭）
    #[error("{}", crate::i18n::t("error.not_connected"))]
    NotConnected,

    /// 查询/写入执行错误
    #[error("{}", crate::i18n::tf("error.query", &[("message", .message.as_str())]))]
    QueryError { message: String },

    /// 参数验证错误
    #[error("{}", crate::i18n::tf("error.validation", &[("field", .field.as_str()), ("message", .message.as_str())]))]
    ValidationError { field: String, message: String },

    /// 配置错误
    #[error("{}", crate::i18n::tf("error.config", &[("message", .message.as_str())]))]
    ConfigError { message: String },

    /// 序列化错误
    #[error("{}", crate::i18n::tf("error.serialization", &[("message", .message.as_str())]))]
    SerializationError { message: String },

    /// IO错误
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    /// 其他错误
    #[error("{message}")]
    Other { message: String },
}

/// 网关结果类型
pub type GatewayResult<T> = Result<T, GatewayError>;

impl GatewayError {
    /// 错误类别的简短标识，用于日志和副通道记录
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::ConnectionError { .. } => "connection",
            GatewayError::NotConnected => "not_connected",
            GatewayError::QueryError { .. } => "query",
            GatewayError::ValidationError { .. } => "validation",
            GatewayError::ConfigError { .. } => "config",
            GatewayError::SerializationError { .. } => "serialization",
            GatewayError::IoError(_) => "io",
            GatewayError::Other { .. } => "other",
        }
    }
}

impl From<mongodb::error::Error> for GatewayError {
    fn from(err: mongodb::error::Error) -> Self {
        GatewayError::QueryError {
            message: err.to_string(),
        }
    }
}

impl From<mongodb::bson::ser::Error> for GatewayError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        GatewayError::SerializationError {
            message: err.to_string(),
        }
    }
}

/// 快速构造错误的便捷宏
///
/// ```ignore
/// gateway_error!(config, "数据库名必须设置");
/// gateway_error!(validation, "collection", "集合名不能为空");
/// ```
#[macro_export]
macro_rules! gateway_error {
    (connection, $msg:expr) => {
        $crate::error::GatewayError::ConnectionError { message: ($msg).to_string() }
    };
    (query, $msg:expr) => {
        $crate::error::GatewayError::QueryError { message: ($msg).to_string() }
    };
    (config, $msg:expr) => {
        $crate::error::GatewayError::ConfigError { message: ($msg).to_string() }
    };
    (serialization, $msg:expr) => {
        $crate::error::GatewayError::SerializationError { message: ($msg).to_string() }
    };
    (validation, $field:expr, $msg:expr) => {
        $crate::error::GatewayError::ValidationError {
            field: ($field).to_string(),
            message: ($msg).to_string(),
        }
    };
    (other, $msg:expr) => {
        $crate::error::GatewayError::Other { message: ($msg).to_string() }
    };
}
