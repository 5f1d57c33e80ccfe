//! rat_mongogate - 单连接MongoDB网关
//!
//! 在官方 `mongodb` 驱动之上提供 connect / close / create / find / update 五个异步操作。
//! 持久化、索引、查询计划和网络处理全部交给驱动完成

// 导出所有公共模块
pub mod error;
pub mod types;
pub mod config;
pub mod security;
pub mod adapter;
pub mod gateway;
pub mod i18n;

// 重新导出常用类型和函数
pub use error::{GatewayError, GatewayResult};
pub use types::*;
pub use config::{GatewayConfig, GatewayConfigBuilder, DEFAULT_FILTER_FIELD};
pub use adapter::{
    DocumentCursor, DocumentStore, StoreConnector, MongoConnector, MongoStore,
    MemoryConnector, MemoryStore, RecordedCall,
};
pub use gateway::{
    FailureRecord, MongoGateway, global_gateway, init_global_gateway,
    install_global_gateway, shutdown_global_gateway,
};

// 驱动的文档类型，调用方无需直接依赖mongodb crate
pub use mongodb::bson::{self, Bson, Document, doc};

// 条件编译调试宏 - 只有在 debug 模式下才输出调试信息
#[cfg(debug_assertions)]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        rat_logger::debug!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        // 在 release 模式下不输出调试信息
    };
}

/// 初始化rat_mongogate库
///
/// 注册多语言错误消息。日志系统由调用者自行初始化
pub fn init() {
    i18n::ErrorMessageI18n::init();
}

/// 库版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 库名称
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// 获取库信息
pub fn get_info() -> String {
    format!("{} v{}", NAME, VERSION)
}
