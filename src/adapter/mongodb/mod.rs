//! MongoDB驱动适配模块
//!
//! - adapter.rs: 连接器与句柄结构
//! - operations.rs: DocumentStore trait实现

pub mod adapter;
pub mod operations;

// 重新导出核心类型
pub use adapter::{MongoConnector, MongoStore};
