//! 数据库驱动适配模块
//!
//! 网关只通过 `StoreConnector` / `DocumentStore` 两个trait访问驱动，
//! 真实驱动与内存驱动分别实现这两个trait

use crate::error::GatewayResult;
use crate::types::{ConnectionSettings, InsertAck, UpdateAck};
use async_trait::async_trait;
use futures::stream::BoxStream;
use ::mongodb::bson::Document;
use std::sync::Arc;

pub mod memory;
pub mod mongodb;
pub(crate) mod utils;

pub use self::memory::{MemoryConnector, MemoryStore, RecordedCall};
pub use self::mongodb::{MongoConnector, MongoStore};

/// 查询游标，调用方逐条拉取文档
pub type DocumentCursor = BoxStream<'static, GatewayResult<Document>>;

/// 已打开的数据库句柄
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// 目标数据库名
    fn database_name(&self) -> &str;

    /// 插入一条文档
    async fn insert_one(&self, collection: &str, document: Document) -> GatewayResult<InsertAck>;

    /// 按过滤条件查询，返回游标
    async fn find(&self, collection: &str, filter: Document) -> GatewayResult<DocumentCursor>;

    /// 更新第一条匹配的文档
    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> GatewayResult<UpdateAck>;

    /// 健康检查
    async fn ping(&self) -> GatewayResult<()>;

    /// 关闭底层连接
    async fn close(&self) -> GatewayResult<()>;
}

/// 驱动连接器，负责根据连接参数打开数据库句柄
#[async_trait]
pub trait StoreConnector: Send + Sync {
    async fn open(&self, settings: &ConnectionSettings) -> GatewayResult<Arc<dyn DocumentStore>>;
}
