//! MongoDB网关核心
//!
//! 持有一个连接句柄，提供 connect / close / create / find / update 五个操作。
//! 每个失败的操作都会在边界处记录日志、写入失败副通道，然后原样返回给调用方

use crate::adapter::utils::{build_filter_document, build_set_document};
use crate::adapter::{DocumentCursor, DocumentStore, MongoConnector, StoreConnector};
use crate::config::GatewayConfig;
use crate::debug_log;
use crate::error::{GatewayError, GatewayResult};
use crate::security::IdentifierValidator;
use crate::types::{InsertAck, UpdateAck};
use futures::{StreamExt, TryStreamExt};
use mongodb::bson::{Bson, Document};
use parking_lot::Mutex;
use rat_logger::{error, info, warn};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// 一次失败操作的记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    /// 操作名（connect、create、find ...）
    pub operation: &'static str,
    /// 涉及的集合
    pub collection: Option<String>,
    /// 错误类别，见 `GatewayError::kind`
    pub kind: &'static str,
    /// 错误消息
    pub message: String,
}

/// MongoDB网关
pub struct MongoGateway {
    config: GatewayConfig,
    connector: Arc<dyn StoreConnector>,
    store: RwLock<Option<Arc<dyn DocumentStore>>>,
    failures: AtomicU64,
    last_failure: Mutex<Option<FailureRecord>>,
}

impl MongoGateway {
    /// 使用官方驱动创建网关（尚未连接）
    pub fn new(config: GatewayConfig) -> Self {
        Self::with_connector(config, Arc::new(MongoConnector::new()))
    }

    /// 使用指定的驱动连接器创建网关
    pub fn with_connector(config: GatewayConfig, connector: Arc<dyn StoreConnector>) -> Self {
        Self {
            config,
            connector,
            store: RwLock::new(None),
            failures: AtomicU64::new(0),
            last_failure: Mutex::new(None),
        }
    }

    /// 从环境变量（及 `.env`）读取配置并创建网关
    pub fn from_env() -> GatewayResult<Self> {
        Ok(Self::new(GatewayConfig::from_env()?))
    }

    /// 网关配置
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// find/update 使用的过滤字段
    pub fn filter_field(&self) -> &str {
        &self.config.filter_field
    }

    /// 是否已连接
    pub async fn is_connected(&self) -> bool {
        self.store.read().await.is_some()
    }

    /// 失败操作的累计次数
    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::SeqCst)
    }

    /// 最近一次失败
    pub fn last_error(&self) -> Option<FailureRecord> {
        self.last_failure.lock().clone()
    }

    /// 打开到配置数据库的连接
    ///
    /// 已连接时仅输出警告，不会建立第二个客户端。连接失败后网关保持未连接状态
    pub async fn connect(&self) -> GatewayResult<()> {
        let mut slot = self.store.write().await;
        if slot.is_some() {
            warn!("MongoDB网关已连接，忽略重复的connect调用");
            return Ok(());
        }

        match self.connector.open(&self.config.connection).await {
            Ok(store) => {
                info!("已连接到MongoDB: 数据库={}", store.database_name());
                *slot = Some(store);
                Ok(())
            }
            Err(e) => Err(self.report("connect", None, e)),
        }
    }

    /// 关闭连接
    ///
    /// 未连接时输出警告并直接返回。驱动关闭失败时保留句柄，可再次调用close
    pub async fn close(&self) -> GatewayResult<()> {
        let mut slot = self.store.write().await;
        let Some(store) = slot.take() else {
            warn!("MongoDB网关未连接，忽略close调用");
            return Ok(());
        };

        match store.close().await {
            Ok(()) => {
                info!("已关闭MongoDB连接");
                Ok(())
            }
            Err(e) => {
                *slot = Some(store);
                Err(self.report("close", None, e))
            }
        }
    }

    /// 健康检查
    pub async fn ping(&self) -> GatewayResult<()> {
        let result = async { self.current_store().await?.ping().await }.await;
        self.observe("ping", None, result)
    }

    /// 在指定集合中插入一条文档，返回包含新 `_id` 的确认
    pub async fn create(&self, collection: &str, data: Document) -> GatewayResult<InsertAck> {
        let result = async {
            let store = self.store_for(collection).await?;
            debug_log!("执行create: 集合={}, 文档={:?}", collection, data);
            store.insert_one(collection, data).await
        }
        .await;
        self.observe("create", Some(collection), result)
    }

    /// 将可序列化的值转换为文档后插入
    pub async fn create_from<T: Serialize>(&self, collection: &str, value: &T) -> GatewayResult<InsertAck> {
        match mongodb::bson::to_document(value) {
            Ok(data) => self.create(collection, data).await,
            Err(e) => Err(self.report("create", Some(collection), GatewayError::from(e))),
        }
    }

    /// 查询文档，返回游标
    ///
    /// 提供过滤值时按 `{ <filter_field>: value }` 精确匹配，否则匹配集合内全部文档
    pub async fn find(&self, collection: &str, filter_value: Option<Bson>) -> GatewayResult<DocumentCursor> {
        let result = self.open_cursor(collection, filter_value).await;
        self.observe("find", Some(collection), result)
    }

    /// 查询并只返回第一条匹配的文档
    pub async fn find_first(
        &self,
        collection: &str,
        filter_value: Option<Bson>,
    ) -> GatewayResult<Option<Document>> {
        let result = async {
            let mut cursor = self.open_cursor(collection, filter_value).await?;
            cursor.next().await.transpose()
        }
        .await;
        self.observe("find", Some(collection), result)
    }

    /// 查询并收集全部匹配的文档
    pub async fn find_all(
        &self,
        collection: &str,
        filter_value: Option<Bson>,
    ) -> GatewayResult<Vec<Document>> {
        let result = async {
            let cursor = self.open_cursor(collection, filter_value).await?;
            cursor.try_collect::<Vec<_>>().await
        }
        .await;
        self.observe("find", Some(collection), result)
    }

    /// 更新第一条过滤字段等于 `filter_value` 的文档
    ///
    /// 使用 `$set` 做字段级合并，未出现在 `data` 中的字段保持不变
    pub async fn update(
        &self,
        collection: &str,
        filter_value: Bson,
        data: Document,
    ) -> GatewayResult<UpdateAck> {
        let result = async {
            if data.is_empty() {
                return Err(crate::gateway_error!(validation, "data", "更新内容不能为空"));
            }
            let store = self.store_for(collection).await?;
            let filter = build_filter_document(&self.config.filter_field, Some(filter_value));
            let update = build_set_document(data);
            debug_log!("执行update: 集合={}, 过滤={:?}, 更新={:?}", collection, filter, update);
            store.update_one(collection, filter, update).await
        }
        .await;
        self.observe("update", Some(collection), result)
    }

    async fn open_cursor(
        &self,
        collection: &str,
        filter_value: Option<Bson>,
    ) -> GatewayResult<DocumentCursor> {
        let store = self.store_for(collection).await?;
        let filter = build_filter_document(&self.config.filter_field, filter_value);
        debug_log!("执行find: 集合={}, 过滤={:?}", collection, filter);
        store.find(collection, filter).await
    }

    /// 校验集合名并取出当前句柄
    async fn store_for(&self, collection: &str) -> GatewayResult<Arc<dyn DocumentStore>> {
        IdentifierValidator::validate_collection_name(collection)?;
        self.current_store().await
    }

    /// 复制当前句柄后立即释放读锁，驱动调用期间不持有锁
    async fn current_store(&self) -> GatewayResult<Arc<dyn DocumentStore>> {
        self.store
            .read()
            .await
            .as_ref()
            .cloned()
            .ok_or(GatewayError::NotConnected)
    }

    fn observe<T>(
        &self,
        operation: &'static str,
        collection: Option<&str>,
        result: GatewayResult<T>,
    ) -> GatewayResult<T> {
        result.map_err(|e| self.report(operation, collection, e))
    }

    /// 记录失败：输出错误日志并写入副通道
    fn report(&self, operation: &'static str, collection: Option<&str>, err: GatewayError) -> GatewayError {
        match collection {
            Some(name) => error!("MongoDB操作失败: 操作={}, 集合={}, 错误={}", operation, name, err),
            None => error!("MongoDB操作失败: 操作={}, 错误={}", operation, err),
        }

        self.failures.fetch_add(1, Ordering::SeqCst);
        *self.last_failure.lock() = Some(FailureRecord {
            operation,
            collection: collection.map(str::to_string),
            kind: err.kind(),
            message: err.to_string(),
        });

        err
    }
}

impl std::fmt::Debug for MongoGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MongoGateway")
            .field("uri", &self.config.connection.masked_uri())
            .field("filter_field", &self.config.filter_field)
            .field("failures", &self.failure_count())
            .finish()
    }
}
