//! 内存驱动
//!
//! 不依赖网络的 `DocumentStore` 实现，支持顶层字段精确匹配过滤和 `$set` 更新。
//! 每次调用都会被记录，可注入失败，关闭后拒绝所有调用，主要用于契约测试和离线开发

use crate::adapter::{DocumentCursor, DocumentStore, StoreConnector};
use crate::error::{GatewayError, GatewayResult};
use crate::types::{ConnectionSettings, InsertAck, UpdateAck};
use async_trait::async_trait;
use futures::StreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Bson, Document};
use parking_lot::Mutex;
use rat_logger::debug;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// 内存驱动记录的一次调用
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Insert { collection: String, document: Document },
    Find { collection: String, filter: Document },
    Update { collection: String, filter: Document, update: Document },
    Ping,
    Close,
}

/// 内存文档存储
pub struct MemoryStore {
    database: String,
    collections: Mutex<HashMap<String, Vec<Document>>>,
    calls: Mutex<Vec<RecordedCall>>,
    failure: Mutex<Option<String>>,
    closed: AtomicBool,
}

impl MemoryStore {
    /// 创建空的内存存储
    pub fn new<S: Into<String>>(database: S) -> Self {
        Self {
            database: database.into(),
            collections: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
            closed: AtomicBool::new(false),
        }
    }

    /// 之后的每次调用都以给定消息失败，直到 `clear_failure`
    pub fn fail_with<S: Into<String>>(&self, message: S) {
        *self.failure.lock() = Some(message.into());
    }

    /// 取消失败注入
    pub fn clear_failure(&self) {
        *self.failure.lock() = None;
    }

    /// 是否已关闭
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// 所有已记录的调用
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// 集合当前内容的快照
    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.collections
            .lock()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// 直接写入文档，不经过调用记录
    pub fn seed(&self, collection: &str, documents: Vec<Document>) {
        self.collections
            .lock()
            .entry(collection.to_string())
            .or_default()
            .extend(documents);
    }

    pub(crate) fn reopen(&self) {
        self.closed.store(false, Ordering::SeqCst);
    }

    fn record(&self, call: RecordedCall) {
        self.calls.lock().push(call);
    }

    /// 检查关闭状态与失败注入
    fn check_available(&self) -> GatewayResult<()> {
        if self.is_closed() {
            return Err(GatewayError::QueryError {
                message: "内存存储已关闭".to_string(),
            });
        }
        if let Some(message) = self.failure.lock().clone() {
            return Err(GatewayError::QueryError { message });
        }
        Ok(())
    }

    fn matches(document: &Document, filter: &Document) -> bool {
        filter.iter().all(|(key, expected)| {
            document
                .get(key)
                .is_some_and(|actual| Self::values_equal(actual, expected))
        })
    }

    /// 按MongoDB的比较规则，不同宽度的数值只比较大小
    fn values_equal(actual: &Bson, expected: &Bson) -> bool {
        match (actual, expected) {
            (Bson::Int32(a), Bson::Int64(b)) => i64::from(*a) == *b,
            (Bson::Int64(a), Bson::Int32(b)) => *a == i64::from(*b),
            (Bson::Double(a), Bson::Int32(b)) | (Bson::Int32(b), Bson::Double(a)) => *a == f64::from(*b),
            (Bson::Double(a), Bson::Int64(b)) | (Bson::Int64(b), Bson::Double(a)) => *a == *b as f64,
            _ => actual == expected,
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn database_name(&self) -> &str {
        &self.database
    }

    async fn insert_one(&self, collection: &str, document: Document) -> GatewayResult<InsertAck> {
        self.record(RecordedCall::Insert {
            collection: collection.to_string(),
            document: document.clone(),
        });
        self.check_available()?;

        let mut stored = document;
        let inserted_id = match stored.get("_id").cloned() {
            Some(id) => id,
            None => {
                let id = Bson::ObjectId(ObjectId::new());
                stored.insert("_id", id.clone());
                id
            }
        };

        let mut collections = self.collections.lock();
        let docs = collections.entry(collection.to_string()).or_default();
        if docs.iter().any(|d| d.get("_id") == Some(&inserted_id)) {
            return Err(GatewayError::QueryError {
                message: format!("E11000 duplicate key error: _id {}", inserted_id),
            });
        }
        docs.push(stored);

        debug!("内存存储插入: 集合={}, _id={}", collection, inserted_id);
        Ok(InsertAck { inserted_id })
    }

    async fn find(&self, collection: &str, filter: Document) -> GatewayResult<DocumentCursor> {
        self.record(RecordedCall::Find {
            collection: collection.to_string(),
            filter: filter.clone(),
        });
        self.check_available()?;

        let matched: Vec<GatewayResult<Document>> = self
            .documents(collection)
            .into_iter()
            .filter(|d| Self::matches(d, &filter))
            .map(Ok)
            .collect();

        Ok(futures::stream::iter(matched).boxed())
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> GatewayResult<UpdateAck> {
        self.record(RecordedCall::Update {
            collection: collection.to_string(),
            filter: filter.clone(),
            update: update.clone(),
        });
        self.check_available()?;

        let mut set_fields = Document::new();
        for (key, value) in &update {
            match (key.as_str(), value) {
                ("$set", Bson::Document(fields)) => {
                    for (field, field_value) in fields {
                        set_fields.insert(field.clone(), field_value.clone());
                    }
                }
                _ => {
                    return Err(GatewayError::QueryError {
                        message: format!("内存存储不支持的更新操作: {}", key),
                    });
                }
            }
        }

        let mut collections = self.collections.lock();
        let target = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| Self::matches(d, &filter)));

        let Some(document) = target else {
            return Ok(UpdateAck::default());
        };

        let mut modified = false;
        for (key, value) in set_fields {
            if document.get(&key) != Some(&value) {
                document.insert(key, value);
                modified = true;
            }
        }

        Ok(UpdateAck {
            matched_count: 1,
            modified_count: u64::from(modified),
        })
    }

    async fn ping(&self) -> GatewayResult<()> {
        self.record(RecordedCall::Ping);
        self.check_available()
    }

    async fn close(&self) -> GatewayResult<()> {
        self.record(RecordedCall::Close);
        if let Some(message) = self.failure.lock().clone() {
            return Err(GatewayError::ConnectionError { message });
        }
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// 内存驱动连接器
///
/// 每次 `open` 都返回同一个共享的 `MemoryStore`，便于测试在连接前后检查其状态
pub struct MemoryConnector {
    store: Arc<MemoryStore>,
    refusal: Mutex<Option<String>>,
    opened: AtomicUsize,
}

impl MemoryConnector {
    /// 创建连接器及其背后的存储
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new("memory")))
    }

    /// 使用已有存储创建连接器
    pub fn with_store(store: Arc<MemoryStore>) -> Self {
        Self {
            store,
            refusal: Mutex::new(None),
            opened: AtomicUsize::new(0),
        }
    }

    /// 共享的内存存储
    pub fn store(&self) -> Arc<MemoryStore> {
        self.store.clone()
    }

    /// 之后的 `open` 以给定消息失败，传入 `None` 恢复
    pub fn refuse_connections(&self, message: Option<String>) {
        *self.refusal.lock() = message;
    }

    /// 成功打开的次数
    pub fn open_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

impl Default for MemoryConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StoreConnector for MemoryConnector {
    async fn open(&self, settings: &ConnectionSettings) -> GatewayResult<Arc<dyn DocumentStore>> {
        if let Some(message) = self.refusal.lock().clone() {
            return Err(GatewayError::ConnectionError { message });
        }

        debug!("打开内存存储: {}", settings.masked_uri());
        self.store.reopen();
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(self.store.clone())
    }
}
