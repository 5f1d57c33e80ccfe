//! MongoDB驱动连接器
//!
//! 使用官方 `mongodb` crate 建立连接，连接建立后立即执行 `ping`，
//! 使网络或认证错误在connect阶段暴露

use crate::adapter::{DocumentStore, StoreConnector};
use crate::error::{GatewayError, GatewayResult};
use crate::types::ConnectionSettings;
use async_trait::async_trait;
use mongodb::{Client, Collection, Database};
use mongodb::bson::Document;
use rat_logger::{debug, info, warn};
use std::sync::Arc;

/// MongoDB句柄：持有客户端及其派生的数据库句柄
pub struct MongoStore {
    pub(crate) client: Client,
    pub(crate) database: Database,
}

impl MongoStore {
    /// 底层数据库句柄
    pub fn database(&self) -> &Database {
        &self.database
    }

    /// 底层客户端
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// 获取集合句柄
    pub(crate) fn collection(&self, name: &str) -> Collection<Document> {
        self.database.collection::<Document>(name)
    }
}

/// 基于官方驱动的连接器
#[derive(Debug, Default, Clone, Copy)]
pub struct MongoConnector;

impl MongoConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl StoreConnector for MongoConnector {
    async fn open(&self, settings: &ConnectionSettings) -> GatewayResult<Arc<dyn DocumentStore>> {
        debug!("MongoDB连接URI: {}", settings.masked_uri());

        let client = Client::with_uri_str(settings.connection_uri())
            .await
            .map_err(|e| GatewayError::ConnectionError {
                message: crate::i18n::tf("error.mongodb_connection", &[("message", &e.to_string())]),
            })?;

        let database = client.database(&settings.database);
        let store = MongoStore { client, database };

        // with_uri_str 不会真正建立连接，这里用ping确认可达
        if let Err(e) = store.ping().await {
            warn!("MongoDB ping失败，关闭客户端: {}", e);
            store.client.clone().shutdown_immediate().await;
            return Err(GatewayError::ConnectionError {
                message: crate::i18n::tf("error.mongodb_connection", &[("message", &e.to_string())]),
            });
        }

        info!("MongoDB客户端已就绪: 数据库={}", settings.database);
        Ok(Arc::new(store))
    }
}
