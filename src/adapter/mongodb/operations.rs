//! MongoDB句柄的DocumentStore实现

use crate::adapter::mongodb::MongoStore;
use crate::adapter::{DocumentCursor, DocumentStore};
use crate::error::{GatewayError, GatewayResult};
use crate::types::{InsertAck, UpdateAck};
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use mongodb::bson::{Document, doc};
use rat_logger::debug;

#[async_trait]
impl DocumentStore for MongoStore {
    fn database_name(&self) -> &str {
        self.database.name()
    }

    async fn insert_one(&self, collection: &str, document: Document) -> GatewayResult<InsertAck> {
        debug!("执行MongoDB插入到集合 {}: {:?}", collection, document);

        let result = self
            .collection(collection)
            .insert_one(document, None)
            .await
            .map_err(|e| GatewayError::QueryError {
                message: format!("MongoDB插入失败: {}", e),
            })?;

        Ok(InsertAck {
            inserted_id: result.inserted_id,
        })
    }

    async fn find(&self, collection: &str, filter: Document) -> GatewayResult<DocumentCursor> {
        debug!("执行MongoDB查询: 集合={}, 过滤条件={:?}", collection, filter);

        let cursor = self
            .collection(collection)
            .find(filter, None)
            .await
            .map_err(|e| GatewayError::QueryError {
                message: format!("MongoDB查询失败: {}", e),
            })?;

        Ok(cursor
            .map_err(|e| GatewayError::QueryError {
                message: format!("MongoDB游标读取失败: {}", e),
            })
            .boxed())
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> GatewayResult<UpdateAck> {
        debug!("执行MongoDB更新: 查询={:?}, 更新={:?}", filter, update);

        let result = self
            .collection(collection)
            .update_one(filter, update, None)
            .await
            .map_err(|e| GatewayError::QueryError {
                message: format!("MongoDB更新失败: {}", e),
            })?;

        Ok(UpdateAck {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        })
    }

    async fn ping(&self) -> GatewayResult<()> {
        self.database
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| GatewayError::ConnectionError {
                message: format!("MongoDB ping失败: {}", e),
            })?;
        Ok(())
    }

    async fn close(&self) -> GatewayResult<()> {
        // shutdown 会无限期等待调用方仍持有的游标，这里不等待
        debug!("关闭MongoDB客户端: 数据库={}", self.database.name());
        self.client.clone().shutdown_immediate().await;
        Ok(())
    }
}
