use mongodb::bson::Bson;
use serde::{Deserialize, Serialize};

/// 插入确认，包含驱动分配的 `_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertAck {
    pub inserted_id: Bson,
}

impl InsertAck {
    /// 以十六进制字符串返回ObjectId，非ObjectId时返回其字符串形式
    pub fn id_string(&self) -> String {
        match &self.inserted_id {
            Bson::ObjectId(oid) => oid.to_hex(),
            Bson::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// 更新确认
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UpdateAck {
    /// 匹配过滤条件的文档数
    pub matched_count: u64,
    /// 实际被修改的文档数
    pub modified_count: u64,
}
