//! 过滤条件与更新文档的构造工具

use mongodb::bson::{Bson, Document, doc};

/// 构造过滤文档
///
/// 提供过滤值时生成 `{ <field>: value }` 精确匹配，否则生成空过滤（匹配全部）
pub(crate) fn build_filter_document(filter_field: &str, filter_value: Option<Bson>) -> Document {
    match filter_value {
        Some(value) => {
            let mut filter = Document::new();
            filter.insert(filter_field, value);
            filter
        }
        None => Document::new(),
    }
}

/// 构造字段级合并的更新文档 `{ "$set": data }`
pub(crate) fn build_set_document(data: Document) -> Document {
    doc! { "$set": data }
}
