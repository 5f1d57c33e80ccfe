//! MongoDB 标识符安全验证
//!
//! 在请求到达驱动之前检查集合名和过滤字段名，
//! 防止 `$` 操作符注入以及写入系统集合

use crate::error::{GatewayError, GatewayResult};

/// 集合名最大字节数（命名空间 `<db>.<collection>` 上限为255）
const MAX_COLLECTION_NAME_BYTES: usize = 255;

/// 标识符验证器
pub struct IdentifierValidator;

impl IdentifierValidator {
    /// 验证集合名的安全性
    ///
    /// # 参数
    /// * `collection_name` - 集合名
    ///
    /// # 返回值
    /// * `Ok(())` - 集合名安全
    /// * `Err(GatewayError)` - 集合名包含非法内容
    pub fn validate_collection_name(collection_name: &str) -> GatewayResult<()> {
        if collection_name.is_empty() {
            return Err(GatewayError::ValidationError {
                field: "collection".to_string(),
                message: "集合名不能为空".to_string(),
            });
        }

        if collection_name.len() > MAX_COLLECTION_NAME_BYTES {
            return Err(GatewayError::ValidationError {
                field: collection_name.to_string(),
                message: format!("集合名长度不能超过{}字节", MAX_COLLECTION_NAME_BYTES),
            });
        }

        // 不能包含$
        if collection_name.contains('$') {
            return Err(GatewayError::ValidationError {
                field: collection_name.to_string(),
                message: "集合名不能包含$".to_string(),
            });
        }

        // 不能包含空字符
        if collection_name.contains('\0') {
            return Err(GatewayError::ValidationError {
                field: collection_name.to_string(),
                message: "集合名不能包含空字符".to_string(),
            });
        }

        // 不能是system集合
        if collection_name.starts_with("system.") {
            return Err(GatewayError::ValidationError {
                field: collection_name.to_string(),
                message: "集合名不能以system.开头".to_string(),
            });
        }

        Ok(())
    }

    /// 验证过滤字段名的安全性
    ///
    /// 过滤字段是顶层字段，因此不允许点号路径
    pub fn validate_field_name(field_name: &str) -> GatewayResult<()> {
        if field_name.is_empty() {
            return Err(GatewayError::ValidationError {
                field: "filter_field".to_string(),
                message: "字段名不能为空".to_string(),
            });
        }

        // 不能以$开头（MongoDB操作符）
        if field_name.starts_with('$') {
            return Err(GatewayError::ValidationError {
                field: field_name.to_string(),
                message: "字段名不能以$开头".to_string(),
            });
        }

        // 不能包含点号（嵌套字段路径分隔符）
        if field_name.contains('.') {
            return Err(GatewayError::ValidationError {
                field: field_name.to_string(),
                message: "字段名不能包含点号".to_string(),
            });
        }

        if field_name.contains('\0') {
            return Err(GatewayError::ValidationError {
                field: field_name.to_string(),
                message: "字段名不能包含空字符".to_string(),
            });
        }

        Ok(())
    }
}
