//! # 全局网关实例
//!
//! 进程内共享一个网关：启动时显式 `init_global_gateway`，退出前 `shutdown_global_gateway`

use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::gateway::MongoGateway;
use rat_logger::info;
use std::sync::Arc;

/// 全局网关实例
static GLOBAL_GATEWAY: once_cell::sync::Lazy<tokio::sync::RwLock<Option<Arc<MongoGateway>>>> =
    once_cell::sync::Lazy::new(|| tokio::sync::RwLock::new(None));

/// 使用官方驱动创建、连接并安装全局网关
pub async fn init_global_gateway(config: GatewayConfig) -> GatewayResult<Arc<MongoGateway>> {
    install_global_gateway(MongoGateway::new(config)).await
}

/// 连接并安装一个已构造好的网关
///
/// 已存在全局网关时返回配置错误；连接失败时不会安装
pub async fn install_global_gateway(gateway: MongoGateway) -> GatewayResult<Arc<MongoGateway>> {
    let mut slot = GLOBAL_GATEWAY.write().await;
    if slot.is_some() {
        return Err(crate::gateway_error!(
            config,
            crate::i18n::t("error.global_already_initialized")
        ));
    }

    gateway.connect().await?;

    let gateway = Arc::new(gateway);
    *slot = Some(gateway.clone());
    info!("全局MongoDB网关已初始化");
    Ok(gateway)
}

/// 获取全局网关
pub async fn global_gateway() -> GatewayResult<Arc<MongoGateway>> {
    GLOBAL_GATEWAY
        .read()
        .await
        .as_ref()
        .cloned()
        .ok_or(GatewayError::NotConnected)
}

/// 关闭并移除全局网关，未初始化时直接返回
///
/// 关闭失败时网关保持安装
pub async fn shutdown_global_gateway() -> GatewayResult<()> {
    let mut slot = GLOBAL_GATEWAY.write().await;
    let Some(gateway) = slot.as_ref() else {
        return Ok(());
    };

    gateway.close().await?;
    *slot = None;
    info!("全局MongoDB网关已关闭");
    Ok(())
}
