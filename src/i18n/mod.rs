//! 多语言错误消息模块
//!
//! 使用rat_embed_lang框架提供统一的错误消息多语言支持

use std::collections::HashMap;
use std::sync::Once;
use rat_embed_lang::register_translations;

// rat_embed_lang 遇到重复键会panic，翻译表只能注册一次
static REGISTER: Once = Once::new();

/// 错误消息翻译注册器
pub struct ErrorMessageI18n;

impl ErrorMessageI18n {
    /// 注册单条翻译（zh-CN / en-US / ja-JP）
    fn insert(
        translations: &mut HashMap<String, HashMap<String, String>>,
        key: &str,
        zh: &str,
        en: &str,
        ja: &str,
    ) {
        let mut entry = HashMap::new();
        entry.insert("zh-CN".to_string(), zh.to_string());
        entry.insert("en-US".to_string(), en.to_string());
        entry.insert("ja-JP".to_string(), ja.to_string());
        translations.insert(key.to_string(), entry);
    }

    /// 注册所有错误消息翻译
    fn register_all_translations() {
        let mut translations = HashMap::new();

        // 数据库连接错误
        Self::insert(
            &mut translations,
            "error.connection",
            "数据库连接失败: {message}",
            "Database connection failed: {message}",
            "データベース接続に失敗しました: {message}",
        );

        // 未连接
        Self::insert(
            &mut translations,
            "error.not_connected",
            "网关尚未连接到MongoDB，请先调用connect",
            "Gateway is not connected to MongoDB, call connect first",
            "ゲートウェイはMongoDBに接続されていません。先にconnectを呼び出してください",
        );

        // 查询错误
        Self::insert(
            &mut translations,
            "error.query",
            "查询执行失败: {message}",
            "Query execution failed: {message}",
            "クエリ実行が失敗しました: {message}",
        );

        // 参数验证错误
        Self::insert(
            &mut translations,
            "error.validation",
            "参数验证失败: {field} - {message}",
            "Validation failed: {field} - {message}",
            "検証が失敗しました: {field} - {message}",
        );

        // 配置错误
        Self::insert(
            &mut translations,
            "error.config",
            "配置错误: {message}",
            "Configuration error: {message}",
            "設定エラー: {message}",
        );

        // 序列化错误
        Self::insert(
            &mut translations,
            "error.serialization",
            "数据序列化失败: {message}",
            "Data serialization failed: {message}",
            "データシリアライズが失敗しました: {message}",
        );

        // MongoDB连接失败
        Self::insert(
            &mut translations,
            "error.mongodb_connection",
            "MongoDB连接失败: {message}",
            "MongoDB connection failed: {message}",
            "MongoDB接続失敗: {message}",
        );

        // 环境变量缺失
        Self::insert(
            &mut translations,
            "error.env_missing",
            "缺少环境变量: {name}",
            "Missing environment variable: {name}",
            "環境変数がありません: {name}",
        );

        // 全局网关
        Self::insert(
            &mut translations,
            "error.global_already_initialized",
            "全局网关已经初始化",
            "Global gateway already initialized",
            "グローバルゲートウェイは既に初期化されています",
        );

        // 注册所有翻译
        register_translations(translations);
    }

    /// 初始化错误消息多语言支持，可重复调用
    pub fn init() {
        REGISTER.call_once(|| {
            Self::register_all_translations();

            // 从环境变量获取语言设置，默认为zh-CN
            let lang = std::env::var("RAT_LANG")
                .or_else(|_| std::env::var("LANG"))
                .unwrap_or_else(|_| "zh-CN".to_string());

            // 标准化语言代码
            use rat_embed_lang::normalize_language_code;
            let normalized_lang = normalize_language_code(&lang);
            set_language(&normalized_lang);
        });
    }
}


/// 重新导出rat_embed_lang的核心函数
pub use rat_embed_lang::{t, tf, set_language, current_language};
