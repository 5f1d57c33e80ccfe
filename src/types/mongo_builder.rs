use std::collections::BTreeMap;

use crate::types::connection_config::{DEFAULT_APP_NAME, UriScheme};

/// MongoDB 连接URI构建器
///
/// 生成形如
/// `mongodb+srv://<user>:<password>@<host>/<db>?retryWrites=true&w=majority&appName=Cluster0`
/// 的连接字符串
pub struct MongoUriBuilder {
    scheme: UriScheme,
    host: String,
    database: String,
    username: Option<String>,
    password: Option<String>,
    app_name: String,
    options: BTreeMap<String, String>,
}

impl MongoUriBuilder {
    /// 创建新的URI构建器
    pub fn new<H: Into<String>, D: Into<String>>(host: H, database: D) -> Self {
        Self {
            scheme: UriScheme::Srv,
            host: host.into(),
            database: database.into(),
            username: None,
            password: None,
            app_name: DEFAULT_APP_NAME.to_string(),
            options: BTreeMap::new(),
        }
    }

    /// 设置URI方案
    pub fn with_scheme(mut self, scheme: UriScheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// 设置用户名和密码
    pub fn with_auth<U: Into<String>, P: Into<String>>(mut self, username: U, password: P) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// 设置appName
    pub fn with_app_name<A: Into<String>>(mut self, app_name: A) -> Self {
        self.app_name = app_name.into();
        self
    }

    /// 添加自定义选项
    pub fn with_option<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// 生成MongoDB连接URI
    pub fn build_uri(&self) -> String {
        self.render(false)
    }

    /// 生成遮蔽密码的URI
    pub fn build_masked_uri(&self) -> String {
        self.render(true)
    }

    fn render(&self, mask_password: bool) -> String {
        let mut uri = String::from(self.scheme.prefix());

        // 添加认证信息
        if let (Some(username), Some(password)) = (&self.username, &self.password) {
            uri.push_str(&urlencoding::encode(username));
            uri.push(':');
            if mask_password {
                uri.push_str("****");
            } else {
                uri.push_str(&urlencoding::encode(password));
            }
            uri.push('@');
        }

        uri.push_str(&self.host);
        uri.push('/');
        uri.push_str(&self.database);

        // 固定参数在前，自定义选项按键名排序追加
        let mut params = vec![
            "retryWrites=true".to_string(),
            "w=majority".to_string(),
            format!("appName={}", urlencoding::encode(&self.app_name)),
        ];

        for (key, value) in &self.options {
            params.push(format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            ));
        }

        uri.push('?');
        uri.push_str(&params.join("&"));

        uri
    }
}
