use std::env;

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// 服务监听地址
    pub server_addr: String,

    /// 服务监听端口
    pub server_port: u16,

    /// 日志级别
    pub log_level: String,

    /// 卡片查询 API 地址
    pub card_api_base: String,

    /// 卡片查询 API 要求的 origin（referer 由它派生）
    pub card_api_origin: String,

    /// 卡片查询 API 的 Bearer Token
    pub card_api_token: String,

    /// 卡片激活 API 地址
    pub activation_api_base: String,

    /// 上游请求超时时间（毫秒），未设置时使用平台默认值
    pub upstream_timeout_ms: Option<u64>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            server_addr: "0.0.0.0".to_string(),
            server_port: 3000,
            log_level: "info".to_string(),
            card_api_base: "https://api.misacard.com".to_string(),
            card_api_origin: "https://misacard.com".to_string(),
            card_api_token: String::new(),
            activation_api_base: "https://mujicard.com".to_string(),
            upstream_timeout_ms: None,
        }
    }
}

impl ProxyConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or(defaults.server_addr),

            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.server_port),

            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),

            card_api_base: env::var("CARD_API_BASE")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or(defaults.card_api_base),

            card_api_origin: env::var("CARD_API_ORIGIN")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or(defaults.card_api_origin),

            card_api_token: env::var("CARD_API_TOKEN").unwrap_or(defaults.card_api_token),

            activation_api_base: env::var("ACTIVATION_API_BASE")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or(defaults.activation_api_base),

            upstream_timeout_ms: env::var("UPSTREAM_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok()),
        }
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.server_addr, self.server_port)
    }

    /// 卡片查询请求的 referer
    pub fn card_api_referer(&self) -> String {
        format!("{}/", self.card_api_origin)
    }

    /// 卡片激活请求的 referer
    pub fn activation_referer(&self) -> String {
        format!("{}/activate", self.activation_api_base)
    }
}
