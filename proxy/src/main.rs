mod config;
mod handler;
mod http_proxy;
mod router;

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ProxyConfig;
use crate::handler::AppState;
use crate::http_proxy::CardUpstream;
use crate::router::create_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载环境变量
    dotenv::dotenv().ok();

    // 加载配置
    let config = Arc::new(ProxyConfig::from_env());

    // 初始化日志
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("card_proxy={},tower_http=info", config.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("启动卡片代理服务...");
    info!("配置信息:");
    info!("  - 监听地址: {}", config.socket_addr());
    info!("  - 卡片查询 API: {}", config.card_api_base);
    info!("  - 卡片激活 API: {}", config.activation_api_base);
    match config.upstream_timeout_ms {
        Some(ms) => info!("  - 上游超时: {}ms", ms),
        None => info!("  - 上游超时: 平台默认"),
    }

    if config.card_api_token.is_empty() {
        warn!("未设置 CARD_API_TOKEN，卡片查询请求可能被上游拒绝");
    }

    // 初始化上游客户端
    let upstream = CardUpstream::new(config.clone()).context("创建 HTTP 客户端失败")?;

    // 创建应用状态
    let state = Arc::new(AppState { upstream });

    // 创建路由
    let app = create_router(state);

    // 启动服务器
    let listener = tokio::net::TcpListener::bind(config.socket_addr())
        .await
        .with_context(|| format!("绑定地址失败: {}", config.socket_addr()))?;
    info!("卡片代理服务监听: http://{}", config.socket_addr());

    axum::serve(listener, app).await?;

    Ok(())
}
