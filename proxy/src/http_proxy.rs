//! HTTP 代理模块
//!
//! 将卡片查询和激活请求转发到第三方卡片服务，附加固定请求头，原样返回 JSON 响应

use axum::http::{header, StatusCode};
use reqwest::Url;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::ProxyConfig;

const ACCEPT_ANY: &str = "application/json, text/plain, */*";

/// 上游响应（状态码 + JSON 响应体）
#[derive(Debug)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub body: Value,
}

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("上游请求失败: {0}")]
    Request(#[source] reqwest::Error),

    #[error("解析上游响应失败: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("上游地址无效: {0}")]
    InvalidUrl(String),
}

/// 第三方卡片服务客户端
#[derive(Clone)]
pub struct CardUpstream {
    client: reqwest::Client,
    config: Arc<ProxyConfig>,
}

impl CardUpstream {
    pub fn new(config: Arc<ProxyConfig>) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(ms) = config.upstream_timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }

        Ok(Self {
            client: builder.build()?,
            config,
        })
    }

    /// GET {card_api_base}/api/card/{card_id}
    pub async fn fetch_card(&self, card_id: &str) -> Result<UpstreamReply, UpstreamError> {
        let url = upstream_url(&self.config.card_api_base, &["api", "card", card_id])?;
        debug!("[Proxy] 查询卡片: {}", url);

        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, ACCEPT_ANY)
            .bearer_auth(&self.config.card_api_token)
            .header(header::ORIGIN, &self.config.card_api_origin)
            .header(header::REFERER, self.config.card_api_referer())
            .send()
            .await
            .map_err(UpstreamError::Request)?;

        relay(response).await
    }

    /// POST {activation_api_base}/api/card/activate/{card_id}（无请求体）
    pub async fn activate_card(&self, card_id: &str) -> Result<UpstreamReply, UpstreamError> {
        let url = upstream_url(
            &self.config.activation_api_base,
            &["api", "card", "activate", card_id],
        )?;
        debug!("[Proxy] 激活卡片: {}", url);

        let response = self
            .client
            .post(url)
            .header(header::ACCEPT, ACCEPT_ANY)
            .header(header::REFERER, self.config.activation_referer())
            .header(header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(UpstreamError::Request)?;

        relay(response).await
    }
}

/// 拼接上游地址，卡片 ID 作为单个路径段编码（`/`、`?` 等不会改变目标路径）
fn upstream_url(base: &str, segments: &[&str]) -> Result<Url, UpstreamError> {
    let mut url = Url::parse(base).map_err(|e| UpstreamError::InvalidUrl(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| UpstreamError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

async fn relay(response: reqwest::Response) -> Result<UpstreamReply, UpstreamError> {
    let status = response.status();
    info!("[Proxy] 上游响应: {} {}", response.url().path(), status);

    let body = response
        .json::<Value>()
        .await
        .map_err(UpstreamError::Decode)?;

    Ok(UpstreamReply { status, body })
}
