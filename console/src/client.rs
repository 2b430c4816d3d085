//! 代理服务客户端
//!
//! 控制器只依赖 [`CardApi`]，实际请求由 [`HttpCardApi`] 发往卡片代理服务

use async_trait::async_trait;
use reqwest::header;
use thiserror::Error;
use tracing::debug;

use crate::models::ApiResponse;

/// 代理服务响应（HTTP 状态码 + 响应体）
#[derive(Debug, Clone, PartialEq)]
pub struct ApiReply {
    pub status: u16,
    pub body: ApiResponse,
}

impl ApiReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("请求代理服务失败: {0}")]
    Request(#[from] reqwest::Error),

    #[error("解析响应失败: {0}")]
    Decode(#[from] serde_json::Error),
}

#[async_trait]
pub trait CardApi: Send + Sync {
    /// 查询卡片信息
    async fn fetch_card(&self, card_id: &str) -> Result<ApiReply, ClientError>;

    /// 激活卡片，响应中包含激活后的完整卡片信息
    async fn activate_card(&self, card_id: &str) -> Result<ApiReply, ClientError>;
}

/// 基于 reqwest 的代理服务客户端
#[derive(Debug, Clone)]
pub struct HttpCardApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCardApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    async fn read_reply(response: reqwest::Response) -> Result<ApiReply, ClientError> {
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        let body = serde_json::from_slice(&bytes)?;
        Ok(ApiReply { status, body })
    }
}

#[async_trait]
impl CardApi for HttpCardApi {
    async fn fetch_card(&self, card_id: &str) -> Result<ApiReply, ClientError> {
        let url = format!("{}/api/card/{}", self.base_url, card_id);
        debug!("[Console] GET {}", url);

        let response = self.client.get(&url).send().await?;
        Self::read_reply(response).await
    }

    async fn activate_card(&self, card_id: &str) -> Result<ApiReply, ClientError> {
        let url = format!("{}/api/card/{}/activate", self.base_url, card_id);
        debug!("[Console] POST {}", url);

        let response = self
            .client
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .send()
            .await?;
        Self::read_reply(response).await
    }
}
