//! 查询 / 激活控制器
//!
//! 状态用 [`ControllerState`] 显式表示，每个状态转换都消费旧快照并返回新快照。
//! 流程：查询卡片 → 检测未激活 → 激活 → 用激活响应覆盖卡片数据。

use std::sync::Arc;
use tracing::{error, info, warn};

use crate::client::{ApiReply, CardApi, ClientError};
use crate::models::{is_card_unactivated, ApiResponse};

pub const MSG_EMPTY_INPUT: &str = "请输入卡片ID";
pub const MSG_FETCH_FAILED: &str = "获取卡片信息失败";
pub const MSG_ACTIVATE_FAILED: &str = "激活失败";

/// 控制器状态快照
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControllerState {
    /// 待提交的输入
    pub card_id: String,
    pub loading: bool,
    pub activating: bool,
    pub card_data: Option<ApiResponse>,
    pub error: Option<String>,
}

impl ControllerState {
    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.card_id = input.into();
        self
    }

    /// 查询或激活进行中（提交按钮禁用）
    pub fn is_busy(&self) -> bool {
        self.loading || self.activating
    }

    /// 当前卡片数据是否需要自动激活
    pub fn needs_activation(&self) -> bool {
        is_card_unactivated(self.card_data.as_ref().and_then(|d| d.result.as_ref()))
    }

    /// 校验输入并进入加载状态，返回去除首尾空白后的 card_id
    ///
    /// 空输入只设置错误信息，不修改 loading 和已有卡片数据
    pub fn begin_submit(mut self) -> Result<(Self, String), Self> {
        let card_id = self.card_id.trim().to_string();
        if card_id.is_empty() {
            self.error = Some(MSG_EMPTY_INPUT.to_string());
            return Err(self);
        }

        self.loading = true;
        self.error = None;
        self.card_data = None;
        Ok((self, card_id))
    }

    pub fn fetch_finished(mut self, outcome: Result<ApiResponse, String>) -> Self {
        self.loading = false;
        match outcome {
            Ok(data) => self.card_data = Some(data),
            Err(message) => self.error = Some(message),
        }
        self
    }

    pub fn activation_started(mut self) -> Self {
        self.activating = true;
        self.error = None;
        self
    }

    /// 激活成功时用激活响应整体替换卡片数据
    pub fn activation_finished(mut self, outcome: Result<ApiResponse, String>) -> Self {
        self.activating = false;
        match outcome {
            Ok(data) => self.card_data = Some(data),
            Err(message) => self.error = Some(message),
        }
        self
    }
}

/// 一次提交的结果：新状态 + 需要随后激活的 card_id
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    pub state: ControllerState,
    pub activate: Option<String>,
}

pub struct CardController<A: CardApi + ?Sized> {
    api: Arc<A>,
}

impl<A: CardApi + ?Sized> Clone for CardController<A> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
        }
    }
}

impl<A: CardApi + ?Sized> CardController<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self { api }
    }

    /// 提交查询
    ///
    /// 不会等待激活；卡片未激活时由调用方在卡片数据展示后再执行 `activate`
    pub async fn submit(&self, state: ControllerState) -> SubmitOutcome {
        let (loading, card_id) = match state.begin_submit() {
            Ok(started) => started,
            Err(rejected) => {
                return SubmitOutcome {
                    state: rejected,
                    activate: None,
                }
            }
        };

        let state = loading.fetch_finished(self.fetch(&card_id).await);
        let activate = if state.needs_activation() {
            info!("[Console] 检测到未激活卡片，开始自动激活: card_id={}", card_id);
            Some(card_id)
        } else {
            None
        };

        SubmitOutcome { state, activate }
    }

    /// 激活卡片（自动触发或单独调用）
    pub async fn activate(&self, state: ControllerState, card_id: &str) -> ControllerState {
        let state = state.activation_started();
        state.activation_finished(self.request_activation(card_id).await)
    }

    /// 查询卡片，失败时返回面向用户的错误信息
    pub async fn fetch(&self, card_id: &str) -> Result<ApiResponse, String> {
        info!("[Console] 正在查询卡片: {}", card_id);
        interpret(self.api.fetch_card(card_id).await, MSG_FETCH_FAILED)
    }

    /// 请求激活，失败时返回面向用户的错误信息
    pub async fn request_activation(&self, card_id: &str) -> Result<ApiResponse, String> {
        info!("[Console] 正在激活卡片: {}", card_id);
        let outcome = interpret(self.api.activate_card(card_id).await, MSG_ACTIVATE_FAILED);
        if outcome.is_ok() {
            info!("[Console] 激活成功，卡片信息已更新: {}", card_id);
        }
        outcome
    }
}

/// 非 2xx 状态或响应体带 error 均视为失败；远端错误信息原样透出，传输错误使用通用提示
fn interpret(
    result: Result<ApiReply, ClientError>,
    fallback: &str,
) -> Result<ApiResponse, String> {
    match result {
        Ok(reply) => {
            if reply.is_success() && reply.body.error_message().is_none() {
                return Ok(reply.body);
            }
            let message = reply.body.error_message().unwrap_or(fallback).to_string();
            warn!("[Console] {}: status={}, error={}", fallback, reply.status, message);
            Err(message)
        }
        Err(e) => {
            error!("[Console] {}: {}", fallback, e);
            Err(fallback.to_string())
        }
    }
}
