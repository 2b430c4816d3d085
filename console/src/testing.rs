//! 测试辅助：按脚本返回响应的 CardApi

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::client::{ApiReply, CardApi, ClientError};
use crate::models::{ApiResponse, CardInfo};

type Scripted = Mutex<VecDeque<Result<ApiReply, ClientError>>>;

#[derive(Default)]
pub struct ScriptedApi {
    fetch: Scripted,
    activate: Scripted,
    calls: Mutex<Vec<String>>,
    /// 设置后激活请求会等待放行
    activation_gate: Option<Arc<Notify>>,
}

impl ScriptedApi {
    pub fn gated(gate: Arc<Notify>) -> Self {
        Self {
            activation_gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn push_fetch(&self, reply: Result<ApiReply, ClientError>) {
        self.fetch.lock().unwrap().push_back(reply);
    }

    pub fn push_activate(&self, reply: Result<ApiReply, ClientError>) {
        self.activate.lock().unwrap().push_back(reply);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn decode_error() -> ClientError {
        ClientError::Decode(serde_json::from_str::<ApiResponse>("not json").unwrap_err())
    }

    fn next(&self, script: &Scripted, call: String) -> Result<ApiReply, ClientError> {
        self.calls.lock().unwrap().push(call.clone());
        script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted reply for {}", call))
    }
}

#[async_trait]
impl CardApi for ScriptedApi {
    async fn fetch_card(&self, card_id: &str) -> Result<ApiReply, ClientError> {
        self.next(&self.fetch, format!("fetch:{}", card_id))
    }

    async fn activate_card(&self, card_id: &str) -> Result<ApiReply, ClientError> {
        let call = format!("activate:{}", card_id);
        if let Some(gate) = &self.activation_gate {
            self.calls.lock().unwrap().push(call.clone());
            gate.notified().await;
            return self
                .activate
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| panic!("no scripted reply for {}", call));
        }
        self.next(&self.activate, call)
    }
}

pub fn reply(status: u16, body: ApiResponse) -> ApiReply {
    ApiReply { status, body }
}

pub fn envelope(result: Option<CardInfo>, error: Option<&str>) -> ApiResponse {
    ApiResponse {
        result,
        msg: None,
        error: error.map(str::to_string),
    }
}

pub fn unactivated_card(id: &str) -> CardInfo {
    CardInfo {
        id: id.to_string(),
        card_nickname: "Mio".to_string(),
        create_time: "2025-01-31T04:34:56Z".to_string(),
        card_limit: 100.0,
        status: "正常".to_string(),
        ..CardInfo::default()
    }
}

pub fn activated_card(id: &str) -> CardInfo {
    CardInfo {
        card_number: Some(4111111111111111),
        card_cvc: Some("123".to_string()),
        card_exp_date: Some("12/27".to_string()),
        card_activation_time: Some("2025-02-01T08:00:00Z".to_string()),
        ..unactivated_card(id)
    }
}
