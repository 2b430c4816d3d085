use crate::http_proxy::{CardUpstream, UpstreamError, UpstreamReply};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info, warn};

const MISSING_CARD_ID: &str = "Card ID is required";
const FETCH_FAILED: &str = "Failed to fetch card information";
const ACTIVATE_FAILED: &str = "Failed to activate card";

#[derive(Clone)]
pub struct AppState {
    pub upstream: CardUpstream,
}

/// 查询卡片信息
///
/// 路径: GET /api/card/{card_id}
pub async fn fetch_card(
    Path(card_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Response {
    if card_id.is_empty() {
        return bad_request().into_response();
    }

    info!("[Proxy] 查询卡片: card_id={}", card_id);
    let result = state.upstream.fetch_card(&card_id).await;
    relay_or_fail(result, &card_id, FETCH_FAILED).into_response()
}

/// 激活卡片
///
/// 路径: POST /api/card/{card_id}/activate
/// 上游响应已包含激活后的完整卡片信息
pub async fn activate_card(
    Path(card_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Response {
    if card_id.is_empty() {
        return bad_request().into_response();
    }

    info!("[Proxy] 激活卡片: card_id={}", card_id);
    let result = state.upstream.activate_card(&card_id).await;
    relay_or_fail(result, &card_id, ACTIVATE_FAILED).into_response()
}

/// 未提供 card_id 的请求
pub async fn missing_card_id() -> impl IntoResponse {
    bad_request()
}

fn bad_request() -> (StatusCode, Json<Value>) {
    warn!("[Proxy] 请求缺少 card_id");
    (StatusCode::BAD_REQUEST, Json(json!({ "error": MISSING_CARD_ID })))
}

/// 健康检查接口
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

/// 透传上游状态码和响应体；传输错误统一转为 500，不暴露内部细节
fn relay_or_fail(
    result: Result<UpstreamReply, UpstreamError>,
    card_id: &str,
    failure: &str,
) -> (StatusCode, Json<Value>) {
    match result {
        Ok(reply) => {
            info!(
                "[Proxy] 转发完成: card_id={}, status={}",
                card_id, reply.status
            );
            (reply.status, Json(reply.body))
        }
        Err(e) => {
            error!("[Proxy] 转发失败: card_id={}, error={}", card_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": failure })),
            )
        }
    }
}
