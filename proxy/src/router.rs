use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handler::{activate_card, fetch_card, health_check, missing_card_id, AppState};

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // 卡片路由（转发到第三方卡片服务）
    let card_routes = Router::new()
        .route("/card", get(missing_card_id))
        .route("/card/", get(missing_card_id))
        .route("/card/{card_id}", get(fetch_card))
        .route("/card/{card_id}/activate", post(activate_card))
        .with_state(state);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", card_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
