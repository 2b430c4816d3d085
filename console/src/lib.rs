//! 卡片查询与自动激活控制台
//!
//! 查询卡片 → 检测未激活 → 自动激活 → 用激活响应更新视图

pub mod client;
pub mod clipboard;
pub mod controller;
pub mod models;
pub mod session;
pub mod view;

#[cfg(test)]
mod testing;

pub use client::{ApiReply, CardApi, ClientError, HttpCardApi};
pub use clipboard::{Clipboard, ClipboardError, CopyTracker};
pub use controller::{CardController, ControllerState, SubmitOutcome};
pub use models::{is_card_unactivated, ApiResponse, CardInfo};
pub use session::{Session, SessionError, SubmitHandle};
pub use view::{render, CardPanel, PanelField, View};
