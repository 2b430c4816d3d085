//! 视图
//!
//! 视图完全由 [`ControllerState`] 决定：加载骨架、错误提示、卡片详情三者互斥。

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use std::fmt;

use crate::controller::ControllerState;
use crate::models::CardInfo;

pub const PLACEHOLDER: &str = "暂无";
pub const DEFAULT_BILLING_ADDRESS: &str = "131 Lupine Drive, Torrington, WY 82240";
pub const DELETED_STATUS: &str = "已删除";
/// 账单地址复制后按"地址"标记
pub const BILLING_COPY_LABEL: &str = "地址";

const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";
const SKELETON_ROWS: usize = 6;

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Idle,
    Loading,
    Error(String),
    Detail(CardPanel),
}

/// 卡片详情面板
#[derive(Debug, Clone, PartialEq)]
pub struct CardPanel {
    /// 激活中提示，叠加在详情面板上
    pub activating: bool,
    pub card_limit: f64,
    pub deleted: bool,
    pub fields: Vec<PanelField>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelField {
    pub label: &'static str,
    pub value: String,
    /// 复制按钮写入剪贴板的内容，`None` 表示该字段不可复制
    pub copy_text: Option<String>,
    /// 复制成功标记对应的名称
    pub copy_label: &'static str,
}

impl PanelField {
    fn copyable(label: &'static str, value: Option<String>) -> Self {
        Self {
            label,
            copy_label: label,
            copy_text: Some(value.clone().unwrap_or_default()),
            value: value.unwrap_or_else(|| PLACEHOLDER.to_string()),
        }
    }
}

impl CardPanel {
    pub fn field(&self, label: &str) -> Option<&PanelField> {
        self.fields.iter().find(|f| f.label == label)
    }
}

/// 按本地时区渲染
pub fn render(state: &ControllerState) -> View {
    render_in(state, &Local)
}

pub fn render_in<Tz: TimeZone>(state: &ControllerState, tz: &Tz) -> View
where
    Tz::Offset: fmt::Display,
{
    if state.loading {
        return View::Loading;
    }
    if let Some(error) = &state.error {
        return View::Error(error.clone());
    }
    match state.card_data.as_ref().and_then(|d| d.result.as_ref()) {
        Some(card) => View::Detail(card_panel(card, state.activating, tz)),
        None => View::Idle,
    }
}

fn card_panel<Tz: TimeZone>(card: &CardInfo, activating: bool, tz: &Tz) -> CardPanel
where
    Tz::Offset: fmt::Display,
{
    let billing_address = card
        .billing_address
        .clone()
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| DEFAULT_BILLING_ADDRESS.to_string());

    // 已删除的卡片显示删除时间
    let expires_at = card
        .delete_date
        .as_deref()
        .filter(|d| !d.is_empty())
        .unwrap_or(&card.create_time);

    CardPanel {
        activating,
        card_limit: card.card_limit,
        deleted: card.status == DELETED_STATUS,
        fields: vec![
            PanelField::copyable("卡密", Some(card.id.clone())),
            PanelField::copyable("卡号", card.card_number.map(|n| n.to_string())),
            PanelField::copyable("有效期", card.card_exp_date.clone()),
            PanelField::copyable("CVC", card.card_cvc.clone()),
            PanelField {
                label: "到期时间",
                value: format_timestamp(expires_at, tz),
                copy_text: None,
                copy_label: "到期时间",
            },
            PanelField {
                copy_label: BILLING_COPY_LABEL,
                ..PanelField::copyable("账单地址", Some(billing_address))
            },
        ],
    }
}

/// 格式化为 `YYYY/MM/DD HH:MM:SS`（24 小时制）
///
/// 不带时区的时间按本地时间处理；无法解析时原样返回
pub fn format_timestamp<Tz: TimeZone>(raw: &str, tz: &Tz) -> String
where
    Tz::Offset: fmt::Display,
{
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(tz).format(TIMESTAMP_FORMAT).to_string();
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .and_then(|naive| tz.from_local_datetime(&naive).earliest())
        .map(|dt| dt.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| raw.to_string())
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Idle => Ok(()),
            View::Loading => {
                for _ in 0..SKELETON_ROWS {
                    writeln!(f, "░░░░  ░░░░░░░░░░░░")?;
                }
                Ok(())
            }
            View::Error(message) => writeln!(f, "错误: {}", message),
            View::Detail(panel) => {
                if panel.activating {
                    writeln!(f, "正在激活卡片...")?;
                }
                write!(f, "额度: {}", panel.card_limit)?;
                if panel.deleted {
                    write!(f, "  {}", DELETED_STATUS)?;
                }
                writeln!(f)?;
                for field in &panel.fields {
                    writeln!(f, "{}: {}", field.label, field.value)?;
                }
                Ok(())
            }
        }
    }
}
