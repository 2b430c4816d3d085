//! 复制到剪贴板
//!
//! 复制失败只记录日志，不展示给用户

use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error};

use crate::view::PanelField;

/// 复制成功标记的显示时长
pub const COPY_FEEDBACK_WINDOW: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
#[error("写入剪贴板失败: {0}")]
pub struct ClipboardError(pub String);

pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// 记录最近一次成功复制的字段，用于显示 ✓ 标记
#[derive(Debug, Default)]
pub struct CopyTracker {
    last: Option<(&'static str, Instant)>,
}

impl CopyTracker {
    pub fn copy<C: Clipboard + ?Sized>(&mut self, clipboard: &mut C, field: &PanelField) -> bool {
        self.copy_at(clipboard, field, Instant::now())
    }

    pub fn copy_at<C: Clipboard + ?Sized>(
        &mut self,
        clipboard: &mut C,
        field: &PanelField,
        now: Instant,
    ) -> bool {
        let Some(text) = field.copy_text.as_deref() else {
            return false;
        };

        match clipboard.write_text(text) {
            Ok(()) => {
                debug!("[Console] 已复制: {}", field.copy_label);
                self.last = Some((field.copy_label, now));
                true
            }
            Err(e) => {
                error!("[Console] 复制失败: {}", e);
                false
            }
        }
    }

    pub fn is_copied(&self, label: &str, now: Instant) -> bool {
        matches!(self.last, Some((copied, at)) if copied == label && now.duration_since(at) < COPY_FEEDBACK_WINDOW)
    }
}
