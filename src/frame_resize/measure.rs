//! 高度测算模块
//!
//! # 设计思路
//!
//! 自适应高度的纯逻辑部分：内容高度取根元素与 body 滚动高度的较大值；
//! `HeightTracker` 缓存最近一次生效高度，只有变化时才允许写回，
//! 避免对 `style.height` 的冗余写入。
//!
//! # 实现思路
//!
//! - `apply` 返回 `Some(高度)` 表示需要写回并已更新缓存，`None` 表示无变化。
//! - 框架重新加载时调用 `reset` 丢弃缓存，新文档从首次测量重新建立。

/// 计算内嵌文档的内容高度。
///
/// # 参数
/// * `root_scroll_height` - 根元素（`documentElement`）滚动高度
/// * `body_scroll_height` - body 滚动高度（body 缺失时为 `None`）
pub fn content_height(root_scroll_height: i32, body_scroll_height: Option<i32>) -> i32 {
    root_scroll_height.max(body_scroll_height.unwrap_or(0))
}

/// 单个 iframe 的高度缓存。
#[derive(Debug, Default)]
pub struct HeightTracker {
    last: Option<i32>,
}

impl HeightTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 提交一次测量值。
    ///
    /// # 返回
    /// - `Some(h)` — 高度发生变化，调用方应写回样式
    /// - `None` — 与上次一致，跳过写入
    pub fn apply(&mut self, measured: i32) -> Option<i32> {
        if self.last == Some(measured) {
            return None;
        }
        self.last = Some(measured);
        Some(measured)
    }

    /// 丢弃缓存（iframe 重新加载时调用）。
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_height_takes_max() {
        assert_eq!(content_height(800, Some(950)), 950);
        assert_eq!(content_height(950, Some(800)), 950);
        assert_eq!(content_height(800, None), 800);
    }

    #[test]
    fn test_tracker_writes_once_per_change() {
        let mut tracker = HeightTracker::new();
        assert_eq!(tracker.apply(800), Some(800));
        assert_eq!(tracker.apply(800), None);
        assert_eq!(tracker.apply(950), Some(950));
        assert_eq!(tracker.apply(950), None);
    }

    #[test]
    fn test_tracker_reset_forces_rewrite() {
        let mut tracker = HeightTracker::new();
        assert_eq!(tracker.apply(800), Some(800));
        tracker.reset();
        assert_eq!(tracker.apply(800), Some(800));
    }
}
