//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `EnhanceError` 枚举，替代各模块中分散的
//! `.map_err(|e| format!(...))`、`expect()` 等不一致模式。
//!
//! 页面增强的失败必须全部就地兜底，任何组件失败都不得影响页面，
//! 因此该类型主要服务于内部传递与日志；只有 wasm 导出函数会把它
//! 转换为 `JsValue` 透传给调用方。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - `From<EnhanceError> for JsValue` 将错误转为字符串，满足 wasm 边界要求。
//! - `js_value_message` 把浏览器侧抛出的 `JsValue` 压成单行文本，便于日志。

use wasm_bindgen::JsValue;

/// 页面增强统一错误类型
///
/// 所有 wasm 导出函数均返回 `Result<T, JsValue>`，内部统一先收敛到此类型。
#[derive(Debug, thiserror::Error)]
pub enum EnhanceError {
    /// DOM 查询 / 节点操作失败
    #[error("DOM 操作失败: {0}")]
    Dom(String),

    /// 剪贴板写入失败（异步 API 与选中复制兜底均失败）
    #[error("剪贴板操作失败: {0}")]
    Clipboard(String),

    /// 页面内嵌配置解析失败
    #[error("配置解析失败: {0}")]
    Config(String),

    /// 尺寸观察（ResizeObserver / 定时器回退）相关失败
    #[error("尺寸观察失败: {0}")]
    Observe(String),
}

impl EnhanceError {
    /// 将浏览器抛出的 `JsValue` 连同上下文收敛为 [`EnhanceError::Dom`]。
    pub(crate) fn dom(context: &str, err: JsValue) -> Self {
        Self::Dom(format!("{context}: {}", js_value_message(&err)))
    }

    /// 将浏览器抛出的 `JsValue` 连同上下文收敛为 [`EnhanceError::Observe`]。
    pub(crate) fn observe(context: &str, err: JsValue) -> Self {
        Self::Observe(format!("{context}: {}", js_value_message(&err)))
    }
}

/// wasm 边界要求错误可转换为 `JsValue`。
/// 与后端 IPC 序列化同理：对外只暴露人类可读的字符串。
impl From<EnhanceError> for JsValue {
    fn from(error: EnhanceError) -> Self {
        JsValue::from_str(&error.to_string())
    }
}

/// 提取 `JsValue` 错误的可读文本。
///
/// 浏览器抛出的异常可能是 `Error` 对象、字符串或任意值，
/// 统一压成一行，避免日志里出现 `[object Object]` 式噪音。
pub(crate) fn js_value_message(err: &JsValue) -> String {
    if let Some(text) = err.as_string() {
        return text;
    }
    js_sys::JSON::stringify(err)
        .ok()
        .and_then(|s| s.as_string())
        .unwrap_or_else(|| format!("{err:?}"))
}
