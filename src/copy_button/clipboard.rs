//! 剪贴板能力提供者模块
//!
//! # 设计思路
//!
//! 浏览器剪贴板存在两代能力：异步剪贴板 API 与选中复制（`execCommand`）。
//! 以 `ClipboardProvider` 枚举在启动时做一次能力探测（工厂选择），
//! 运行期不再做内联分支判断。
//!
//! # 实现思路
//!
//! - 探测通过 `Reflect` 检查 `navigator.clipboard` 是否存在，
//!   避免在缺失该 API 的环境中触发绑定层异常。
//! - 异步写入被拒绝（权限、不安全上下文等）时自动降级到选中复制。
//! - 选中复制使用临时离屏文本框，复制后立即移除；无论哪条路径失败，
//!   错误都收敛为 `Result`，绝不越过点击处理器向外抛出。

use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Clipboard, Document, HtmlDocument, HtmlInputElement, Window};

use crate::error::{EnhanceError, js_value_message};

/// 剪贴板写入能力提供者。
///
/// 启动时经 [`ClipboardProvider::detect`] 选定一种实现，之后保持不变。
pub(crate) enum ClipboardProvider {
    /// 异步剪贴板 API（`navigator.clipboard.writeText`）。
    AsyncApi(Clipboard),
    /// 选中复制兜底（临时文本框 + `execCommand("copy")`）。
    SelectCopy,
}

impl ClipboardProvider {
    /// 探测当前环境可用的剪贴板能力。
    pub(crate) fn detect(window: &Window) -> Self {
        let navigator = window.navigator();
        let available = js_sys::Reflect::get(navigator.as_ref(), &JsValue::from_str("clipboard"))
            .map(|value| !value.is_undefined() && !value.is_null())
            .unwrap_or(false);

        if available {
            log::debug!("剪贴板能力：异步 API");
            Self::AsyncApi(navigator.clipboard())
        } else {
            log::info!("异步剪贴板 API 不可用，使用选中复制兜底");
            Self::SelectCopy
        }
    }

    /// 将文本写入系统剪贴板。
    ///
    /// 异步 API 路径失败时自动降级到选中复制；
    /// 两条路径都失败才返回 `Err`，由调用方静默处理。
    pub(crate) async fn copy(&self, document: &Document, text: &str) -> Result<(), EnhanceError> {
        match self {
            Self::AsyncApi(clipboard) => match JsFuture::from(clipboard.write_text(text)).await {
                Ok(_) => Ok(()),
                Err(err) => {
                    log::debug!("异步剪贴板写入被拒绝，降级选中复制: {}", js_value_message(&err));
                    select_copy(document, text)
                }
            },
            Self::SelectCopy => select_copy(document, text),
        }
    }
}

/// 选中复制：创建离屏文本框 → 选中 → `execCommand("copy")` → 移除。
fn select_copy(document: &Document, text: &str) -> Result<(), EnhanceError> {
    let input: HtmlInputElement = document
        .create_element("input")
        .map_err(|err| EnhanceError::dom("创建临时文本框失败", err))?
        .dyn_into()
        .map_err(|_| EnhanceError::Dom("临时文本框类型转换失败".to_string()))?;

    input.set_value(text);
    let style = input.style();
    let _ = style.set_property("position", "fixed");
    let _ = style.set_property("top", "-1000px");
    let _ = style.set_property("opacity", "0");

    let body = document
        .body()
        .ok_or_else(|| EnhanceError::Dom("document.body 不存在".to_string()))?;
    body.append_child(input.as_ref())
        .map_err(|err| EnhanceError::dom("挂载临时文本框失败", err))?;

    input.select();
    let result = document
        .clone()
        .dyn_into::<HtmlDocument>()
        .map_err(|_| EnhanceError::Dom("document 不支持 execCommand".to_string()))
        .and_then(|html_doc| {
            html_doc
                .exec_command("copy")
                .map_err(|err| EnhanceError::dom("execCommand 执行失败", err))
        });

    // 无论复制是否成功，临时元素必须移除
    input.remove();

    match result {
        Ok(true) => Ok(()),
        Ok(false) => Err(EnhanceError::Clipboard(
            "execCommand(\"copy\") 返回失败".to_string(),
        )),
        Err(err) => Err(err),
    }
}
