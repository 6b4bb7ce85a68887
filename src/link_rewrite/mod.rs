//! 内嵌链接改写模块
//!
//! # 设计思路
//!
//! 仅当当前文档被嵌入在其他框架内时生效（顶层文档直接跳过）。
//! 对每个超链接：
//! - 安全方案绝对链接或页面文档引用 → 强制 `target="_top"`，
//!   点击后在顶层浏览上下文中导航；
//! - 相对页面引用 → 按 [`path_map`] 规则把静态资源前缀段映射为页面前缀段。
//!
//! # 实现思路
//!
//! - 嵌入判定比较 `window` 与 `window.top` 的对象同一性。
//! - 遍历与属性改写是薄接线层；路径逻辑全部在 [`path_map`] 纯函数中。
//! - 无任何持久状态，重复执行只是把已改写的属性重写一遍。

pub mod path_map;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, NodeList, Window};

use crate::config::EnhanceConfig;
use crate::error::EnhanceError;

/// 对当前文档执行一次链接改写。
///
/// # 返回
/// 被触达（设置 target 或改写 href）的链接数量；顶层文档恒为 0。
pub fn rewrite_document_links(
    window: &Window,
    document: &Document,
    config: &EnhanceConfig,
) -> Result<u32, EnhanceError> {
    if !is_embedded(window) {
        log::debug!("链接改写：当前为顶层文档，跳过");
        return Ok(0);
    }
    let current_path = window
        .location()
        .pathname()
        .map_err(|err| EnhanceError::dom("读取当前路径失败", err))?;
    let anchors = document
        .query_selector_all("a[href]")
        .map_err(|err| EnhanceError::dom("超链接查询失败", err))?;
    rewrite_anchor_list(&anchors, &current_path, config)
}

/// 对指定子树内的链接执行改写（不做嵌入判定，供测试与动态内容复用）。
pub fn rewrite_anchors_within(
    root: &Element,
    current_path: &str,
    config: &EnhanceConfig,
) -> Result<u32, EnhanceError> {
    let anchors = root
        .query_selector_all("a[href]")
        .map_err(|err| EnhanceError::dom("超链接查询失败", err))?;
    rewrite_anchor_list(&anchors, current_path, config)
}

fn rewrite_anchor_list(
    anchors: &NodeList,
    current_path: &str,
    config: &EnhanceConfig,
) -> Result<u32, EnhanceError> {
    let mut touched = 0;
    for index in 0..anchors.length() {
        let Some(anchor) = anchors
            .get(index)
            .and_then(|node| node.dyn_into::<Element>().ok())
        else {
            continue;
        };
        let Some(href) = anchor.get_attribute("href") else {
            continue;
        };

        let mut changed = false;
        if path_map::needs_top_target(&href) {
            anchor
                .set_attribute("target", "_top")
                .map_err(|err| EnhanceError::dom("设置链接 target 失败", err))?;
            changed = true;
        }
        if path_map::is_relative_page(&href) {
            let rewritten = path_map::rewrite_relative(
                current_path,
                &href,
                &config.static_prefix,
                &config.pages_prefix,
            );
            anchor
                .set_attribute("href", &rewritten)
                .map_err(|err| EnhanceError::dom("改写链接 href 失败", err))?;
            changed = true;
        }
        if changed {
            touched += 1;
        }
    }
    Ok(touched)
}

/// 当前窗口是否被嵌入在其他框架内。
///
/// `window.top` 读取失败按未嵌入处理（宁可不改写，也不在异常环境下误动链接）。
fn is_embedded(window: &Window) -> bool {
    match window.top() {
        Ok(Some(top)) => {
            AsRef::<JsValue>::as_ref(window) != AsRef::<JsValue>::as_ref(&top)
        }
        // top 为空视作脱离层级的框架，按嵌入处理
        Ok(None) => true,
        Err(err) => {
            log::warn!("读取 window.top 失败，按顶层文档处理: {:?}", err);
            false
        }
    }
}
