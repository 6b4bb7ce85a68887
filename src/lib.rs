//! # 文档站页面增强 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 文档站页面 (静态 HTML)                    │
//! │                                                          │
//! │   .CodeBlock ── a[href] ── iframe.autoresize             │
//! │        ↕            ↕            ↕                       │
//! └────────┼────────────┼────────────┼───────────────────────┘
//!          ↕ wasm-bindgen（启动自动执行 + 手动重扫导出）
//! ┌────────┼────────────┼────────────┼───────────────────────┐
//! │        ↕        本库 (Rust → WASM)                       │
//! │                                                          │
//! │  ┌─ error ──────── EnhanceError (统一错误类型)            │
//! │  │                                                       │
//! │  ├─ config ─────── EnhanceConfig (页面内嵌 JSON 覆盖)     │
//! │  │                                                       │
//! │  ├─ dom ────────── EventSource / 就绪调度 / 帧节流阀      │
//! │  │                                                       │
//! │  ├─ copy_button ── 发现·幂等·id 分配·点击复制             │
//! │  │   ├─ extract        纯函数文案提取（双模式）           │
//! │  │   └─ clipboard      剪贴板能力提供者（异步/选中复制）  │
//! │  │                                                       │
//! │  ├─ link_rewrite ── 内嵌链接改写                          │
//! │  │   └─ path_map       纯函数路径映射                     │
//! │  │                                                       │
//! │  └─ frame_resize ── iframe 自适应高度                     │
//! │      ├─ measure        纯函数高度测算 + 变更去重          │
//! │      └─ observer       尺寸观察能力提供者（原生/定时器）  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `EnhanceError`，wasm 边界转字符串 |
//! | [`config`] | 选择器/前缀/延迟等可调策略，页面内嵌 JSON 覆盖 |
//! | [`copy_button`] | 代码块复制按钮：发现、幂等、文案提取、剪贴板写入 |
//! | [`link_rewrite`] | 内嵌框架中的链接改写与顶层跳转 |
//! | [`frame_resize`] | iframe 高度跟随内嵌文档内容高度 |
//!
//! 三个组件互不通信，各自只操作自己负责的 DOM 子树；
//! 任何一个初始化失败都不影响其余组件（受限模式继续运行）。

pub mod config;
pub mod copy_button;
pub mod error;
pub mod frame_resize;
pub mod link_rewrite;

mod dom;

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::wasm_bindgen;
use web_sys::Element;

use crate::config::EnhanceConfig;
use crate::copy_button::CopyButtonAugmenter;
use crate::error::EnhanceError;
use crate::frame_resize::ResizeWatch;

/// 页面级状态：配置与各组件实例，启动时创建一次，导出函数复用。
struct PageState {
    config: Rc<EnhanceConfig>,
    augmenter: CopyButtonAugmenter,
    watch: ResizeWatch,
}

thread_local! {
    static PAGE: RefCell<Option<PageState>> = const { RefCell::new(None) };
}

/// 取页面级状态执行 `run`，首次调用时完成初始化（配置加载 + 能力探测）。
fn with_page<T>(run: impl FnOnce(&PageState) -> Result<T, EnhanceError>) -> Result<T, EnhanceError> {
    PAGE.with(|cell| {
        let mut slot = cell.borrow_mut();
        if slot.is_none() {
            let window = dom::window()?;
            let document = dom::document()?;
            let config = Rc::new(EnhanceConfig::load(&document));
            let state = PageState {
                augmenter: CopyButtonAugmenter::new(Rc::clone(&config), &window),
                watch: ResizeWatch::detect(),
                config,
            };
            *slot = Some(state);
        }
        // 上面刚保证过 Some，这里的分支只是避免 unwrap
        match slot.as_ref() {
            Some(state) => run(state),
            None => Err(EnhanceError::Dom("页面状态初始化失败".to_string())),
        }
    })
}

/// wasm 入口：装好日志与 panic 钩子，文档就绪后执行一次页面增强。
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let document = dom::document()?;
    dom::on_ready(&document, || {
        if let Err(err) = enhance_page() {
            log::error!("页面增强初始化失败: {err}");
        }
    })?;
    Ok(())
}

/// 执行一轮完整的页面增强。
///
/// 分阶段推进，单个组件失败只记录日志，其余组件照常接线。
fn enhance_page() -> Result<(), EnhanceError> {
    log::info!("setup: begin");
    let window = dom::window()?;
    let document = dom::document()?;

    with_page(|state| {
        match state.augmenter.augment_document(&document) {
            Ok(count) => log::info!("setup: copy buttons ready（{count} 个代码块）"),
            Err(err) => log::error!("setup: 复制按钮初始化失败，跳过该组件: {err}"),
        }

        match link_rewrite::rewrite_document_links(&window, &document, &state.config) {
            Ok(count) => log::info!("setup: link rewrite done（触达 {count} 个链接）"),
            Err(err) => log::error!("setup: 链接改写失败，跳过该组件: {err}"),
        }

        match frame_resize::watch_frames(&window, &document, &state.config, state.watch) {
            Ok(count) => log::info!("setup: frame resize ready（{count} 个 iframe）"),
            Err(err) => log::error!("setup: 自适应高度初始化失败，跳过该组件: {err}"),
        }

        log::info!("setup: complete");
        Ok(())
    })
}

/// 手动重扫代码块（动态插入内容后调用）。
///
/// # 参数
/// * `root` - 限定扫描的子树根；缺省为整个文档
///
/// # 返回
/// 本次新处理的代码块数量。
#[wasm_bindgen]
pub fn enhance_code_blocks(root: Option<Element>) -> Result<u32, JsValue> {
    let added = with_page(|state| match &root {
        Some(element) => state.augmenter.augment_within(element),
        None => state.augmenter.augment_document(&dom::document()?),
    })?;
    Ok(added)
}

/// 手动重跑内嵌链接改写（顶层文档中为空操作）。
#[wasm_bindgen]
pub fn rewrite_embedded_links() -> Result<u32, JsValue> {
    let touched = with_page(|state| {
        link_rewrite::rewrite_document_links(&dom::window()?, &dom::document()?, &state.config)
    })?;
    Ok(touched)
}

/// 手动重扫自适应 iframe（已接线的框架跳过）。
#[wasm_bindgen]
pub fn watch_resizable_frames() -> Result<u32, JsValue> {
    let wired = with_page(|state| {
        frame_resize::watch_frames(&dom::window()?, &dom::document()?, &state.config, state.watch)
    })?;
    Ok(wired)
}
