//! 复制按钮模块
//!
//! # 设计思路
//!
//! 为每个尚未处理的代码块追加一个复制控件：
//! - **发现与幂等**：按选择器扫描给定根节点，带已处理标记的块直接跳过，
//!   重复扫描（含动态插入内容后的手动重扫）安全且无副作用。
//! - **标识分配**：`IdAllocator` 以实例内计数器生成 `前缀 + 序号` 的唯一 id，
//!   不依赖任何全局可变状态。
//! - **视觉贴靠**：按钮随块的横向滚动平移，始终贴在可视区域内；
//!   滚动监听为被动监听，不影响滚动性能。
//! - **点击复制**：DOM 遍历压成 [`extract::Segment`] 序列后交给纯函数组装载荷，
//!   经 [`clipboard::ClipboardProvider`] 异步写入；任何失败都在处理器内兜底。
//!
//! # 实现思路
//!
//! - 已处理标记与 id 写在块元素属性上，状态随 DOM 子树走。
//! - "已复制"视觉状态通过 `copied` 类切换，固定延迟后复位；
//!   快速连击只是重启复位定时器，属纯视觉行为。
//! - 单块可用 `data-copy-mode` 属性覆盖全局提取模式。

pub mod extract;

mod clipboard;

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, HtmlElement, NodeList, Window};

pub(crate) use clipboard::ClipboardProvider;

use crate::config::{EnhanceConfig, ExtractMode};
use crate::dom::{self, EventSource};
use crate::error::EnhanceError;

/// 单块级提取模式覆盖属性。
const MODE_OVERRIDE_ATTR: &str = "data-copy-mode";

/// 复制按钮的样式类与提示属性（与站点样式表约定一致）。
const BUTTON_CLASS: &str = "copybtn o-tooltip--left";
const BUTTON_TOOLTIP: &str = "Copy";
const BUTTON_ARIA_LABEL: &str = "Copy code";

/// 按钮图标：默认"复制"图标与成功后的"对勾"图标，靠 `copied` 类切换显隐。
const BUTTON_ICONS: &str = r#"
<svg class="icon-copy icon icon-tabler icon-tabler-copy" viewBox="0 0 24 24" aria-hidden="true">
  <path stroke="none" d="M0 0h24v24H0z" fill="none"/>
  <rect x="8" y="8" width="12" height="12" rx="2"/>
  <path d="M16 8v-2a2 2 0 0 0 -2 -2h-8
           a2 2 0 0 0 -2 2v8
           a2 2 0 0 0 2 2h2"/>
</svg>
<svg class="icon-check icon icon-tabler icon-tabler-check" viewBox="0 0 24 24" aria-hidden="true">
  <path stroke="none" d="M0 0h24v24H0z" fill="none"/>
  <path d="M5 12l5 5l10 -10" stroke-width="2"
        stroke-linecap="round" stroke-linejoin="round" fill="none"/>
</svg>"#;

// ============================================================================
// IdAllocator — 实例级唯一标识分配
// ============================================================================

/// 代码块 id 分配器。
///
/// 只保证单调唯一，不承诺与 DOM 顺序相关；
/// 手动重扫复用同一分配器，序号在页面会话内持续递增。
pub struct IdAllocator {
    next: Cell<u32>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: Cell::new(0) }
    }

    fn next_id(&self, prefix: &str) -> String {
        let seq = self.next.get();
        self.next.set(seq + 1);
        format!("{prefix}{seq}")
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// CopyButtonAugmenter
// ============================================================================

/// 复制按钮增强器。
///
/// 启动时创建一次并复用：配置、id 分配器与剪贴板提供者都挂在实例上，
/// 导出的手动重扫入口与自动初始化共享同一实例。
pub struct CopyButtonAugmenter {
    config: Rc<EnhanceConfig>,
    ids: IdAllocator,
    clipboard: Rc<ClipboardProvider>,
}

impl CopyButtonAugmenter {
    pub(crate) fn new(config: Rc<EnhanceConfig>, window: &Window) -> Self {
        Self {
            config,
            ids: IdAllocator::new(),
            clipboard: Rc::new(ClipboardProvider::detect(window)),
        }
    }

    /// 对整个文档执行一次发现与接线。
    ///
    /// # 返回
    /// 本次新处理的代码块数量（已处理的块不计入）。
    pub fn augment_document(&self, document: &Document) -> Result<u32, EnhanceError> {
        let blocks = document
            .query_selector_all(&self.config.block_selector)
            .map_err(|err| EnhanceError::dom("代码块选择器查询失败", err))?;
        self.process(document, blocks)
    }

    /// 对指定子树执行一次发现与接线（动态插入内容的手动入口）。
    pub fn augment_within(&self, root: &Element) -> Result<u32, EnhanceError> {
        let blocks = root
            .query_selector_all(&self.config.block_selector)
            .map_err(|err| EnhanceError::dom("代码块选择器查询失败", err))?;
        self.process(&dom::document()?, blocks)
    }

    fn process(&self, document: &Document, blocks: NodeList) -> Result<u32, EnhanceError> {
        let mut added = 0;
        for index in 0..blocks.length() {
            let Some(block) = blocks
                .get(index)
                .and_then(|node| node.dyn_into::<HtmlElement>().ok())
            else {
                continue;
            };
            if block.has_attribute(&self.config.processed_marker) {
                continue;
            }
            block
                .set_attribute(&self.config.processed_marker, "y")
                .map_err(|err| EnhanceError::dom("写入已处理标记失败", err))?;

            self.attach(document, &block)?;
            added += 1;
        }
        if added > 0 {
            log::debug!("复制按钮：新接线 {added} 个代码块");
        }
        Ok(added)
    }

    /// 为单个代码块构建按钮并接线滚动贴靠与点击复制。
    fn attach(&self, document: &Document, block: &HtmlElement) -> Result<(), EnhanceError> {
        let target_id = self.ids.next_id(&self.config.id_prefix);
        block
            .set_attribute("id", &target_id)
            .map_err(|err| EnhanceError::dom("写入代码块 id 失败", err))?;

        let button = build_button(document)?;
        block
            .append_child(button.as_ref())
            .map_err(|err| EnhanceError::dom("挂载复制按钮失败", err))?;

        // 滚动贴靠：按钮横向偏移跟随块的滚动位置
        let _ = button.style().set_property("transform", "translateX(0px)");
        {
            let scroll_block = block.clone();
            let scroll_button = button.clone();
            EventSource::new(block.as_ref()).on_passive("scroll", move || {
                let _ = scroll_button.style().set_property(
                    "transform",
                    &format!("translateX({}px)", scroll_block.scroll_left()),
                );
            })?;
        }

        // 点击复制
        {
            let config = Rc::clone(&self.config);
            let provider = Rc::clone(&self.clipboard);
            let block = block.clone();
            let button_in_click = button.clone();
            EventSource::new(button.as_ref()).on("click", move || {
                let mode = block_mode(&block, &config);
                let segments = collect_segments(&block, &button_in_click, &config);
                let payload = extract::assemble_payload(&segments, mode);

                let provider = Rc::clone(&provider);
                let button = button_in_click.clone();
                let reset_ms = config.copied_reset_ms;
                spawn_local(async move {
                    let Ok(document) = dom::document() else {
                        return;
                    };
                    if let Err(err) = provider.copy(&document, &payload).await {
                        // 两条路径都失败时保持静默，视觉确认照常
                        log::debug!("复制失败（已静默处理）: {err}");
                    }
                    let _ = button.class_list().add_1("copied");
                    let to_reset = button.clone();
                    if let Err(err) = dom::after(reset_ms, move || {
                        let _ = to_reset.class_list().remove_1("copied");
                    }) {
                        log::debug!("复位定时器注册失败: {err}");
                    }
                });
            })?;
        }
        Ok(())
    }
}

/// 读取单块级提取模式覆盖，非法值告警并回退全局配置。
fn block_mode(block: &HtmlElement, config: &EnhanceConfig) -> ExtractMode {
    let Some(raw) = block.get_attribute(MODE_OVERRIDE_ATTR) else {
        return config.extract_mode;
    };
    match ExtractMode::from_str(&raw) {
        Ok(mode) => mode,
        Err(err) => {
            log::warn!("{MODE_OVERRIDE_ATTR} 非法，回退 {}: {err}", config.extract_mode.as_str());
            config.extract_mode
        }
    }
}

/// 遍历代码块的直接子元素，压成提取用快照序列（剔除按钮自身子树）。
fn collect_segments(
    block: &HtmlElement,
    button: &HtmlElement,
    config: &EnhanceConfig,
) -> Vec<extract::Segment> {
    let children = block.children();
    let mut segments = Vec::with_capacity(children.length() as usize);

    for index in 0..children.length() {
        let Some(child) = children.item(index) else {
            continue;
        };
        if child.is_same_node(Some(button.as_ref())) {
            continue;
        }
        let classes = child.class_list();
        segments.push(extract::Segment {
            is_wrapper: classes.contains(&config.wrapper_class),
            is_output: classes.contains(&config.outputs_class),
            text: child.text_content().unwrap_or_default(),
            lead_text: child
                .first_element_child()
                .and_then(|lead| lead.text_content()),
        });
    }
    segments
}

/// 构建复制按钮元素（双图标 + 提示 + 无障碍标注）。
fn build_button(document: &Document) -> Result<HtmlElement, EnhanceError> {
    let button: HtmlElement = document
        .create_element("button")
        .map_err(|err| EnhanceError::dom("创建按钮元素失败", err))?
        .dyn_into()
        .map_err(|_| EnhanceError::Dom("按钮元素类型转换失败".to_string()))?;

    button
        .set_attribute("type", "button")
        .map_err(|err| EnhanceError::dom("设置按钮类型失败", err))?;
    button
        .set_attribute("class", BUTTON_CLASS)
        .map_err(|err| EnhanceError::dom("设置按钮样式类失败", err))?;
    button
        .set_attribute("data-tooltip", BUTTON_TOOLTIP)
        .map_err(|err| EnhanceError::dom("设置按钮提示失败", err))?;
    button
        .set_attribute("aria-label", BUTTON_ARIA_LABEL)
        .map_err(|err| EnhanceError::dom("设置按钮无障碍标注失败", err))?;
    button.set_inner_html(BUTTON_ICONS);
    Ok(button)
}
