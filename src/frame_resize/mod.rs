//! iframe 自适应高度模块
//!
//! # 设计思路
//!
//! 让标记为自适应的 iframe 高度始终跟随内嵌文档的内容高度，消除内部滚动条：
//! - **加载即测**：load 事件触发首次测量；高度写入经 [`measure::HeightTracker`]
//!   去重，不变则不写。
//! - **持续观察**：内嵌文档根元素的尺寸变化（经动画帧节流阀合并）、
//!   字体加载完成、迟到图片加载完成，都会触发重测。
//! - **能力降级**：无 `ResizeObserver` 时退回 window resize 监听
//!   加两次固定延迟重测，兜住晚到的布局稳定。
//!
//! # 实现思路
//!
//! - 每个 iframe 独立接线，状态（高度缓存、节流阀）挂在闭包捕获里，
//!   随 iframe 的事件链同生命周期。
//! - 跨源内嵌文档不可访问时静默跳过，不影响其余框架。
//! - 已接线的框架打标记，手动重扫幂等。

pub mod measure;

mod observer;

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{Document, HtmlIFrameElement, HtmlImageElement, Window};

pub(crate) use observer::ResizeWatch;

use crate::config::EnhanceConfig;
use crate::dom::{self, EventSource, FrameGate};
use crate::error::EnhanceError;

/// 已接线标记属性，保证重复扫描幂等。
const WIRED_MARKER: &str = "data-resize-ready";

/// 扫描文档内所有标记为自适应的 iframe 并接线。
///
/// # 返回
/// 本次新接线的 iframe 数量。
pub(crate) fn watch_frames(
    window: &Window,
    document: &Document,
    config: &Rc<EnhanceConfig>,
    watch: ResizeWatch,
) -> Result<u32, EnhanceError> {
    let selector = format!("iframe.{}", config.autoresize_class);
    let frames = document
        .query_selector_all(&selector)
        .map_err(|err| EnhanceError::dom("iframe 选择器查询失败", err))?;

    let mut wired = 0;
    for index in 0..frames.length() {
        let Some(frame) = frames
            .get(index)
            .and_then(|node| node.dyn_into::<HtmlIFrameElement>().ok())
        else {
            continue;
        };
        if frame.has_attribute(WIRED_MARKER) {
            continue;
        }
        frame
            .set_attribute(WIRED_MARKER, "y")
            .map_err(|err| EnhanceError::dom("写入接线标记失败", err))?;
        wire(window, frame, config, watch)?;
        wired += 1;
    }
    if wired > 0 {
        log::debug!("自适应高度：新接线 {wired} 个 iframe（能力：{}）", watch.as_str());
    }
    Ok(wired)
}

/// 为单个 iframe 建立测量与观察链路。
fn wire(
    window: &Window,
    frame: HtmlIFrameElement,
    config: &Rc<EnhanceConfig>,
    watch: ResizeWatch,
) -> Result<(), EnhanceError> {
    let tracker = Rc::new(RefCell::new(measure::HeightTracker::new()));

    // resize()：测量并在变化时写回
    let apply: Rc<dyn Fn()> = {
        let frame = frame.clone();
        let tracker = Rc::clone(&tracker);
        Rc::new(move || measure_and_apply(&frame, &tracker))
    };

    // 动画帧节流后的重测入口，观察类通知统一走这里
    let gate = FrameGate::new();
    let on_layout: Rc<dyn Fn()> = {
        let apply = Rc::clone(&apply);
        Rc::new(move || {
            if let Err(err) = gate.schedule(Rc::clone(&apply)) {
                log::debug!("布局重测调度失败: {err}");
            }
        })
    };

    // load：丢弃旧缓存、首次测量、挂内层观察
    {
        let loaded_frame = frame.clone();
        let tracker = Rc::clone(&tracker);
        let apply = Rc::clone(&apply);
        let on_layout = Rc::clone(&on_layout);
        EventSource::new(frame.as_ref()).on("load", move || {
            tracker.borrow_mut().reset();
            apply();
            let Some(inner) = loaded_frame.content_document() else {
                // 跨源文档不可访问时静默跳过
                log::debug!("内嵌文档不可访问（疑似跨源），跳过内层观察");
                return;
            };
            wire_inner(&inner, watch, &apply, &on_layout);
        })?;
    }

    // 外层：观察 iframe 自身盒尺寸；无能力时走定时器兜底
    let attached = watch.observe(frame.as_ref(), Rc::clone(&on_layout))?;
    if !attached {
        {
            let on_layout = Rc::clone(&on_layout);
            EventSource::new(window.as_ref()).on("resize", move || on_layout())?;
        }
        for &delay in &config.settle_delays_ms {
            let apply = Rc::clone(&apply);
            dom::after(delay, move || apply())?;
        }
    }
    Ok(())
}

/// 挂内嵌文档侧的观察：根元素尺寸、字体就绪、迟到图片。
fn wire_inner(
    inner: &Document,
    watch: ResizeWatch,
    apply: &Rc<dyn Fn()>,
    on_layout: &Rc<dyn Fn()>,
) {
    if let Some(root) = inner.document_element() {
        if let Err(err) = watch.observe(&root, Rc::clone(on_layout)) {
            log::debug!("内层观察挂载失败: {err}");
        }
    }

    // 字体加载完成后重测一次（能力可选，缺失则跳过）
    let has_fonts = js_sys::Reflect::has(inner.as_ref(), &JsValue::from_str("fonts"))
        .unwrap_or(false);
    if has_fonts {
        let ready = inner.fonts().ready();
        let apply = Rc::clone(apply);
        spawn_local(async move {
            if let Ok(ready) = ready {
                let _ = JsFuture::from(ready).await;
            }
            apply();
        });
    }

    // 观察时尚未加载完的图片，各自加载完成后重测
    let images = inner.images();
    for index in 0..images.length() {
        let Some(image) = images
            .item(index)
            .and_then(|el| el.dyn_into::<HtmlImageElement>().ok())
        else {
            continue;
        };
        if image.complete() {
            continue;
        }
        let on_layout = Rc::clone(on_layout);
        if let Err(err) = EventSource::new(image.as_ref()).on("load", move || on_layout()) {
            log::debug!("图片加载监听注册失败: {err}");
        }
    }
}

/// 测量内嵌文档内容高度，变化时写回 iframe 的 height 样式。
fn measure_and_apply(frame: &HtmlIFrameElement, tracker: &Rc<RefCell<measure::HeightTracker>>) {
    let Some(inner) = frame.content_document() else {
        return;
    };
    let Some(root) = inner.document_element() else {
        return;
    };
    let height = measure::content_height(
        root.scroll_height(),
        inner.body().map(|body| body.scroll_height()),
    );
    if let Some(next) = tracker.borrow_mut().apply(height) {
        match frame.style().set_property("height", &format!("{next}px")) {
            Ok(()) => log::debug!("iframe 高度更新为 {next}px"),
            Err(err) => log::debug!("iframe 高度写入失败: {:?}", err),
        }
    }
}
