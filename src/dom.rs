//! DOM 基础设施模块
//!
//! # 设计思路
//!
//! 各组件共用的浏览器桥接能力集中于此：
//! - **显式事件注册**：`EventSource` 以 `on(event, handler)` 形式注册监听，
//!   替代散落在各处的 `Closure` 裸包装，使事件接线成为可审查的接口。
//! - **就绪调度**：`on_ready` 在文档仍在加载时延迟执行，否则立即执行。
//! - **定时与帧调度**：`after` 封装一次性定时器；`FrameGate` 把密集的
//!   布局变化通知合并到下一动画帧，避免重复测量。
//!
//! # 实现思路
//!
//! - 监听器闭包通过 `Closure::forget` 与页面同生命周期（页面级接线，
//!   无需回收）。
//! - `FrameGate` 用 `Rc<Cell<bool>>` 去重：帧未执行前的重复调度是空操作。

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{AddEventListenerOptions, Document, EventTarget, Window};

use crate::error::EnhanceError;

/// 获取全局 `Window`。
pub(crate) fn window() -> Result<Window, EnhanceError> {
    web_sys::window().ok_or_else(|| EnhanceError::Dom("无法获取 window 对象".to_string()))
}

/// 获取当前 `Document`。
pub(crate) fn document() -> Result<Document, EnhanceError> {
    window()?
        .document()
        .ok_or_else(|| EnhanceError::Dom("无法获取 document 对象".to_string()))
}

// ============================================================================
// EventSource — 显式事件注册
// ============================================================================

/// 事件源包装：对任意 `EventTarget` 暴露 `on` / `on_passive` 注册接口。
///
/// 所有处理器均为无参闭包；需要事件上下文的场景（如滚动偏移）
/// 由闭包自行捕获目标元素。
pub(crate) struct EventSource<'a> {
    target: &'a EventTarget,
}

impl<'a> EventSource<'a> {
    pub(crate) fn new(target: &'a EventTarget) -> Self {
        Self { target }
    }

    /// 注册普通监听器。
    pub(crate) fn on(
        &self,
        kind: &str,
        handler: impl FnMut() + 'static,
    ) -> Result<(), EnhanceError> {
        let closure = Closure::<dyn FnMut()>::new(handler);
        self.target
            .add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
            .map_err(|err| EnhanceError::dom(&format!("注册 {kind} 监听失败"), err))?;
        closure.forget();
        Ok(())
    }

    /// 注册被动监听器（不阻塞滚动等默认行为）。
    pub(crate) fn on_passive(
        &self,
        kind: &str,
        handler: impl FnMut() + 'static,
    ) -> Result<(), EnhanceError> {
        let closure = Closure::<dyn FnMut()>::new(handler);
        let options = AddEventListenerOptions::new();
        options.set_passive(true);
        self.target
            .add_event_listener_with_callback_and_add_event_listener_options(
                kind,
                closure.as_ref().unchecked_ref(),
                &options,
            )
            .map_err(|err| EnhanceError::dom(&format!("注册 {kind} 被动监听失败"), err))?;
        closure.forget();
        Ok(())
    }
}

// ============================================================================
// 就绪 / 定时 / 帧调度
// ============================================================================

/// 文档就绪后执行 `run`：加载中则挂到 `DOMContentLoaded`，否则立即执行。
pub(crate) fn on_ready(
    document: &Document,
    run: impl FnOnce() + 'static,
) -> Result<(), EnhanceError> {
    if document.ready_state() == "loading" {
        let mut pending = Some(run);
        EventSource::new(document).on("DOMContentLoaded", move || {
            if let Some(run) = pending.take() {
                run();
            }
        })
    } else {
        run();
        Ok(())
    }
}

/// 延迟 `ms` 毫秒执行一次 `run`。
pub(crate) fn after(ms: i32, run: impl FnOnce() + 'static) -> Result<(), EnhanceError> {
    let closure = Closure::once(run);
    window()?
        .set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            ms,
        )
        .map_err(|err| EnhanceError::dom("设置定时器失败", err))?;
    closure.forget();
    Ok(())
}

/// 动画帧节流阀：把一阵密集的调度请求合并为下一帧的一次执行。
#[derive(Clone)]
pub(crate) struct FrameGate {
    pending: Rc<Cell<bool>>,
}

impl FrameGate {
    pub(crate) fn new() -> Self {
        Self {
            pending: Rc::new(Cell::new(false)),
        }
    }

    /// 请求在下一动画帧执行 `run`；帧到来前的重复请求被合并。
    pub(crate) fn schedule(&self, run: Rc<dyn Fn()>) -> Result<(), EnhanceError> {
        if self.pending.get() {
            return Ok(());
        }
        self.pending.set(true);

        let pending = Rc::clone(&self.pending);
        let closure = Closure::once(move || {
            pending.set(false);
            run();
        });
        window()?
            .request_animation_frame(closure.as_ref().unchecked_ref())
            .map_err(|err| EnhanceError::observe("申请动画帧失败", err))?;
        closure.forget();
        Ok(())
    }
}
