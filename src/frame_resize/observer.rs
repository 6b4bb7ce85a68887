//! 尺寸观察能力提供者模块
//!
//! # 设计思路
//!
//! 尺寸观察存在两代能力：`ResizeObserver` 与定时器兜底。
//! 以 `ResizeWatch` 枚举在启动时做一次能力探测（工厂选择），
//! 接线处按能力走不同通道，不再散落内联分支。
//!
//! # 实现思路
//!
//! - 探测通过 `Reflect` 检查全局 `ResizeObserver` 构造器是否存在。
//! - `observe` 为单个元素创建观察器；回调经上层的动画帧节流阀合并。
//! - 观察器与回调闭包都随页面存活，创建后交由浏览器持有。

use std::rc::Rc;

use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen::closure::Closure;
use web_sys::{Element, ResizeObserver};

use crate::error::EnhanceError;

/// 尺寸观察能力提供者。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ResizeWatch {
    /// 原生 `ResizeObserver`。
    Observer,
    /// 定时器兜底（window resize + 固定延迟重测）。
    Timers,
}

impl ResizeWatch {
    /// 探测当前环境的尺寸观察能力。
    pub(crate) fn detect() -> Self {
        let available =
            js_sys::Reflect::has(&js_sys::global(), &JsValue::from_str("ResizeObserver"))
                .unwrap_or(false);
        if available {
            log::debug!("尺寸观察能力：ResizeObserver");
            Self::Observer
        } else {
            log::info!("ResizeObserver 不可用，使用定时器兜底");
            Self::Timers
        }
    }

    /// 能力名称（日志与诊断用）。
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Observer => "resize-observer",
            Self::Timers => "timers",
        }
    }

    /// 观察单个元素的盒尺寸变化。
    ///
    /// # 返回
    /// - `Ok(true)` — 已挂上观察器
    /// - `Ok(false)` — 当前能力不支持元素级观察，调用方应走定时器兜底
    pub(crate) fn observe(
        self,
        element: &Element,
        on_change: Rc<dyn Fn()>,
    ) -> Result<bool, EnhanceError> {
        match self {
            Self::Timers => Ok(false),
            Self::Observer => {
                let callback = Closure::<dyn FnMut()>::new(move || on_change());
                let observer = ResizeObserver::new(callback.as_ref().unchecked_ref())
                    .map_err(|err| EnhanceError::observe("创建 ResizeObserver 失败", err))?;
                observer.observe(element);
                callback.forget();
                // 观察器随页面存活，由浏览器的观察登记持有
                std::mem::forget(observer);
                Ok(true)
            }
        }
    }
}
