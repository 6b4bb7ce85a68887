//! 配置模块
//!
//! # 设计思路
//!
//! 将所有"可调策略"集中到 `EnhanceConfig`：选择器、类名约定、路径映射前缀、
//! 提示复位延迟与兜底重测延迟。保证运行时行为可观测、可调整、可测试。
//!
//! 文案提取存在两代策略（元素文本模式 / 行包装器规范化模式），
//! 以 `ExtractMode` 作为高层语义开关，默认使用更稳健的规范化模式。
//!
//! # 实现思路
//!
//! - `Default` 提供生产可用配置（与文档站现有标记约定一致）。
//! - 页面可通过 `<script type="application/json" data-enhancer-config>`
//!   局部覆盖字段；解析失败时告警并回退默认值，绝不让页面初始化失败。
//! - `ExtractMode` 负责模式字符串解析与反向输出，供单块级
//!   `data-copy-mode` 属性覆盖使用。

use serde::Deserialize;
use web_sys::Document;

use crate::error::EnhanceError;

/// 页面内配置元素的选择器。
pub const CONFIG_SELECTOR: &str = r#"script[type="application/json"][data-enhancer-config]"#;

/// 页面增强配置。
///
/// 字段覆盖三个组件：复制按钮、内嵌链接改写、iframe 自适应高度。
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnhanceConfig {
    /// 代码块选择器。
    pub block_selector: String,
    /// 行包装器类名（规范化提取模式只遍历带此类名的直接子元素）。
    pub wrapper_class: String,
    /// 输出区域类名（附加在行包装器上，仅首行 / 首个子元素参与复制）。
    pub outputs_class: String,
    /// 已处理标记属性名，保证重复扫描幂等。
    pub processed_marker: String,
    /// 代码块 id 前缀，与递增计数器拼接出唯一标识。
    pub id_prefix: String,
    /// "已复制"视觉状态的复位延迟（毫秒）。
    pub copied_reset_ms: i32,
    /// 文案提取模式（缺省为规范化行包装器模式）。
    pub extract_mode: ExtractMode,
    /// 内嵌路径中的静态资源前缀段（被映射的一侧）。
    pub static_prefix: String,
    /// 页面前缀段（映射到的一侧）。
    pub pages_prefix: String,
    /// iframe 自适应高度的选择类名。
    pub autoresize_class: String,
    /// 无 ResizeObserver 时的固定延迟重测点（毫秒）。
    pub settle_delays_ms: Vec<i32>,
}

impl Default for EnhanceConfig {
    fn default() -> Self {
        Self {
            block_selector: ".CodeBlock".to_string(),
            wrapper_class: "inlineWrapper".to_string(),
            outputs_class: "outputs".to_string(),
            processed_marker: "data-copy-ready".to_string(),
            id_prefix: "codecell".to_string(),
            copied_reset_ms: 1_200,
            extract_mode: ExtractMode::InlineWrappers,
            static_prefix: "/_static/html/".to_string(),
            pages_prefix: "/pages/".to_string(),
            autoresize_class: "autoresize".to_string(),
            settle_delays_ms: vec![500, 1_500],
        }
    }
}

impl EnhanceConfig {
    /// 从页面内嵌 JSON 元素加载配置，不存在或解析失败时回退默认值。
    ///
    /// # 参数
    /// * `document` - 当前文档
    pub fn load(document: &Document) -> Self {
        let element = match document.query_selector(CONFIG_SELECTOR) {
            Ok(Some(element)) => element,
            _ => return Self::default(),
        };
        let raw = element.text_content().unwrap_or_default();
        match serde_json::from_str::<Self>(&raw) {
            Ok(config) => {
                log::info!("已加载页面内嵌配置（{CONFIG_SELECTOR}）");
                config
            }
            Err(err) => {
                log::warn!("页面内嵌配置解析失败，回退默认配置: {err}");
                Self::default()
            }
        }
    }
}

/// 文案提取模式（面向页面标记语义）。
///
/// - `Elements`：元素文本模式，逐个直接子元素取原始文本（旧版行为）
/// - `InlineWrappers`：行包装器规范化模式，仅遍历行包装器并做字符规范化
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractMode {
    Elements,
    InlineWrappers,
}

impl ExtractMode {
    /// 从外部字符串解析模式（供单块级 `data-copy-mode` 属性覆盖）。
    pub fn from_str(mode: &str) -> Result<Self, EnhanceError> {
        match mode.trim().to_lowercase().as_str() {
            "elements" => Ok(Self::Elements),
            "inline-wrappers" => Ok(Self::InlineWrappers),
            other => Err(EnhanceError::Config(format!(
                "未知提取模式：{other}（可选：elements / inline-wrappers）"
            ))),
        }
    }

    /// 将模式输出为稳定字符串，供日志与诊断。
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Elements => "elements",
            Self::InlineWrappers => "inline-wrappers",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_site_conventions() {
        let config = EnhanceConfig::default();
        assert_eq!(config.block_selector, ".CodeBlock");
        assert_eq!(config.wrapper_class, "inlineWrapper");
        assert_eq!(config.outputs_class, "outputs");
        assert_eq!(config.copied_reset_ms, 1_200);
        assert_eq!(config.extract_mode, ExtractMode::InlineWrappers);
        assert_eq!(config.settle_delays_ms, vec![500, 1_500]);
    }

    #[test]
    fn test_partial_json_override_keeps_defaults() {
        let config: EnhanceConfig =
            serde_json::from_str(r#"{"idPrefix": "snippet", "copiedResetMs": 800}"#).unwrap();
        assert_eq!(config.id_prefix, "snippet");
        assert_eq!(config.copied_reset_ms, 800);
        assert_eq!(config.block_selector, ".CodeBlock");
    }

    #[test]
    fn test_extract_mode_round_trip() {
        let mode = ExtractMode::from_str("inline-wrappers").unwrap();
        assert_eq!(mode, ExtractMode::InlineWrappers);
        assert_eq!(mode.as_str(), "inline-wrappers");
        assert_eq!(ExtractMode::from_str("ELEMENTS").unwrap(), ExtractMode::Elements);
    }

    #[test]
    fn test_extract_mode_rejects_unknown() {
        assert!(ExtractMode::from_str("raw").is_err());
    }
}
