//! 文案提取模块
//!
//! # 设计思路
//!
//! 复制按钮的核心逻辑：把代码块的直接子元素还原为"输入行 + 至多一行输出回显"
//! 的纯文本载荷。DOM 遍历在上层完成并压成 [`Segment`] 序列，本模块只做
//! 纯函数组装，便于脱离浏览器做单元与属性测试。
//!
//! 两代提取策略并存（页面标记经历过一次迁移）：
//! - **元素文本模式**：逐个子元素取原始文本；输出区域只保留合并文本的
//!   首个非空行，追加在所有输入行之后。
//! - **行包装器规范化模式**（默认）：仅遍历行包装器子元素；输出包装器
//!   只取其首个子元素的文本，且所有行做字符规范化。
//!
//! # 实现思路
//!
//! - 规范化：不间断空格（U+00A0）与窄不间断空格（U+202F）替换为普通空格，
//!   零宽空格（U+200B）与 BOM（U+FEFF）剔除，逐行去尾部空白但保留行间空行。
//! - 行以单个 `\n` 连接，载荷最终再整体去一次尾部空白。

use crate::config::ExtractMode;

/// 代码块的一个直接子元素在提取视角下的快照。
#[derive(Debug, Clone, Default)]
pub struct Segment {
    /// 是否带行包装器类名（规范化模式只处理这部分）。
    pub is_wrapper: bool,
    /// 是否为输出区域。
    pub is_output: bool,
    /// 合并文本（`textContent` 语义，可能含换行）。
    pub text: String,
    /// 首个子元素的合并文本（输出包装器只取这一段）。
    pub lead_text: Option<String>,
}

/// 规范化一段（可能多行的）文本。
///
/// 逐行处理：替换不间断空格、剔除零宽字符、去尾部空白。
/// 行结构保持不变，行间空行不删除。多次应用结果不变（幂等）。
pub fn normalize(text: &str) -> String {
    text.split('\n')
        .map(normalize_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn normalize_line(line: &str) -> String {
    let cleaned: String = line
        .chars()
        .filter(|c| !matches!(c, '\u{200B}' | '\u{FEFF}'))
        .map(|c| match c {
            '\u{00A0}' | '\u{202F}' => ' ',
            other => other,
        })
        .collect();
    cleaned.trim_end().to_string()
}

/// 取合并文本的首个非空行（输出区域在元素文本模式下的贡献）。
fn first_nonempty_line(text: &str) -> Option<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .find(|line| !line.is_empty())
}

/// 将代码块子元素序列组装为剪贴板载荷。
///
/// # 参数
/// * `segments` - 按 DOM 顺序排列的直接子元素快照（复制按钮自身已被上层剔除）
/// * `mode` - 提取模式
///
/// # 返回
/// 以 `\n` 连接、整体去尾部空白后的载荷；保证不以空白字符结尾。
pub fn assemble_payload(segments: &[Segment], mode: ExtractMode) -> String {
    let lines = match mode {
        ExtractMode::Elements => element_text_lines(segments),
        ExtractMode::InlineWrappers => wrapper_lines(segments),
    };
    lines.join("\n").trim_end().to_string()
}

/// 元素文本模式：所有非输出子元素贡献原始文本；
/// 最后一个输出区域贡献其首个非空行，追加在末尾。
fn element_text_lines(segments: &[Segment]) -> Vec<String> {
    let mut lines = Vec::with_capacity(segments.len());
    let mut outputs: Option<&Segment> = None;

    for segment in segments {
        if segment.is_output {
            outputs = Some(segment);
            continue;
        }
        lines.push(segment.text.clone());
    }

    if let Some(outputs) = outputs {
        lines.push(
            first_nonempty_line(&outputs.text)
                .unwrap_or_default()
                .to_string(),
        );
    }
    lines
}

/// 行包装器规范化模式：仅遍历行包装器；输出包装器只取首个子元素，
/// 规范化后为空白则不贡献任何行。
fn wrapper_lines(segments: &[Segment]) -> Vec<String> {
    let mut lines = Vec::with_capacity(segments.len());

    for segment in segments.iter().filter(|s| s.is_wrapper) {
        if !segment.is_output {
            lines.push(normalize(&segment.text));
            continue;
        }
        let Some(lead) = segment.lead_text.as_deref() else {
            continue;
        };
        let normalized = normalize(lead);
        if normalized.trim().is_empty() {
            continue;
        }
        lines.push(normalized);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(text: &str) -> Segment {
        Segment {
            is_wrapper: true,
            is_output: false,
            text: text.to_string(),
            lead_text: None,
        }
    }

    fn output(text: &str, lead: &str) -> Segment {
        Segment {
            is_wrapper: true,
            is_output: true,
            text: text.to_string(),
            lead_text: Some(lead.to_string()),
        }
    }

    #[test]
    fn test_normalize_replaces_nbsp_variants() {
        assert_eq!(normalize("a\u{00A0}b\u{202F}c"), "a b c");
    }

    #[test]
    fn test_normalize_strips_zero_width() {
        assert_eq!(normalize("a\u{200B}b\u{FEFF}c"), "abc");
    }

    #[test]
    fn test_normalize_keeps_interior_blank_lines() {
        assert_eq!(normalize("a  \n\nb\t"), "a\n\nb");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize("x\u{00A0} \n\u{200B}\ny  ");
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn test_wrapper_mode_keeps_single_output_echo() {
        let segments = vec![
            input("def f():"),
            input("    return 1\u{00A0}"),
            output("1\n<deprecation warning>", "1\n"),
        ];
        assert_eq!(
            assemble_payload(&segments, ExtractMode::InlineWrappers),
            "def f():\n    return 1\n1"
        );
    }

    #[test]
    fn test_wrapper_mode_skips_non_wrapper_children() {
        let segments = vec![
            input("x = 1"),
            Segment {
                is_wrapper: false,
                is_output: false,
                text: "decoration".to_string(),
                lead_text: None,
            },
        ];
        assert_eq!(
            assemble_payload(&segments, ExtractMode::InlineWrappers),
            "x = 1"
        );
    }

    #[test]
    fn test_wrapper_mode_empty_output_contributes_nothing() {
        let segments = vec![input("x = 1"), output("", "  \u{00A0}")];
        assert_eq!(
            assemble_payload(&segments, ExtractMode::InlineWrappers),
            "x = 1"
        );
    }

    #[test]
    fn test_element_mode_takes_first_nonempty_output_line() {
        let segments = vec![
            Segment {
                is_wrapper: false,
                is_output: false,
                text: "plot(x)".to_string(),
                lead_text: None,
            },
            Segment {
                is_wrapper: false,
                is_output: true,
                text: "\r\nans = 42\r\nans = 43".to_string(),
                lead_text: None,
            },
        ];
        assert_eq!(
            assemble_payload(&segments, ExtractMode::Elements),
            "plot(x)\nans = 42"
        );
    }

    #[test]
    fn test_element_mode_last_outputs_region_wins() {
        let segments = vec![
            Segment {
                is_wrapper: false,
                is_output: true,
                text: "first".to_string(),
                lead_text: None,
            },
            Segment {
                is_wrapper: false,
                is_output: false,
                text: "y = 2".to_string(),
                lead_text: None,
            },
            Segment {
                is_wrapper: false,
                is_output: true,
                text: "second".to_string(),
                lead_text: None,
            },
        ];
        assert_eq!(
            assemble_payload(&segments, ExtractMode::Elements),
            "y = 2\nsecond"
        );
    }

    #[test]
    fn test_payload_never_ends_in_whitespace() {
        let segments = vec![input("a   "), input("   ")];
        let payload = assemble_payload(&segments, ExtractMode::InlineWrappers);
        assert!(!payload.ends_with(char::is_whitespace));
        assert_eq!(payload, "a");
    }
}
