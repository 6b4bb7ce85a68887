// 文案提取链路的集成测试：覆盖行数守恒与典型页面场景
use docsite_enhancer::config::ExtractMode;
use docsite_enhancer::copy_button::extract::{Segment, assemble_payload, normalize};
use docsite_enhancer::frame_resize::measure::{HeightTracker, content_height};
use docsite_enhancer::link_rewrite::path_map;

fn wrapper(text: &str) -> Segment {
    Segment {
        is_wrapper: true,
        is_output: false,
        text: text.to_string(),
        lead_text: None,
    }
}

fn outputs_wrapper(text: &str, lead: &str) -> Segment {
    Segment {
        is_wrapper: true,
        is_output: true,
        text: text.to_string(),
        lead_text: Some(lead.to_string()),
    }
}

#[test]
fn test_n_plus_one_line_law_with_outputs() {
    // N 个输入行 + 一个多行输出区域 → N+1 行
    let segments = vec![
        wrapper("x = magic(3);"),
        wrapper("disp(x)"),
        outputs_wrapper("ans =\n  8  1  6", "ans ="),
    ];
    let payload = assemble_payload(&segments, ExtractMode::InlineWrappers);
    assert_eq!(payload.lines().count(), 2 + 1);
    assert_eq!(payload, "x = magic(3);\ndisp(x)\nans =");
}

#[test]
fn test_n_line_law_with_empty_outputs() {
    let segments = vec![
        wrapper("x = 1;"),
        wrapper("y = 2;"),
        Segment {
            is_wrapper: true,
            is_output: true,
            text: String::new(),
            lead_text: None,
        },
    ];
    let payload = assemble_payload(&segments, ExtractMode::InlineWrappers);
    assert_eq!(payload.lines().count(), 2);
}

#[test]
fn test_interior_blank_line_survives() {
    let segments = vec![wrapper("a = 1;"), wrapper(""), wrapper("b = 2;")];
    assert_eq!(
        assemble_payload(&segments, ExtractMode::InlineWrappers),
        "a = 1;\n\nb = 2;"
    );
}

#[test]
fn test_output_wrapper_ignores_later_children() {
    // 输出包装器只取首个子元素文本，后续弃用警告等一概忽略
    let segments = vec![
        wrapper("def f():"),
        wrapper("    return 1\u{00A0}"),
        outputs_wrapper("1\n<deprecation warning>", "1\n"),
    ];
    assert_eq!(
        assemble_payload(&segments, ExtractMode::InlineWrappers),
        "def f():\n    return 1\n1"
    );
}

#[test]
fn test_element_mode_matches_legacy_markup() {
    // 旧版标记没有行包装器类名，元素文本模式仍需工作
    let segments = vec![
        Segment {
            is_wrapper: false,
            is_output: false,
            text: "plot(sin(0:0.1:pi))".to_string(),
            lead_text: None,
        },
        Segment {
            is_wrapper: false,
            is_output: true,
            text: "\nFigure created.\nWarning: deprecated".to_string(),
            lead_text: None,
        },
    ];
    assert_eq!(
        assemble_payload(&segments, ExtractMode::Elements),
        "plot(sin(0:0.1:pi))\nFigure created."
    );
}

#[test]
fn test_normalize_twice_equals_once() {
    let raw = "x\u{202F}=\u{00A0}1;\u{200B}  \n\n  y = 2;\u{FEFF}\t";
    let once = normalize(raw);
    assert_eq!(normalize(&once), once);
    assert!(!once.contains('\u{00A0}'));
    assert!(!once.contains('\u{202F}'));
    assert!(!once.contains('\u{200B}'));
    assert!(!once.contains('\u{FEFF}'));
}

#[test]
fn test_sibling_tutorial_link_rewrite() {
    assert!(path_map::needs_top_target("./y.html"));
    assert_eq!(
        path_map::rewrite_relative(
            "/_static/html/tutorials/x.html",
            "./y.html",
            "/_static/html/",
            "/pages/",
        ),
        "/pages/tutorials/y.html"
    );
}

#[test]
fn test_https_always_gets_top_target_even_without_rewrite() {
    let href = "https://example.org/api.json";
    assert!(path_map::needs_top_target(href));
    assert!(!path_map::is_relative_page(href));
}

#[test]
fn test_autoresize_writes_once_per_height_change() {
    // 800 → 950 各写一次；高度未变时零写入
    let mut tracker = HeightTracker::new();
    let mut writes = Vec::new();

    for measured in [800, 800, 950, 950, 950] {
        let height = content_height(measured, Some(measured - 10));
        if let Some(next) = tracker.apply(height) {
            writes.push(format!("{next}px"));
        }
    }
    assert_eq!(writes, vec!["800px", "950px"]);
}
