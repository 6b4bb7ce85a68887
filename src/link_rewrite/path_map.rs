//! 路径映射模块
//!
//! # 设计思路
//!
//! 内嵌链接改写的纯逻辑部分：判断链接是否需要逃出 iframe、
//! 是否为相对页面引用，以及如何把内嵌路径的静态资源前缀段
//! 映射为页面前缀段。全部为纯函数，脱离浏览器可测。
//!
//! # 实现思路
//!
//! - 方案（scheme）识别使用预编译正则，经 `once_cell::sync::Lazy`
//!   首次调用时编译、后续零成本复用。
//! - 基路径取当前路径做一次前缀替换后去掉最后一个路径分隔符之后的部分；
//!   相对链接去掉单个前导 `./` 后拼接。

use once_cell::sync::Lazy;
use regex::Regex;

/// 绝对 URL 方案识别（`http://`、`https://`、`ftp://` 等）。
static SCHEME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[a-z]+://").unwrap());

/// 链接是否应强制在顶层浏览上下文中打开。
///
/// 安全方案的绝对链接与页面文档引用都不应留在 iframe 内部导航。
pub fn needs_top_target(href: &str) -> bool {
    href.starts_with("https:") || href.ends_with(".html")
}

/// 链接是否为相对页面文档引用（以 `.html` 结尾且不带任何 URL 方案）。
pub fn is_relative_page(href: &str) -> bool {
    href.ends_with(".html") && !SCHEME_PATTERN.is_match(href)
}

/// 把相对页面引用改写为顶层页面路径。
///
/// # 参数
/// * `current_path` - 内嵌文档的当前路径（`location.pathname`）
/// * `href` - 相对链接
/// * `static_prefix` - 被替换的静态资源前缀段
/// * `pages_prefix` - 替换后的页面前缀段
///
/// # 返回
/// 当前路径做一次前缀段替换、截断到最后一个 `/` 之后，拼上去掉
/// 前导 `./` 的相对链接。
pub fn rewrite_relative(
    current_path: &str,
    href: &str,
    static_prefix: &str,
    pages_prefix: &str,
) -> String {
    let mapped = current_path.replacen(static_prefix, pages_prefix, 1);
    let base = match mapped.rfind('/') {
        Some(pos) => &mapped[..=pos],
        None => "",
    };
    let relative = href.strip_prefix("./").unwrap_or(href);
    format!("{base}{relative}")
}
