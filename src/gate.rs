//! 翻译判定
//!
//! 粗粒度的按运行过滤：内容中是否仍含有非目标语言的字符。中英混排的字符串同样会被标记。

use crate::types::Language;

fn is_cjk_ideograph(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

/// 判断内容是否需要翻译
///
/// * 目标语言为英文：含有至少一个中日韩统一表意文字
/// * 目标语言为中文：含有至少一个拉丁字母
///
/// # 示例
///
/// ```rust
/// use design_localizer::{needs_translation, Language};
///
/// assert!(needs_translation("你好", Language::En));
/// assert!(!needs_translation("hello", Language::En));
/// assert!(needs_translation("hello", Language::Zh));
/// ```
pub fn needs_translation(content: &str, target_language: Language) -> bool {
    match target_language {
        Language::En => content.chars().any(is_cjk_ideograph),
        Language::Zh => content.chars().any(|c| c.is_ascii_alphabetic()),
    }
}
