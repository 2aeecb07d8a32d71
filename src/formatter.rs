//! 本地化内容格式化
//!
//! 对翻译结果应用语言相关的规则：日期改写、星期/月份缩写、标题大小写和货币符号替换。
//! 所有函数都是纯函数。

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::types::Language;

const MONTHS: [(&str, &str); 12] = [
    ("January", "Jan"),
    ("February", "Feb"),
    ("March", "Mar"),
    ("April", "Apr"),
    ("May", "May"),
    ("June", "Jun"),
    ("July", "Jul"),
    ("August", "Aug"),
    ("September", "Sep"),
    ("October", "Oct"),
    ("November", "Nov"),
    ("December", "Dec"),
];

const WEEKDAYS: [(&str, &str); 7] = [
    ("Sunday", "Sun"),
    ("Monday", "Mon"),
    ("Tuesday", "Tue"),
    ("Wednesday", "Wed"),
    ("Thursday", "Thu"),
    ("Friday", "Fri"),
    ("Saturday", "Sat"),
];

/// 需要标题大小写的节点名称
const TITLE_CASE_ROLES: [&str; 14] = [
    "ForcedCapitalization",
    "我是标题",
    "二级标题",
    "Tab-title",
    "_Avatar-title",
    "Dialog-title",
    "Button-text",
    "Menu__brand-name",
    "MenuItem-label",
    "TabPane-text-selected",
    "TabPane-text",
    "Menu-title",
    "标题文本",
    "ModalView_title",
];

/// 以此后缀结尾的节点名称同样强制标题大小写
const FORCED_CAPITALIZATION_SUFFIX: &str = "_fc";

const SKIP_WORDS: [&str; 19] = [
    "and", "or", "but", "the", "a", "an", "in", "on", "at", "for", "to", "with", "by", "of", "as",
    "is", "are", "was", "were",
];

static NUMERIC_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{4})/(\d{2})/(\d{2})").expect("numeric date pattern"));

static WEEKDAY_BEFORE_DATE: Lazy<Regex> = Lazy::new(|| {
    let weekdays = WEEKDAYS.map(|(full, _)| full).join("|");
    let months = MONTHS
        .iter()
        .map(|(full, _)| *full)
        .chain(MONTHS.iter().map(|(_, short)| *short))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b({weekdays}), ((?:{months}) \d{{1,2}})\b")).expect("weekday pattern")
});

static MONTH_BEFORE_DAY: Lazy<Regex> = Lazy::new(|| {
    let months = MONTHS.map(|(full, _)| full).join("|");
    Regex::new(&format!(r"({months}) (\d{{1,2}})")).expect("month pattern")
});

/// 根据目标语言和节点名称格式化内容
///
/// 英文规则按固定顺序执行：数字日期 → 星期缩写 → 月份缩写 → 标题大小写，
/// 最后对任意目标语言执行货币替换。空内容直接返回空字符串。
///
/// # 示例
///
/// ```rust
/// use design_localizer::{format_content, Language};
///
/// assert_eq!(format_content("January 1, 2022", Language::En, "nodeName"), "Jan 1, 2022");
/// assert_eq!(format_content("$ 100", Language::Zh, "nodeName"), "¥ 100");
/// ```
pub fn format_content(content: &str, target_language: Language, role_hint: &str) -> String {
    if content.is_empty() {
        return String::new();
    }

    let mut content = content.to_string();
    if target_language == Language::En {
        content = format_date(&content);
        content = abbreviate_weekday(&content);
        content = abbreviate_month(&content);
        content = apply_title_case(&content, role_hint);
    }

    format_currency(&content, target_language)
}

/// `YYYY/MM/DD` → `Mon D, YYYY`，月份不在01-12内的保持原样
fn format_date(content: &str) -> String {
    NUMERIC_DATE
        .replace_all(content, |caps: &Captures| {
            let month = caps[2].parse::<usize>().ok().filter(|m| (1..=12).contains(m));
            let day = caps[3].parse::<u32>().ok();
            match (month, day) {
                (Some(month), Some(day)) => format!("{} {}, {}", MONTHS[month - 1].1, day, &caps[1]),
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// 只缩写后面紧跟 `, 月份 日` 的星期，日期部分保持不变
fn abbreviate_weekday(content: &str) -> String {
    WEEKDAY_BEFORE_DATE
        .replace_all(content, |caps: &Captures| {
            format!("{}, {}", short_name(&WEEKDAYS, &caps[1]), &caps[2])
        })
        .into_owned()
}

fn abbreviate_month(content: &str) -> String {
    MONTH_BEFORE_DAY
        .replace_all(content, |caps: &Captures| {
            format!("{} {}", short_name(&MONTHS, &caps[1]), &caps[2])
        })
        .into_owned()
}

fn short_name<'a>(table: &[(&str, &'a str)], full: &str) -> &'a str {
    table
        .iter()
        .find(|(name, _)| *name == full)
        .map(|(_, short)| *short)
        .unwrap_or_default()
}

/// 该节点名称是否要求标题大小写
pub fn is_title_role(role_hint: &str) -> bool {
    TITLE_CASE_ROLES.contains(&role_hint) || role_hint.ends_with(FORCED_CAPITALIZATION_SUFFIX)
}

fn apply_title_case(content: &str, role_hint: &str) -> String {
    if !is_title_role(role_hint) {
        return content.to_string();
    }

    content
        .split(' ')
        .enumerate()
        .map(|(index, word)| {
            if index == 0 || !SKIP_WORDS.contains(&word.to_lowercase().as_str()) {
                capitalize(word)
            } else {
                word.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn format_currency(content: &str, target_language: Language) -> String {
    match target_language {
        Language::En => content.replace('¥', "$").replace("CNY", "USD"),
        Language::Zh => content.replace('$', "¥").replace("USD", "CNY"),
    }
}
