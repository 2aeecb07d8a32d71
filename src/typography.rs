//! 排版映射表
//!
//! 固定的字体样式字典：按 (字重, 字号, 行高, 语言, 设备) 精确匹配，
//! 得到目标语言/设备下的样式键和规范字体。

use crate::types::{DeviceClass, FontName, Language};

/// 样式记录
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleRecord {
    pub name: &'static str,
    pub font_family: &'static str,
    pub font_weight_name: &'static str,
    pub font_size: f64,
    pub line_height: f64,
    pub language: Language,
    pub device_class: DeviceClass,
    pub style_key: &'static str,
}

impl StyleRecord {
    /// 记录对应的规范字体
    pub fn canonical_font(&self) -> FontName {
        FontName::new(self.font_family, self.font_weight_name)
    }

    fn matches(
        &self,
        weight: &str,
        font_size: f64,
        line_height: f64,
        language: Language,
        device_class: DeviceClass,
    ) -> bool {
        self.font_weight_name == weight
            && self.font_size == font_size
            && self.line_height == line_height
            && self.language == language
            && self.device_class == device_class
    }
}

const PING_FANG: &str = "PingFang SC";
const SF_PRO: &str = "SF Pro Text";

macro_rules! style {
    ($name:literal, $family:expr, $weight:literal, $size:literal, $line:literal, $lang:ident, $device:ident, $key:literal) => {
        StyleRecord {
            name: $name,
            font_family: $family,
            font_weight_name: $weight,
            font_size: $size,
            line_height: $line,
            language: Language::$lang,
            device_class: DeviceClass::$device,
            style_key: $key,
        }
    };
}

/// 字体样式字典
pub static TYPOGRAPHY_TABLE: &[StyleRecord] = &[
    style!("特大标题_PC_ZH", PING_FANG, "Semibold", 30.0, 46.0, Zh, Pc, "baace18851d4410b290e76e4030a6c43894015b7"),
    style!("一级标题_PC_ZH", PING_FANG, "Semibold", 24.0, 36.0, Zh, Pc, "84b11a3514fcc6331fd7b22faaf6b0e1e479a60c"),
    style!("二级标题_PC_ZH", PING_FANG, "Medium", 20.0, 30.0, Zh, Pc, "815d93ed9bfd4457154e8938482e258c29ef97dd"),
    style!("三级标题_PC_ZH", PING_FANG, "Medium", 18.0, 28.0, Zh, Pc, "357161d8af91a6c343195f3a85e437bd1ae7428a"),
    style!("四级标题_PC_ZH", PING_FANG, "Medium", 16.0, 24.0, Zh, Pc, "dc094b69f79fb32793a63a94ebfa0bee11c680ee"),
    style!("五级标题_PC_ZH", PING_FANG, "Regular", 16.0, 24.0, Zh, Pc, "b969aea446b6cdb04d9a22f74016d84804bd04ea"),
    style!("辅助标题_PC_ZH", PING_FANG, "Medium", 14.0, 22.0, Zh, Pc, "633417d53d1f6aaf5a25836c3dfbb7865cc26901"),
    style!("正文_PC_ZH", PING_FANG, "Regular", 14.0, 22.0, Zh, Pc, "a619584c8b84081754e0d0548cc02918bb2608ae"),
    style!("正文辅助_PC_ZH", PING_FANG, "Regular", 12.0, 20.0, Zh, Pc, "800d06fe6c96efcf63c147c3908ac723663ef12a"),
    style!("辅助_PC_ZH", PING_FANG, "Medium", 12.0, 20.0, Zh, Pc, "08d5d98e3b3457af595d34e5701aa5f15b7d6bdf"),
    style!("小辅助_PC_ZH", PING_FANG, "Medium", 10.0, 16.0, Zh, Pc, "a468d88d9821a71292ff1248f343718729f385ee"),
    style!("最小辅助_PC_ZH", PING_FANG, "Regular", 10.0, 16.0, Zh, Pc, "3e7b95748455839143dce3a39f2c08ce24cca648"),
    style!("Title-0_PC_EN", SF_PRO, "Semibold", 30.0, 46.0, En, Pc, "c94c00e250f2f32a1e99b8a4fb5f847d980c93f3"),
    style!("Title-1_PC_EN", SF_PRO, "Semibold", 24.0, 36.0, En, Pc, "493f65cc7355e1dfdb902d3ae2bb21931d898e9c"),
    style!("Title-2_PC_EN", SF_PRO, "Medium", 20.0, 30.0, En, Pc, "c272b336db56ff1ee5e67415b197fcdce26bf8e5"),
    style!("Title-3_PC_EN", SF_PRO, "Medium", 18.0, 28.0, En, Pc, "f5ec4aa020fa8adcd2dd3d3422d75a0f40b9a602"),
    style!("Title-4_PC_EN", SF_PRO, "Medium", 16.0, 24.0, En, Pc, "fef0d8335452173953a6fe8309175fddb989c0d1"),
    style!("Title-5_PC_EN", SF_PRO, "Regular", 16.0, 24.0, En, Pc, "2fb9fc4d80b17fbe299d8fad71ade84f0c8853ca"),
    style!("Headline_PC_EN", SF_PRO, "Medium", 14.0, 22.0, En, Pc, "effac6f1285c0efcbcdfd9fac1295bc4fbcf82bb"),
    style!("Body-0_PC_EN", SF_PRO, "Regular", 14.0, 22.0, En, Pc, "bd0fe524af75554cb26f336c6916c3100be75f2d"),
    style!("Body-2_PC_EN", SF_PRO, "Regular", 12.0, 20.0, En, Pc, "2d7121c34523ead5779a21d8ccdfb215b5c10ac3"),
    style!("Caption-0_PC_EN", SF_PRO, "Medium", 12.0, 20.0, En, Pc, "3008f7356e60db42a85d8bcaf3be8674d36dc88e"),
    style!("Caption-1_PC_EN", SF_PRO, "Medium", 10.0, 16.0, En, Pc, "74933d4d09d0c53610005529b169ce645707cb85"),
    style!("Caption-3_PC_EN", SF_PRO, "Regular", 10.0, 16.0, En, Pc, "3aa3ee2538536526e5083d46e57a82552dadde45"),
    style!("特大标题-0_Mobile_ZH", PING_FANG, "Semibold", 26.0, 40.0, Zh, Mobile, "f153b4fdf50677c79e07bd3530a42c54441049b2"),
    style!("一级标题_Mobile_ZH", PING_FANG, "Semibold", 24.0, 36.0, Zh, Mobile, "9ce249b5c7bfadde65c7352a06027589f2456ac5"),
    style!("二级标题_Mobile_ZH", PING_FANG, "Medium", 20.0, 30.0, Zh, Mobile, "8a6546c5ff33b92f0fa7e4d77d3c15e2965f0531"),
    style!("三级标题_Mobile_ZH", PING_FANG, "Medium", 17.0, 26.0, Zh, Mobile, "26f3c1cf6108f8877f9bc366afe9679ca3171402"),
    style!("四级标题_Mobile_ZH", PING_FANG, "Regular", 17.0, 26.0, Zh, Mobile, "34c5748b0a417539a6f823bacd0b3811d001d505"),
    style!("辅助标题_Mobile_ZH", PING_FANG, "Medium", 16.0, 24.0, Zh, Mobile, "addf9e38fdc0939b4f1b6eed62273878e58119d6"),
    style!("正文_Mobile_ZH", PING_FANG, "Regular", 16.0, 24.0, Zh, Mobile, "a18a512f0c97944421691f6764efd4345d417fc6"),
    style!("正文大辅助_Mobile_ZH", PING_FANG, "Medium", 14.0, 22.0, Zh, Mobile, "ea03cc6a6e05ef1fee95779d53a5be1df8258b37"),
    style!("正文辅助_Mobile_ZH", PING_FANG, "Regular", 14.0, 22.0, Zh, Mobile, "67d7fe3b961232098eea36d351d395aaa691a9eb"),
    style!("辅助_Mobile_ZH", PING_FANG, "Medium", 12.0, 20.0, Zh, Mobile, "336fc9d0dae54fdfccdd2e3120b61b80da815e3a"),
    style!("小辅助_Mobile_ZH", PING_FANG, "Regular", 12.0, 20.0, Zh, Mobile, "839429252dacd1cda2ef4c9ed8cb5d1b26c16480"),
    style!("次小辅助_Mobile_ZH", PING_FANG, "Medium", 10.0, 16.0, Zh, Mobile, "739d6a80237c673794a7a90e83c3218ea1915f0a"),
    style!("最小辅助_Mobile_ZH", PING_FANG, "Regular", 10.0, 16.0, Zh, Mobile, "a1b3294ec95bdb06f55ca9abbfe62f699a6b1f44"),
    style!("Title-0_Mobile_EN", SF_PRO, "Semibold", 26.0, 40.0, En, Mobile, "eda380179c68f96c0731cf362eb923ad13b2ca73"),
    style!("Title-1_Mobile_EN", SF_PRO, "Semibold", 24.0, 36.0, En, Mobile, "9ae457259718e71a80d0a4668b83523cd29163e1"),
    style!("Title-2_Mobile_EN", SF_PRO, "Medium", 20.0, 30.0, En, Mobile, "1611eaa6df3cb6c9327d9725d0d2cc51ad52fd7a"),
    style!("Title-3_Mobile_EN", SF_PRO, "Medium", 17.0, 26.0, En, Mobile, "5763f3c5b9edba982586554e533ab1da03c54d4f"),
    style!("Title-4_Mobile_EN", SF_PRO, "Regular", 17.0, 26.0, En, Mobile, "2372fe6023fdd3d90810b615a0b3b8bf0f4522b6"),
    style!("Headline_Mobile_EN", SF_PRO, "Medium", 16.0, 24.0, En, Mobile, "421c19631f990150c2a67f6ef250d894d7883f57"),
    style!("Body-0_Mobile_EN", SF_PRO, "Regular", 16.0, 24.0, En, Mobile, "7b3e6e2a112344f4c9df622c3b074b579076d4ec"),
    style!("Body-1_Mobile_EN", SF_PRO, "Medium", 14.0, 22.0, En, Mobile, "036d8bc9d371ea10c901ddbb0e31fc663a2a119b"),
    style!("Body-2_Mobile_EN", SF_PRO, "Regular", 14.0, 22.0, En, Mobile, "330fe08996401272f4eedaa3ae6d40b2124d98ee"),
    style!("Caption-0_Mobile_EN", SF_PRO, "Medium", 12.0, 20.0, En, Mobile, "89101c98c1679dc429e55b76cca794fe5d7efa30"),
    style!("Caption-1_Mobile_EN", SF_PRO, "Regular", 12.0, 20.0, En, Mobile, "a0cbea28dc1f1a9978910d3312a289087883a6a1"),
    style!("Caption-2_Mobile_EN", SF_PRO, "Medium", 10.0, 16.0, En, Mobile, "bd8f949cf3d693a949bae0f5cbb7d57b91461c13"),
    style!("Caption-3_Mobile_EN", SF_PRO, "Regular", 10.0, 16.0, En, Mobile, "8c1ee07fd1c8cfac51946eeac84ed18e61e7cb19"),
];

/// 查找匹配的样式记录
///
/// 字族不参与匹配：输入字体只提供字重，目标语言/设备决定返回的规范字体。
/// 字重为空、字号或行高不为正时直接返回 `None`。
pub fn find_style(
    font: &FontName,
    font_size: f64,
    line_height: f64,
    language: Language,
    device_class: DeviceClass,
) -> Option<&'static StyleRecord> {
    if font.style.is_empty() || !(font_size > 0.0) || !(line_height > 0.0) {
        return None;
    }

    TYPOGRAPHY_TABLE
        .iter()
        .find(|record| record.matches(&font.style, font_size, line_height, language, device_class))
}

/// 获取样式键，未匹配时返回空字符串
pub fn resolve_style_key(
    font: &FontName,
    font_size: f64,
    line_height: f64,
    language: Language,
    device_class: DeviceClass,
) -> &'static str {
    find_style(font, font_size, line_height, language, device_class)
        .map(|record| record.style_key)
        .unwrap_or("")
}

/// 获取目标语言/设备下的规范字体
pub fn resolve_font(
    font: &FontName,
    font_size: f64,
    line_height: f64,
    language: Language,
    device_class: DeviceClass,
) -> Option<FontName> {
    find_style(font, font_size, line_height, language, device_class).map(StyleRecord::canonical_font)
}
