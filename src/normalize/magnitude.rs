// 数量级字符串解析
//
// 上游页面以 "12.3K"、"4M" 这类缩写展示计数；解析失败一律归零，
// 绝不抛错，以抵御上游标记漂移

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // 整数部分允许千分位逗号，小数部分可选，单位后缀可选
    static ref MAGNITUDE_RE: Regex =
        Regex::new(r"^([0-9][0-9,]*)(?:\.([0-9]+))?\s*([KkMmBb])?$").unwrap();
}

/// 将数量级字符串解析为整数计数
///
/// 空串、不可解析或为负的输入返回 0；应用乘数后按四舍五入取整
pub fn parse_magnitude(text: &str) -> u64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0;
    }

    let caps = match MAGNITUDE_RE.captures(trimmed) {
        Some(caps) => caps,
        None => return 0,
    };

    let mut number: String = caps[1].chars().filter(|c| *c != ',').collect();
    if let Some(frac) = caps.get(2) {
        number.push('.');
        number.push_str(frac.as_str());
    }

    let value: f64 = match number.parse() {
        Ok(value) => value,
        Err(_) => return 0,
    };

    let multiplier = match caps.get(3) {
        Some(unit) => match unit.as_str().to_ascii_uppercase().as_str() {
            "K" => 1e3,
            "M" => 1e6,
            "B" => 1e9,
            _ => 1.0,
        },
        None => 1.0,
    };

    (value * multiplier).round() as u64
}
