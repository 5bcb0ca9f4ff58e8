use crate::error::{AppError, AppResult};
use regex::Regex;
use std::sync::OnceLock;

fn phone_regex() -> &'static Regex {
    static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
    PHONE_REGEX.get_or_init(|| Regex::new(r"^\+?\d{8,15}$").expect("valid phone regex"))
}

/// 规范化手机号：去掉空格、横线、点与括号，保留开头的 +
pub fn normalize_phone(phone: &str) -> AppResult<String> {
    let normalized: String = phone
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
        .collect();

    if !phone_regex().is_match(&normalized) {
        return Err(AppError::ValidationError(format!(
            "Invalid phone number: {phone}"
        )));
    }

    Ok(normalized)
}
