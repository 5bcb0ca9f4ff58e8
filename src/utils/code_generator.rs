use rand::Rng;

const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// 生成兑换码：前缀 + 指定长度的大写字母数字组合，例如 GIFT-7Q2XK9AB
pub fn generate_claim_code(prefix: &str, length: usize) -> String {
    let mut rng = rand::thread_rng();
    let body: String = (0..length)
        .map(|_| CODE_CHARSET[rng.gen_range(0..CODE_CHARSET.len())] as char)
        .collect();
    format!("{prefix}{body}")
}

/// 兑换码大小写不敏感，统一转为大写
pub fn normalize_claim_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}
