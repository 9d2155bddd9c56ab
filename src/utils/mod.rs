pub mod ip;
pub mod ua;

use uuid::Uuid;

/// 生成 8 位随机别名（UUID v4 截断）
///
/// 碰撞概率非零，由创建路径上的存在性检查 + 有限重试兜底。
pub fn generate_alias() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// 匿名访客的归因 key：对 (ip, user-agent) 做 xxh64
///
/// 未登录访问按此 key 去重，已登录访问直接用用户 id。
pub fn anonymous_visitor_key(ip: &str, user_agent: &str) -> String {
    use xxhash_rust::xxh64::xxh64;

    let fingerprint = format!("{}|{}", ip, user_agent);
    format!("anon:{:016x}", xxh64(fingerprint.as_bytes(), 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_alias_length() {
        for _ in 0..32 {
            let alias = generate_alias();
            assert_eq!(alias.len(), 8);
            assert!(alias.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn test_generate_alias_varies() {
        let a = generate_alias();
        let b = generate_alias();
        assert_ne!(a, b);
    }

    #[test]
    fn test_anonymous_visitor_key_stable() {
        let k1 = anonymous_visitor_key("203.0.113.9", "curl/8.0");
        let k2 = anonymous_visitor_key("203.0.113.9", "curl/8.0");
        let k3 = anonymous_visitor_key("203.0.113.10", "curl/8.0");
        assert_eq!(k1, k2);
        assert_ne!(k1, k3);
        assert!(k1.starts_with("anon:"));
    }
}
