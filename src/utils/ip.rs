//! 客户端 IP 提取
//!
//! 优先取 X-Forwarded-For 的第一跳，取不到时回落到对端地址。

use std::net::IpAddr;

use actix_web::HttpRequest;

/// 检查 IP 是否为私有地址或 localhost
///
/// GeoIP 数据库对这类地址没有条目，直接跳过查询。
pub fn is_private_or_local(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_private() || v4.is_loopback(),
        IpAddr::V6(v6) => {
            v6.is_loopback()
                || (v6.segments()[0] & 0xfe00) == 0xfc00 // fc00::/7 (ULA)
                || (v6.segments()[0] & 0xffc0) == 0xfe80 // fe80::/10 (link-local)
        }
    }
}

pub fn extract_client_ip(req: &HttpRequest) -> String {
    if let Some(forwarded) = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        // 多跳时第一个为客户端原始地址
        if let Some(first) = forwarded.split(',').next() {
            let candidate = first.trim();
            if !candidate.is_empty() {
                return candidate.to_string();
            }
        }
    }

    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}
