//! 客户端 IP 提取
//!
//! 默认使用连接的对端地址（去掉端口）。对端是私有地址或 localhost 时，
//! 认为前面有反向代理，改用 X-Forwarded-For / X-Real-IP。

use std::net::IpAddr;

use actix_web::HttpRequest;
use actix_web::http::header::HeaderMap;
use tracing::debug;

/// 检查 IP 是否为私有地址或 localhost
pub fn is_private_or_local(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_private() || v4.is_loopback(),
        IpAddr::V6(v6) => {
            v6.is_loopback()
                || (v6.segments()[0] & 0xfe00) == 0xfc00 // fc00::/7
                || (v6.segments()[0] & 0xffc0) == 0xfe80 // fe80::/10
        }
    }
}

/// 从 HttpRequest 提取客户端 IP，拿不到时返回空字符串
pub fn extract_client_ip(req: &HttpRequest) -> String {
    let Some(peer) = req.peer_addr() else {
        return extract_forwarded_ip_from_headers(req.headers()).unwrap_or_default();
    };
    resolve_client_ip(peer.ip(), req.headers())
}

pub fn resolve_client_ip(peer_ip: IpAddr, headers: &HeaderMap) -> String {
    if is_private_or_local(&peer_ip)
        && let Some(real_ip) = extract_forwarded_ip_from_headers(headers)
    {
        debug!("Proxy detected (peer {}): using forwarded IP {}", peer_ip, real_ip);
        return real_ip;
    }
    peer_ip.to_string()
}

/// 优先 X-Forwarded-For 的第一跳，其次 X-Real-IP
pub fn extract_forwarded_ip_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}
