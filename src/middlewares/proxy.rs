use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use axum::{
    extract::{ConnectInfo, Request},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use ipnet::IpNet;

use crate::state::AppState;

/// Extension type to store resolved client IP
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClientIp(pub IpAddr);

fn peer_is_trusted(proxies: &[IpNet], peer: Option<IpAddr>) -> bool {
    match peer {
        Some(ip) => proxies.iter().any(|net| net.contains(&ip)),
        None => false,
    }
}

/// Client address announced by a proxy: Cloudflare header, then the first
/// X-Forwarded-For hop, then X-Real-IP.
fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    if let Some(cf) = header("cf-connecting-ip") {
        return IpAddr::from_str(cf.trim()).ok();
    }
    if let Some(xff) = header("x-forwarded-for") {
        return xff.split(',').next().and_then(|s| IpAddr::from_str(s.trim()).ok());
    }
    header("x-real-ip").and_then(|xri| IpAddr::from_str(xri.trim()).ok())
}

/// Resolves the caller's IP. Forwarding headers are only believed when the
/// socket peer sits inside one of the configured trusted proxy ranges.
pub fn resolve_client_ip(
    proxies: &[IpNet],
    peer: Option<IpAddr>,
    headers: &HeaderMap,
) -> Option<IpAddr> {
    let forwarded = if peer_is_trusted(proxies, peer) {
        forwarded_ip(headers)
    } else {
        None
    };
    forwarded.or(peer)
}

pub async fn proxy_middleware(mut req: Request, next: Next) -> Response {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    let proxies = req
        .extensions()
        .get::<AppState>()
        .map(|state| state.config.trusted_proxies.clone())
        .unwrap_or_default();

    if let Some(ip) = resolve_client_ip(&proxies, peer, req.headers()) {
        req.extensions_mut().insert(ClientIp(ip));
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert(*k, HeaderValue::from_static(v));
        }
        map
    }

    fn proxies() -> Vec<IpNet> {
        vec![IpNet::from_str("10.0.0.0/8").unwrap()]
    }

    #[test]
    fn untrusted_peer_headers_are_ignored() {
        let peer: IpAddr = "203.0.113.9".parse().unwrap();
        let h = headers(&[("x-forwarded-for", "198.51.100.1")]);
        assert_eq!(resolve_client_ip(&proxies(), Some(peer), &h), Some(peer));
    }

    #[test]
    fn trusted_peer_uses_first_forwarded_hop() {
        let peer: IpAddr = "10.1.2.3".parse().unwrap();
        let h = headers(&[("x-forwarded-for", "198.51.100.1, 10.1.2.3")]);
        assert_eq!(
            resolve_client_ip(&proxies(), Some(peer), &h),
            Some("198.51.100.1".parse().unwrap())
        );
    }

    #[test]
    fn cloudflare_header_wins_over_forwarded_for() {
        let peer: IpAddr = "10.1.2.3".parse().unwrap();
        let h = headers(&[
            ("cf-connecting-ip", "192.0.2.7"),
            ("x-forwarded-for", "198.51.100.1"),
        ]);
        assert_eq!(
            resolve_client_ip(&proxies(), Some(peer), &h),
            Some("192.0.2.7".parse().unwrap())
        );
    }

    #[test]
    fn no_peer_and_no_trust_resolves_nothing() {
        let h = headers(&[("x-real-ip", "192.0.2.7")]);
        assert_eq!(resolve_client_ip(&proxies(), None, &h), None);
    }
}
