use std::{net::IpAddr, str::FromStr};

use actix_web::HttpRequest;
use log::{debug, trace};
use regex::Regex;

/// Get the remote IP address from the request. It uses 3 sources to determine the IP address, in decreasing order
/// of preference:
/// 1. The `X-Forwarded-For` header, iif `use_x_forwarded_for` is set to true in the configuration.
/// 2. The `Forwarded` header, iif `use_forwarded` is set to true in the configuration.
/// 3. The peer address from the connection info.
pub fn get_remote_ip(req: &HttpRequest, use_x_forwarded_for: bool, use_forwarded: bool) -> Option<IpAddr> {
    let header = |name: &str| req.headers().get(name).and_then(|v| v.to_str().ok());
    if use_x_forwarded_for {
        trace!("Checking X-Forwarded-For header");
        if let Some(ip) = header("X-Forwarded-For").and_then(client_ip_from_forwarded_for) {
            debug!("Using X-Forwarded-For header for remote address: {ip}");
            return Some(ip);
        }
    }
    if use_forwarded {
        trace!("Checking Forwarded header");
        if let Some(ip) = header("Forwarded").and_then(client_ip_from_forwarded) {
            debug!("Using Forwarded header for remote address: {ip}");
            return Some(ip);
        }
    }
    let peer_addr = req.connection_info().peer_addr().map(|a| a.to_string());
    trace!("Using Peer address for remote address: {:?}", peer_addr);
    peer_addr.and_then(|s| IpAddr::from_str(&s).ok())
}

/// `X-Forwarded-For` carries the whole proxy chain. The client is the first entry.
fn client_ip_from_forwarded_for(value: &str) -> Option<IpAddr> {
    value.split(',').next().and_then(|s| IpAddr::from_str(s.trim()).ok())
}

/// Extracts the client IP from the first `for=` node of an RFC 7239 `Forwarded` header. Nodes may be quoted, carry
/// a port, and wrap IPv6 addresses in brackets.
fn client_ip_from_forwarded(value: &str) -> Option<IpAddr> {
    let re = Regex::new(r"for=(?P<node>[^;,\s]+)").ok()?;
    let node = re.captures(value)?.name("node")?.as_str().trim_matches('"');
    let ip = match node.strip_prefix('[') {
        Some(rest) => rest.split(']').next().unwrap_or(rest),
        None => node.split(':').next().unwrap_or(node),
    };
    IpAddr::from_str(ip).ok()
}
