//! Address of the person behind a request
//!
//! Used to locate a sample that carries no location text. The first
//! `X-Forwarded-For` entry wins when present; otherwise the TCP peer.

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

/// Caller address, when one can be determined
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallerIp(pub Option<IpAddr>);

#[async_trait]
impl<S> FromRequestParts<S> for CallerIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        Ok(CallerIp(forwarded_for(&parts.headers).or(peer)))
    }
}

/// First parseable address in `X-Forwarded-For`
fn forwarded_for(headers: &HeaderMap) -> Option<IpAddr> {
    let raw = headers.get("x-forwarded-for")?.to_str().ok()?;
    let first = raw.split(',').next()?.trim();
    first.parse().ok()
}
