//! Multiaddr parsing
//!
//! Peers advertise self-describing multiaddrs such as
//! `/ip4/188.63.76.112/tcp/4001`. Only the network-layer host is of
//! interest here: the transport and identity segments are ignored.

use multiaddr::{Multiaddr, Protocol};
use serde::Serialize;
use std::net::IpAddr;
use thiserror::Error;

/// Failure to extract a host from an address string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid multiaddr `{input}`: {reason}")]
pub struct ParseError {
    pub input: String,
    pub reason: String,
}

impl ParseError {
    fn new(input: &str, reason: impl Into<String>) -> Self {
        Self {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HostKind {
    Ip4,
    Ip6,
    Dns,
}

/// The routable host of a successfully parsed multiaddr
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedAddress {
    /// IP literal or DNS name
    pub host: String,
    pub kind: HostKind,
}

impl ParsedAddress {
    pub fn ip(&self) -> Option<IpAddr> {
        match self.kind {
            HostKind::Ip4 | HostKind::Ip6 => self.host.parse().ok(),
            HostKind::Dns => None,
        }
    }
}

/// Parse a multiaddr string and pick its host.
///
/// An `ip4` segment takes precedence over `ip6`, which takes precedence
/// over DNS names, regardless of where they appear in the address.
pub fn parse(input: &str) -> Result<ParsedAddress, ParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ParseError::new(input, "empty address"));
    }

    let addr: Multiaddr = trimmed
        .parse()
        .map_err(|e: multiaddr::Error| ParseError::new(input, e.to_string()))?;

    let mut ip6 = None;
    let mut dns = None;

    for protocol in addr.iter() {
        match protocol {
            Protocol::Ip4(ip) => {
                return Ok(ParsedAddress {
                    host: ip.to_string(),
                    kind: HostKind::Ip4,
                });
            }
            Protocol::Ip6(ip) if ip6.is_none() => ip6 = Some(ip),
            Protocol::Dns(name)
            | Protocol::Dns4(name)
            | Protocol::Dns6(name)
            | Protocol::Dnsaddr(name)
                if dns.is_none() =>
            {
                dns = Some(name.to_string())
            }
            _ => {}
        }
    }

    if let Some(ip) = ip6 {
        return Ok(ParsedAddress {
            host: ip.to_string(),
            kind: HostKind::Ip6,
        });
    }

    dns.map(|host| ParsedAddress {
        host,
        kind: HostKind::Dns,
    })
    .ok_or_else(|| ParseError::new(input, "no network-layer segment"))
}

/// Split a stored address list into its entries.
///
/// The peer table keeps addresses as a Postgres array literal, e.g.
/// `{/ip6/::/tcp/37374,/ip4/151.252.13.181/tcp/37374}`. Braces are optional
/// and double-quoted entries are unquoted. Blank entries are dropped.
pub fn parse_address_list(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    let inner = raw
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .unwrap_or(raw);

    inner
        .split(',')
        .map(|entry| entry.trim().trim_matches('"').trim())
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}
