use serde::{Deserialize, Serialize};
use std::fmt;

/// Primary key of a peer row in the store
pub type PeerId = i64;

/// A peer as read from the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerRecord {
    pub id: PeerId,
    /// Candidate multiaddrs in lookup precedence order
    pub addresses: Vec<String>,
}

impl PeerRecord {
    pub fn new<I, S>(id: PeerId, addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id,
            addresses: addresses.into_iter().map(Into::into).collect(),
        }
    }
}

/// ISO 3166-1 alpha-2 country code, or the `unknown` sentinel
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryCode(String);

impl CountryCode {
    const UNKNOWN: &'static str = "unknown";

    /// Accepts two ASCII letters in any case, stored uppercase.
    pub fn parse(code: &str) -> Option<Self> {
        let code = code.trim();
        if code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            Some(Self(code.to_ascii_uppercase()))
        } else {
            None
        }
    }

    pub fn unknown() -> Self {
        Self(Self::UNKNOWN.to_string())
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == Self::UNKNOWN
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
