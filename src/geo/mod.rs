//! Country resolution for IP addresses
//!
//! [`CountryLookup`] is the seam between the enricher and whatever answers
//! "which country is this IP in". [`GeoResolver`] answers it from a MaxMind
//! database held in memory for the lifetime of the process; [`RangeTable`]
//! answers it from an explicit list of networks.

pub mod maxmind;
pub mod table;

use std::net::IpAddr;
use std::path::PathBuf;
use thiserror::Error;

use crate::models::CountryCode;

pub use maxmind::GeoResolver;
pub use table::RangeTable;

/// Per-host lookup failure. Expected for private and reserved ranges.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("host `{0}` is not an IP address")]
    InvalidHost(String),
    #[error("no network covers {0}")]
    NotFound(IpAddr),
    #[error("network covering {0} has no country code")]
    MissingCountry(IpAddr),
    #[error("database has no IPv6 data for {0}")]
    UnsupportedFamily(IpAddr),
    #[error("database lookup failed for {ip}")]
    Database {
        ip: IpAddr,
        #[source]
        source: maxminddb::MaxMindDbError,
    },
}

/// The geo database could not be opened or is not a valid MMDB file
#[derive(Debug, Error)]
#[error("failed to load GeoIP database at {}", path.display())]
pub struct DatabaseLoadError {
    pub path: PathBuf,
    #[source]
    pub source: maxminddb::MaxMindDbError,
}

pub trait CountryLookup: Send + Sync {
    fn lookup_country(&self, ip: IpAddr) -> Result<CountryCode, ResolutionError>;

    /// Resolve a textual host. Only IP literals are accepted; names are never
    /// sent to DNS.
    fn resolve_country(&self, host: &str) -> Result<CountryCode, ResolutionError> {
        let literal = host
            .trim()
            .trim_start_matches('[')
            .trim_end_matches(']');
        let ip: IpAddr = literal
            .parse()
            .map_err(|_| ResolutionError::InvalidHost(host.to_string()))?;
        self.lookup_country(ip)
    }
}
