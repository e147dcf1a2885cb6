//! Country lookups against a MaxMind GeoLite2/GeoIP2 MMDB
//!
//! The whole database is read into memory once and shared read-only by all
//! lookups, including lookups running on blocking worker threads.

use maxminddb::{geoip2, Reader};
use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use super::{CountryLookup, DatabaseLoadError, ResolutionError};
use crate::models::CountryCode;

/// Country resolver backed by a Country or City database
#[derive(Clone)]
pub struct GeoResolver {
    reader: Arc<Reader<Vec<u8>>>,
}

impl GeoResolver {
    /// Load the database at `path` into memory
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DatabaseLoadError> {
        let path = path.as_ref();
        let reader = Reader::open_readfile(path).map_err(|source| DatabaseLoadError {
            path: path.to_path_buf(),
            source,
        })?;

        info!(
            "Loaded GeoIP database {} ({}, built {})",
            path.display(),
            reader.metadata.database_type,
            reader.metadata.build_epoch
        );

        Ok(Self {
            reader: Arc::new(reader),
        })
    }
}

impl CountryLookup for GeoResolver {
    fn lookup_country(&self, ip: IpAddr) -> Result<CountryCode, ResolutionError> {
        if ip.is_ipv6() && self.reader.metadata.ip_version == 4 {
            return Err(ResolutionError::UnsupportedFamily(ip));
        }

        let result = self
            .reader
            .lookup(ip)
            .map_err(|source| ResolutionError::Database { ip, source })?;

        // geoip2::Country decodes the country fields of City databases too
        let country = result
            .decode::<geoip2::Country>()
            .map_err(|source| ResolutionError::Database { ip, source })?
            .ok_or(ResolutionError::NotFound(ip))?;

        country
            .country
            .iso_code
            .and_then(CountryCode::parse)
            .ok_or(ResolutionError::MissingCountry(ip))
    }
}
