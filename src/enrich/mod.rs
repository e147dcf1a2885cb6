//! Per-peer country enrichment
//!
//! A peer's addresses are tried in the order the store returned them. The
//! first address that both parses and resolves decides the peer's country;
//! later addresses are never looked at.

use std::sync::Arc;
use tracing::debug;

use crate::address::{self, ParseError, ParsedAddress};
use crate::geo::{CountryLookup, ResolutionError};
use crate::models::{CountryCode, PeerRecord};

/// Outcome of trying a single candidate address
#[derive(Debug)]
pub enum AddressOutcome<'a> {
    Resolved {
        address: &'a str,
        country: CountryCode,
    },
    ParseFailed {
        address: &'a str,
        error: ParseError,
    },
    Unresolvable {
        address: &'a str,
        parsed: ParsedAddress,
        error: ResolutionError,
    },
}

/// Outcome for a whole peer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enrichment {
    Country(CountryCode),
    /// Every candidate failed; carries the peer's original address list
    Unresolved(Vec<String>),
}

#[derive(Clone)]
pub struct Enricher {
    lookup: Arc<dyn CountryLookup>,
}

impl Enricher {
    pub fn new(lookup: Arc<dyn CountryLookup>) -> Self {
        Self { lookup }
    }

    pub fn attempt<'a>(&self, address: &'a str) -> AddressOutcome<'a> {
        let parsed = match address::parse(address) {
            Ok(parsed) => parsed,
            Err(error) => return AddressOutcome::ParseFailed { address, error },
        };

        match self.lookup.resolve_country(&parsed.host) {
            Ok(country) => AddressOutcome::Resolved { address, country },
            Err(error) => AddressOutcome::Unresolvable {
                address,
                parsed,
                error,
            },
        }
    }

    pub fn enrich(&self, peer: &PeerRecord) -> Enrichment {
        for address in &peer.addresses {
            match self.attempt(address) {
                AddressOutcome::Resolved { country, .. } => {
                    return Enrichment::Country(country);
                }
                AddressOutcome::ParseFailed { error, .. } => {
                    debug!(peer = peer.id, "Skipping address: {error}");
                }
                AddressOutcome::Unresolvable { address, error, .. } => {
                    debug!(peer = peer.id, "Could not resolve {address}: {error}");
                }
            }
        }

        debug!(peer = peer.id, addresses = ?peer.addresses, "No resolvable address");
        Enrichment::Unresolved(peer.addresses.clone())
    }
}
