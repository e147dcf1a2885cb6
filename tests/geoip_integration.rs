//! Tests against a real MaxMind Country database
//!
//! Point `GEOIP_COUNTRY_DB` at a GeoLite2-Country (or City) .mmdb file to run
//! them. Without it they are skipped.

use peergeo::enrich::{Enricher, Enrichment};
use peergeo::geo::{CountryLookup, GeoResolver, ResolutionError};
use peergeo::models::PeerRecord;
use std::sync::Arc;

fn open_resolver() -> Option<GeoResolver> {
    let path = std::env::var("GEOIP_COUNTRY_DB").ok()?;
    if !std::path::Path::new(&path).exists() {
        return None;
    }
    Some(GeoResolver::open(&path).expect("Failed to open GeoIP database"))
}

#[test]
fn test_public_addresses_resolve() {
    let Some(resolver) = open_resolver() else {
        println!("SKIPPED: GEOIP_COUNTRY_DB not set");
        return;
    };

    assert_eq!(resolver.resolve_country("8.8.8.8").unwrap().as_str(), "US");
    assert_eq!(
        resolver
            .resolve_country("2001:4860:4860::8888")
            .unwrap()
            .as_str(),
        "US"
    );
}

#[test]
fn test_private_addresses_do_not_resolve() {
    let Some(resolver) = open_resolver() else {
        println!("SKIPPED: GEOIP_COUNTRY_DB not set");
        return;
    };

    for host in ["10.0.0.1", "192.168.1.1", "127.0.0.1", "::1"] {
        assert!(matches!(
            resolver.resolve_country(host),
            Err(ResolutionError::NotFound(_))
        ));
    }
}

#[test]
fn test_repeated_lookups_agree() {
    let Some(resolver) = open_resolver() else {
        println!("SKIPPED: GEOIP_COUNTRY_DB not set");
        return;
    };

    let first = resolver.resolve_country("1.1.1.1").ok();
    let cloned = resolver.clone();
    for _ in 0..5 {
        assert_eq!(resolver.resolve_country("1.1.1.1").ok(), first);
        assert_eq!(cloned.resolve_country("1.1.1.1").ok(), first);
    }
}

#[test]
fn test_enrich_with_real_database() {
    let Some(resolver) = open_resolver() else {
        println!("SKIPPED: GEOIP_COUNTRY_DB not set");
        return;
    };

    let enricher = Enricher::new(Arc::new(resolver));
    let peer = PeerRecord::new(
        1,
        [
            "/ip6/::/tcp/37374",
            "/ip4/10.0.0.1/tcp/4001",
            "/ip4/8.8.8.8/tcp/4001",
        ],
    );

    match enricher.enrich(&peer) {
        Enrichment::Country(country) => assert_eq!(country.as_str(), "US"),
        Enrichment::Unresolved(addresses) => panic!("unresolved: {addresses:?}"),
    }
}
