use ipnet::IpNet;
use std::net::IpAddr;

use super::{CountryLookup, ResolutionError};
use crate::models::CountryCode;

/// In-memory country lookup over explicit networks.
///
/// When networks overlap the most specific (longest prefix) one wins.
#[derive(Debug, Clone, Default)]
pub struct RangeTable {
    ranges: Vec<(IpNet, CountryCode)>,
}

impl RangeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, net: IpNet, country: CountryCode) {
        self.ranges.push((net.trunc(), country));
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with(mut self, net: IpNet, country: CountryCode) -> Self {
        self.insert(net, country);
        self
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

impl FromIterator<(IpNet, CountryCode)> for RangeTable {
    fn from_iter<T: IntoIterator<Item = (IpNet, CountryCode)>>(iter: T) -> Self {
        let mut table = Self::new();
        for (net, country) in iter {
            table.insert(net, country);
        }
        table
    }
}

impl CountryLookup for RangeTable {
    fn lookup_country(&self, ip: IpAddr) -> Result<CountryCode, ResolutionError> {
        self.ranges
            .iter()
            .filter(|(net, _)| net.contains(&ip))
            .max_by_key(|(net, _)| net.prefix_len())
            .map(|(_, country)| country.clone())
            .ok_or(ResolutionError::NotFound(ip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> CountryCode {
        CountryCode::parse(s).unwrap()
    }

    fn net(s: &str) -> IpNet {
        s.parse().unwrap()
    }

    #[test]
    fn test_longest_prefix_wins() {
        let table = RangeTable::new()
            .with(net("188.0.0.0/8"), code("DE"))
            .with(net("188.63.76.0/24"), code("US"))
            .with(net("188.63.0.0/16"), code("FR"));

        assert_eq!(table.resolve_country("188.63.76.112").unwrap(), code("US"));
        assert_eq!(table.resolve_country("188.63.1.1").unwrap(), code("FR"));
        assert_eq!(table.resolve_country("188.1.1.1").unwrap(), code("DE"));
    }

    #[test]
    fn test_not_found() {
        let table: RangeTable = [(net("2001:db8::/32"), code("JP"))].into_iter().collect();

        assert_eq!(table.resolve_country("2001:db8::42").unwrap(), code("JP"));
        assert!(matches!(
            table.resolve_country("10.0.0.1"),
            Err(ResolutionError::NotFound(_))
        ));
    }

    #[test]
    fn test_host_bits_are_truncated() {
        let table = RangeTable::new().with(net("192.0.2.77/24"), code("GB"));
        assert_eq!(table.len(), 1);
        assert_eq!(table.resolve_country("192.0.2.1").unwrap(), code("GB"));
    }

    #[test]
    fn test_repeated_lookups_are_stable() {
        let table = RangeTable::new().with(net("8.8.8.0/24"), code("US"));
        let first = table.resolve_country("8.8.8.8").unwrap();
        for _ in 0..10 {
            assert_eq!(table.resolve_country("8.8.8.8").unwrap(), first);
        }
    }
}
