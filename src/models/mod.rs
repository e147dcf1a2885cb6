pub mod peer;

pub use peer::{CountryCode, PeerId, PeerRecord};
