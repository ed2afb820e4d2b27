//! Providers Module - External Services
//!
//! Geocoding port, the Nominatim HTTP client and a deterministic fake.

pub mod geocoder;
pub mod mock;
pub mod nominatim;

pub use geocoder::Geocoder;
pub use mock::StaticGeocoder;
pub use nominatim::{NominatimGeocoder, NominatimPlace};
