//! Great-circle distance and the delivery price formula
//!
//! Everything here is pure and synchronous.

use crate::models::{DeliveryEstimateResult, GeoPoint, PricingConfig};
use crate::utils::constants::EARTH_RADIUS_KM;

/// Haversine distance between two points in kilometers
pub fn haversine_km(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lng = (to.lng - from.lng).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    // Rounding can push `a` a hair past 1 for antipodal points
    let a = a.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Price a delivery of `distance_km` with `preparation_count` orders queued
pub fn price_delivery(
    distance_km: f64,
    preparation_count: u32,
    pricing: &PricingConfig,
) -> DeliveryEstimateResult {
    let rounded_km = distance_km.ceil();

    let fee = (rounded_km * pricing.fee_per_km).max(pricing.min_fee);
    let base_minutes = pricing.base_minutes + rounded_km * pricing.minutes_per_km;
    let extra_minutes = preparation_count as f64 * pricing.minutes_per_queued_order;

    DeliveryEstimateResult {
        fee,
        minutes: base_minutes + extra_minutes,
        distance_km,
        rounded_km,
    }
}

/// Distance and price for two resolved points
pub fn estimate_between(
    from: GeoPoint,
    to: GeoPoint,
    preparation_count: u32,
    pricing: &PricingConfig,
) -> DeliveryEstimateResult {
    price_delivery(haversine_km(from, to), preparation_count, pricing)
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLOSSEUM_AREA: GeoPoint = GeoPoint { lat: 41.9028, lng: 12.4964 };
    const SAN_GIOVANNI: GeoPoint = GeoPoint { lat: 41.8919, lng: 12.5113 };

    #[test]
    fn test_haversine_known_distance() {
        let d = haversine_km(COLOSSEUM_AREA, SAN_GIOVANNI);
        assert!(d > 1.0 && d < 2.0, "expected ~1.7km, got {}", d);

        // Rome -> Milan is roughly 477km
        let milan = GeoPoint::new(45.4642, 9.1900);
        let d = haversine_km(COLOSSEUM_AREA, milan);
        assert!((d - 477.0).abs() < 5.0, "got {}", d);
    }

    #[test]
    fn test_haversine_is_symmetric() {
        let ab = haversine_km(COLOSSEUM_AREA, SAN_GIOVANNI);
        let ba = haversine_km(SAN_GIOVANNI, COLOSSEUM_AREA);
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn test_antipodal_points_do_not_produce_nan() {
        let d = haversine_km(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 180.0));
        assert!(d.is_finite());
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn test_rome_example() {
        let pricing = PricingConfig::default();
        let result = estimate_between(COLOSSEUM_AREA, SAN_GIOVANNI, 0, &pricing);
        assert_eq!(result.rounded_km, 2.0);
        assert_eq!(result.fee, 1.0);
        assert_eq!(result.minutes, 33.0);

        let queued = estimate_between(COLOSSEUM_AREA, SAN_GIOVANNI, 4, &pricing);
        assert_eq!(queued.fee, 1.0);
        assert_eq!(queued.minutes, 53.0);
    }

    #[test]
    fn test_distance_rounds_up() {
        let result = price_delivery(4.2, 0, &PricingConfig::default());
        assert_eq!(result.rounded_km, 5.0);
        assert_eq!(result.fee, 2.5);
        assert_eq!(result.minutes, 37.5);
    }

    #[test]
    fn test_identical_points() {
        let result = estimate_between(SAN_GIOVANNI, SAN_GIOVANNI, 0, &PricingConfig::default());
        assert_eq!(result.distance_km, 0.0);
        assert_eq!(result.rounded_km, 0.0);
        assert_eq!(result.fee, 1.0);
        assert_eq!(result.minutes, 30.0);
    }

    #[test]
    fn test_lower_bounds_hold_across_grid() {
        let pricing = PricingConfig::default();
        let points = [
            GeoPoint::new(-89.9, -179.9),
            GeoPoint::new(-33.86, 151.21),
            GeoPoint::new(0.0, 0.0),
            COLOSSEUM_AREA,
            GeoPoint::new(64.15, -21.94),
            GeoPoint::new(89.9, 179.9),
        ];
        for from in points {
            for to in points {
                for queued in [0, 1, 7] {
                    let result = estimate_between(from, to, queued, &pricing);
                    assert!(result.fee >= 1.0);
                    assert!(result.minutes >= 30.0);
                    assert_eq!(result, estimate_between(from, to, queued, &pricing));
                }
            }
        }
    }

    #[test]
    fn test_custom_pricing() {
        let pricing = PricingConfig {
            fee_per_km: 1.0,
            min_fee: 3.0,
            base_minutes: 20.0,
            minutes_per_km: 2.0,
            minutes_per_queued_order: 10.0,
        };
        let result = price_delivery(2.1, 2, &pricing);
        assert_eq!(result.fee, 3.0);
        assert_eq!(result.minutes, 20.0 + 6.0 + 20.0);
    }
}
