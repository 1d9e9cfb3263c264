//! Unit tests for mt-core primitives.

#[cfg(test)]
mod ids {
    use crate::{EdgeId, NodeId, VehicleId};

    #[test]
    fn index_roundtrip() {
        let id = VehicleId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(VehicleId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(NodeId::INVALID.0, u32::MAX);
        assert_eq!(EdgeId::INVALID.0, u32::MAX);
        assert_eq!(VehicleId::default(), VehicleId::INVALID);
    }

    #[test]
    fn display() {
        assert_eq!(EdgeId(7).to_string(), "EdgeId(7)");
    }
}

#[cfg(test)]
mod geo {
    use crate::{GeoPoint, Vec2, haversine_m};

    #[test]
    fn zero_distance() {
        let p = GeoPoint::new(49.0, 9.0);
        assert!(p.distance_m(p) < 0.01);
    }

    #[test]
    fn one_degree_latitude() {
        let a = GeoPoint::new(48.0, 9.0);
        let b = GeoPoint::new(49.0, 9.0);
        let d = haversine_m(a, b);
        assert!((d - 111_195.0).abs() < 500.0, "got {d}");
    }

    #[test]
    fn normalize_zero_stays_zero() {
        assert_eq!(Vec2::ZERO.normalize(), Vec2::ZERO);
        let n = Vec2::new(3.0, 4.0).normalize();
        assert!((n.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn negated_normalized_is_exact() {
        let a = GeoPoint::new(48.7758, 9.1829);
        let b = GeoPoint::new(48.7761, 9.1834);
        assert_eq!((b - a).normalize(), -(a - b).normalize());
    }

    #[test]
    fn bearings_are_clockwise_from_north() {
        let north = Vec2::new(0.0, 1.0).bearing();
        let east  = Vec2::new(1.0, 0.0).bearing();
        let south = Vec2::new(0.0, -1.0).bearing();
        let west  = Vec2::new(-1.0, 0.0).bearing();
        assert!(north < east && east < south && south < west);
        assert!(north.abs() < 1e-6);
    }
}

#[cfg(test)]
mod direction {
    use crate::{Direction, GeoPoint, curve_direction};

    // Junction at the origin; coordinates are (lat, lon).
    fn p(lat: f32, lon: f32) -> GeoPoint {
        GeoPoint::new(lat, lon)
    }

    #[test]
    fn straight_through() {
        // Heading north through the junction.
        let d = curve_direction(p(-1.0, 0.0), p(0.0, 0.0), p(1.0, 0.0));
        assert_eq!(d, Direction::Straight);
    }

    #[test]
    fn left_and_right() {
        // Heading north, then west (left) or east (right).
        assert_eq!(curve_direction(p(-1.0, 0.0), p(0.0, 0.0), p(0.0, -1.0)), Direction::Left);
        assert_eq!(curve_direction(p(-1.0, 0.0), p(0.0, 0.0), p(0.0, 1.0)), Direction::Right);
    }

    #[test]
    fn reversal_is_left() {
        assert_eq!(curve_direction(p(-1.0, 0.0), p(0.0, 0.0), p(-1.0, 0.0)), Direction::Left);
    }
}

#[cfg(test)]
mod street {
    use crate::{StreetPriorities, StreetType};

    #[test]
    fn tags_parse() {
        assert_eq!(StreetType::from_tag("primary_link"), Some(StreetType::Primary));
        assert_eq!(StreetType::from_tag("footway"), None);
    }

    #[test]
    fn default_priorities_are_ordered() {
        let prios = StreetPriorities::default();
        assert!(prios.get(StreetType::Motorway) > prios.get(StreetType::Primary));
        assert!(prios.get(StreetType::Primary) > prios.get(StreetType::Residential));
    }

    #[test]
    fn override_one_class() {
        let mut prios = StreetPriorities::uniform(1);
        prios.set(StreetType::Service, 9);
        assert_eq!(prios.get(StreetType::Service), 9);
        assert_eq!(prios.get(StreetType::Trunk), 1);
    }
}

#[cfg(test)]
mod time {
    use crate::{SimClock, Tick};

    #[test]
    fn tick_arithmetic() {
        let t = Tick(10);
        assert_eq!(t + 5, Tick(15));
        assert_eq!(t.offset(3), Tick(13));
        assert_eq!(Tick(15) - Tick(10), 5u64);
        assert_eq!(Tick(3).since(Tick(5)), 0);
    }

    #[test]
    fn clock_hms() {
        let mut clock = SimClock::new();
        for _ in 0..3_725 {
            clock.advance();
        }
        assert_eq!(clock.elapsed_hms(), (1, 2, 5));
        assert_eq!(clock.to_string(), "T3725 (1:02:05)");
    }
}

#[cfg(test)]
mod config {
    use crate::SimConfig;

    #[test]
    fn default_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_cell_length() {
        let cfg = SimConfig { meters_per_cell: 0.0, ..SimConfig::default() };
        assert!(cfg.validate().is_err());
        let cfg = SimConfig { meters_per_cell: f32::NAN, ..SimConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_zero_threads() {
        let cfg = SimConfig { num_threads: Some(0), ..SimConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_shards_means_one_per_thread() {
        let cfg = SimConfig { shards: 0, num_threads: Some(4), ..SimConfig::default() };
        assert!(cfg.validate().is_ok());
    }
}

#[cfg(test)]
mod rng {
    use crate::{SimRng, Tick, VehicleId, VehicleRng};

    #[test]
    fn same_inputs_same_stream() {
        let mut r1 = VehicleRng::for_tick(12345, VehicleId(3), Tick(9));
        let mut r2 = VehicleRng::for_tick(12345, VehicleId(3), Tick(9));
        for _ in 0..100 {
            let a: f32 = r1.random();
            let b: f32 = r2.random();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn ticks_and_vehicles_differ() {
        let a: u64 = VehicleRng::for_tick(1, VehicleId(0), Tick(0)).random();
        let b: u64 = VehicleRng::for_tick(1, VehicleId(1), Tick(0)).random();
        let c: u64 = VehicleRng::for_tick(1, VehicleId(0), Tick(1)).random();
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn gen_bool_extremes() {
        let mut rng = VehicleRng::for_tick(0, VehicleId(0), Tick::ZERO);
        assert!(!rng.gen_bool(0.0));
        assert!(rng.gen_bool(1.0));
    }

    #[test]
    fn sim_rng_choose() {
        let mut rng = SimRng::new(7);
        let empty: [u8; 0] = [];
        assert!(rng.choose(&empty).is_none());
        assert_eq!(rng.choose(&[5u8]), Some(&5));
        let v: u32 = rng.gen_range(10..20);
        assert!((10..20).contains(&v));
    }
}
