//! Unit tests for mt-vehicle.

#[cfg(test)]
mod fixtures {
    use mt_core::{Direction, EdgeId, GeoPoint, Vec2};
    use mt_graph::{EdgeSpec, LaneRef, StreetGraph};

    /// a → b → c with a connector at b, plus c → a with no connector.
    pub fn line() -> (StreetGraph, [EdgeId; 3]) {
        let mut g = StreetGraph::new(7.5);
        let a = g.add_node(GeoPoint::new(0.0, 0.0)).unwrap();
        let b = g.add_node(GeoPoint::new(0.0, 0.001)).unwrap();
        let c = g.add_node(GeoPoint::new(0.0, 0.002)).unwrap();
        let spec = |origin, destination| EdgeSpec {
            origin,
            destination,
            length_m: 75.0,
            origin_direction: Vec2::new(1.0, 0.0),
            destination_direction: Vec2::new(1.0, 0.0),
            max_speed_kmh: 50.0,
            lane_count: 1,
            priority: 1,
        };
        let ab = g.add_edge(spec(a, b)).unwrap();
        let bc = g.add_edge(spec(b, c)).unwrap();
        let ca = g.add_edge(spec(c, a)).unwrap();
        g.add_connector(b, LaneRef::new(ab, 0), LaneRef::new(bc, 0), Direction::Straight)
            .unwrap();
        g.finalize().unwrap();
        (g, [ab, bc, ca])
    }
}

#[cfg(test)]
mod nasch {
    use mt_core::{Tick, VehicleId, VehicleRng};

    use crate::{DrivingModel, NagelSchreckenberg};

    fn rng() -> VehicleRng {
        VehicleRng::for_tick(1, VehicleId(0), Tick(0))
    }

    #[test]
    fn probability_is_validated() {
        assert!(NagelSchreckenberg::new(1.5).is_err());
        assert!(NagelSchreckenberg::new(-0.1).is_err());
        assert_eq!(NagelSchreckenberg::new(0.3).unwrap().dawdle_probability(), 0.3);
        assert_eq!(NagelSchreckenberg::default().dawdle_probability(), 0.2);
    }

    #[test]
    fn accelerate_and_brake() {
        let m = NagelSchreckenberg::deterministic();
        assert_eq!(m.accelerate(0, 3), 1);
        assert_eq!(m.accelerate(3, 3), 3);
        assert_eq!(m.brake(3, 1), 1);
        assert_eq!(m.next_velocity(2, 5, 10, &mut rng()), 3);
        assert_eq!(m.next_velocity(2, 5, 0, &mut rng()), 0);
    }

    /// Looks only half as far as it could.
    struct Cautious;

    impl DrivingModel for Cautious {
        fn dash(&self, gap: u32) -> u32 {
            gap / 2
        }

        fn dawdle(&self, velocity: u32, _: &mut VehicleRng) -> u32 {
            velocity
        }
    }

    /// Claims to see further than the gap.
    struct Reckless;

    impl DrivingModel for Reckless {
        fn dash(&self, gap: u32) -> u32 {
            gap + 5
        }

        fn dawdle(&self, velocity: u32, _: &mut VehicleRng) -> u32 {
            velocity
        }
    }

    #[test]
    fn dash_runs_between_accelerate_and_brake() {
        assert_eq!(NagelSchreckenberg::deterministic().dash(4), 4);
        assert_eq!(Cautious.next_velocity(4, 5, 4, &mut rng()), 2);
        assert_eq!(Cautious.next_velocity(0, 5, 10, &mut rng()), 1);
        assert_eq!(Reckless.next_velocity(4, 5, 2, &mut rng()), 2);
    }

    #[test]
    fn dawdle_extremes() {
        let always = NagelSchreckenberg::new(1.0).unwrap();
        assert_eq!(always.dawdle(3, &mut rng()), 2);
        assert_eq!(always.dawdle(0, &mut rng()), 0);
        let never = NagelSchreckenberg::deterministic();
        for t in 0..50 {
            let mut r = VehicleRng::for_tick(9, VehicleId(t), Tick(t as u64));
            assert_eq!(never.dawdle(4, &mut r), 4);
        }
    }

    #[test]
    fn same_draws_same_velocity() {
        let m = NagelSchreckenberg::new(0.5).unwrap();
        for t in 0..20 {
            let a = m.next_velocity(1, 5, 5, &mut VehicleRng::for_tick(3, VehicleId(2), Tick(t)));
            let b = m.next_velocity(1, 5, 5, &mut VehicleRng::for_tick(3, VehicleId(2), Tick(t)));
            assert_eq!(a, b);
        }
    }
}

#[cfg(test)]
mod store {
    use mt_core::{EdgeId, Tick, VehicleId};
    use mt_graph::{GraphError, LaneRef};

    use super::fixtures::line;
    use crate::{VehicleError, VehicleStatus, VehicleStoreBuilder};

    #[test]
    fn builder_assigns_ids_in_order() {
        let (g, [ab, bc, _]) = line();
        let mut b = VehicleStoreBuilder::new(&g);
        assert_eq!(b.add(vec![ab, bc], Tick(0)).unwrap(), VehicleId(0));
        assert_eq!(b.add(vec![bc], Tick(4)).unwrap(), VehicleId(1));
        let store = b.build();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(VehicleId(1)).depart(), Tick(4));
        assert_eq!(store.count(VehicleStatus::Waiting), 2);
        assert_eq!(store.next_edge(VehicleId(0)), Some(bc));
        assert_eq!(store.next_edge(VehicleId(1)), None);
    }

    #[test]
    fn bad_routes_are_rejected() {
        let (g, [ab, bc, ca]) = line();
        let mut b = VehicleStoreBuilder::new(&g);
        assert!(matches!(b.add(vec![], Tick(0)), Err(VehicleError::EmptyRoute)));
        assert!(matches!(
            b.add(vec![bc, ca], Tick(0)),
            Err(VehicleError::DisconnectedRoute { .. })
        ));
        assert!(matches!(
            b.add(vec![ab, EdgeId(42)], Tick(0)),
            Err(VehicleError::Graph(GraphError::EdgeNotFound(EdgeId(42))))
        ));
        assert!(b.is_empty());
    }

    #[test]
    fn lifecycle() {
        let (g, [ab, bc, _]) = line();
        let mut b = VehicleStoreBuilder::new(&g);
        let id = b.add(vec![ab, bc], Tick(2)).unwrap();
        let mut store = b.build();

        let v = store.get_mut(id);
        v.spawn(LaneRef::new(ab, 0).at(0), Tick(2));
        assert!(v.is_spawned());
        assert_eq!(v.current_edge(), Some(ab));

        v.advance(LaneRef::new(ab, 0).at(1), 1, 1, false);
        v.advance(LaneRef::new(bc, 0).at(0), 2, 9, true);
        assert_eq!(v.current_edge(), Some(bc));
        assert!(v.is_on_last_edge());
        assert_eq!(v.next_edge(), None);

        v.finish(3, Tick(12));
        assert_eq!(v.status(), VehicleStatus::Finished);
        assert_eq!(v.position(), None);
        assert_eq!(v.distance_cells(), 13);
        assert_eq!(v.travel_ticks(), Some(10));
        assert!(store.all_finished());

        store.reset();
        let v = store.get(id);
        assert_eq!(v.status(), VehicleStatus::Waiting);
        assert_eq!(v.route(), &[ab, bc]);
        assert_eq!(v.route_pos(), 0);
        assert_eq!(v.distance_cells(), 0);
        assert_eq!(v.depart(), Tick(2));
    }
}
