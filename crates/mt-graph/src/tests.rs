//! Unit tests for mt-graph.

#[cfg(test)]
mod fixtures {
    use mt_core::{GeoPoint, SimConfig, StreetType};

    use crate::{Dataset, GeneratedGraph, StreetGraphGenerator, WayRecord};

    pub const CENTER: i64 = 100;
    pub const NORTH: i64 = 1;
    pub const EAST: i64 = 2;
    pub const SOUTH: i64 = 3;
    pub const WEST: i64 = 4;

    /// Every segment is 100 m long regardless of geometry.
    pub fn hundred_m(_: GeoPoint, _: GeoPoint) -> f32 {
        100.0
    }

    /// A plus-shaped crossing: four two-way arms, each drawn from the
    /// centre outward.  Way ids equal the arm's outer node id.
    pub fn four_way(east_type: StreetType) -> Dataset {
        let mut ds = Dataset::new();
        ds.add_node(CENTER, GeoPoint::new(0.0, 0.0));
        ds.add_node(NORTH, GeoPoint::new(0.001, 0.0));
        ds.add_node(EAST, GeoPoint::new(0.0, 0.001));
        ds.add_node(SOUTH, GeoPoint::new(-0.001, 0.0));
        ds.add_node(WEST, GeoPoint::new(0.0, -0.001));
        for arm in [NORTH, EAST, SOUTH, WEST] {
            let street = if arm == EAST { east_type } else { StreetType::Residential };
            ds.add_way(WayRecord::new(arm, vec![CENTER, arm], street));
        }
        ds.derive_connections();
        ds
    }

    pub fn generate(ds: &Dataset) -> GeneratedGraph {
        let config = SimConfig::default();
        StreetGraphGenerator::with_distance(&config, hundred_m)
            .generate(ds)
            .unwrap()
    }
}

#[cfg(test)]
mod indices {
    use std::collections::BTreeSet;

    use crate::{GraphError, are_indices_crossing, leftmost_index_in_matching, movements_conflict};

    fn swept(o: u8, d: u8, n: u8) -> BTreeSet<u8> {
        let mut set = BTreeSet::new();
        let mut i = o;
        set.insert(i);
        while i != d {
            i = (i + 1) % n;
            set.insert(i);
        }
        set
    }

    #[test]
    fn four_way_scenario() {
        // N, E, S, W = 0, 1, 2, 3.
        assert!(are_indices_crossing(0, 2, 1, 0, 4).unwrap());
        assert!(are_indices_crossing(0, 2, 3, 2, 4).unwrap());
        assert!(are_indices_crossing(3, 2, 0, 2, 4).unwrap());
    }

    #[test]
    fn symmetric_without_shared_endpoints() {
        for n in 4..=6u8 {
            for o1 in 0..n {
                for d1 in 0..n {
                    for o2 in 0..n {
                        for d2 in 0..n {
                            let distinct: BTreeSet<u8> = [o1, d1, o2, d2].into_iter().collect();
                            if distinct.len() < 4 {
                                continue;
                            }
                            assert_eq!(
                                are_indices_crossing(o1, d1, o2, d2, n).unwrap(),
                                are_indices_crossing(o2, d2, o1, d1, n).unwrap(),
                                "n={n} {o1}->{d1} vs {o2}->{d2}"
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn shared_destination_always_crosses() {
        for n in 1..=6u8 {
            for o1 in 0..n {
                for o2 in 0..n {
                    for d in 0..n {
                        assert!(are_indices_crossing(o1, d, o2, d, n).unwrap());
                        assert!(are_indices_crossing(o2, d, o1, d, n).unwrap());
                    }
                }
            }
        }
    }

    #[test]
    fn nested_movement_does_not_cross() {
        // 0 -> 3 sweeps 0,1,2,3; 1 -> 2 lies inside it.
        assert!(!are_indices_crossing(0, 3, 1, 2, 4).unwrap());
        // Disjoint sweeps.
        assert!(!are_indices_crossing(0, 1, 2, 3, 4).unwrap());
    }

    #[test]
    fn matching_is_minimum_common_index() {
        for n in 1..=6u8 {
            for o1 in 0..n {
                for d1 in 0..n {
                    for o2 in 0..n {
                        for d2 in 0..n {
                            let a = swept(o1, d1, n);
                            let b = swept(o2, d2, n);
                            let expected = a.intersection(&b).next().copied();
                            assert_eq!(
                                leftmost_index_in_matching(o1, d1, o2, d2, n).unwrap(),
                                expected,
                                "n={n} {o1}->{d1} vs {o2}->{d2}"
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn wrapped_ranges_match_at_zero() {
        // 3 -> 1 sweeps 3,0,1 and 2 -> 0 sweeps 2,3,0: common {0, 3}.
        assert_eq!(leftmost_index_in_matching(3, 1, 2, 0, 4).unwrap(), Some(0));
        assert_eq!(leftmost_index_in_matching(0, 1, 2, 3, 4).unwrap(), None);
    }

    #[test]
    fn invalid_index_is_rejected() {
        assert_eq!(
            are_indices_crossing(4, 0, 1, 2, 4),
            Err(GraphError::InvalidIndex { index: 4, indices_per_node: 4 })
        );
        assert!(leftmost_index_in_matching(0, 0, 0, 0, 0).is_err());
        assert!(movements_conflict((0, 1), (1, 9), 4).is_err());
    }

    #[test]
    fn disjoint_movements_never_conflict() {
        assert!(!movements_conflict((0, 1), (2, 3), 4).unwrap());
        assert!(movements_conflict((0, 2), (1, 3), 4).unwrap());
    }
}

#[cfg(test)]
mod lane {
    use mt_core::{EdgeId, VehicleId};

    use crate::{Lane, LaneOp, LaneRef};

    #[test]
    fn occupy_and_vacate() {
        let mut lane = Lane::new(0, 5);
        lane.occupy(1, VehicleId(7));
        lane.occupy(3, VehicleId(8));
        assert_eq!(lane.vehicle_count(), 2);
        assert_eq!(lane.get(3), Some(VehicleId(8)));
        assert_eq!(lane.front(), Some((3, VehicleId(8))));
        assert_eq!(lane.first_occupied(), Some(1));
        assert_eq!(lane.next_occupied_from(2), Some(3));
        assert_eq!(lane.next_occupied_from(4), None);

        assert_eq!(lane.vacate(3), Some(VehicleId(8)));
        assert_eq!(lane.vacate(3), None);
        assert_eq!(lane.vehicle_count(), 1);
        assert_eq!(lane.vehicles().collect::<Vec<_>>(), vec![(1, VehicleId(7))]);
    }

    #[test]
    #[should_panic(expected = "capacity exceeded")]
    fn out_of_bounds_cell_panics() {
        let lane = Lane::new(0, 3);
        let _ = lane.get(3);
    }

    #[test]
    #[should_panic(expected = "already holds")]
    fn double_occupancy_panics() {
        let mut lane = Lane::new(0, 3);
        lane.occupy(0, VehicleId(1));
        lane.occupy(0, VehicleId(2));
    }

    #[test]
    fn ops_sort_vacates_first() {
        let at = LaneRef::new(EdgeId(2), 0).at(4);
        let mut ops = vec![LaneOp::occupy(at, VehicleId(1)), LaneOp::vacate(at)];
        ops.sort_by_key(LaneOp::sort_key);
        assert_eq!(ops[0], LaneOp::vacate(at));
    }
}

#[cfg(test)]
mod edge {
    use mt_core::{EdgeId, NodeId, Vec2, VehicleId};

    use crate::{DirectedEdge, EdgeSpec, LaneOp, LaneRef};

    fn spec(length_m: f32, kmh: f32, lanes: u8) -> EdgeSpec {
        EdgeSpec {
            origin: NodeId(0),
            destination: NodeId(1),
            length_m,
            origin_direction: Vec2::new(0.0, 1.0),
            destination_direction: Vec2::new(0.0, 1.0),
            max_speed_kmh: kmh,
            lane_count: lanes,
            priority: 2,
        }
    }

    #[test]
    fn discretisation() {
        let e = DirectedEdge::new(EdgeId(0), spec(300.0, 50.0, 1), 7.5);
        assert_eq!(e.number_of_cells(), 40);
        assert_eq!(e.max_velocity(), 2); // 50 / 3.6 / 7.5 = 1.85
        assert_eq!(e.time_cost_millis(), 20_000.0);

        let short = DirectedEdge::new(EdgeId(1), spec(0.5, 1.0, 0), 7.5);
        assert_eq!(short.number_of_cells(), 1);
        assert_eq!(short.max_velocity(), 1);
        assert_eq!(short.lane_count(), 1);
    }

    #[test]
    fn usage_averages_over_active_lanes() {
        let mut e = DirectedEdge::new(EdgeId(0), spec(75.0, 50.0, 2), 7.5);
        e.lane_mut(0).unwrap().occupy(0, VehicleId(0));
        e.lane_mut(0).unwrap().occupy(1, VehicleId(1));
        e.lane_mut(1).unwrap().occupy(0, VehicleId(2));
        assert_eq!(e.vehicle_count(), 3);
        assert_eq!(e.current_usage(), 1.5);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut e = DirectedEdge::new(EdgeId(3), spec(75.0, 50.0, 3), 7.5);
        e.lane_mut(2).unwrap().occupy(4, VehicleId(9));
        let before = e.clone();

        e.reset();
        let once = e.clone();
        e.reset();

        for edge in [&once, &e] {
            assert_eq!(edge.lane_count(), 3);
            assert_eq!(edge.active_lane_count(), 1);
            assert_eq!(edge.vehicle_count(), 0);
            assert_eq!(edge.lane(0).unwrap().cell_count(), 10);
            assert!(edge.lane(1).is_none());
            assert!(edge.lane(2).is_none());
            assert_eq!(edge, &before);
        }
    }

    #[test]
    fn lane_ops_let_a_vehicle_follow_into_a_freed_cell() {
        let mut e = DirectedEdge::new(EdgeId(0), spec(75.0, 50.0, 1), 7.5);
        let lane = LaneRef::new(EdgeId(0), 0);
        e.lane_mut(0).unwrap().occupy(2, VehicleId(1));
        e.lane_mut(0).unwrap().occupy(3, VehicleId(2));

        // 2 moves 3 -> 5, 1 moves 2 -> 3; occupy listed first on purpose.
        e.apply_lane_ops(&[
            LaneOp::occupy(lane.at(3), VehicleId(1)),
            LaneOp::occupy(lane.at(5), VehicleId(2)),
            LaneOp::vacate(lane.at(2)),
            LaneOp::vacate(lane.at(3)),
        ]);
        let l = e.lane(0).unwrap();
        assert_eq!(l.get(3), Some(VehicleId(1)));
        assert_eq!(l.get(5), Some(VehicleId(2)));
        assert!(l.is_free(2));
    }

    #[test]
    fn display_and_identity() {
        let a = DirectedEdge::new(EdgeId(0), spec(300.0, 50.0, 1), 7.5);
        assert_eq!(a.to_string(), "0:(0 -40-> 1)");
        let b = DirectedEdge::new(EdgeId(0), spec(300.0, 90.0, 2), 7.5);
        assert_eq!(a, b);
        let c = DirectedEdge::new(EdgeId(1), spec(300.0, 50.0, 1), 7.5);
        assert_ne!(a, c);
    }
}

#[cfg(test)]
mod graph {
    use mt_core::{Direction, EdgeId, GeoPoint, NodeId, Vec2};

    use crate::{EdgeSpec, GraphError, LaneRef, StreetGraph};

    fn spec(origin: NodeId, destination: NodeId) -> EdgeSpec {
        EdgeSpec {
            origin,
            destination,
            length_m: 30.0,
            origin_direction: Vec2::new(1.0, 0.0),
            destination_direction: Vec2::new(1.0, 0.0),
            max_speed_kmh: 50.0,
            lane_count: 1,
            priority: 1,
        }
    }

    fn line() -> (StreetGraph, [NodeId; 3], [EdgeId; 2]) {
        let mut g = StreetGraph::new(7.5);
        let a = g.add_node(GeoPoint::new(0.0, 0.0)).unwrap();
        let b = g.add_node(GeoPoint::new(0.0, 0.001)).unwrap();
        let c = g.add_node(GeoPoint::new(0.0, 0.002)).unwrap();
        let ab = g.add_edge(spec(a, b)).unwrap();
        let bc = g.add_edge(spec(b, c)).unwrap();
        (g, [a, b, c], [ab, bc])
    }

    #[test]
    fn registration_and_lookup() {
        let (mut g, [a, b, c], [ab, bc]) = line();
        assert!(g.add_connector(b, LaneRef::new(ab, 0), LaneRef::new(bc, 0), Direction::Straight).unwrap());
        assert!(!g.add_connector(b, LaneRef::new(ab, 0), LaneRef::new(bc, 0), Direction::Straight).unwrap());
        assert_eq!(g.connector_count(), 1);
        assert!(g.is_connected(ab, bc));
        assert_eq!(g.leaving(a).map(|e| e.id()).collect::<Vec<_>>(), vec![ab]);
        assert_eq!(g.incoming(c).map(|e| e.id()).collect::<Vec<_>>(), vec![bc]);
        assert_eq!(g.node(b).edges(), &[ab, bc]);
    }

    #[test]
    fn invalid_registrations() {
        let (mut g, [a, b, _], [ab, bc]) = line();
        assert_eq!(g.add_edge(spec(a, NodeId(9))), Err(GraphError::NodeNotFound(NodeId(9))));
        assert!(matches!(
            g.add_connector(a, LaneRef::new(ab, 0), LaneRef::new(bc, 0), Direction::Straight),
            Err(GraphError::MisplacedConnector { .. })
        ));
        assert!(matches!(
            g.add_connector(b, LaneRef::new(ab, 1), LaneRef::new(bc, 0), Direction::Straight),
            Err(GraphError::LaneNotFound { .. })
        ));
    }

    #[test]
    fn finalize_freezes_topology() {
        let (mut g, [a, b, c], _) = line();
        g.finalize().unwrap();
        assert!(g.is_finalized());
        assert_eq!(g.add_node(GeoPoint::new(1.0, 1.0)), Err(GraphError::Frozen));
        assert_eq!(g.add_edge(spec(a, c)), Err(GraphError::Frozen));
        // Through node: both legs are distinct.
        assert_eq!(g.node(b).indices_per_node(), 2);
    }

    #[test]
    fn snapping() {
        let (mut g, [a, _, c], _) = line();
        assert_eq!(g.snap_to_node(GeoPoint::new(0.0, 0.0)), None);
        g.finalize().unwrap();
        assert_eq!(g.snap_to_node(GeoPoint::new(0.0001, -0.0002)), Some(a));
        assert_eq!(g.snap_to_node(GeoPoint::new(0.0, 0.0025)), Some(c));
    }

    #[test]
    fn reset_clears_occupancy() {
        let (mut g, _, [ab, _]) = line();
        g.finalize().unwrap();
        g.edges_mut()[ab.index()].lane_mut(0).unwrap().occupy(0, mt_core::VehicleId(0));
        assert_eq!(g.vehicle_count(), 1);
        g.reset();
        assert_eq!(g.vehicle_count(), 0);
        assert_eq!(g.edge_count(), 2);
    }
}

#[cfg(test)]
mod admission {
    use std::collections::HashMap;

    use mt_core::{EdgeId, StreetType, Tick, VehicleId};

    use super::fixtures::{CENTER, EAST, NORTH, SOUTH, WEST, four_way, generate};
    use crate::{GeneratedGraph, GraphError, LaneRef};

    struct Crossing {
        out: GeneratedGraph,
    }

    impl Crossing {
        fn new(east_type: StreetType) -> Self {
            Self { out: generate(&four_way(east_type)) }
        }

        /// Edge arriving at the centre from `arm`.
        fn inbound(&self, arm: i64) -> EdgeId {
            self.out.way_edges[&arm].backward.unwrap()
        }

        /// Edge leaving the centre towards `arm`.
        fn outbound(&self, arm: i64) -> EdgeId {
            self.out.way_edges[&arm].forward.unwrap()
        }

        fn place_at_end(&mut self, edge: EdgeId, vehicle: VehicleId) {
            let e = &mut self.out.graph.edges_mut()[edge.index()];
            let last = e.number_of_cells() - 1;
            e.lane_mut(0).unwrap().occupy(last, vehicle);
        }

        fn update(&mut self, routes: &HashMap<VehicleId, EdgeId>, tick: Tick) -> usize {
            let center = self.out.node_ids[&CENTER];
            let graph = &mut self.out.graph;
            let requests = graph
                .node(center)
                .collect_requests(graph.edges(), |v| routes.get(&v).copied())
                .unwrap();
            let (nodes, _) = graph.nodes_mut_with_edges();
            nodes[center.index()].update(requests, tick).unwrap()
        }

        fn granted(&self, vehicle: VehicleId) -> Option<LaneRef> {
            let center = self.out.node_ids[&CENTER];
            self.out.graph.node(center).granted_lane(vehicle)
        }
    }

    #[test]
    fn legs_are_indexed_clockwise_from_north() {
        let x = Crossing::new(StreetType::Residential);
        let node = x.out.graph.node(x.out.node_ids[&CENTER]);
        assert_eq!(node.indices_per_node(), 4);
        for (arm, index) in [(NORTH, 0), (EAST, 1), (SOUTH, 2), (WEST, 3)] {
            assert_eq!(node.incoming_index(x.inbound(arm)), Some(index));
            assert_eq!(node.leaving_index(x.outbound(arm)), Some(index));
        }
    }

    #[test]
    fn crossing_movements_are_serialised() {
        let mut x = Crossing::new(StreetType::Residential);
        let (a, b) = (VehicleId(0), VehicleId(1));
        x.place_at_end(x.inbound(NORTH), a);
        x.place_at_end(x.inbound(EAST), b);
        let routes = HashMap::from([(a, x.outbound(SOUTH)), (b, x.outbound(NORTH))]);

        assert_eq!(x.update(&routes, Tick(5)), 1);
        // Equal priority and waiting time: lower origin index wins.
        assert_eq!(x.granted(a), Some(LaneRef::new(x.outbound(SOUTH), 0)));
        assert_eq!(x.granted(b), None);

        let center = x.out.node_ids[&CENTER];
        assert_eq!(x.out.graph.node(center).waiting_since(b), Some(Tick(5)));
        x.update(&routes, Tick(6));
        assert_eq!(x.out.graph.node(center).waiting_since(b), Some(Tick(5)));
    }

    #[test]
    fn priority_beats_index_order() {
        let mut x = Crossing::new(StreetType::Primary);
        let (a, b) = (VehicleId(0), VehicleId(1));
        x.place_at_end(x.inbound(NORTH), a);
        x.place_at_end(x.inbound(EAST), b);
        let routes = HashMap::from([(a, x.outbound(SOUTH)), (b, x.outbound(NORTH))]);

        assert_eq!(x.update(&routes, Tick(0)), 1);
        assert!(x.granted(b).is_some());
        assert!(x.granted(a).is_none());
    }

    #[test]
    fn independent_movements_are_granted_together() {
        let mut x = Crossing::new(StreetType::Residential);
        let (a, b) = (VehicleId(0), VehicleId(1));
        x.place_at_end(x.inbound(NORTH), a);
        x.place_at_end(x.inbound(SOUTH), b);
        // 0 -> 1 and 2 -> 3 sweep disjoint ranges.
        let routes = HashMap::from([(a, x.outbound(EAST)), (b, x.outbound(WEST))]);
        assert_eq!(x.update(&routes, Tick(0)), 2);
    }

    #[test]
    fn invalid_index_aborts_only_that_node() {
        let mut x = Crossing::new(StreetType::Residential);
        let (a, b, c) = (VehicleId(0), VehicleId(1), VehicleId(2));
        x.place_at_end(x.inbound(NORTH), a);
        x.place_at_end(x.inbound(EAST), b);
        let mut routes = HashMap::from([(a, x.outbound(SOUTH)), (b, x.outbound(NORTH))]);
        assert_eq!(x.update(&routes, Tick(5)), 1);

        // `c` waits for the dead-end u-turn at the north arm's outer node.
        let u_turn = x.inbound(NORTH);
        x.place_at_end(x.outbound(NORTH), c);
        routes.insert(c, u_turn);

        let center = x.out.node_ids[&CENTER];
        let north = x.out.node_ids[&NORTH];
        let graph = &mut x.out.graph;
        let mut requests = graph
            .node(center)
            .collect_requests(graph.edges(), |v| routes.get(&v).copied())
            .unwrap();
        assert_eq!(requests.len(), 2);
        requests[0].origin_index = 200;
        let north_requests = graph
            .node(north)
            .collect_requests(graph.edges(), |v| routes.get(&v).copied())
            .unwrap();

        let (nodes, _) = graph.nodes_mut_with_edges();
        let err = nodes[center.index()].update(requests, Tick(6)).unwrap_err();
        assert!(matches!(err, GraphError::InvalidIndex { index: 200, indices_per_node: 4 }));
        assert!(nodes[center.index()].granted().is_empty());
        assert_eq!(nodes[center.index()].waiting_since(b), Some(Tick(5)));

        assert_eq!(nodes[north.index()].update(north_requests, Tick(6)).unwrap(), 1);
        assert_eq!(nodes[north.index()].granted_lane(c), Some(LaneRef::new(u_turn, 0)));
    }

    #[test]
    fn far_or_leaving_vehicles_do_not_ask() {
        let mut x = Crossing::new(StreetType::Residential);
        let (a, b) = (VehicleId(0), VehicleId(1));
        let north = x.inbound(NORTH);
        x.out.graph.edges_mut()[north.index()]
            .lane_mut(0)
            .unwrap()
            .occupy(0, a);
        x.place_at_end(x.inbound(SOUTH), b);
        // `b` has no next edge: it ends its trip at the node.
        let routes = HashMap::from([(a, x.outbound(EAST))]);
        assert_eq!(x.update(&routes, Tick(0)), 0);
    }
}

#[cfg(test)]
mod generator {
    use mt_core::{GeoPoint, SimConfig, StreetType};

    use super::fixtures::{CENTER, NORTH, four_way, generate, hundred_m};
    use crate::{Dataset, GraphError, Oneway, StreetGraphGenerator, WayRecord};

    fn straight_way(oneway: Oneway) -> Dataset {
        let mut ds = Dataset::new();
        for i in 0..4 {
            ds.add_node(i, GeoPoint::new(0.0, 0.001 * i as f32));
        }
        ds.add_way(WayRecord::new(7, vec![0, 1, 2, 3], StreetType::Residential).with_oneway(oneway));
        ds.derive_connections();
        ds
    }

    #[test]
    fn bidirectional_way_round_trip() {
        let out = generate(&straight_way(Oneway::No));
        let edges = out.way_edges[&7];
        let fwd = out.graph.edge(edges.forward.unwrap());
        let bwd = out.graph.edge(edges.backward.unwrap());

        // 3 segments * 100 m at 7.5 m per cell.
        assert_eq!(fwd.number_of_cells(), 40);
        assert_eq!(bwd.number_of_cells(), 40);
        assert_eq!(fwd.origin(), bwd.destination());
        assert_eq!(fwd.destination(), bwd.origin());
        assert_eq!(fwd.origin_direction(), -bwd.destination_direction());
        assert_eq!(fwd.destination_direction(), -bwd.origin_direction());
        assert_eq!(out.graph.node_count(), 2);
    }

    #[test]
    fn oneway_values_select_edges() {
        for (oneway, fwd, bwd) in [
            (Oneway::Forward, true, false),
            (Oneway::Reversible, true, false),
            (Oneway::Backward, false, true),
        ] {
            let out = generate(&straight_way(oneway));
            let edges = out.way_edges[&7];
            assert_eq!(edges.forward.is_some(), fwd, "{oneway:?}");
            assert_eq!(edges.backward.is_some(), bwd, "{oneway:?}");
            assert_eq!(out.graph.edge_count(), 1);
        }
    }

    #[test]
    fn dead_end_uturns_sit_on_their_own_endpoint() {
        let out = generate(&straight_way(Oneway::No));
        let edges = out.way_edges[&7];
        let (fwd, bwd) = (edges.forward.unwrap(), edges.backward.unwrap());
        let start = out.node_ids[&0];
        let end = out.node_ids[&3];

        let at_start = out.graph.node(start).connectors();
        assert_eq!(at_start.len(), 1);
        assert_eq!((at_start[0].from.edge, at_start[0].to.edge), (bwd, fwd));

        let at_end = out.graph.node(end).connectors();
        assert_eq!(at_end.len(), 1);
        assert_eq!((at_end[0].from.edge, at_end[0].to.edge), (fwd, bwd));
    }

    #[test]
    fn four_way_turns() {
        let out = generate(&four_way(StreetType::Residential));
        let center = out.graph.node(out.node_ids[&CENTER]);
        // Every inbound arm may continue into each of the three other arms.
        assert_eq!(center.connectors().len(), 12);
        let from_north = out.way_edges[&NORTH].backward.unwrap();
        let dirs: Vec<_> = center
            .connectors_from_edge(from_north)
            .map(|c| c.direction)
            .collect();
        assert_eq!(dirs.len(), 3);
        assert!(dirs.contains(&mt_core::Direction::Straight));
        assert!(dirs.contains(&mt_core::Direction::Left));
        assert!(dirs.contains(&mt_core::Direction::Right));
    }

    #[test]
    fn ring_continues_into_itself() {
        let mut ds = Dataset::new();
        ds.add_node(1, GeoPoint::new(0.0, 0.0));
        ds.add_node(2, GeoPoint::new(0.001, 0.0));
        ds.add_node(3, GeoPoint::new(0.0, 0.001));
        ds.add_way(
            WayRecord::new(9, vec![1, 2, 3, 1], StreetType::Residential).with_oneway(Oneway::Forward),
        );
        ds.derive_connections();
        let out = generate(&ds);
        let fwd = out.way_edges[&9].forward.unwrap();
        let node = out.graph.node(out.node_ids[&1]);
        let edge = out.graph.edge(fwd);
        assert_eq!(edge.origin(), edge.destination());
        assert!(node
            .connectors()
            .iter()
            .any(|c| c.from.edge == fwd && c.to.edge == fwd && c.direction == mt_core::Direction::Straight));
    }

    #[test]
    fn inconsistent_ways_are_skipped() {
        let mut ds = straight_way(Oneway::No);
        ds.add_way(WayRecord::new(8, vec![3, 99], StreetType::Residential));
        ds.add_way(WayRecord::new(10, vec![0], StreetType::Residential));
        let config = SimConfig::default();
        let out = StreetGraphGenerator::with_distance(&config, hundred_m)
            .generate(&ds)
            .unwrap();

        assert_eq!(out.skipped.len(), 2);
        assert!(out.skipped.iter().all(|e| matches!(e, GraphError::InconsistentWay { .. })));
        assert!(!out.way_edges.contains_key(&8));
        assert_eq!(out.graph.edge_count(), 2);
        assert!(out.graph.is_finalized());
    }

    #[test]
    fn derive_connections_links_shared_endpoints() {
        let ds = four_way(StreetType::Residential);
        let north = &ds.ways[&NORTH];
        assert_eq!(north.from.len(), 3);
        assert!(north.from.iter().all(|c| c.via == CENTER));
        assert_eq!(north.uturn, vec![NORTH]);
    }
}

#[cfg(test)]
mod router {
    use mt_core::StreetType;

    use super::fixtures::{CENTER, NORTH, SOUTH, four_way, generate};
    use crate::{DijkstraRouter, GraphError, Oneway, Router};

    #[test]
    fn routes_through_the_crossing() {
        let out = generate(&four_way(StreetType::Residential));
        let (n, s) = (out.node_ids[&NORTH], out.node_ids[&SOUTH]);
        let route = DijkstraRouter.route(&out.graph, n, s).unwrap();
        assert_eq!(
            route.edges,
            vec![out.way_edges[&NORTH].backward.unwrap(), out.way_edges[&SOUTH].forward.unwrap()]
        );
        // Two edges of 14 cells at velocity 2.
        assert_eq!(route.total_time_ms, 14_000);
    }

    #[test]
    fn trivial_and_missing_routes() {
        let mut ds = four_way(StreetType::Residential);
        ds.ways.get_mut(&SOUTH).unwrap().oneway = Oneway::Backward;
        ds.derive_connections();
        let out = generate(&ds);
        let (n, s, c) = (out.node_ids[&NORTH], out.node_ids[&SOUTH], out.node_ids[&CENTER]);

        assert!(DijkstraRouter.route(&out.graph, c, c).unwrap().is_trivial());
        assert_eq!(
            DijkstraRouter.route(&out.graph, n, s),
            Err(GraphError::NoRoute { from: n, to: s })
        );
    }
}
