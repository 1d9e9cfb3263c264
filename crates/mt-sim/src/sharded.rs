//! Sharded fork-join step executor on a dedicated Rayon pool.
//!
//! Every phase cuts its entity set (vehicles, plans, edges or nodes) into
//! contiguous shards of ascending id and processes the shards in parallel.
//! Per-shard results are concatenated in shard order, so the outcome is the
//! same as a single pass in id order, for any shard or thread count:
//!
//! | Phase          | Parallel part                         | Sequential part              |
//! |----------------|---------------------------------------|------------------------------|
//! | `will_move_all`| plan per vehicle                      | concatenate shards           |
//! | `move_all`     | lane ops, commit per edge and vehicle | —                            |
//! | `did_move_all` | retire per vehicle                    | —                            |
//! | `spawn_all`    | candidate filter                      | commit in ascending id order |
//! | `update_nodes` | admission per node                    | —                            |

use rayon::prelude::*;

use mt_core::{Tick, VehicleId};
use mt_graph::{LaneOp, StreetGraph};
use mt_vehicle::VehicleStore;

use crate::executor::{StepContext, StepExecutor};
use crate::phases::{self, Plan};
use crate::{SimError, SimResult};

pub struct ShardedExecutor {
    pool: rayon::ThreadPool,
    shards: usize,
}

impl ShardedExecutor {
    /// A pool of `num_threads` workers (`None` = all logical cores) and
    /// `shards` shards per phase (`0` = one per worker).
    pub fn new(num_threads: Option<usize>, shards: usize) -> SimResult<Self> {
        let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("mt-shard-{i}"));
        if let Some(n) = num_threads {
            builder = builder.num_threads(n);
        }
        let pool = builder
            .build()
            .map_err(|e| SimError::Config(format!("cannot build worker pool: {e}")))?;
        let shards = if shards == 0 { pool.current_num_threads() } else { shards };
        Ok(Self { pool, shards })
    }

    #[inline]
    pub fn shards(&self) -> usize {
        self.shards
    }

    #[inline]
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Entities per shard for a set of `len`.
    #[inline]
    fn shard_len(&self, len: usize) -> usize {
        len.div_ceil(self.shards).max(1)
    }
}

impl StepExecutor for ShardedExecutor {
    fn name(&self) -> &'static str {
        "sharded"
    }

    fn will_move_all(
        &self,
        ctx: &StepContext<'_>,
        graph: &StreetGraph,
        vehicles: &VehicleStore,
        plans: &mut Vec<Plan>,
    ) -> SimResult<()> {
        let shard = self.shard_len(vehicles.len());
        let per_shard: Vec<Vec<Plan>> = self.pool.install(|| {
            vehicles
                .as_slice()
                .par_chunks(shard)
                .map(|slice| {
                    let mut out = Vec::new();
                    for vehicle in slice.iter().filter(|v| v.is_spawned()) {
                        ctx.check_cancelled()?;
                        out.extend(phases::plan_vehicle(ctx, graph, vehicle));
                    }
                    Ok(out)
                })
                .collect::<SimResult<Vec<_>>>()
        })?;

        plans.clear();
        for shard_plans in per_shard {
            plans.extend(shard_plans);
        }
        Ok(())
    }

    fn move_all(&self, graph: &mut StreetGraph, vehicles: &mut VehicleStore, plans: &[Plan]) -> usize {
        let plan_shard = self.shard_len(plans.len());
        let edge_shard = self.shard_len(graph.edge_count());
        let vehicle_shard = self.shard_len(vehicles.len());

        self.pool.install(|| {
            let mut ops: Vec<LaneOp> = plans
                .par_chunks(plan_shard)
                .flat_map_iter(|slice| slice.iter().flat_map(|p| p.lane_ops()))
                .collect();
            ops.par_sort_unstable_by_key(LaneOp::sort_key);

            graph.edges_mut().par_chunks_mut(edge_shard).for_each(|edges| {
                for edge in edges {
                    let edge_ops = phases::ops_for_edge(&ops, edge);
                    if !edge_ops.is_empty() {
                        edge.apply_lane_ops(edge_ops);
                    }
                }
            });

            vehicles
                .as_mut_slice()
                .par_chunks_mut(vehicle_shard)
                .for_each(|slice| {
                    for vehicle in slice {
                        if let Some(plan) = phases::plan_of(plans, vehicle.id()) {
                            phases::commit_vehicle(vehicle, plan);
                        }
                    }
                });
        });

        plans.iter().filter(|p| p.moves()).count()
    }

    fn did_move_all(&self, tick: Tick, vehicles: &mut VehicleStore, plans: &[Plan]) -> usize {
        let shard = self.shard_len(vehicles.len());
        self.pool.install(|| {
            vehicles
                .as_mut_slice()
                .par_chunks_mut(shard)
                .map(|slice| {
                    let mut finished = 0;
                    for vehicle in slice {
                        let Some(plan) = phases::plan_of(plans, vehicle.id()) else { continue };
                        if phases::retire_vehicle(tick, vehicle, plan) {
                            finished += 1;
                        }
                    }
                    finished
                })
                .sum()
        })
    }

    fn spawn_all(&self, tick: Tick, graph: &mut StreetGraph, vehicles: &mut VehicleStore) -> usize {
        let shard = self.shard_len(vehicles.len());
        let candidates: Vec<VehicleId> = {
            let graph: &StreetGraph = graph;
            self.pool.install(|| {
                vehicles
                    .as_slice()
                    .par_chunks(shard)
                    .flat_map_iter(|slice| {
                        slice
                            .iter()
                            .filter(|v| phases::wants_to_spawn(tick, graph, v))
                            .map(|v| v.id())
                    })
                    .collect()
            })
        };

        candidates
            .into_iter()
            .filter(|&id| phases::spawn_vehicle(tick, graph, vehicles.get_mut(id)))
            .count()
    }

    fn update_nodes(&self, tick: Tick, graph: &mut StreetGraph, vehicles: &VehicleStore) -> usize {
        let shard = self.shard_len(graph.node_count());
        let (nodes, edges) = graph.nodes_mut_with_edges();
        self.pool.install(|| {
            nodes
                .par_chunks_mut(shard)
                .map(|slice| {
                    slice
                        .iter_mut()
                        .map(|node| phases::update_node(tick, node, edges, vehicles))
                        .sum::<usize>()
                })
                .sum()
        })
    }
}
