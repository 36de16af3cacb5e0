use super::{construct_path, Cost};
use crate::common::{Found, OpenNode};
use crate::stat::Stats;

use std::collections::{BTreeSet, HashMap};
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Instant;
use tracing::{debug, instrument, trace};

/// Priority search over non-negative weighted edges, ordered by
/// `g + heuristic(state)`.
///
/// `expand` returns `(neighbor, step_cost)` pairs; a zero heuristic gives
/// plain Dijkstra.
///
/// The best-known cost map is keyed by the whole state. When the edges depend
/// on elapsed cost (moving obstacles), the state must carry that time
/// component itself, e.g. `(position, time % period)`.
///
/// Ties on `f` prefer the larger `g`, then the earlier inserted entry.
#[instrument(skip_all, name = "best_first_search", fields(start = format!("{start:?}")), level = "debug")]
pub fn best_first_search<S, C, G, X, I, H>(
    start: S,
    mut is_goal: G,
    mut expand: X,
    mut heuristic: H,
    stats: &mut Stats,
) -> anyhow::Result<Option<Found<S, C>>>
where
    S: Clone + Eq + Hash + Debug,
    C: Cost,
    G: FnMut(&S) -> bool,
    X: FnMut(&S, C) -> anyhow::Result<I>,
    I: IntoIterator<Item = (S, C)>,
    H: FnMut(&S) -> C,
{
    let search_start_time = Instant::now();

    let mut open_list = BTreeSet::new();
    let mut best_known: HashMap<S, C> = HashMap::new();
    let mut trace = HashMap::new();
    let mut sequence = 0;

    best_known.insert(start.clone(), C::ZERO);
    open_list.insert(OpenNode {
        f_open_cost: heuristic(&start),
        g_cost: C::ZERO,
        sequence,
        state: start,
    });

    while let Some(current) = open_list.pop_first() {
        // A cheaper entry for this state was pushed after this one.
        if best_known
            .get(&current.state)
            .is_some_and(|&best| current.g_cost > best)
        {
            continue;
        }

        if is_goal(&current.state) {
            debug!("reach goal {:?} with cost {:?}", current.state, current.g_cost);
            stats.record_time(search_start_time);
            return Ok(Some(Found {
                cost: current.g_cost,
                path: construct_path(&trace, &current.state),
                goal: current.state,
            }));
        }

        trace!("expand node: {current:?}");
        stats.expanded_nodes += 1;

        let neighbors = match expand(&current.state, current.g_cost) {
            Ok(neighbors) => neighbors,
            Err(error) => {
                stats.record_time(search_start_time);
                return Err(error);
            }
        };
        for (neighbor, step_cost) in neighbors {
            let tentative_g_cost = current.g_cost + step_cost;

            // Only a strictly better cost reopens a state.
            if best_known
                .get(&neighbor)
                .is_some_and(|&best| tentative_g_cost >= best)
            {
                continue;
            }

            let h_open_cost = heuristic(&neighbor);
            best_known.insert(neighbor.clone(), tentative_g_cost);
            trace.insert(neighbor.clone(), current.state.clone());

            sequence += 1;
            stats.generated_nodes += 1;
            open_list.insert(OpenNode {
                f_open_cost: tentative_g_cost + h_open_cost,
                g_cost: tentative_g_cost,
                sequence,
                state: neighbor,
            });
        }
    }

    debug!("cannot reach goal");
    stats.record_time(search_start_time);
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .try_init();
    }

    fn manhattan(a: (usize, usize), b: (usize, usize)) -> usize {
        a.0.abs_diff(b.0) + a.1.abs_diff(b.1)
    }

    fn open_grid_neighbors(size: usize, (x, y): (usize, usize)) -> Vec<((usize, usize), usize)> {
        let mut neighbors = Vec::new();
        if x > 0 {
            neighbors.push(((x - 1, y), 1));
        }
        if y > 0 {
            neighbors.push(((x, y - 1), 1));
        }
        if x + 1 < size {
            neighbors.push(((x + 1, y), 1));
        }
        if y + 1 < size {
            neighbors.push(((x, y + 1), 1));
        }
        neighbors
    }

    #[test]
    fn test_astar_open_grid() {
        init_tracing();
        let goal = (4, 4);
        let stats = &mut Stats::default();
        let found = best_first_search(
            (0, 0),
            |&s| s == goal,
            |&s, _| Ok(open_grid_neighbors(5, s)),
            |&s| manhattan(s, goal),
            stats,
        )
        .unwrap()
        .unwrap();

        assert_eq!(found.cost, 8);
        assert_eq!(found.path.len(), 9);
    }

    #[test]
    fn test_heuristic_reduces_expansions() {
        let goal = (9, 9);
        let dijkstra_stats = &mut Stats::default();
        let dijkstra = best_first_search(
            (0, 0),
            |&s| s == goal,
            |&s, _| Ok(open_grid_neighbors(10, s)),
            |_| 0,
            dijkstra_stats,
        )
        .unwrap()
        .unwrap();

        let astar_stats = &mut Stats::default();
        let astar = best_first_search(
            (0, 0),
            |&s| s == goal,
            |&s, _| Ok(open_grid_neighbors(10, s)),
            |&s| manhattan(s, goal),
            astar_stats,
        )
        .unwrap()
        .unwrap();

        assert_eq!(dijkstra.cost, astar.cost);
        assert!(astar_stats.expanded_nodes < dijkstra_stats.expanded_nodes);
    }

    #[test]
    fn test_cheaper_detour_beats_direct_edge() {
        // 0 -> 3 directly costs 10; 0 -> 1 -> 2 -> 3 costs 6.
        let edges: HashMap<u8, Vec<(u8, u32)>> = HashMap::from([
            (0, vec![(3, 10), (1, 2)]),
            (1, vec![(2, 2)]),
            (2, vec![(3, 2)]),
            (3, vec![]),
        ]);
        let stats = &mut Stats::default();
        let found = best_first_search(
            0u8,
            |&s| s == 3,
            |s, _| Ok(edges[s].clone()),
            |_| 0,
            stats,
        )
        .unwrap()
        .unwrap();

        assert_eq!(found.cost, 6);
        assert_eq!(found.path, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_zero_cost_edges() {
        let edges: HashMap<u8, Vec<(u8, u32)>> =
            HashMap::from([(0, vec![(1, 0), (2, 5)]), (1, vec![(2, 0), (0, 0)]), (2, vec![])]);
        let stats = &mut Stats::default();
        let found = best_first_search(0u8, |&s| s == 2, |s, _| Ok(edges[s].clone()), |_| 0, stats)
            .unwrap()
            .unwrap();
        assert_eq!(found.cost, 0);
    }

    #[test]
    fn test_unreachable_goal_is_none() {
        let stats = &mut Stats::default();
        let result = best_first_search(
            0u32,
            |&s| s == 100,
            |&s, _| Ok(if s < 5 { vec![(s + 1, 1u32)] } else { vec![] }),
            |_| 0,
            stats,
        )
        .unwrap();
        assert!(result.is_none());
        assert_eq!(stats.expanded_nodes, 6);
    }

    // Corridor 0..=3 where cell 1 is occupied on odd time steps. Moving
    // straight through would stand on cell 1 at time 1, so one wait is needed.
    #[test]
    fn test_time_varying_corridor_needs_one_wait() {
        init_tracing();
        const PERIOD: usize = 2;
        let blocked = |cell: usize, time: usize| cell == 1 && time % 2 == 1;

        let stats = &mut Stats::default();
        let found = best_first_search(
            (0usize, 0usize),
            |&(cell, _)| cell == 3,
            |&(cell, phase), time: usize| {
                assert_eq!(phase, time % PERIOD);
                let next_time = time + 1;
                let mut next = vec![cell];
                if cell > 0 {
                    next.push(cell - 1);
                }
                if cell < 3 {
                    next.push(cell + 1);
                }
                Ok(next
                    .into_iter()
                    .filter(|&c| !blocked(c, next_time))
                    .map(|c| ((c, next_time % PERIOD), 1))
                    .collect::<Vec<_>>())
            },
            |&(cell, _)| 3 - cell,
            stats,
        )
        .unwrap()
        .unwrap();

        assert_eq!(found.cost, 4);
        let cells: Vec<usize> = found.path.iter().map(|&(cell, _)| cell).collect();
        assert_eq!(cells, vec![0, 0, 1, 2, 3]);
    }

    // Bellman-Ford style relaxation as a reference for non-negative weights.
    fn reference_cost(weights: &[Vec<Option<u32>>], goal: usize) -> Option<u32> {
        let n = weights.len();
        let mut dist: Vec<Option<u32>> = vec![None; n];
        dist[0] = Some(0);
        for _ in 0..n {
            for u in 0..n {
                let Some(du) = dist[u] else { continue };
                for v in 0..n {
                    if let Some(w) = weights[u][v] {
                        if dist[v].map_or(true, |dv| du + w < dv) {
                            dist[v] = Some(du + w);
                        }
                    }
                }
            }
        }
        dist[goal]
    }

    // Exact remaining cost to `goal` from every node, by reversed relaxation.
    fn exact_remaining(weights: &[Vec<Option<u32>>], goal: usize) -> Vec<Option<u32>> {
        let n = weights.len();
        let mut dist: Vec<Option<u32>> = vec![None; n];
        dist[goal] = Some(0);
        for _ in 0..n {
            for v in 0..n {
                let Some(dv) = dist[v] else { continue };
                for u in 0..n {
                    if let Some(w) = weights[u][v] {
                        if dist[u].map_or(true, |du| dv + w < du) {
                            dist[u] = Some(dv + w);
                        }
                    }
                }
            }
        }
        dist
    }

    #[test]
    fn test_heuristic_never_changes_optimum_on_random_graphs() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let n = rng.gen_range(2..10);
            let weights: Vec<Vec<Option<u32>>> = (0..n)
                .map(|_| {
                    (0..n)
                        .map(|_| rng.gen_bool(0.3).then(|| rng.gen_range(0..10)))
                        .collect()
                })
                .collect();

            for goal in 0..n {
                let expected = reference_cost(&weights, goal);
                let remaining = exact_remaining(&weights, goal);
                let expand = |&s: &usize, _: u32| -> anyhow::Result<Vec<(usize, u32)>> {
                    Ok((0..n)
                        .filter_map(|v| weights[s][v].map(|w| (v, w)))
                        .collect())
                };

                let stats = &mut Stats::default();
                let dijkstra = best_first_search(0usize, |&s| s == goal, expand, |_| 0u32, stats)
                    .unwrap()
                    .map(|found| found.cost);

                // Half the exact remaining cost is admissible but not exact.
                let stats = &mut Stats::default();
                let guided = best_first_search(
                    0usize,
                    |&s| s == goal,
                    expand,
                    |&s| remaining[s].map_or(0, |r| r / 2),
                    stats,
                )
                .unwrap()
                .map(|found| found.cost);

                assert_eq!(dijkstra, expected);
                assert_eq!(guided, expected);
            }
        }
    }

    #[test]
    fn test_astar_rerun_gives_same_path() {
        // Many equal-cost routes across the open grid.
        let goal = (5, 5);
        let run = || {
            let stats = &mut Stats::default();
            best_first_search(
                (0, 0),
                |&s| s == goal,
                |&s, _| Ok(open_grid_neighbors(6, s)),
                |&s| manhattan(s, goal),
                stats,
            )
            .unwrap()
            .unwrap()
        };

        let first = run();
        for _ in 0..5 {
            let again = run();
            assert_eq!(again.cost, first.cost);
            assert_eq!(again.path, first.path);
        }
    }

    #[test]
    fn test_astar_records_time_on_expand_error() {
        let stats = &mut Stats::default();
        let result = best_first_search(
            0u32,
            |&s| s == 10,
            |&s, _| {
                std::thread::sleep(std::time::Duration::from_millis(2));
                if s == 1 {
                    anyhow::bail!("state {s} has no successors defined");
                }
                Ok(vec![(s + 1, 1u32)])
            },
            |_| 0,
            stats,
        );

        assert!(result.is_err());
        assert_eq!(stats.expanded_nodes, 2);
        assert!(stats.time_us >= 4000);
    }
}
