use super::construct_path;
use crate::common::Found;
use crate::stat::Stats;

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Instant;
use tracing::{debug, instrument, trace};

/// Breadth-first search over unit-cost edges. `expand` also gets the
/// distance of the state it expands. `Ok(None)` means the goal is unreachable.
#[instrument(skip_all, name = "shortest_path", fields(start = format!("{start:?}")), level = "debug")]
pub fn shortest_path<S, G, X, I>(
    start: S,
    mut is_goal: G,
    mut expand: X,
    stats: &mut Stats,
) -> anyhow::Result<Option<Found<S, usize>>>
where
    S: Clone + Eq + Hash + Debug,
    G: FnMut(&S) -> bool,
    X: FnMut(&S, usize) -> anyhow::Result<I>,
    I: IntoIterator<Item = S>,
{
    let search_start_time = Instant::now();

    let mut open_list = VecDeque::new();
    let mut visited = HashSet::new();
    let mut trace = HashMap::new();

    visited.insert(start.clone());
    open_list.push_back((start, 0));

    while let Some((current, distance)) = open_list.pop_front() {
        if is_goal(&current) {
            debug!("reach goal {current:?} at distance {distance}");
            stats.record_time(search_start_time);
            return Ok(Some(Found {
                cost: distance,
                path: construct_path(&trace, &current),
                goal: current,
            }));
        }

        trace!("expand node: {current:?} at distance {distance}");
        stats.expanded_nodes += 1;

        let neighbors = match expand(&current, distance) {
            Ok(neighbors) => neighbors,
            Err(error) => {
                stats.record_time(search_start_time);
                return Err(error);
            }
        };
        for neighbor in neighbors {
            if !visited.insert(neighbor.clone()) {
                continue;
            }
            stats.generated_nodes += 1;
            trace.insert(neighbor.clone(), current.clone());
            open_list.push_back((neighbor, distance + 1));
        }
    }

    debug!("cannot reach goal");
    stats.record_time(search_start_time);
    Ok(None)
}
