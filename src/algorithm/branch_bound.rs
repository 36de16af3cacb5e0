use crate::stat::Stats;

use std::fmt::Debug;
use std::time::Instant;
use tracing::{debug, instrument, trace};

// Depth-first maximisation. The last successor `expand` returns is explored
// first, and a state whose `upper_bound` does not beat the best objective so
// far is dropped with its subtree. `upper_bound` must never underestimate.
#[instrument(skip_all, name = "branch_and_bound", fields(start = format!("{start:?}")), level = "debug")]
pub fn branch_and_bound<S, V, T, X, I, U, O>(
    start: S,
    mut is_terminal: T,
    mut expand: X,
    mut upper_bound: U,
    mut objective: O,
    stats: &mut Stats,
) -> anyhow::Result<Option<V>>
where
    S: Debug,
    V: Copy + Ord + Debug,
    T: FnMut(&S) -> bool,
    X: FnMut(&S) -> anyhow::Result<I>,
    I: IntoIterator<Item = S>,
    U: FnMut(&S) -> V,
    O: FnMut(&S) -> V,
{
    let search_start_time = Instant::now();

    let mut stack = vec![start];
    let mut best: Option<V> = None;

    while let Some(current) = stack.pop() {
        if let Some(best) = best {
            if upper_bound(&current) <= best {
                stats.pruned_nodes += 1;
                continue;
            }
        }

        if is_terminal(&current) {
            let value = objective(&current);
            if best.map_or(true, |best| value > best) {
                debug!("improve best to {value:?} at {current:?}");
                best = Some(value);
            }
            continue;
        }

        trace!("expand node: {current:?}");
        stats.expanded_nodes += 1;

        let successors = match expand(&current) {
            Ok(successors) => successors,
            Err(error) => {
                stats.record_time(search_start_time);
                return Err(error);
            }
        };
        for successor in successors {
            stats.generated_nodes += 1;
            stack.push(successor);
        }
    }

    stats.record_time(search_start_time);
    Ok(best)
}
