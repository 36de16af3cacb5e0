mod astar;
mod bfs;
mod branch_bound;

pub use astar::best_first_search;
pub use bfs::shortest_path;
pub use branch_bound::branch_and_bound;

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::ops::Add;

// Accumulated path cost. Edge costs must never be negative.
pub trait Cost: Copy + Ord + Debug + Add<Output = Self> {
    const ZERO: Self;
}

macro_rules! impl_cost {
    ($($ty:ty),*) => {
        $(impl Cost for $ty {
            const ZERO: Self = 0;
        })*
    };
}

impl_cost!(u8, u16, u32, u64, usize, i32, i64);

// Walks the parent trace back from `goal`; the start state has no entry.
fn construct_path<S: Clone + Eq + Hash>(trace: &HashMap<S, S>, goal: &S) -> Vec<S> {
    let mut path = vec![goal.clone()];
    let mut current = goal;
    while let Some(previous) = trace.get(current) {
        path.push(previous.clone());
        current = previous;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construct_path_follows_trace_to_start() {
        let trace = HashMap::from([(3, 2), (2, 1), (1, 0)]);
        assert_eq!(construct_path(&trace, &3), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_construct_path_without_trace_is_single_state() {
        let trace: HashMap<(usize, usize), (usize, usize)> = HashMap::new();
        assert_eq!(construct_path(&trace, &(4, 4)), vec![(4, 4)]);
    }
}
