use std::cmp::Ordering;

use crate::algorithm::Cost;

// Open list entry for the best-first search.
#[derive(Debug, Clone)]
pub(crate) struct OpenNode<S, C> {
    pub(crate) state: S,
    pub(crate) f_open_cost: C,
    pub(crate) g_cost: C,
    // Insertion order, unique per search.
    pub(crate) sequence: usize,
}

impl<S, C: Cost> PartialEq for OpenNode<S, C> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<S, C: Cost> Eq for OpenNode<S, C> {}

impl<S, C: Cost> PartialOrd for OpenNode<S, C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<S, C: Cost> Ord for OpenNode<S, C> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f_open_cost
            .cmp(&other.f_open_cost)
            // Higher g cost has higher priority, it is closer to the goal.
            .then_with(|| other.g_cost.cmp(&self.g_cost))
            // Sequence is unique, so the state itself never needs comparing.
            .then_with(|| self.sequence.cmp(&other.sequence))
    }
}
