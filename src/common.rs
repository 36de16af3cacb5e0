mod frontier;

pub(crate) use frontier::OpenNode;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Found<S, C> {
    pub cost: C,
    pub goal: S,
    // From the start state to `goal`, both included.
    pub path: Vec<S>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Solution {
    pub part_one: i64,
    pub part_two: i64,
}
