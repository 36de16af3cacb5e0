pub mod algorithm;
pub mod common;
pub mod config;
pub mod grid;
pub mod solver;
pub mod stat;
