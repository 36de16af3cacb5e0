mod basin;
mod factory;
mod filesystem;
mod hill;
mod mixing;
mod monkey;
mod valve;

pub use basin::BlizzardBasin;
pub use factory::RobotFactory;
pub use filesystem::FileSystem;
pub use hill::HillClimb;
pub use mixing::Mixing;
pub use monkey::MonkeyMath;
pub use valve::ValveNetwork;

use anyhow::{bail, Context};
use std::fs;

use crate::common::Solution;
use crate::config::Config;
use crate::stat::Stats;

pub trait Solver {
    fn solve(&mut self, config: &Config) -> anyhow::Result<Solution>;

    fn stats(&self) -> &Stats;
}

pub fn solver_from_str(day: u8, input: &str) -> anyhow::Result<Box<dyn Solver>> {
    let solver: Box<dyn Solver> = match day {
        7 => Box::new(FileSystem::parse(input)?),
        12 => Box::new(HillClimb::parse(input)?),
        16 => Box::new(ValveNetwork::parse(input)?),
        19 => Box::new(RobotFactory::parse(input)?),
        20 => Box::new(Mixing::parse(input)?),
        21 => Box::new(MonkeyMath::parse(input)?),
        24 => Box::new(BlizzardBasin::parse(input)?),
        _ => bail!("no solver for day {day}"),
    };
    Ok(solver)
}

pub fn solver_from_file(day: u8, path: &str) -> anyhow::Result<Box<dyn Solver>> {
    let input =
        fs::read_to_string(path).with_context(|| format!("cannot read puzzle input {path}"))?;
    solver_from_str(day, &input).with_context(|| format!("error with puzzle input {path}"))
}
