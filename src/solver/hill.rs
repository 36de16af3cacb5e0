use anyhow::{bail, Context};
use tracing::info;

use super::Solver;
use crate::algorithm::shortest_path;
use crate::common::Solution;
use crate::config::Config;
use crate::grid::Grid;
use crate::stat::Stats;

pub struct HillClimb {
    grid: Grid,
    start: (usize, usize),
    end: (usize, usize),
    stats: Stats,
}

fn elevation(cell: u8) -> u8 {
    match cell {
        b'S' => 0,
        b'E' => b'z' - b'a',
        c => c - b'a',
    }
}

fn climbable(grid: &Grid, from: (usize, usize), to: (usize, usize)) -> bool {
    match (grid.get(from), grid.get(to)) {
        (Some(from), Some(to)) => elevation(to) <= elevation(from) + 1,
        _ => false,
    }
}

impl HillClimb {
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let grid = Grid::parse(text)?;
        if let Some(cell) = (0..grid.height)
            .flat_map(|x| (0..grid.width).map(move |y| (x, y)))
            .filter_map(|position| grid.get(position))
            .find(|&c| !(c.is_ascii_lowercase() || c == b'S' || c == b'E'))
        {
            bail!("unexpected height marker {:?}", cell as char);
        }

        let start = grid.find(b'S').context("height map has no start S")?;
        let end = grid.find(b'E').context("height map has no end E")?;
        Ok(HillClimb {
            grid,
            start,
            end,
            stats: Stats::default(),
        })
    }

    pub fn climb(&mut self) -> anyhow::Result<usize> {
        let grid = &self.grid;
        let end = self.end;
        let found = shortest_path(
            self.start,
            |&position| position == end,
            |&position, _| {
                Ok(grid
                    .neighbors(position)
                    .into_iter()
                    .filter(|&neighbor| climbable(grid, position, neighbor))
                    .collect::<Vec<_>>())
            },
            &mut self.stats,
        )?
        .context("E cannot be reached from S")?;
        Ok(found.cost)
    }

    // Walks down from E once instead of up from every lowest square.
    pub fn descend(&mut self) -> anyhow::Result<usize> {
        let grid = &self.grid;
        let found = shortest_path(
            self.end,
            |&position| grid.get(position).is_some_and(|c| elevation(c) == 0),
            |&position, _| {
                Ok(grid
                    .neighbors(position)
                    .into_iter()
                    .filter(|&neighbor| climbable(grid, neighbor, position))
                    .collect::<Vec<_>>())
            },
            &mut self.stats,
        )?
        .context("no lowest square can reach E")?;
        Ok(found.cost)
    }
}

impl Solver for HillClimb {
    fn solve(&mut self, _config: &Config) -> anyhow::Result<Solution> {
        let part_one = self.climb()?;
        let part_two = self.descend()?;
        info!("hill climb: {part_one} steps from S, {part_two} from the best start");
        Ok(Solution {
            part_one: part_one as i64,
            part_two: part_two as i64,
        })
    }

    fn stats(&self) -> &Stats {
        &self.stats
    }
}
