use anyhow::{bail, Context};
use tracing::{debug, info};

use super::Solver;
use crate::algorithm::best_first_search;
use crate::common::Solution;
use crate::config::Config;
use crate::grid::Grid;
use crate::stat::Stats;

fn gcd(a: usize, b: usize) -> usize {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

// Walled valley; blizzards wrap around inside the walls.
struct Valley {
    grid: Grid,
    // Inner size, walls excluded.
    inner_height: usize,
    inner_width: usize,
    // Blizzard layout repeats after this many minutes.
    period: usize,
}

impl Valley {
    fn is_inner(&self, (x, y): (usize, usize)) -> bool {
        (1..=self.inner_height).contains(&x) && (1..=self.inner_width).contains(&y)
    }

    // Whether a blizzard sits on the inner cell at `time`, found by tracing
    // each direction back to where it started.
    fn has_blizzard(&self, (x, y): (usize, usize), time: usize) -> bool {
        let (h, w) = (self.inner_height, self.inner_width);
        let (row, col) = (x - 1, y - 1);
        let (dt_row, dt_col) = (time % h, time % w);

        let origins = [
            (row, (col + w - dt_col) % w, b'>'),
            (row, (col + dt_col) % w, b'<'),
            ((row + h - dt_row) % h, col, b'v'),
            ((row + dt_row) % h, col, b'^'),
        ];
        origins
            .iter()
            .any(|&(r, c, blizzard)| self.grid.get((r + 1, c + 1)) == Some(blizzard))
    }

    fn moves(&self, position: (usize, usize), phase: usize) -> Vec<((usize, usize), usize)> {
        let next_phase = (phase + 1) % self.period;
        self.grid
            .neighbors_with_stay(position)
            .into_iter()
            .filter(|&next| self.grid.get(next).is_some_and(|cell| cell != b'#'))
            .filter(|&next| !(self.is_inner(next) && self.has_blizzard(next, next_phase)))
            .map(|next| (next, next_phase))
            .collect()
    }
}

pub struct BlizzardBasin {
    valley: Valley,
    start: (usize, usize),
    end: (usize, usize),
    stats: Stats,
}

impl BlizzardBasin {
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let grid = Grid::parse(text)?;
        if grid.height < 3 || grid.width < 3 {
            bail!("valley of {}x{} has no inside", grid.height, grid.width);
        }

        let start = (0..grid.width)
            .map(|y| (0, y))
            .find(|&position| grid.get(position) == Some(b'.'))
            .context("top wall has no opening")?;
        let end = (0..grid.width)
            .map(|y| (grid.height - 1, y))
            .find(|&position| grid.get(position) == Some(b'.'))
            .context("bottom wall has no opening")?;

        let inner_height = grid.height - 2;
        let inner_width = grid.width - 2;
        let period = inner_height / gcd(inner_height, inner_width) * inner_width;
        debug!("valley {inner_height}x{inner_width}, blizzard period {period}");

        Ok(BlizzardBasin {
            valley: Valley {
                grid,
                inner_height,
                inner_width,
                period,
            },
            start,
            end,
            stats: Stats::default(),
        })
    }

    // Minutes to walk from `from` to `to` leaving at minute `depart`.
    pub fn cross(
        &mut self,
        from: (usize, usize),
        to: (usize, usize),
        depart: usize,
    ) -> anyhow::Result<usize> {
        let valley = &self.valley;
        let found = best_first_search(
            (from, depart % valley.period),
            |&(position, _)| position == to,
            |&(position, phase), _| {
                Ok(valley
                    .moves(position, phase)
                    .into_iter()
                    .map(|next| (next, 1)))
            },
            |&(position, _)| position.0.abs_diff(to.0) + position.1.abs_diff(to.1),
            &mut self.stats,
        )?
        .with_context(|| format!("{to:?} cannot be reached from {from:?} at minute {depart}"))?;
        Ok(found.cost)
    }

    pub fn round_trips(&mut self, trips: usize) -> anyhow::Result<usize> {
        let mut time = 0;
        let (mut from, mut to) = (self.start, self.end);
        for trip in 0..trips {
            let minutes = self.cross(from, to, time)?;
            debug!("trip {trip} took {minutes} minutes");
            time += minutes;
            (from, to) = (to, from);
        }
        Ok(time)
    }
}

impl Solver for BlizzardBasin {
    fn solve(&mut self, config: &Config) -> anyhow::Result<Solution> {
        let part_one = self.round_trips(1)?;
        let part_two = self.round_trips(config.basin_trips)?;
        info!("blizzard basin: {part_one} minutes across, {part_two} for the round trip");
        Ok(Solution {
            part_one: part_one as i64,
            part_two: part_two as i64,
        })
    }

    fn stats(&self) -> &Stats {
        &self.stats
    }
}
