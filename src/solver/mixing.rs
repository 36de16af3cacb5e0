use anyhow::{bail, Context};
use tracing::{debug, info};

use super::Solver;
use crate::common::Solution;
use crate::config::Config;
use crate::stat::Stats;

const DECRYPTION_KEY: i64 = 811_589_153;
const GROVE_OFFSETS: [usize; 3] = [1000, 2000, 3000];

#[derive(Debug, Clone, Copy)]
struct Link {
    value: i64,
    prev: usize,
    next: usize,
}

// Circular doubly linked list; links sit in the order they were read and
// point at each other by index.
#[derive(Debug, Clone)]
struct Ring {
    links: Vec<Link>,
}

impl Ring {
    fn new(values: &[i64]) -> Self {
        let len = values.len();
        let links = values
            .iter()
            .enumerate()
            .map(|(i, &value)| Link {
                value,
                prev: (i + len - 1) % len,
                next: (i + 1) % len,
            })
            .collect();
        Ring { links }
    }

    fn unlink(&mut self, node: usize) {
        let Link { prev, next, .. } = self.links[node];
        self.links[prev].next = next;
        self.links[next].prev = prev;
    }

    fn insert_after(&mut self, node: usize, after: usize) {
        let next = self.links[after].next;
        self.links[node].prev = after;
        self.links[node].next = next;
        self.links[after].next = node;
        self.links[next].prev = node;
    }

    fn walk(&self, mut node: usize, forward: usize, backward: usize) -> usize {
        for _ in 0..forward {
            node = self.links[node].next;
        }
        for _ in 0..backward {
            node = self.links[node].prev;
        }
        node
    }

    // Moves every link by its value, in reading order.
    fn mix(&mut self) {
        let len = self.links.len();
        if len < 2 {
            return;
        }
        // A link moving around the other len - 1 links lands where it started.
        let others = len - 1;

        for node in 0..len {
            let steps = self.links[node].value.rem_euclid(others as i64) as usize;
            if steps == 0 {
                continue;
            }
            let prev = self.links[node].prev;
            self.unlink(node);
            let after = if steps <= others / 2 {
                self.walk(prev, steps, 0)
            } else {
                self.walk(prev, 0, others - steps)
            };
            self.insert_after(node, after);
        }
    }

    fn grove_coordinates(&self) -> anyhow::Result<i64> {
        let zero = self
            .links
            .iter()
            .position(|link| link.value == 0)
            .context("no number 0 in the file")?;
        let len = self.links.len();
        Ok(GROVE_OFFSETS
            .iter()
            .map(|&offset| self.links[self.walk(zero, offset % len, 0)].value)
            .sum())
    }
}

pub struct Mixing {
    values: Vec<i64>,
    stats: Stats,
}

impl Mixing {
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let values = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| {
                line.parse()
                    .with_context(|| format!("bad number {line:?}"))
            })
            .collect::<anyhow::Result<Vec<i64>>>()?;
        if values.is_empty() {
            bail!("no numbers in the file");
        }
        debug!("{} numbers to mix", values.len());
        Ok(Mixing {
            values,
            stats: Stats::default(),
        })
    }

    pub fn decrypt(&self, key: i64, rounds: usize) -> anyhow::Result<i64> {
        let values = self
            .values
            .iter()
            .map(|&value| {
                value
                    .checked_mul(key)
                    .with_context(|| format!("{value} overflows with key {key}"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        let mut ring = Ring::new(&values);
        for round in 0..rounds {
            ring.mix();
            debug!("mixing round {round} done");
        }
        ring.grove_coordinates()
    }
}

impl Solver for Mixing {
    fn solve(&mut self, config: &Config) -> anyhow::Result<Solution> {
        let part_one = self.decrypt(1, 1)?;
        let part_two = self.decrypt(DECRYPTION_KEY, config.mixing_rounds)?;
        info!("mixing: grove coordinates {part_one}, decrypted {part_two}");
        Ok(Solution { part_one, part_two })
    }

    fn stats(&self) -> &Stats {
        &self.stats
    }
}
