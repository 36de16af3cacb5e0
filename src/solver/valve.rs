use anyhow::{bail, Context};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

use super::Solver;
use crate::algorithm::{branch_and_bound, shortest_path};
use crate::common::Solution;
use crate::config::Config;
use crate::stat::Stats;

const START: &str = "AA";

#[derive(Debug, Clone, Copy)]
struct Opener {
    at: usize,
    minutes_left: u32,
}

#[derive(Debug, Clone)]
struct Plan {
    openers: Vec<Opener>,
    // Bit per key valve.
    opened: u64,
    released: u32,
}

// Start valve plus every valve with a positive flow, and the walking
// distances between them.
#[derive(Debug)]
struct KeyValves {
    flows: Vec<u32>,
    distances: Vec<Vec<u32>>,
}

impl KeyValves {
    fn is_closed(&self, plan: &Plan, valve: usize) -> bool {
        plan.opened & (1 << valve) == 0
    }

    fn reachable(&self, plan: &Plan, opener: Opener) -> impl Iterator<Item = usize> + '_ {
        let opened = plan.opened;
        (0..self.flows.len()).filter(move |&valve| {
            opened & (1 << valve) == 0 && self.distances[opener.at][valve] + 1 < opener.minutes_left
        })
    }

    fn is_finished(&self, plan: &Plan) -> bool {
        plan.openers
            .iter()
            .all(|&opener| self.reachable(plan, opener).next().is_none())
    }

    // Moves the opener with the most time left. Another opener still being
    // active allows this one to stop instead.
    fn successors(&self, plan: &Plan) -> Vec<Plan> {
        let mut successors = Vec::new();
        let Some((index, opener)) = plan
            .openers
            .iter()
            .copied()
            .enumerate()
            .max_by_key(|&(index, opener)| (opener.minutes_left, std::cmp::Reverse(index)))
        else {
            return successors;
        };

        let active = plan
            .openers
            .iter()
            .filter(|opener| opener.minutes_left > 0)
            .count();
        if active > 1 {
            let mut stopped = plan.clone();
            stopped.openers[index].minutes_left = 0;
            successors.push(stopped);
        }

        for valve in self.reachable(plan, opener) {
            let minutes_left = opener.minutes_left - self.distances[opener.at][valve] - 1;
            let mut next = plan.clone();
            next.openers[index] = Opener {
                at: valve,
                minutes_left,
            };
            next.opened |= 1 << valve;
            next.released += self.flows[valve] * minutes_left;
            successors.push(next);
        }
        successors
    }

    // Closed flows, largest first, opened as early as the openers could:
    // the first one a minute from now, each later one two minutes after.
    fn upper_bound(&self, plan: &Plan) -> u32 {
        let openers = plan.openers.len().max(1) as u32;
        let minutes_left = plan
            .openers
            .iter()
            .map(|opener| opener.minutes_left)
            .max()
            .unwrap_or(0);

        let mut closed: Vec<u32> = (0..self.flows.len())
            .filter(|&valve| self.is_closed(plan, valve))
            .map(|valve| self.flows[valve])
            .collect();
        closed.sort_unstable_by(|a, b| b.cmp(a));

        plan.released
            + closed
                .iter()
                .enumerate()
                .map(|(i, flow)| {
                    flow * minutes_left.saturating_sub(2 * (i as u32 / openers) + 1)
                })
                .sum::<u32>()
    }
}

pub struct ValveNetwork {
    key_valves: KeyValves,
    stats: Stats,
}

fn parse_line(line: &str) -> anyhow::Result<(&str, u32, Vec<&str>)> {
    let rest = line.strip_prefix("Valve ").context("missing `Valve` prefix")?;
    let (name, rest) = rest
        .split_once(" has flow rate=")
        .context("missing flow rate")?;
    let (rate, rest) = rest.split_once(';').context("missing tunnel list")?;
    let rate = rate
        .parse()
        .with_context(|| format!("bad flow rate {rate:?}"))?;
    let (_, tunnels) = rest.split_once("valve").context("missing tunnel list")?;
    let tunnels = tunnels
        .trim_start_matches('s')
        .split(',')
        .map(str::trim)
        .filter(|tunnel| !tunnel.is_empty())
        .collect();
    Ok((name, rate, tunnels))
}

impl ValveNetwork {
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let mut names = Vec::new();
        let mut rates = Vec::new();
        let mut tunnel_names = Vec::new();
        for line in text.lines().filter(|line| !line.trim().is_empty()) {
            let (name, rate, tunnels) =
                parse_line(line).with_context(|| format!("bad valve line {line:?}"))?;
            names.push(name);
            rates.push(rate);
            tunnel_names.push(tunnels);
        }

        let index: HashMap<&str, usize> = names
            .iter()
            .enumerate()
            .map(|(i, &name)| (name, i))
            .collect();
        let mut tunnels = Vec::with_capacity(names.len());
        for (name, targets) in names.iter().zip(&tunnel_names) {
            let targets = targets
                .iter()
                .map(|target| {
                    index
                        .get(target)
                        .copied()
                        .with_context(|| format!("valve {name} leads to unknown valve {target}"))
                })
                .collect::<anyhow::Result<Vec<usize>>>()?;
            tunnels.push(targets);
        }

        let start = *index
            .get(START)
            .with_context(|| format!("no start valve {START}"))?;
        let mut key: Vec<usize> = vec![start];
        key.extend((0..names.len()).filter(|&valve| valve != start && rates[valve] > 0));
        if key.len() > 64 {
            bail!("{} valves with flow, at most 63 supported", key.len() - 1);
        }

        let mut stats = Stats::default();
        let mut distances = vec![vec![0; key.len()]; key.len()];
        for (i, &from) in key.iter().enumerate() {
            for (j, &to) in key.iter().enumerate() {
                if i == j {
                    continue;
                }
                let found = shortest_path(
                    from,
                    |&valve| valve == to,
                    |&valve, _| Ok(tunnels[valve].clone()),
                    &mut stats,
                )?;
                // Unreachable valves are never worth walking to.
                distances[i][j] = found.map_or(u32::MAX / 2, |found| found.cost as u32);
            }
        }
        debug!("key valves {:?}", key.iter().map(|&v| names[v]).collect::<Vec<_>>());

        Ok(ValveNetwork {
            key_valves: KeyValves {
                flows: key.iter().map(|&valve| rates[valve]).collect(),
                distances,
            },
            stats,
        })
    }

    // Most pressure `openers` openers release within `minutes`, all
    // starting at `AA`.
    #[instrument(skip(self), level = "debug")]
    pub fn max_release(&mut self, openers: usize, minutes: u32) -> anyhow::Result<u32> {
        let key_valves = &self.key_valves;
        let start = Plan {
            openers: vec![
                Opener {
                    at: 0,
                    minutes_left: minutes,
                };
                openers
            ],
            // A start valve without flow counts as open.
            opened: if key_valves.flows[0] == 0 { 1 } else { 0 },
            released: 0,
        };

        let best = branch_and_bound(
            start,
            |plan| key_valves.is_finished(plan),
            |plan| Ok(key_valves.successors(plan)),
            |plan| key_valves.upper_bound(plan),
            |plan| plan.released,
            &mut self.stats,
        )?;
        Ok(best.unwrap_or(0))
    }
}

impl Solver for ValveNetwork {
    fn solve(&mut self, config: &Config) -> anyhow::Result<Solution> {
        let part_one = self.max_release(1, config.valve_minutes)?;
        let part_two = self.max_release(2, config.valve_pair_minutes)?;
        info!("valves: {part_one} released alone, {part_two} released in pair");
        Ok(Solution {
            part_one: part_one as i64,
            part_two: part_two as i64,
        })
    }

    fn stats(&self) -> &Stats {
        &self.stats
    }
}
