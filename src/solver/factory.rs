use anyhow::{bail, Context};
use tracing::{debug, info, instrument};

use super::Solver;
use crate::algorithm::branch_and_bound;
use crate::common::Solution;
use crate::config::Config;
use crate::stat::Stats;

const ORE: usize = 0;
const CLAY: usize = 1;
const OBSIDIAN: usize = 2;
const GEODE: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blueprint {
    pub id: u32,
    // costs[robot][resource], geodes are never spent.
    costs: [[u32; 3]; 4],
    // Most of each resource any one robot needs.
    max_spend: [u32; 3],
}

impl Blueprint {
    fn parse(text: &str) -> anyhow::Result<Self> {
        let numbers = text
            .split(|c: char| !c.is_ascii_digit())
            .filter(|token| !token.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<u32>, _>>()?;
        let &[id, ore_ore, clay_ore, obsidian_ore, obsidian_clay, geode_ore, geode_obsidian] =
            numbers.as_slice()
        else {
            bail!("expected 7 numbers in blueprint, found {}", numbers.len());
        };

        let costs = [
            [ore_ore, 0, 0],
            [clay_ore, 0, 0],
            [obsidian_ore, obsidian_clay, 0],
            [geode_ore, 0, geode_obsidian],
        ];
        let mut max_spend = [0; 3];
        for cost in &costs {
            for (resource, &amount) in cost.iter().enumerate() {
                max_spend[resource] = max_spend[resource].max(amount);
            }
        }
        Ok(Blueprint { id, costs, max_spend })
    }

    // Next robot to build, waiting for it as long as needed, or idling to
    // the end. The geode robot comes last so it is explored first.
    fn successors(&self, stock: &Stock) -> Vec<Stock> {
        let mut successors = vec![stock.advance(stock.minutes_left)];

        for robot in [ORE, CLAY, OBSIDIAN, GEODE] {
            if robot != GEODE && stock.robots[robot] >= self.max_spend[robot] {
                continue;
            }
            let Some(wait) = self.wait_for(robot, stock) else {
                continue;
            };
            // A robot finished in the last minute never collects anything.
            if wait + 1 >= stock.minutes_left {
                continue;
            }

            let mut next = stock.advance(wait + 1);
            for (resource, &cost) in self.costs[robot].iter().enumerate() {
                next.resources[resource] -= cost;
            }
            next.robots[robot] += 1;
            successors.push(next);
        }
        successors
    }

    // Minutes before `robot` is affordable, `None` when no robot collects a
    // missing resource.
    fn wait_for(&self, robot: usize, stock: &Stock) -> Option<u32> {
        let mut wait = 0;
        for (resource, &cost) in self.costs[robot].iter().enumerate() {
            let have = stock.resources[resource];
            if cost <= have {
                continue;
            }
            let rate = stock.robots[resource];
            if rate == 0 {
                return None;
            }
            wait = wait.max((cost - have).div_ceil(rate));
        }
        Some(wait)
    }

    #[instrument(skip(self, stats), fields(blueprint = self.id), level = "debug")]
    pub fn max_geodes(&self, minutes: u32, stats: &mut Stats) -> anyhow::Result<u32> {
        let start = Stock {
            minutes_left: minutes,
            robots: [1, 0, 0, 0],
            resources: [0; 4],
        };
        let best = branch_and_bound(
            start,
            |stock| stock.minutes_left == 0,
            |stock| Ok(self.successors(stock)),
            Stock::upper_bound,
            |stock| stock.resources[GEODE],
            stats,
        )?;
        let geodes = best.unwrap_or(0);
        debug!("blueprint {} opens {geodes} geodes", self.id);
        Ok(geodes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Stock {
    minutes_left: u32,
    robots: [u32; 4],
    resources: [u32; 4],
}

impl Stock {
    fn advance(&self, minutes: u32) -> Stock {
        let mut next = self.clone();
        next.minutes_left -= minutes;
        for (resource, robots) in self.robots.iter().enumerate() {
            next.resources[resource] += robots * minutes;
        }
        next
    }

    // As if a new geode robot were built every remaining minute.
    fn upper_bound(&self) -> u32 {
        let t = self.minutes_left;
        self.resources[GEODE] + self.robots[GEODE] * t + t * t.saturating_sub(1) / 2
    }
}

pub struct RobotFactory {
    blueprints: Vec<Blueprint>,
    stats: Stats,
}

impl RobotFactory {
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let blueprints = text
            .split("Blueprint")
            .filter(|chunk| !chunk.trim().is_empty())
            .map(|chunk| {
                Blueprint::parse(chunk)
                    .with_context(|| format!("bad blueprint {:?}", chunk.trim()))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        if blueprints.is_empty() {
            bail!("no blueprints in input");
        }
        Ok(RobotFactory {
            blueprints,
            stats: Stats::default(),
        })
    }

    pub fn quality_level(&mut self, minutes: u32) -> anyhow::Result<u32> {
        let mut total = 0;
        for blueprint in &self.blueprints {
            total += blueprint.id * blueprint.max_geodes(minutes, &mut self.stats)?;
        }
        Ok(total)
    }

    pub fn geode_product(&mut self, minutes: u32, blueprints: usize) -> anyhow::Result<u64> {
        let mut product = 1;
        for blueprint in self.blueprints.iter().take(blueprints) {
            product *= u64::from(blueprint.max_geodes(minutes, &mut self.stats)?);
        }
        Ok(product)
    }
}

impl Solver for RobotFactory {
    fn solve(&mut self, config: &Config) -> anyhow::Result<Solution> {
        let part_one = self.quality_level(config.factory_minutes)?;
        let part_two = self.geode_product(
            config.factory_long_minutes,
            config.factory_long_blueprints,
        )?;
        info!("robot factory: quality level {part_one}, geode product {part_two}");
        Ok(Solution {
            part_one: i64::from(part_one),
            part_two: part_two as i64,
        })
    }

    fn stats(&self) -> &Stats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn example() -> RobotFactory {
        RobotFactory::parse(&fs::read_to_string("input/test/day19.txt").unwrap()).unwrap()
    }

    #[test]
    fn test_parse_blueprints() {
        let factory = example();
        assert_eq!(factory.blueprints.len(), 2);
        let first = &factory.blueprints[0];
        assert_eq!(first.id, 1);
        assert_eq!(first.costs[OBSIDIAN], [3, 14, 0]);
        assert_eq!(first.costs[GEODE], [2, 0, 7]);
        assert_eq!(first.max_spend, [4, 14, 7]);
    }

    #[test]
    fn test_wait_for_robot() {
        let blueprint = &example().blueprints[0];
        let stock = Stock {
            minutes_left: 20,
            robots: [1, 2, 0, 0],
            resources: [1, 3, 0, 0],
        };
        assert_eq!(blueprint.wait_for(ORE, &stock), Some(3));
        // 11 more clay at two per minute.
        assert_eq!(blueprint.wait_for(OBSIDIAN, &stock), Some(6));
        assert_eq!(blueprint.wait_for(GEODE, &stock), None);
    }

    #[test]
    fn test_geodes_in_24_minutes() {
        let factory = example();
        let stats = &mut Stats::default();
        assert_eq!(factory.blueprints[0].max_geodes(24, stats).unwrap(), 9);
        assert_eq!(factory.blueprints[1].max_geodes(24, stats).unwrap(), 12);
    }

    #[test]
    fn test_quality_level() {
        assert_eq!(example().quality_level(24).unwrap(), 33);
    }

    #[test]
    fn test_geodes_in_32_minutes() {
        let mut factory = example();
        assert_eq!(factory.geode_product(32, 3).unwrap(), 56 * 62);
    }

    #[test]
    fn test_too_short_to_open_geodes() {
        let factory = example();
        let stats = &mut Stats::default();
        assert_eq!(factory.blueprints[0].max_geodes(5, stats).unwrap(), 0);
    }

    #[test]
    fn test_bad_blueprint() {
        assert!(RobotFactory::parse("Blueprint 1: Each ore robot costs 4 ore.").is_err());
        assert!(RobotFactory::parse("").is_err());
    }
}
