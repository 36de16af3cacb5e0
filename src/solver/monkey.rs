use anyhow::{anyhow, bail, Context};
use std::collections::HashMap;
use tracing::{debug, info};

use super::Solver;
use crate::common::Solution;
use crate::config::Config;
use crate::stat::Stats;

const ROOT: &str = "root";
const HUMAN: &str = "humn";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operation {
    fn parse(token: &str) -> anyhow::Result<Self> {
        Ok(match token {
            "+" => Operation::Add,
            "-" => Operation::Sub,
            "*" => Operation::Mul,
            "/" => Operation::Div,
            _ => bail!("unknown operation {token:?}"),
        })
    }

    fn apply(self, lhs: i64, rhs: i64) -> anyhow::Result<i64> {
        match self {
            Operation::Add => lhs.checked_add(rhs),
            Operation::Sub => lhs.checked_sub(rhs),
            Operation::Mul => lhs.checked_mul(rhs),
            Operation::Div => lhs.checked_div(rhs),
        }
        .ok_or_else(|| anyhow!("{lhs} {self:?} {rhs} overflows or divides by zero"))
    }

    // The `x` in `x op rhs == target`.
    fn solve_lhs(self, target: i64, rhs: i64) -> anyhow::Result<i64> {
        match self {
            Operation::Add => Operation::Sub.apply(target, rhs),
            Operation::Sub => Operation::Add.apply(target, rhs),
            Operation::Mul => exact_div(target, rhs),
            Operation::Div => Operation::Mul.apply(target, rhs),
        }
    }

    // The `x` in `lhs op x == target`.
    fn solve_rhs(self, lhs: i64, target: i64) -> anyhow::Result<i64> {
        match self {
            Operation::Add => Operation::Sub.apply(target, lhs),
            Operation::Sub => Operation::Sub.apply(lhs, target),
            Operation::Mul => exact_div(target, lhs),
            Operation::Div => exact_div(lhs, target),
        }
    }
}

fn exact_div(lhs: i64, rhs: i64) -> anyhow::Result<i64> {
    let quotient = Operation::Div.apply(lhs, rhs)?;
    if quotient * rhs != lhs {
        bail!("{lhs} is not a multiple of {rhs}, no integer solution");
    }
    Ok(quotient)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Expr {
    Constant(i64),
    Variable,
    Binary {
        operation: Operation,
        lhs: usize,
        rhs: usize,
    },
}

// Expression tree kept in an arena; children are arena indices.
#[derive(Debug, Clone)]
struct Arena {
    exprs: Vec<Expr>,
}

impl Arena {
    fn evaluate(&self, node: usize, memo: &mut HashMap<usize, i64>) -> anyhow::Result<i64> {
        self.evaluate_at_depth(node, 0, memo)
    }

    fn evaluate_at_depth(
        &self,
        node: usize,
        depth: usize,
        memo: &mut HashMap<usize, i64>,
    ) -> anyhow::Result<i64> {
        if let Some(&value) = memo.get(&node) {
            return Ok(value);
        }
        if depth > self.exprs.len() {
            bail!("expression {node} refers to itself");
        }

        let value = match self.exprs[node] {
            Expr::Constant(value) => value,
            Expr::Variable => bail!("expression {node} is the unknown"),
            Expr::Binary {
                operation,
                lhs,
                rhs,
            } => {
                let lhs = self.evaluate_at_depth(lhs, depth + 1, memo)?;
                let rhs = self.evaluate_at_depth(rhs, depth + 1, memo)?;
                operation.apply(lhs, rhs)?
            }
        };
        memo.insert(node, value);
        Ok(value)
    }

    fn contains_variable(&self, node: usize, memo: &mut HashMap<usize, bool>) -> bool {
        if let Some(&contains) = memo.get(&node) {
            return contains;
        }
        // Cut cycles while this node is being visited.
        memo.insert(node, false);
        let contains = match self.exprs[node] {
            Expr::Constant(_) => false,
            Expr::Variable => true,
            Expr::Binary { lhs, rhs, .. } => {
                self.contains_variable(lhs, memo) || self.contains_variable(rhs, memo)
            }
        };
        memo.insert(node, contains);
        contains
    }

    // Value of the unknown that makes `node` evaluate to `target`, walking
    // the single path from `node` down to the unknown.
    fn solve(&self, mut node: usize, mut target: i64) -> anyhow::Result<i64> {
        let mut values = HashMap::new();
        let mut has_variable = HashMap::new();

        loop {
            match self.exprs[node] {
                Expr::Variable => return Ok(target),
                Expr::Constant(_) => bail!("expression {node} does not contain the unknown"),
                Expr::Binary {
                    operation,
                    lhs,
                    rhs,
                } => {
                    let in_lhs = self.contains_variable(lhs, &mut has_variable);
                    let in_rhs = self.contains_variable(rhs, &mut has_variable);
                    (node, target) = match (in_lhs, in_rhs) {
                        (true, false) => {
                            let rhs_value = self.evaluate(rhs, &mut values)?;
                            (lhs, operation.solve_lhs(target, rhs_value)?)
                        }
                        (false, true) => {
                            let lhs_value = self.evaluate(lhs, &mut values)?;
                            (rhs, operation.solve_rhs(lhs_value, target)?)
                        }
                        (true, true) => bail!("unknown appears on both sides of {node}"),
                        (false, false) => bail!("expression {node} does not contain the unknown"),
                    };
                    debug!("need {target} from expression {node}");
                }
            }
        }
    }
}

pub struct MonkeyMath {
    arena: Arena,
    root: usize,
    human: usize,
    stats: Stats,
}

impl MonkeyMath {
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let jobs: Vec<(&str, &str)> = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                line.split_once(": ")
                    .map(|(name, job)| (name.trim(), job.trim()))
                    .with_context(|| format!("bad monkey line {line:?}"))
            })
            .collect::<anyhow::Result<_>>()?;

        let mut index = HashMap::with_capacity(jobs.len());
        for (i, &(name, _)) in jobs.iter().enumerate() {
            if index.insert(name, i).is_some() {
                bail!("monkey {name} appears twice");
            }
        }
        let lookup = |name: &str| {
            index
                .get(name)
                .copied()
                .with_context(|| format!("unknown monkey {name}"))
        };

        let mut exprs = Vec::with_capacity(jobs.len());
        for &(name, job) in &jobs {
            let expr = if let Ok(value) = job.parse() {
                Expr::Constant(value)
            } else {
                let tokens: Vec<&str> = job.split_whitespace().collect();
                let &[lhs, operation, rhs] = tokens.as_slice() else {
                    bail!("monkey {name} has a malformed job {job:?}");
                };
                Expr::Binary {
                    operation: Operation::parse(operation)?,
                    lhs: lookup(lhs)?,
                    rhs: lookup(rhs)?,
                }
            };
            exprs.push(expr);
        }

        Ok(MonkeyMath {
            arena: Arena { exprs },
            root: lookup(ROOT)?,
            human: lookup(HUMAN)?,
            stats: Stats::default(),
        })
    }

    pub fn root_value(&self) -> anyhow::Result<i64> {
        self.arena.evaluate(self.root, &mut HashMap::new())
    }

    pub fn human_value(&self) -> anyhow::Result<i64> {
        let mut arena = self.arena.clone();
        arena.exprs[self.human] = Expr::Variable;
        let Expr::Binary { lhs, rhs, .. } = arena.exprs[self.root] else {
            bail!("{ROOT} must combine two monkeys");
        };

        // lhs == rhs is lhs - rhs == 0.
        arena.exprs[self.root] = Expr::Binary {
            operation: Operation::Sub,
            lhs,
            rhs,
        };
        arena.solve(self.root, 0)
    }
}

impl Solver for MonkeyMath {
    fn solve(&mut self, _config: &Config) -> anyhow::Result<Solution> {
        let part_one = self.root_value()?;
        let part_two = self.human_value()?;
        info!("monkey math: root yells {part_one}, human yells {part_two}");
        Ok(Solution { part_one, part_two })
    }

    fn stats(&self) -> &Stats {
        &self.stats
    }
}
