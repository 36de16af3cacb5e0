use anyhow::Context;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::info;

use crate::common::Solution;

#[derive(Debug, Clone, Default, Serialize)]
pub struct Stats {
    pub expanded_nodes: usize,
    pub generated_nodes: usize,
    pub pruned_nodes: usize,
    pub time_us: usize,
}

#[derive(Serialize)]
struct StatsRecord<'a> {
    day: u8,
    #[serde(flatten)]
    solution: &'a Solution,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<&'a Stats>,
}

impl Stats {
    pub(crate) fn record_time(&mut self, search_start_time: Instant) {
        self.time_us += search_start_time.elapsed().as_micros() as usize;
    }

    // Days answered without a search leave every counter at zero.
    pub fn is_empty(&self) -> bool {
        self.expanded_nodes == 0 && self.generated_nodes == 0 && self.pruned_nodes == 0
    }

    pub fn print(&self) {
        if self.is_empty() {
            info!("No search ran, no statistics to report");
            return;
        }
        info!(
            "Time(microseconds) {:?} Expand nodes number: {:?} Generate nodes number: {:?} Prune nodes number: {:?}",
            self.time_us, self.expanded_nodes, self.generated_nodes, self.pruned_nodes
        );
    }

    pub fn write_json_line(&self, path: &str, day: u8, solution: &Solution) -> anyhow::Result<()> {
        let record = StatsRecord {
            day,
            solution,
            stats: (!self.is_empty()).then_some(self),
        };
        if let Some(parent) = Path::new(path).parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("cannot open stats file {path}"))?;
        let line = serde_json::to_string(&record)?;
        writeln!(file, "{line}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_record_is_flat_json() {
        let stats = Stats {
            expanded_nodes: 3,
            generated_nodes: 5,
            pruned_nodes: 1,
            time_us: 0,
        };
        let solution = Solution {
            part_one: 31,
            part_two: 29,
        };
        let record = StatsRecord {
            day: 12,
            solution: &solution,
            stats: Some(&stats),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["day"], 12);
        assert_eq!(value["part_one"], 31);
        assert_eq!(value["stats"]["generated_nodes"], 5);
    }

    #[test]
    fn test_empty_stats_are_left_out_of_json_line() {
        let path = std::env::temp_dir().join(format!("aoc_search_stats_{}.jsonl", std::process::id()));
        let path = path.to_str().unwrap();
        let _ = fs::remove_file(path);

        let solution = Solution {
            part_one: 95437,
            part_two: 24933642,
        };
        let searched = Stats {
            expanded_nodes: 2,
            ..Stats::default()
        };
        Stats::default().write_json_line(path, 7, &solution).unwrap();
        searched.write_json_line(path, 12, &solution).unwrap();

        let lines: Vec<serde_json::Value> = fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        fs::remove_file(path).unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["day"], 7);
        assert_eq!(lines[0]["part_two"], 24933642);
        assert!(lines[0].get("stats").is_none());
        assert_eq!(lines[1]["stats"]["expanded_nodes"], 2);
    }
}
