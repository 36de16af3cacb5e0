use anyhow::anyhow;
use clap::Parser;
use serde::Deserialize;

pub const SUPPORTED_DAYS: [u8; 7] = [7, 12, 16, 19, 20, 21, 24];

#[derive(Parser, Debug)]
#[command(
    name = "AoC search",
    about = "Advent of Code 2022 puzzles solved on a shared state-space search engine.",
    version = "1.0"
)]
pub struct Cli {
    #[arg(long, help = "Path to a YAML config file")]
    pub config: Option<String>,

    #[arg(long, help = "Puzzle day to solve")]
    pub day: Option<u8>,

    #[arg(long, help = "Path to the puzzle input (default: input/dayNN.txt)")]
    pub input_path: Option<String>,

    #[arg(long, help = "Append search statistics as JSON lines to this file")]
    pub stats_path: Option<String>,

    #[arg(long, help = "Minutes for the single valve opener")]
    pub valve_minutes: Option<u32>,

    #[arg(long, help = "Minutes for the two valve openers")]
    pub valve_pair_minutes: Option<u32>,

    #[arg(long, help = "Minutes for the geode quality levels")]
    pub factory_minutes: Option<u32>,

    #[arg(long, help = "Minutes for the long geode run")]
    pub factory_long_minutes: Option<u32>,

    #[arg(long, help = "Blueprints considered in the long geode run")]
    pub factory_long_blueprints: Option<usize>,

    #[arg(long, help = "Mixing rounds of the decrypted file")]
    pub mixing_rounds: Option<usize>,

    #[arg(long, help = "Crossings of the blizzard basin in part two")]
    pub basin_trips: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub day: u8,
    pub input_path: Option<String>,
    pub stats_path: Option<String>,
    pub valve_minutes: u32,
    pub valve_pair_minutes: u32,
    pub factory_minutes: u32,
    pub factory_long_minutes: u32,
    pub factory_long_blueprints: usize,
    pub mixing_rounds: usize,
    pub basin_trips: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            day: 12,
            input_path: None,
            stats_path: None,
            valve_minutes: 30,
            valve_pair_minutes: 26,
            factory_minutes: 24,
            factory_long_minutes: 32,
            factory_long_blueprints: 3,
            mixing_rounds: 10,
            basin_trips: 3,
        }
    }
}

impl Config {
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn override_from_command_line(mut self, cli: &Cli) -> anyhow::Result<Self> {
        if let Some(day) = cli.day {
            self.day = day;
        }
        if let Some(input_path) = &cli.input_path {
            self.input_path = Some(input_path.clone());
        }
        if let Some(stats_path) = &cli.stats_path {
            self.stats_path = Some(stats_path.clone());
        }
        if let Some(minutes) = cli.valve_minutes {
            self.valve_minutes = minutes;
        }
        if let Some(minutes) = cli.valve_pair_minutes {
            self.valve_pair_minutes = minutes;
        }
        if let Some(minutes) = cli.factory_minutes {
            self.factory_minutes = minutes;
        }
        if let Some(minutes) = cli.factory_long_minutes {
            self.factory_long_minutes = minutes;
        }
        if let Some(blueprints) = cli.factory_long_blueprints {
            self.factory_long_blueprints = blueprints;
        }
        if let Some(rounds) = cli.mixing_rounds {
            self.mixing_rounds = rounds;
        }
        if let Some(trips) = cli.basin_trips {
            self.basin_trips = trips;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn input_path(&self) -> String {
        self.input_path
            .clone()
            .unwrap_or_else(|| format!("input/day{:02}.txt", self.day))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !SUPPORTED_DAYS.contains(&self.day) {
            return Err(anyhow!(
                "Day {} is not supported, expected one of {:?}",
                self.day,
                SUPPORTED_DAYS
            ));
        }

        for (name, minutes) in [
            ("valve_minutes", self.valve_minutes),
            ("valve_pair_minutes", self.valve_pair_minutes),
            ("factory_minutes", self.factory_minutes),
            ("factory_long_minutes", self.factory_long_minutes),
        ] {
            if minutes == 0 {
                return Err(anyhow!("{name} must be greater than 0"));
            }
        }

        if self.factory_long_blueprints == 0 {
            return Err(anyhow!("factory_long_blueprints must be greater than 0"));
        }
        if self.mixing_rounds == 0 {
            return Err(anyhow!("mixing_rounds must be greater than 0"));
        }
        if self.basin_trips == 0 {
            return Err(anyhow!("basin_trips must be greater than 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_overrides_defaults() {
        let config = Config::from_yaml_str("day: 16\nvalve_minutes: 20\n").unwrap();
        assert_eq!(config.day, 16);
        assert_eq!(config.valve_minutes, 20);
        assert_eq!(config.valve_pair_minutes, 26);
        assert_eq!(config.input_path(), "input/day16.txt");
    }

    #[test]
    fn test_example_config_file() {
        let yaml = std::fs::read_to_string("config/example.yaml").unwrap();
        let config = Config::from_yaml_str(&yaml).unwrap();
        assert_eq!(config.day, 24);
        assert_eq!(config.stats_path.as_deref(), Some("result/stats.jsonl"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_minutes_out_of_range_are_rejected() {
        assert!(Config::from_yaml_str("valve_minutes: 5000000000\n").is_err());
        assert!(Config::from_yaml_str("factory_minutes: -1\n").is_err());
        assert!(Cli::try_parse_from(["aoc-search", "--factory-long-minutes", "5000000000"]).is_err());

        let config = Config::from_yaml_str("factory_long_minutes: 4000000000\n").unwrap();
        assert_eq!(config.factory_long_minutes, 4_000_000_000);
    }

    #[test]
    fn test_unknown_yaml_field_is_rejected() {
        assert!(Config::from_yaml_str("valves: 3\n").is_err());
    }

    #[test]
    fn test_command_line_wins_over_file() {
        let cli = Cli::parse_from([
            "aoc-search",
            "--day",
            "24",
            "--input-path",
            "input/test/day24.txt",
            "--basin-trips",
            "1",
        ]);
        let config = Config::from_yaml_str("day: 7\nbasin_trips: 5\n")
            .unwrap()
            .override_from_command_line(&cli)
            .unwrap();
        assert_eq!(config.day, 24);
        assert_eq!(config.basin_trips, 1);
        assert_eq!(config.input_path(), "input/test/day24.txt");
    }

    #[test]
    fn test_validate() {
        assert!(Config::default().validate().is_ok());

        let unsupported = Config {
            day: 3,
            ..Config::default()
        };
        assert!(unsupported.validate().is_err());

        let no_time = Config {
            factory_minutes: 0,
            ..Config::default()
        };
        assert!(no_time.validate().is_err());

        let no_rounds = Config {
            day: 20,
            mixing_rounds: 0,
            ..Config::default()
        };
        assert!(no_rounds.validate().is_err());
    }
}
