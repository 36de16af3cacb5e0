use aoc_search::config::{Cli, Config};
use aoc_search::solver::solver_from_file;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cli = Cli::parse();

    let config = if let Some(config_file) = cli.config.as_ref() {
        let config_str = std::fs::read_to_string(config_file)
            .with_context(|| format!("cannot read config file: {config_file}"))?;
        Config::from_yaml_str(&config_str)
            .with_context(|| format!("error with config file: {config_file}"))?
    } else {
        info!("No config file specified, using default config");
        Config::default()
    }
    .override_from_command_line(&cli)?;

    let input_path = config.input_path();
    info!("solving day {} from {input_path}", config.day);
    let mut solver = solver_from_file(config.day, &input_path)?;
    let solution = solver.solve(&config)?;

    solver.stats().print();
    if let Some(stats_path) = &config.stats_path {
        solver
            .stats()
            .write_json_line(stats_path, config.day, &solution)?;
    }

    println!("{}", solution.part_one);
    println!("{}", solution.part_two);
    Ok(())
}
