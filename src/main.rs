use clap::Parser;

use any_angle::comparison::{self, EnvironmentSetup};
use any_angle::config::Config;
use any_angle::Result;

fn run(config: &Config) -> Result<()> {
    let kinds = config.algorithms()?;
    let options = config.planner_options()?;
    let environment = EnvironmentSetup::from_config(config)?;

    if !config.quiet && !config.csv {
        println!(
            "Grid: {}x{}, blocked cells: {}",
            environment.grid.height(),
            environment.grid.width(),
            environment.grid.num_blocked()
        );
        if let Some(seed) = environment.seed {
            println!("Environment seed: {} (for reproducibility)", seed);
        }
        println!("Start: {}, Goal: {}", environment.start, environment.goal);
        println!();
    }

    let results = comparison::run_all(&environment, &kinds, &options)?;

    if config.csv {
        print!("{}", comparison::format_csv(&results));
    } else if let [single] = results.as_slice() {
        println!("=== {} ===", single.name);
        if single.result.found {
            let path: Vec<String> = single.result.path.iter().map(|p| p.to_string()).collect();
            println!("Path: {}", path.join(" -> "));
        } else {
            println!("No path found");
        }
        print!("{}", single.result.stats);
    } else {
        print!("{}", comparison::format_comparison_results(&results));
    }
    Ok(())
}

fn main() {
    let config = Config::parse();
    let filter = if config.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    if let Err(e) = run(&config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
