//! Run several planners on one grid and tabulate the results.

use log::info;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::fmt::Write as _;
use std::fs;

use crate::algorithms::{
    AlgorithmKind, PathfindingAlgorithm, Planner, PlannerOptions, VisibilityGraph,
};
use crate::config::Config;
use crate::error::{PlannerError, Result};
use crate::grid::{Grid, Point};
use crate::search::SearchResult;
use crate::statistics::Stats;

/// One grid and query shared by every algorithm in a comparison.
#[derive(Debug, Clone)]
pub struct EnvironmentSetup {
    pub grid: Grid,
    pub start: Point,
    pub goal: Point,
    /// Seed of the random grid, `None` for grids loaded from a file.
    pub seed: Option<u64>,
}

impl EnvironmentSetup {
    pub fn from_config(config: &Config) -> Result<Self> {
        match &config.map {
            Some(path) => {
                let grid = Grid::parse(&fs::read_to_string(path)?)?;
                Self::with_endpoints(grid, config, None)
            }
            None => Self::generate(config),
        }
    }

    /// Random square grid of `grid_size` cells per side. Without a seed one is
    /// drawn so the run can be reproduced.
    pub fn generate(config: &Config) -> Result<Self> {
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        let grid = Grid::random(config.grid_size, config.grid_size, config.num_walls, &mut rng)?;
        Self::with_endpoints_from(grid, config, Some(seed), &mut rng)
    }

    fn with_endpoints(grid: Grid, config: &Config, seed: Option<u64>) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(config.seed.unwrap_or(0));
        Self::with_endpoints_from(grid, config, seed, &mut rng)
    }

    /// Use the configured endpoints, or pick a passable start in the upper
    /// left half and a passable goal in the lower right half.
    fn with_endpoints_from(
        grid: Grid,
        config: &Config,
        seed: Option<u64>,
        rng: &mut StdRng,
    ) -> Result<Self> {
        let (h, w) = (grid.height() as i32, grid.width() as i32);
        let start = match config.start {
            Some(p) => p,
            None => random_passable(&grid, rng, |p| p.row <= h / 2 && p.col <= w / 2, "start")?,
        };
        let goal = match config.goal {
            Some(p) => p,
            None => random_passable(&grid, rng, |p| p.row >= h / 2 && p.col >= w / 2, "goal")?,
        };
        Ok(EnvironmentSetup {
            grid,
            start,
            goal,
            seed,
        })
    }
}

fn random_passable<F>(grid: &Grid, rng: &mut StdRng, region: F, which: &str) -> Result<Point>
where
    F: Fn(&Point) -> bool,
{
    let candidates: Vec<Point> = grid
        .points()
        .filter(|p| region(p) && grid.passable_point(p.row, p.col))
        .collect();
    candidates
        .choose(rng)
        .copied()
        .ok_or_else(|| {
            PlannerError::InvalidValue(format!("no passable {} point on the grid", which))
        })
}

#[derive(Debug, Clone)]
pub struct AlgorithmResult {
    pub name: &'static str,
    pub result: SearchResult,
}

impl AlgorithmResult {
    pub fn stats(&self) -> &Stats {
        &self.result.stats
    }
}

/// Run every algorithm on the environment. Suboptimality is measured
/// against the visibility-graph optimum.
pub fn run_all(
    environment: &EnvironmentSetup,
    kinds: &[AlgorithmKind],
    options: &PlannerOptions,
) -> Result<Vec<AlgorithmResult>> {
    let EnvironmentSetup {
        grid, start, goal, ..
    } = environment;

    let mut results = Vec::with_capacity(kinds.len());
    for (i, kind) in kinds.iter().enumerate() {
        info!("running algorithm {} of {}: {}", i + 1, kinds.len(), kind);
        let planner = Planner::build(*kind, options);
        let result = planner.search(grid, *start, *goal)?;
        info!(
            "completed {}: found {}, cost {:.4}, {} expansions",
            kind, result.found, result.cost, result.stats.expansions
        );
        results.push(AlgorithmResult {
            name: planner.name(),
            result,
        });
    }

    let reference = match results.iter().find(|r| r.name == AlgorithmKind::VisibilityGraph.name()) {
        Some(r) => r.result.clone(),
        None => VisibilityGraph::new().search(grid, *start, *goal)?,
    };
    if reference.found {
        for r in &mut results {
            r.result.stats.calculate_suboptimality(reference.cost);
        }
    }
    Ok(results)
}

/// Comparison table, one row per algorithm.
pub fn format_comparison_results(results: &[AlgorithmResult]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== ALGORITHM COMPARISON RESULTS ===");
    let _ = writeln!(
        out,
        "{:<18} {:<8} {:<12} {:<12} {:<12} {:<14} {:<12}",
        "Algorithm", "Found", "Length", "Suboptimal", "Expansions", "Max Tree Size", "Runtime"
    );
    let _ = writeln!(out, "{}", "-".repeat(94));
    for r in results {
        let stats = r.stats();
        let found = if stats.found { "yes" } else { "no" };
        let suboptimal = if stats.suboptimal > 0.0 {
            format!("{:.4}", stats.suboptimal)
        } else {
            "-".to_string()
        };
        let _ = writeln!(
            out,
            "{:<18} {:<8} {:<12} {:<12} {:<12} {:<14} {:<12}",
            r.name,
            found,
            format!("{:.4}", stats.way_length),
            suboptimal,
            stats.expansions,
            stats.max_tree_size,
            format!("{:.2?}", stats.runtime)
        );
    }
    out
}

/// CSV with an algorithm column in front of the stats record.
pub fn format_csv(results: &[AlgorithmResult]) -> String {
    let mut out = format!("algorithm,{}\n", Stats::CSV_HEADER);
    for r in results {
        let _ = writeln!(out, "{},{}", r.name, r.stats().to_csv_record());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn config(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("any_angle").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn seeded_environments_are_reproducible() {
        let config = config(&["--seed", "11", "--grid-size", "12", "--num-walls", "20"]);
        let a = EnvironmentSetup::generate(&config).unwrap();
        let b = EnvironmentSetup::generate(&config).unwrap();
        assert_eq!(a.grid, b.grid);
        assert_eq!((a.start, a.goal), (b.start, b.goal));
        assert_eq!(a.seed, Some(11));
        assert!(a.grid.passable_point(a.start.row, a.start.col));
        assert!(a.grid.passable_point(a.goal.row, a.goal.col));
    }

    #[test]
    fn comparison_fills_suboptimality() {
        let environment = EnvironmentSetup {
            grid: Grid::parse("..#.\n#...\n...#\n.#..").unwrap(),
            start: Point::new(0, 0),
            goal: Point::new(4, 0),
            seed: None,
        };
        let kinds = [AlgorithmKind::Anya, AlgorithmKind::AStar2k];
        let options = PlannerOptions {
            two_k: crate::algorithms::TwoKSettings {
                k: 3,
                ..Default::default()
            },
            ..PlannerOptions::default()
        };
        let results = run_all(&environment, &kinds, &options).unwrap();
        assert_eq!(results.len(), 2);
        assert!((results[0].stats().suboptimal - 1.0).abs() < 1e-9);
        assert!(results[1].stats().suboptimal > 1.0);

        let table = format_comparison_results(&results);
        assert!(table.contains("anya"));
        assert!(table.contains("astar_2k"));

        let csv = format_csv(&results);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with(Stats::CSV_HEADER));
        assert!(lines[1].starts_with("anya,0,"));
    }

    #[test]
    fn configured_endpoints_win() {
        let config = config(&[
            "--seed",
            "3",
            "--start",
            "0,1",
            "--goal",
            "5,5",
            "--grid-size",
            "5",
        ]);
        let environment = EnvironmentSetup::generate(&config).unwrap();
        assert_eq!(environment.start, Point::new(0, 1));
        assert_eq!(environment.goal, Point::new(5, 5));
    }
}
