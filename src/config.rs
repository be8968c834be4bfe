use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::algorithms::{
    AlgorithmKind, Heuristic, Neighborhood, PlannerOptions, ThetaSettings, TwoKSettings,
};
use crate::error::Result;
use crate::grid::Point;
use crate::search::{DuplicatePolicy, SearchBudget};

/// Parse `row,col` into a grid point.
pub fn parse_point(s: &str) -> std::result::Result<Point, String> {
    let (row, col) = s
        .split_once(',')
        .ok_or_else(|| format!("expected row,col but got {:?}", s))?;
    let row = row.trim().parse().map_err(|_| format!("bad row in {:?}", s))?;
    let col = col.trim().parse().map_err(|_| format!("bad column in {:?}", s))?;
    Ok(Point::new(row, col))
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// anya, theta, lazy_theta, theta_ap, astar_2k, canonical_2k, visibility_graph or all
    #[arg(long, default_value = "all")]
    pub algorithm: String,

    /// Grid text file; a random grid is generated when absent
    #[arg(long)]
    pub map: Option<PathBuf>,

    #[arg(long, default_value_t = 20)]
    pub grid_size: usize,

    #[arg(long, default_value_t = 50)]
    pub num_walls: usize,

    /// Seed for the random grid and endpoints
    #[arg(long)]
    pub seed: Option<u64>,

    /// Start point as row,col
    #[arg(long, value_parser = parse_point)]
    pub start: Option<Point>,

    /// Goal point as row,col
    #[arg(long, value_parser = parse_point)]
    pub goal: Option<Point>,

    /// Direction exponent for the 2^k searches
    #[arg(long, default_value_t = 4)]
    pub k: u32,

    /// Theta* neighborhood: 4, 8 or 16
    #[arg(long, default_value_t = 8)]
    pub neighbors: usize,

    /// Duplicate handling: lazy, sdd or reexpansion
    #[arg(long)]
    pub policy: Option<String>,

    /// Heuristic weight for Theta* and Lazy Theta*
    #[arg(long, default_value_t = 1.0)]
    pub weight: f64,

    /// Blend factor for the parent-aware Theta* heuristic
    #[arg(long)]
    pub parent_blend: Option<f64>,

    /// Ancestors Theta* tries for line of sight
    #[arg(long, default_value_t = 1)]
    pub ancestors: usize,

    /// Let Theta* queue a successor for every visible ancestor
    #[arg(long, default_value_t = false)]
    pub multi_parent: bool,

    #[arg(long)]
    pub max_expansions: Option<usize>,

    #[arg(long)]
    pub max_runtime_ms: Option<u64>,

    /// Print CSV records instead of a table
    #[arg(long, default_value_t = false)]
    pub csv: bool,

    #[arg(long, default_value_t = false)]
    pub quiet: bool,
}

impl Config {
    /// The algorithms selected by `--algorithm`.
    pub fn algorithms(&self) -> Result<Vec<AlgorithmKind>> {
        if self.algorithm == "all" {
            return Ok(AlgorithmKind::ALL.to_vec());
        }
        Ok(vec![self.algorithm.parse()?])
    }

    pub fn budget(&self) -> SearchBudget {
        let mut budget = SearchBudget::unlimited();
        if let Some(expansions) = self.max_expansions {
            budget = budget.with_max_expansions(expansions);
        }
        if let Some(ms) = self.max_runtime_ms {
            budget = budget.with_max_runtime(Duration::from_millis(ms));
        }
        budget
    }

    pub fn planner_options(&self) -> Result<PlannerOptions> {
        let heuristic = match self.parent_blend {
            Some(wh) => Heuristic::ParentBlend(wh),
            None => Heuristic::Euclidean,
        };
        let policy = self.policy.as_deref().map(str::parse::<DuplicatePolicy>).transpose()?;
        Ok(PlannerOptions {
            theta: ThetaSettings {
                neighborhood: Neighborhood::try_from(self.neighbors)?,
                heuristic,
                weight: self.weight,
                ancestors: self.ancestors,
                multi_parent: self.multi_parent,
                ..ThetaSettings::default()
            },
            two_k: TwoKSettings {
                k: self.k,
                ..TwoKSettings::default()
            },
            policy,
            budget: self.budget(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlannerError;

    fn config(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("any_angle").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults_run_everything() {
        let config = config(&[]);
        assert_eq!(config.algorithms().unwrap(), AlgorithmKind::ALL.to_vec());
        let options = config.planner_options().unwrap();
        assert_eq!(options.theta.neighborhood, Neighborhood::Eight);
        assert_eq!(options.two_k.k, 4);
        assert_eq!(options.policy, None);
        assert_eq!(options.budget, SearchBudget::unlimited());
    }

    #[test]
    fn parses_points_and_limits() {
        let config = config(&[
            "--algorithm",
            "theta",
            "--start",
            "1,2",
            "--goal",
            "3, 4",
            "--policy",
            "sdd",
            "--max-expansions",
            "100",
            "--neighbors",
            "16",
            "--ancestors",
            "2",
            "--multi-parent",
        ]);
        assert_eq!(config.start, Some(Point::new(1, 2)));
        assert_eq!(config.goal, Some(Point::new(3, 4)));
        assert_eq!(config.algorithms().unwrap(), vec![AlgorithmKind::Theta]);
        let options = config.planner_options().unwrap();
        assert_eq!(options.policy, Some(DuplicatePolicy::SemiDuplicateDetection));
        assert_eq!(options.budget.max_expansions, Some(100));
        assert_eq!(options.theta.neighborhood, Neighborhood::Sixteen);
        assert_eq!(options.theta.ancestors, 2);
        assert!(options.theta.multi_parent);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Config::try_parse_from(["any_angle", "--start", "12"]).is_err());
        assert!(matches!(
            config(&["--algorithm", "bfs"]).algorithms(),
            Err(PlannerError::UnknownAlgorithm(_))
        ));
        assert_eq!(
            config(&["--neighbors", "6"]).planner_options().unwrap_err(),
            PlannerError::InvalidNeighborhood(6)
        );
        assert!(config(&["--policy", "fifo"]).planner_options().is_err());
    }
}
