pub mod anya;
pub mod common;
pub mod lazy_theta;
pub mod theta;
pub mod theta_ap;
pub mod two_k;
pub mod visibility_graph;

use log::warn;
use std::fmt;
use std::str::FromStr;

use crate::error::{PlannerError, Result};
use crate::grid::{Grid, Point};
use crate::search::{DuplicatePolicy, SearchBudget, SearchResult};

pub use anya::Anya;
pub use common::{Heuristic, Neighborhood, PathfindingAlgorithm};
pub use lazy_theta::LazyThetaStar;
pub use theta::{ThetaSettings, ThetaStar};
pub use theta_ap::ThetaAp;
pub use two_k::{TwoKAStar, TwoKSettings};
pub use visibility_graph::VisibilityGraph;

/// Algorithm names accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgorithmKind {
    Anya,
    Theta,
    LazyTheta,
    ThetaAp,
    AStar2k,
    Canonical2k,
    VisibilityGraph,
}

impl AlgorithmKind {
    pub const ALL: [AlgorithmKind; 7] = [
        AlgorithmKind::Anya,
        AlgorithmKind::Theta,
        AlgorithmKind::LazyTheta,
        AlgorithmKind::ThetaAp,
        AlgorithmKind::AStar2k,
        AlgorithmKind::Canonical2k,
        AlgorithmKind::VisibilityGraph,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AlgorithmKind::Anya => "anya",
            AlgorithmKind::Theta => "theta",
            AlgorithmKind::LazyTheta => "lazy_theta",
            AlgorithmKind::ThetaAp => "theta_ap",
            AlgorithmKind::AStar2k => "astar_2k",
            AlgorithmKind::Canonical2k => "canonical_2k",
            AlgorithmKind::VisibilityGraph => "visibility_graph",
        }
    }
}

impl FromStr for AlgorithmKind {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self> {
        AlgorithmKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| PlannerError::UnknownAlgorithm(s.to_string()))
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Settings shared by every planner built from the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlannerOptions {
    pub theta: ThetaSettings,
    pub two_k: TwoKSettings,
    /// Overrides each algorithm's default duplicate policy.
    pub policy: Option<DuplicatePolicy>,
    pub budget: SearchBudget,
}

/// An algorithm together with its settings.
#[derive(Debug, Clone)]
pub enum Planner {
    Anya(Anya),
    Theta(ThetaStar),
    LazyTheta(LazyThetaStar),
    ThetaAp(ThetaAp),
    TwoK(TwoKAStar),
    VisibilityGraph(VisibilityGraph),
}

impl Planner {
    pub fn build(kind: AlgorithmKind, options: &PlannerOptions) -> Planner {
        let budget = options.budget;
        match kind {
            AlgorithmKind::Anya => Planner::Anya(Anya {
                policy: options.policy.unwrap_or_default(),
                budget,
            }),
            AlgorithmKind::Theta => Planner::Theta(ThetaStar::new(ThetaSettings {
                policy: options.policy.unwrap_or(options.theta.policy),
                budget,
                ..options.theta
            })),
            AlgorithmKind::LazyTheta => {
                let policy = options.policy;
                if let Some(policy) = policy.filter(|p| *p != DuplicatePolicy::Reexpansion) {
                    warn!("lazy_theta ignores the {} policy and uses reexpansion", policy);
                }
                Planner::LazyTheta(LazyThetaStar::new(ThetaSettings {
                    policy: DuplicatePolicy::Reexpansion,
                    budget,
                    ..options.theta
                }))
            }
            AlgorithmKind::ThetaAp => {
                if options.theta.neighborhood != Neighborhood::Eight {
                    warn!(
                        "theta_ap ignores the {:?} neighborhood and uses 8 neighbors",
                        options.theta.neighborhood
                    );
                }
                Planner::ThetaAp(ThetaAp::new(ThetaSettings {
                    neighborhood: Neighborhood::Eight,
                    policy: options.policy.unwrap_or(options.theta.policy),
                    budget,
                    ..options.theta
                }))
            }
            AlgorithmKind::AStar2k | AlgorithmKind::Canonical2k => {
                Planner::TwoK(TwoKAStar::new(TwoKSettings {
                    canonical: kind == AlgorithmKind::Canonical2k,
                    policy: options.policy.unwrap_or(options.two_k.policy),
                    budget,
                    ..options.two_k
                }))
            }
            AlgorithmKind::VisibilityGraph => Planner::VisibilityGraph(VisibilityGraph::new()),
        }
    }

    fn algorithm(&self) -> &dyn PathfindingAlgorithm {
        match self {
            Planner::Anya(a) => a,
            Planner::Theta(a) => a,
            Planner::LazyTheta(a) => a,
            Planner::ThetaAp(a) => a,
            Planner::TwoK(a) => a,
            Planner::VisibilityGraph(a) => a,
        }
    }
}

impl PathfindingAlgorithm for Planner {
    fn name(&self) -> &'static str {
        self.algorithm().name()
    }

    fn search(&self, grid: &Grid, start: Point, goal: Point) -> Result<SearchResult> {
        self.algorithm().search(grid, start, goal)
    }
}
