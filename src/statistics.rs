use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::PlannerError;

/// Counters collected by one search run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stats {
    /// Benchmark bucket of the scenario, set by the caller.
    pub difficulty: u32,
    pub expansions: usize,
    pub runtime: Duration,
    /// Length of the returned path, zero when none was found.
    pub way_length: f64,
    /// `way_length / optimal`, filled in only when an optimum is known.
    pub suboptimal: f64,
    /// Peak size of open plus closed sets.
    pub max_tree_size: usize,
    pub found: bool,
    pub budget_exceeded: bool,
}

impl Stats {
    pub const CSV_HEADER: &'static str =
        "difficulty,expansions,runtime,way_length,suboptimal,max_tree_size";

    pub fn new() -> Self {
        Self::default()
    }

    /// Record the reference optimum and derive the suboptimality ratio.
    pub fn calculate_suboptimality(&mut self, optimal: f64) {
        if self.found && optimal > 0.0 {
            self.suboptimal = self.way_length / optimal;
        } else if self.found {
            self.suboptimal = 1.0;
        } else {
            self.suboptimal = 0.0;
        }
    }

    pub fn to_csv_record(&self) -> String {
        format!(
            "{},{},{:.6},{:.6},{:.6},{}",
            self.difficulty,
            self.expansions,
            self.runtime.as_secs_f64(),
            self.way_length,
            self.suboptimal,
            self.max_tree_size
        )
    }
}

impl FromStr for Stats {
    type Err = PlannerError;

    /// Parse a record written by [`Stats::to_csv_record`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.trim().split(',').collect();
        if fields.len() != 6 {
            return Err(PlannerError::InvalidValue(format!(
                "expected 6 stats fields, got {}",
                fields.len()
            )));
        }
        let bad = |name: &str, value: &str| {
            PlannerError::InvalidValue(format!("{} field {:?}", name, value))
        };

        let runtime: f64 = fields[2].parse().map_err(|_| bad("runtime", fields[2]))?;
        if !runtime.is_finite() || runtime < 0.0 {
            return Err(bad("runtime", fields[2]));
        }
        let way_length: f64 = fields[3].parse().map_err(|_| bad("way_length", fields[3]))?;

        Ok(Stats {
            difficulty: fields[0].parse().map_err(|_| bad("difficulty", fields[0]))?,
            expansions: fields[1].parse().map_err(|_| bad("expansions", fields[1]))?,
            runtime: Duration::from_secs_f64(runtime),
            way_length,
            suboptimal: fields[4].parse().map_err(|_| bad("suboptimal", fields[4]))?,
            max_tree_size: fields[5].parse().map_err(|_| bad("max_tree_size", fields[5]))?,
            found: way_length > 0.0,
            budget_exceeded: false,
        })
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Found: {}", self.found)?;
        writeln!(f, "Path Length: {:.6}", self.way_length)?;
        writeln!(f, "Expansions: {}", self.expansions)?;
        writeln!(f, "Max Tree Size: {}", self.max_tree_size)?;
        writeln!(f, "Runtime: {:.2?}", self.runtime)?;

        if self.suboptimal > 0.0 {
            writeln!(f, "Suboptimality: {:.4}", self.suboptimal)?;
        }
        if self.budget_exceeded {
            writeln!(f, "Note: search budget exceeded before the frontier was exhausted")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_record_has_six_fields_matching_header() {
        let stats = Stats {
            difficulty: 3,
            expansions: 42,
            runtime: Duration::from_millis(1500),
            way_length: 3.5,
            suboptimal: 1.25,
            max_tree_size: 77,
            found: true,
            budget_exceeded: false,
        };
        let record = stats.to_csv_record();
        assert_eq!(record, "3,42,1.500000,3.500000,1.250000,77");
        assert_eq!(
            record.split(',').count(),
            Stats::CSV_HEADER.split(',').count()
        );
    }

    #[test]
    fn parses_its_own_records() {
        let parsed: Stats = "3,42,1.500000,3.500000,1.250000,77".parse().unwrap();
        assert_eq!(parsed.difficulty, 3);
        assert_eq!(parsed.expansions, 42);
        assert_eq!(parsed.runtime, Duration::from_millis(1500));
        assert_eq!(parsed.max_tree_size, 77);
        assert!(parsed.found);

        assert!("1,2,3".parse::<Stats>().is_err());
        assert!("x,2,0.1,0,0,1".parse::<Stats>().is_err());
        assert!("1,2,-0.1,0,0,1".parse::<Stats>().is_err());
    }

    #[test]
    fn suboptimality_needs_a_found_path() {
        let mut stats = Stats::new();
        stats.calculate_suboptimality(2.0);
        assert_eq!(stats.suboptimal, 0.0);

        stats.found = true;
        stats.way_length = 3.0;
        stats.calculate_suboptimality(2.0);
        assert!((stats.suboptimal - 1.5).abs() < 1e-12);
    }
}
