use any_angle::algorithms::{
    Anya, LazyThetaStar, Neighborhood, ThetaAp, ThetaSettings, ThetaStar, TwoKAStar,
    TwoKSettings, VisibilityGraph,
};
use any_angle::search::path_length;
use any_angle::{DuplicatePolicy, Grid, PathfindingAlgorithm, PlannerError, Point};

const SQRT2: f64 = std::f64::consts::SQRT_2;

struct Scenario {
    rows: &'static str,
    start: (i32, i32),
    goal: (i32, i32),
}

const SCENARIOS: [Scenario; 5] = [
    Scenario {
        rows: "....\n..#.\n.##.\n....",
        start: (3, 1),
        goal: (1, 3),
    },
    Scenario {
        rows: "..#.\n##.#\n#..#\n...#",
        start: (0, 4),
        goal: (2, 2),
    },
    Scenario {
        rows: "..#.\n#...\n...#\n.#..",
        start: (0, 0),
        goal: (4, 0),
    },
    Scenario {
        rows: ".@@@\n.@@.\n....\n....",
        start: (2, 2),
        goal: (2, 2),
    },
    Scenario {
        rows: "@...\n@...\n@@..\n@@@@",
        start: (3, 4),
        goal: (0, 2),
    },
];

const OPTIMAL: [Option<f64>; 5] = [
    Some(3.414213562373095),
    None,
    Some(4.650281539872885),
    Some(0.0),
    Some(3.605551275463989),
];

fn check(algorithm: &dyn PathfindingAlgorithm, expected: &[Option<f64>]) {
    for (scenario, expected) in SCENARIOS.iter().zip(expected) {
        let grid = Grid::parse(scenario.rows).unwrap();
        let (start, goal) = (Point::from(scenario.start), Point::from(scenario.goal));
        let result = algorithm.search(&grid, start, goal).unwrap();
        let label = format!("{} on\n{}", algorithm.name(), grid);
        match expected {
            Some(cost) => {
                assert!(result.found, "{label}");
                assert!((result.cost - cost).abs() < 1e-9, "{label}: {} != {cost}", result.cost);
                assert_eq!(result.path.first(), Some(&start), "{label}");
                assert_eq!(result.path.last(), Some(&goal), "{label}");
                assert!((path_length(&result.path) - result.cost).abs() < 1e-9, "{label}");
                for pair in result.path.windows(2) {
                    assert!(grid.visible(pair[0], pair[1]), "{label}: {} -> {}", pair[0], pair[1]);
                }
                assert!((result.stats.way_length - result.cost).abs() < 1e-9, "{label}");
            }
            None => {
                assert!(!result.found, "{label}");
                assert!(result.path.is_empty(), "{label}");
                assert_eq!(result.cost, 0.0, "{label}");
                assert_eq!(result.stats.way_length, 0.0, "{label}");
            }
        }
    }
}

#[test]
fn anya_is_optimal_on_every_scenario() {
    env_logger::try_init().ok();
    check(&Anya::new(), &OPTIMAL);
    for policy in [DuplicatePolicy::SemiDuplicateDetection, DuplicatePolicy::Reexpansion] {
        check(&Anya { policy, ..Anya::new() }, &OPTIMAL);
    }
}

#[test]
fn visibility_graph_is_optimal_on_every_scenario() {
    check(&VisibilityGraph::new(), &OPTIMAL);
}

#[test]
fn theta_family_scenarios() {
    for neighborhood in [Neighborhood::Eight, Neighborhood::Sixteen] {
        for policy in [
            DuplicatePolicy::LazyRemoval,
            DuplicatePolicy::SemiDuplicateDetection,
            DuplicatePolicy::Reexpansion,
        ] {
            let settings = ThetaSettings {
                neighborhood,
                policy,
                ..ThetaSettings::default()
            };
            check(&ThetaStar::new(settings), &OPTIMAL);
            if neighborhood == Neighborhood::Eight {
                check(&ThetaAp::new(settings), &OPTIMAL);
            }
        }
        let lazy = LazyThetaStar::new(ThetaSettings {
            neighborhood,
            ..LazyThetaStar::default().settings
        });
        check(&lazy, &OPTIMAL);
    }

    let four = ThetaSettings {
        neighborhood: Neighborhood::Four,
        ..ThetaSettings::default()
    };
    let expected = [Some(4.0), None, Some(2.0 + 2.0 * SQRT2), Some(0.0), Some(3.605551275463989)];
    check(&ThetaStar::new(four), &expected);
}

#[test]
fn two_k_scenarios() {
    let cases = [
        (3, [Some(2.0 + SQRT2), None, Some(2.0 + 2.0 * SQRT2), Some(0.0), Some(1.0 + 2.0 * SQRT2)]),
        (
            4,
            [
                Some(2.0 + SQRT2),
                None,
                Some(4.650281539872885),
                Some(0.0),
                Some(SQRT2 + 5f64.sqrt()),
            ],
        ),
        (5, OPTIMAL),
    ];
    for (k, expected) in cases {
        for canonical in [false, true] {
            let settings = TwoKSettings {
                k,
                canonical,
                ..TwoKSettings::default()
            };
            check(&TwoKAStar::new(settings), &expected);
        }
    }
}

#[test]
fn configuration_errors() {
    let grid = Grid::parse("....\n....").unwrap();
    let (start, goal) = (Point::new(0, 0), Point::new(2, 4));

    let err = TwoKAStar::new(TwoKSettings {
        k: 2,
        ..TwoKSettings::default()
    })
    .search(&grid, start, goal)
    .unwrap_err();
    assert!(matches!(err, PlannerError::InvalidK { k: 2, .. }));

    let err = Anya::new().search(&grid, Point::new(-1, 0), goal).unwrap_err();
    assert!(matches!(err, PlannerError::OutOfBounds { which: "start", .. }));

    let err = ThetaStar::default().search(&grid, start, Point::new(3, 0)).unwrap_err();
    assert!(matches!(err, PlannerError::OutOfBounds { which: "goal", .. }));

    assert_eq!(
        Neighborhood::try_from(12).unwrap_err(),
        PlannerError::InvalidNeighborhood(12)
    );
}

#[test]
fn grid_text_errors() {
    assert!(matches!(
        Grid::parse_with_size("...\n...", 3, 3),
        Err(PlannerError::SizeMismatch { .. })
    ));
    let err = Grid::parse("..\n.?").unwrap_err();
    assert!(err.to_string().contains("row 1, column 1"));
}
