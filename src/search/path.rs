use crate::grid::Point;

use super::engine::Node;
use super::frontier::NodeId;

/// A found path: points from start to goal inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub points: Vec<Point>,
    pub length: f64,
}

impl Path {
    pub fn new(points: Vec<Point>) -> Self {
        let length = path_length(&points);
        Path { points, length }
    }
}

/// Sum of Euclidean segment lengths.
pub fn path_length(points: &[Point]) -> f64 {
    points.windows(2).map(|w| w[0].distance(&w[1])).sum()
}

/// Walk parent links from `goal_node` back to the start.
///
/// `anchor` maps a node to the path vertex it stands for: the node's own
/// point for cell searches, the interval root for Anya. Repeated anchors
/// collapse, and `goal` is appended when the last anchor is not the goal.
pub fn reconstruct<S, F>(nodes: &[Node<S>], goal_node: NodeId, goal: Point, anchor: F) -> Path
where
    F: Fn(&S) -> Point,
{
    let mut points = vec![goal];
    let mut current = Some(goal_node);
    while let Some(id) = current {
        let node = &nodes[id];
        let point = anchor(&node.state);
        if points.last() != Some(&point) {
            points.push(point);
        }
        current = node.parent;
    }
    points.reverse();
    Path::new(points)
}
