//! Cycle detection over the mount redirection graph.
//!
//! Every mount point contributes one directed edge src→dest; nodes are
//! keyed `namespace:path`. Classic three-color depth-first search: a
//! back-edge into the current recursion stack means the redirections
//! loop and the candidate table must be rejected.

use std::collections::BTreeMap;

use crate::point::MountPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// Not yet visited.
    White,
    /// On the current recursion stack.
    Gray,
    /// Fully explored.
    Black,
}

/// Search the graph built from `points` for a cycle.
///
/// Returns the node key where a back-edge was found, or `None` when the
/// graph is acyclic.
pub(crate) fn find_cycle(points: &[MountPoint]) -> Option<String> {
    let mut edges: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for point in points {
        edges
            .entry(point.src.node_key())
            .or_default()
            .push(point.dest.node_key());
        // Make sure sink-only nodes exist so every node gets visited.
        edges.entry(point.dest.node_key()).or_default();
    }

    let mut colors: BTreeMap<&str, Color> =
        edges.keys().map(|k| (k.as_str(), Color::White)).collect();

    for node in edges.keys() {
        if colors[node.as_str()] == Color::White {
            if let Some(hit) = visit(node, &edges, &mut colors) {
                return Some(hit);
            }
        }
    }
    None
}

fn visit<'a>(
    node: &'a str,
    edges: &'a BTreeMap<String, Vec<String>>,
    colors: &mut BTreeMap<&'a str, Color>,
) -> Option<String> {
    colors.insert(node, Color::Gray);

    if let Some(next) = edges.get(node) {
        for dest in next {
            match colors[dest.as_str()] {
                Color::Gray => return Some(dest.clone()),
                Color::White => {
                    if let Some(hit) = visit(dest, edges, colors) {
                        return Some(hit);
                    }
                }
                Color::Black => {}
            }
        }
    }

    colors.insert(node, Color::Black);
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::{Endpoint, Namespace};
    use hearth_core::VPath;

    fn point(src: &str, dest: &str) -> MountPoint {
        // Namespaces don't matter for the graph shape; encode them in keys.
        let (src_ns, src_path) = split(src);
        let (dest_ns, dest_path) = split(dest);
        MountPoint::new(
            Endpoint::new(src_ns, VPath::parse(src_path).unwrap()),
            Endpoint::new(dest_ns, VPath::parse(dest_path).unwrap()),
        )
    }

    fn split(s: &str) -> (Namespace, &str) {
        match s.split_once(':').unwrap() {
            ("root", path) => (Namespace::Root, path),
            ("external", path) => (Namespace::External, path),
            other => panic!("bad key {:?}", other),
        }
    }

    #[test]
    fn empty_table_is_acyclic() {
        assert_eq!(find_cycle(&[]), None);
    }

    #[test]
    fn chain_is_acyclic() {
        let points = vec![
            point("external:/m1", "root:/a"),
            point("root:/a", "external:/m2"),
            point("external:/m2", "root:/b"),
        ];
        assert_eq!(find_cycle(&points), None);
    }

    #[test]
    fn two_point_loop_detected() {
        let points = vec![
            point("root:/a", "external:/m1"),
            point("external:/m1", "root:/a"),
        ];
        assert!(find_cycle(&points).is_some());
    }

    #[test]
    fn longer_loop_detected() {
        let points = vec![
            point("root:/a", "external:/m1"),
            point("external:/m1", "root:/b"),
            point("root:/b", "external:/m2"),
            point("external:/m2", "root:/a"),
        ];
        assert!(find_cycle(&points).is_some());
    }

    #[test]
    fn diamond_without_back_edge_is_acyclic() {
        // Two routes into the same sink is sharing, not a loop.
        let points = vec![
            point("external:/m1", "root:/shared"),
            point("external:/m2", "root:/shared"),
        ];
        assert_eq!(find_cycle(&points), None);
    }

    #[test]
    fn disconnected_component_with_loop_detected() {
        let points = vec![
            point("external:/m1", "root:/a"),
            point("root:/x", "external:/y"),
            point("external:/y", "root:/x"),
        ];
        assert!(find_cycle(&points).is_some());
    }

    #[test]
    fn self_edge_detected() {
        // Same path in both namespaces still forms a one-node loop if the
        // keys collide; same-namespace self edge is the degenerate case.
        let points = vec![point("external:/m1", "external:/m1")];
        assert!(find_cycle(&points).is_some());
    }
}
