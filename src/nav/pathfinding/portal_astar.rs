use fixedbitset::FixedBitSet;
use super::astar::{reconstruct, OpenList, NO_PREDECESSOR};
use super::portal_graph::PortalGraph;
use super::types::{PortalId, PortalPath};

fn center_distance(graph: &PortalGraph, a: PortalId, b: PortalId) -> f32 {
    let (ax, ay) = graph.portals[a].center();
    let (bx, by) = graph.portals[b].center();
    ((ax - bx) * (ax - bx) + (ay - by) * (ay - by)).sqrt()
}

/// A* over portals using the precomputed connection costs.
///
/// Same open-list discipline as the cell search. The heuristic (distance
/// between footprint centers) is not always consistent with cell-count
/// costs, so a node that is already closed can still get a better
/// predecessor; it is recorded but the node is not expanded again.
pub fn find_portal_path(graph: &PortalGraph, from: PortalId, to: PortalId) -> PortalPath {
    let n = graph.portals.len();
    if from >= n || to >= n {
        return PortalPath::none();
    }

    let mut g = vec![f32::MAX; n];
    let mut f = vec![f32::MAX; n];
    let mut prev = vec![NO_PREDECESSOR; n];
    let mut closed = FixedBitSet::with_capacity(n);
    let mut open = OpenList::new(n);

    g[from] = 0.0;
    f[from] = center_distance(graph, from, to);
    open.push_if_absent(from);

    while let Some(best) = open.best(&f) {
        let current = open.get(best);
        if current == to {
            return PortalPath {
                portals: reconstruct(&prev, to),
                cost: f[to],
            };
        }
        open.remove(best);
        if closed.contains(current) {
            continue;
        }
        closed.insert(current);

        for connection in &graph.portals[current].connections {
            let next = connection.target;
            let tentative = g[current] + connection.cost;
            if tentative < g[next] {
                prev[next] = current;
                g[next] = tentative;
                f[next] = tentative + center_distance(graph, next, to);
            }
            open.push_if_absent(next);
        }
    }

    PortalPath::none()
}
