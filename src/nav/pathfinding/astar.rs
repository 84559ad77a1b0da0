use fixedbitset::FixedBitSet;
use crate::nav::dungeon::{Cell, DungeonGrid};
use super::types::SearchBounds;

pub(super) const NO_PREDECESSOR: usize = usize::MAX;

/// Unsorted open list with O(1) membership.
///
/// Selection scans for the first strict minimum of `f`, and removal keeps the
/// remaining order, so equal scores always resolve to the earliest insertion.
pub(super) struct OpenList {
    nodes: Vec<usize>,
    members: FixedBitSet,
}

impl OpenList {
    pub(super) fn new(capacity: usize) -> Self {
        Self {
            nodes: Vec::new(),
            members: FixedBitSet::with_capacity(capacity),
        }
    }

    #[inline]
    pub(super) fn push_if_absent(&mut self, node: usize) {
        if !self.members.contains(node) {
            self.members.insert(node);
            self.nodes.push(node);
        }
    }

    /// Index into the list of the best node (not removed).
    pub(super) fn best(&self, f: &[f32]) -> Option<usize> {
        let mut iter = self.nodes.iter().enumerate();
        let (mut best_idx, first) = iter.next()?;
        let mut best_score = f[*first];
        for (i, node) in iter {
            if f[*node] < best_score {
                best_idx = i;
                best_score = f[*node];
            }
        }
        Some(best_idx)
    }

    #[inline]
    pub(super) fn get(&self, idx: usize) -> usize {
        self.nodes[idx]
    }

    pub(super) fn remove(&mut self, idx: usize) -> usize {
        let node = self.nodes.remove(idx);
        self.members.set(node, false);
        node
    }
}

/// Walk predecessors back from `goal` and return the chain start-first.
pub(super) fn reconstruct(prev: &[usize], goal: usize) -> Vec<usize> {
    let mut chain = vec![goal];
    let mut current = goal;
    while prev[current] != NO_PREDECESSOR {
        current = prev[current];
        chain.push(current);
    }
    chain.reverse();
    chain
}

#[inline]
fn heuristic(a: Cell, b: Cell) -> f32 {
    let dx = (a.x - b.x) as f32;
    let dy = (a.y - b.y) as f32;
    (dx * dx + dy * dy).sqrt()
}

/// Shortest 4-connected path from `from` to `to` that never leaves `bounds`.
///
/// Returns the cells start-first, `[from]` when `from == to`, and an empty
/// path when `from` is a wall, lies outside the (grid-clipped) bounds, or the
/// goal is unreachable. Identical inputs always give the identical path.
pub fn find_path_local(grid: &DungeonGrid, from: Cell, to: Cell, bounds: SearchBounds) -> Vec<Cell> {
    let Some(bounds) = bounds.clipped_to(grid) else {
        return Vec::new();
    };
    if !bounds.contains(from) || !grid.is_walkable(from) {
        return Vec::new();
    }

    let size = bounds.area();
    let mut g = vec![f32::MAX; size];
    let mut f = vec![f32::MAX; size];
    let mut prev = vec![NO_PREDECESSOR; size];
    let mut closed = FixedBitSet::with_capacity(size);
    let mut open = OpenList::new(size);

    let start = bounds.local_index(from);
    let goal = bounds.contains(to).then(|| bounds.local_index(to));
    g[start] = 0.0;
    f[start] = heuristic(from, to);
    open.push_if_absent(start);

    while let Some(best) = open.best(&f) {
        if Some(open.get(best)) == goal {
            return reconstruct(&prev, open.get(best))
                .into_iter()
                .map(|idx| bounds.local_cell(idx))
                .collect();
        }
        let current = open.remove(best);
        if closed.contains(current) {
            continue;
        }
        closed.insert(current);

        let current_cell = bounds.local_cell(current);
        for next in current_cell.neighbors() {
            if !bounds.contains(next) || !grid.is_walkable(next) {
                continue;
            }
            let idx = bounds.local_index(next);
            let tentative = g[current] + 1.0;
            if tentative < g[idx] {
                prev[idx] = current;
                g[idx] = tentative;
                f[idx] = tentative + heuristic(next, to);
            }
            open.push_if_absent(idx);
        }
    }

    Vec::new()
}

/// [`find_path_local`] over the whole grid.
pub fn find_path_grid(grid: &DungeonGrid, from: Cell, to: Cell) -> Vec<Cell> {
    match SearchBounds::full(grid) {
        Some(bounds) => find_path_local(grid, from, to, bounds),
        None => Vec::new(),
    }
}
