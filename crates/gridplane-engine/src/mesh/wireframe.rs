use std::collections::HashSet;

use super::GridMesh;

impl GridMesh {
    /// Unique triangle edges as a line-list index buffer.
    ///
    /// Each edge appears once, oriented and ordered as first encountered while
    /// walking the triangle list. Used to draw the wireframe on adapters that
    /// cannot rasterize polygons in line mode.
    pub fn wireframe_edges(&self) -> Vec<u32> {
        let mut seen: HashSet<(u32, u32)> = HashSet::with_capacity(self.index_count());
        let mut lines = Vec::with_capacity(self.index_count());

        for tri in self.indices().chunks_exact(3) {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                if seen.insert((a.min(b), a.max(b))) {
                    lines.push(a);
                    lines.push(b);
                }
            }
        }

        lines
    }
}

#[cfg(test)]
mod tests {
    use crate::mesh::generate;

    #[test]
    fn single_cell_has_four_sides_and_a_diagonal() {
        let edges = generate(1).unwrap().wireframe_edges();
        assert_eq!(edges, vec![1, 2, 2, 0, 0, 1, 1, 3, 3, 2]);
    }

    #[test]
    fn edge_count_matches_lattice() {
        for n in [1usize, 2, 5, 32] {
            let edges = generate(n as u32).unwrap().wireframe_edges();
            assert_eq!(edges.len() / 2, 2 * n * (n + 1) + n * n, "n = {n}");
        }
    }

    #[test]
    fn edges_are_unique() {
        let edges = generate(6).unwrap().wireframe_edges();
        let mut keys: Vec<(u32, u32)> = edges
            .chunks_exact(2)
            .map(|e| (e[0].min(e[1]), e[0].max(e[1])))
            .collect();
        let before = keys.len();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), before);
    }
}
