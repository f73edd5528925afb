use crate::error::{GridError, GridResult};

/// Tessellated unit square in the XY plane.
///
/// Positions are row-major (y outer, x inner) and centred on the origin with
/// an extent of `[-0.5, 0.5]` on both axes. Indices form a triangle list with
/// two triangles per cell.
#[derive(Debug, Clone, PartialEq)]
pub struct GridMesh {
    resolution: u32,
    positions: Vec<[f32; 3]>,
    indices: Vec<u32>,
}

/// Largest accepted resolution: 4097² vertices, about 0.6 GB of buffers.
pub const MAX_RESOLUTION: u32 = 4096;

/// Generates the grid mesh for `resolution` subdivisions per axis.
///
/// Fails with `InvalidArgument` for a zero resolution, for one above
/// [`MAX_RESOLUTION`], or when the buffers cannot be allocated.
pub fn generate(resolution: u32) -> GridResult<GridMesh> {
    if resolution < 1 {
        return Err(GridError::invalid("grid resolution must be at least 1"));
    }
    if resolution > MAX_RESOLUTION {
        return Err(GridError::invalid(format!(
            "grid resolution {resolution} exceeds the maximum of {MAX_RESOLUTION}"
        )));
    }

    let n = resolution;
    let side = n as usize + 1;

    let mut positions = Vec::new();
    positions
        .try_reserve_exact(side * side)
        .map_err(|e| GridError::invalid(format!("grid resolution {n}: vertex buffer: {e}")))?;

    let mut indices = Vec::new();
    indices
        .try_reserve_exact(6 * n as usize * n as usize)
        .map_err(|e| GridError::invalid(format!("grid resolution {n}: index buffer: {e}")))?;

    let nf = n as f32;
    let half = nf / 2.0;

    for y in 0..=n {
        for x in 0..=n {
            positions.push([(x as f32 - half) / nf, (y as f32 - half) / nf, 0.0]);
        }
    }

    // `start` walks the i-th row skipping its first column; each value names the
    // bottom-right corner of one cell.
    for i in 0..n {
        let row = i * (n + 1);
        for start in row + 1..row + n + 1 {
            indices.extend_from_slice(&[start, start + n, start - 1]);
            indices.extend_from_slice(&[start, start + n + 1, start + n]);
        }
    }

    Ok(GridMesh {
        resolution,
        positions,
        indices,
    })
}

impl GridMesh {
    #[inline]
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    #[inline]
    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Vertex data as bytes, ready for a `VERTEX` buffer upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Index data as bytes, ready for an `INDEX` buffer upload (`Uint32`).
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-6;

    fn lattice(n: u32, row: u32, col: u32) -> u32 {
        row * (n + 1) + col
    }

    fn close(a: [f32; 3], b: [f32; 3]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < EPS)
    }

    // ── sizes ─────────────────────────────────────────────────────────────

    #[test]
    fn buffer_lengths_follow_resolution() {
        for n in [1u32, 2, 3, 7, 32, 64] {
            let mesh = generate(n).unwrap();
            let side = (n + 1) as usize;
            assert_eq!(mesh.vertex_bytes().len() / 4, 3 * side * side, "n = {n}");
            assert_eq!(mesh.index_count(), 6 * (n * n) as usize, "n = {n}");
            assert_eq!(mesh.triangle_count(), 2 * (n * n) as usize, "n = {n}");
        }
    }

    #[test]
    fn indices_stay_in_vertex_range() {
        for n in [1u32, 2, 5, 32] {
            let mesh = generate(n).unwrap();
            let count = mesh.vertex_count() as u32;
            assert!(mesh.indices().iter().all(|&i| i < count), "n = {n}");
        }
    }

    #[test]
    fn byte_views_match_element_sizes() {
        let mesh = generate(4).unwrap();
        assert_eq!(mesh.vertex_bytes().len(), mesh.vertex_count() * 12);
        assert_eq!(mesh.index_bytes().len(), mesh.index_count() * 4);
    }

    // ── positions ─────────────────────────────────────────────────────────

    #[test]
    fn corners_map_to_unit_square() {
        for n in [1u32, 2, 3, 9, 32] {
            let mesh = generate(n).unwrap();
            let p = mesh.positions();
            assert!(close(p[lattice(n, 0, 0) as usize], [-0.5, -0.5, 0.0]));
            assert!(close(p[lattice(n, 0, n) as usize], [0.5, -0.5, 0.0]));
            assert!(close(p[lattice(n, n, 0) as usize], [-0.5, 0.5, 0.0]));
            assert!(close(p[lattice(n, n, n) as usize], [0.5, 0.5, 0.0]));
        }
    }

    #[test]
    fn positions_are_row_major_and_planar() {
        let mesh = generate(4).unwrap();
        let p = mesh.positions();
        // Second vertex steps along x, vertex n+1 starts the next row.
        assert!(close(p[1], [-0.25, -0.5, 0.0]));
        assert!(close(p[5], [-0.5, -0.25, 0.0]));
        assert!(p.iter().all(|v| v[2] == 0.0));
    }

    // ── topology ──────────────────────────────────────────────────────────

    #[test]
    fn single_cell_triangles() {
        let mesh = generate(1).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.indices(), &[1, 2, 0, 1, 3, 2]);

        let mut used: Vec<u32> = mesh.indices().to_vec();
        used.sort_unstable();
        used.dedup();
        assert_eq!(used, vec![0, 1, 2, 3]);
    }

    #[test]
    fn single_cell_shares_one_edge() {
        let mesh = generate(1).unwrap();
        let idx = mesh.indices();
        let edges = |t: &[u32]| {
            let mut e = vec![
                (t[0].min(t[1]), t[0].max(t[1])),
                (t[1].min(t[2]), t[1].max(t[2])),
                (t[2].min(t[0]), t[2].max(t[0])),
            ];
            e.sort_unstable();
            e
        };
        let a = edges(&idx[0..3]);
        let b = edges(&idx[3..6]);
        let shared: Vec<_> = a.iter().filter(|e| b.contains(e)).collect();
        assert_eq!(shared, vec![&(1, 2)]);
    }

    #[test]
    fn every_cell_uses_the_fixed_triple_pattern() {
        let n = 3;
        let mesh = generate(n).unwrap();
        for (cell, tris) in mesh.indices().chunks(6).enumerate() {
            let row = cell as u32 / n;
            let col = cell as u32 % n;
            let start = lattice(n, row, col + 1);
            assert_eq!(
                tris,
                &[start, start + n, start - 1, start, start + n + 1, start + n]
            );
        }
    }

    #[test]
    fn generation_is_deterministic() {
        assert_eq!(generate(17).unwrap(), generate(17).unwrap());
    }

    // ── validation ────────────────────────────────────────────────────────

    #[test]
    fn zero_resolution_is_rejected() {
        assert!(matches!(generate(0), Err(GridError::InvalidArgument(_))));
    }

    #[test]
    fn oversized_resolution_is_rejected() {
        assert!(matches!(generate(u32::MAX), Err(GridError::InvalidArgument(_))));
        assert!(matches!(generate(65534), Err(GridError::InvalidArgument(_))));
        assert!(matches!(
            generate(MAX_RESOLUTION + 1),
            Err(GridError::InvalidArgument(_))
        ));
    }
}
