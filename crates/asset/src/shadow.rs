//! Shadow volumes for directional lights.
//!
//! A [`ShadowVolume`] keeps welded triangles plus their edge adjacency.
//! [`ShadowVolume::extrude`] turns it into a closed triangle soup for a given
//! light direction: faces pointing away from the light form the near cap, the
//! same faces pushed along the light form the far cap, and silhouette edges
//! become side quads. All triangles wind counter-clockwise seen from outside
//! the volume, which is what a depth-fail stencil pass expects.

use std::collections::HashMap;

use glam::Vec3;

use crate::obj::PlainMesh;

/// One face's view of an edge: the face index and the edge's direction in
/// that face's winding.
#[derive(Clone, Copy, Debug, PartialEq)]
struct EdgeSide {
    face: u32,
    from: u32,
    to: u32,
}

#[derive(Clone, Debug, PartialEq)]
struct Edge {
    sides: Vec<EdgeSide>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShadowVolume {
    positions: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
    edges: Vec<Edge>,
}

impl ShadowVolume {
    pub fn from_plain(mesh: &PlainMesh) -> Self {
        let positions: Vec<Vec3> = mesh.positions.iter().copied().map(Vec3::from).collect();
        let triangles: Vec<[u32; 3]> = mesh
            .indices
            .chunks_exact(3)
            .map(|t| [t[0], t[1], t[2]])
            .collect();

        let mut lookup: HashMap<(u32, u32), usize> = HashMap::new();
        let mut edges: Vec<Edge> = Vec::new();
        for (face, tri) in triangles.iter().enumerate() {
            for k in 0..3 {
                let (from, to) = (tri[k], tri[(k + 1) % 3]);
                if from == to {
                    continue;
                }
                let key = (from.min(to), from.max(to));
                let slot = *lookup.entry(key).or_insert_with(|| {
                    edges.push(Edge { sides: Vec::new() });
                    edges.len() - 1
                });
                edges[slot].sides.push(EdgeSide {
                    face: face as u32,
                    from,
                    to,
                });
            }
        }

        let open = edges.iter().filter(|e| e.sides.len() == 1).count();
        if open > 0 {
            log::debug!("Shadow volume has {} open edges", open);
        }

        Self {
            positions,
            triangles,
            edges,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Welded caster positions.
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Closed volume for light travelling along `light_dir`, extruded by
    /// `distance`. Returns a flat triangle list.
    pub fn extrude(&self, light_dir: Vec3, distance: f32) -> Vec<[f32; 3]> {
        let light = light_dir.normalize_or_zero();
        if light == Vec3::ZERO {
            return Vec::new();
        }
        let offset = light * distance;
        let far = |i: u32| self.positions[i as usize] + offset;
        let near = |i: u32| self.positions[i as usize];

        let dark: Vec<bool> = self
            .triangles
            .iter()
            .map(|&[a, b, c]| {
                let n = (near(b) - near(a)).cross(near(c) - near(a));
                n.dot(light) > 0.0
            })
            .collect();

        let mut out: Vec<[f32; 3]> = Vec::new();
        let mut push = |tri: [Vec3; 3]| out.extend(tri.map(|v| v.to_array()));

        for (tri, _) in self.triangles.iter().zip(&dark).filter(|(_, d)| **d) {
            let [a, b, c] = *tri;
            push([near(a), near(c), near(b)]);
            push([far(a), far(b), far(c)]);
        }

        for edge in &self.edges {
            let dark_side = match edge.sides.as_slice() {
                [only] => dark[only.face as usize].then_some(*only),
                [first, second, ..] => {
                    match (dark[first.face as usize], dark[second.face as usize]) {
                        (true, false) => Some(*first),
                        (false, true) => Some(*second),
                        _ => None,
                    }
                }
                [] => None,
            };
            // Near cap reverses the dark face, so the edge runs `to -> from`.
            if let Some(side) = dark_side {
                let (p, q) = (side.to, side.from);
                push([near(p), far(p), far(q)]);
                push([near(p), far(q), near(q)]);
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Axis-aligned unit cube with outward CCW faces.
    fn cube() -> PlainMesh {
        let positions = vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 1.0],
            [1.0, 1.0, 1.0],
            [0.0, 1.0, 1.0],
        ];
        #[rustfmt::skip]
        let indices = vec![
            0, 2, 1, 0, 3, 2, // bottom (-Z)
            4, 5, 6, 4, 6, 7, // top (+Z)
            0, 1, 5, 0, 5, 4, // front (-Y)
            2, 3, 7, 2, 7, 6, // back (+Y)
            0, 4, 7, 0, 7, 3, // left (-X)
            1, 2, 6, 1, 6, 5, // right (+X)
        ];
        PlainMesh { positions, indices }
    }

    fn signed_volume(soup: &[[f32; 3]]) -> f32 {
        soup.chunks_exact(3)
            .map(|t| {
                let [a, b, c] = [t[0], t[1], t[2]].map(Vec3::from);
                a.dot(b.cross(c)) / 6.0
            })
            .sum()
    }

    #[test]
    fn closed_cube_has_full_adjacency() {
        let volume = ShadowVolume::from_plain(&cube());
        assert_eq!(volume.triangle_count(), 12);
        assert_eq!(volume.edges.len(), 18);
        assert!(volume.edges.iter().all(|e| e.sides.len() == 2));
    }

    #[test]
    fn extruded_cube_is_closed_and_outward() {
        let volume = ShadowVolume::from_plain(&cube());
        let soup = volume.extrude(Vec3::new(0.0, 0.0, -1.0), 10.0);
        // Two bottom triangles per cap, four silhouette edges with two triangles each.
        assert_eq!(soup.len(), (2 + 2 + 8) * 3);
        // Bottom cap swept 10 units down: a 1 x 1 x 10 box.
        assert!((signed_volume(&soup) - 10.0).abs() < 1e-3);
    }

    #[test]
    fn oblique_light_still_gives_positive_volume() {
        let volume = ShadowVolume::from_plain(&cube());
        let soup = volume.extrude(Vec3::new(1.0, 0.5, -2.0), 5.0);
        assert!(signed_volume(&soup) > 0.0);
    }

    #[test]
    fn single_triangle_uses_open_edges() {
        let mesh = PlainMesh {
            positions: vec![[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]],
            indices: vec![0, 1, 2],
        };
        let volume = ShadowVolume::from_plain(&mesh);
        // Normal points down, away from a light shining down.
        let soup = volume.extrude(Vec3::NEG_Z, 2.0);
        assert_eq!(soup.len(), (1 + 1 + 6) * 3);
        assert!((signed_volume(&soup) - 1.0).abs() < 1e-4);

        // Facing the light: nothing is dark, no volume.
        assert!(volume.extrude(Vec3::Z, 2.0).is_empty());
    }

    #[test]
    fn zero_direction_yields_nothing() {
        let volume = ShadowVolume::from_plain(&cube());
        assert!(volume.extrude(Vec3::ZERO, 1.0).is_empty());
    }
}
