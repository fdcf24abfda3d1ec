//! Read-only mesh topology: faces made of corners with optional UVs.

use std::ops::Range;

use bevy::math::Vec2;
use thiserror::Error;

/// Errors raised while assembling a [`Topology`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    #[error("face {face} references vertex {vertex}, but the mesh has {vertex_count} vertices")]
    VertexOutOfRange {
        face: usize,
        vertex: usize,
        vertex_count: usize,
    },

    #[error("face {face} has {corners} corners but {uvs} UV coordinates")]
    UvCountMismatch {
        face: usize,
        corners: usize,
        uvs: usize,
    },
}

/// A face-vertex pair, the finer of the two mask domains.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Corner {
    pub face: usize,
    pub vertex: usize,
    /// `None` when the face was added without UV coordinates.
    pub uv: Option<Vec2>,
}

/// Mesh connectivity as consumed by the solver.
///
/// Corners are stored face by face, so a corner's index is its position in
/// [`Topology::corners`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Topology {
    vertex_count: usize,
    corners: Vec<Corner>,
    faces: Vec<Range<usize>>,
}

impl Topology {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    #[inline]
    pub fn corners(&self) -> &[Corner] {
        &self.corners
    }

    /// Corners of a single face.
    pub fn face(&self, face: usize) -> Option<&[Corner]> {
        self.faces.get(face).map(|r| &self.corners[r.clone()])
    }

    /// Iterates faces as corner slices, in face order.
    pub fn faces(&self) -> impl Iterator<Item = &[Corner]> + '_ {
        self.faces.iter().map(|r| &self.corners[r.clone()])
    }

    /// Whether any corner carries a UV coordinate.
    pub fn has_uvs(&self) -> bool {
        self.corners.iter().any(|c| c.uv.is_some())
    }

    /// Number of corners referencing each vertex.
    pub fn valence(&self) -> Vec<u32> {
        let mut valence = vec![0u32; self.vertex_count];
        for corner in &self.corners {
            valence[corner.vertex] += 1;
        }
        valence
    }
}

struct PendingFace {
    vertices: Vec<usize>,
    uvs: Option<Vec<Vec2>>,
}

/// Builder for [`Topology`].
///
/// # Example
/// ```
/// use bevy::math::Vec2;
/// use bevy_heightfill::topology::TopologyBuilder;
///
/// let topology = TopologyBuilder::new(3)
///     .with_face([(0, Vec2::ZERO), (1, Vec2::X), (2, Vec2::Y)])
///     .build()
///     .unwrap();
/// assert_eq!(topology.corners().len(), 3);
/// ```
pub struct TopologyBuilder {
    vertex_count: usize,
    faces: Vec<PendingFace>,
}

impl TopologyBuilder {
    pub fn new(vertex_count: usize) -> Self {
        Self {
            vertex_count,
            faces: Vec::new(),
        }
    }

    /// Adds a face from `(vertex, uv)` corners.
    pub fn with_face(mut self, corners: impl IntoIterator<Item = (usize, Vec2)>) -> Self {
        let (vertices, uvs): (Vec<usize>, Vec<Vec2>) = corners.into_iter().unzip();
        self.push_face(vertices, Some(uvs));
        self
    }

    /// Adds a face whose corners have no UV coordinates.
    pub fn with_untextured_face(mut self, vertices: impl IntoIterator<Item = usize>) -> Self {
        self.push_face(vertices.into_iter().collect(), None);
        self
    }

    /// Adds a face (mutable version for loops).
    pub fn push_face(&mut self, vertices: Vec<usize>, uvs: Option<Vec<Vec2>>) {
        self.faces.push(PendingFace { vertices, uvs });
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Validates vertex indices and UV counts and builds the topology.
    pub fn build(self) -> Result<Topology, TopologyError> {
        let corner_count = self.faces.iter().map(|f| f.vertices.len()).sum();
        let mut corners = Vec::with_capacity(corner_count);
        let mut faces = Vec::with_capacity(self.faces.len());

        for (face, pending) in self.faces.into_iter().enumerate() {
            if let Some(uvs) = &pending.uvs {
                if uvs.len() != pending.vertices.len() {
                    return Err(TopologyError::UvCountMismatch {
                        face,
                        corners: pending.vertices.len(),
                        uvs: uvs.len(),
                    });
                }
            }

            let start = corners.len();
            for (i, &vertex) in pending.vertices.iter().enumerate() {
                if vertex >= self.vertex_count {
                    return Err(TopologyError::VertexOutOfRange {
                        face,
                        vertex,
                        vertex_count: self.vertex_count,
                    });
                }
                corners.push(Corner {
                    face,
                    vertex,
                    uv: pending.uvs.as_ref().map(|uvs| uvs[i]),
                });
            }
            faces.push(start..corners.len());
        }

        Ok(Topology {
            vertex_count: self.vertex_count,
            corners,
            faces,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_pair() -> Topology {
        // Two triangles sharing the edge 1-2
        TopologyBuilder::new(4)
            .with_face([(0, Vec2::ZERO), (1, Vec2::X), (2, Vec2::Y)])
            .with_face([(1, Vec2::X), (3, Vec2::ONE), (2, Vec2::Y)])
            .build()
            .unwrap()
    }

    #[test]
    fn test_corners_are_face_ordered() {
        let t = quad_pair();
        assert_eq!(t.face_count(), 2);
        assert_eq!(t.corners().len(), 6);
        let second: Vec<_> = t.face(1).unwrap().iter().map(|c| c.vertex).collect();
        assert_eq!(second, vec![1, 3, 2]);
        assert!(t.faces().all(|f| f.len() == 3));
        assert!(t.face(2).is_none());
    }

    #[test]
    fn test_valence() {
        assert_eq!(quad_pair().valence(), vec![1, 2, 2, 1]);

        let sparse = TopologyBuilder::new(5)
            .with_untextured_face([0, 1, 2])
            .build()
            .unwrap();
        assert_eq!(sparse.valence(), vec![1, 1, 1, 0, 0]);
    }

    #[test]
    fn test_uv_presence() {
        assert!(quad_pair().has_uvs());
        let bare = TopologyBuilder::new(3)
            .with_untextured_face([0, 1, 2])
            .build()
            .unwrap();
        assert!(!bare.has_uvs());
        assert_eq!(bare.corners()[0].uv, None);
    }

    #[test]
    fn test_vertex_out_of_range() {
        let err = TopologyBuilder::new(2)
            .with_untextured_face([0, 1, 2])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            TopologyError::VertexOutOfRange {
                face: 0,
                vertex: 2,
                vertex_count: 2
            }
        );
    }

    #[test]
    fn test_uv_count_mismatch() {
        let mut builder = TopologyBuilder::new(3);
        builder.push_face(vec![0, 1, 2], Some(vec![Vec2::ZERO]));
        assert!(matches!(
            builder.build(),
            Err(TopologyError::UvCountMismatch {
                face: 0,
                corners: 3,
                uvs: 1
            })
        ));
    }
}
