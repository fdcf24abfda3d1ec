//! Building solver topology from a Bevy mesh.

use bevy::math::Vec2;
use bevy::mesh::{Mesh, PrimitiveTopology, VertexAttributeValues};
use thiserror::Error;

use crate::topology::{Topology, TopologyBuilder, TopologyError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshAdapterError {
    #[error("only triangle lists are supported, got {0:?}")]
    UnsupportedTopology(PrimitiveTopology),

    #[error("mesh has no positions")]
    NoPositions,

    #[error("index count {0} is not a multiple of 3")]
    PartialTriangle(usize),

    #[error("UV_0 must be Float32x2")]
    UnsupportedUvFormat,

    #[error("mesh has {positions} positions but {uvs} UVs")]
    UvCountMismatch { positions: usize, uvs: usize },

    #[error("mesh has no normals")]
    NoNormals,

    #[error("mesh has {mesh} vertices but the solve produced {result}")]
    VertexCountMismatch { mesh: usize, result: usize },

    #[error(transparent)]
    Topology(#[from] TopologyError),
}

impl Topology {
    /// Reads a `TriangleList` mesh, indexed or not.
    ///
    /// Every triangle becomes a face. Corner UVs come from
    /// [`Mesh::ATTRIBUTE_UV_0`]; a mesh without that attribute yields a
    /// topology with no UVs, which the solver rejects. A `UV_0` that is not
    /// `Float32x2`, or has fewer entries than positions, is an error.
    pub fn from_mesh(mesh: &Mesh) -> Result<Self, MeshAdapterError> {
        let topology = mesh.primitive_topology();
        if topology != PrimitiveTopology::TriangleList {
            return Err(MeshAdapterError::UnsupportedTopology(topology));
        }

        let vertex_count = match mesh.attribute(Mesh::ATTRIBUTE_POSITION) {
            Some(attr) => attr.len(),
            None => return Err(MeshAdapterError::NoPositions),
        };

        let uvs: Option<&[[f32; 2]]> = match mesh.attribute(Mesh::ATTRIBUTE_UV_0) {
            Some(VertexAttributeValues::Float32x2(uvs)) => Some(uvs.as_slice()),
            Some(_) => return Err(MeshAdapterError::UnsupportedUvFormat),
            None => None,
        };
        if let Some(uvs) = uvs
            && uvs.len() < vertex_count
        {
            return Err(MeshAdapterError::UvCountMismatch {
                positions: vertex_count,
                uvs: uvs.len(),
            });
        }

        let indices: Vec<usize> = match mesh.indices() {
            Some(indices) => indices.iter().collect(),
            None => (0..vertex_count).collect(),
        };
        if indices.len() % 3 != 0 {
            return Err(MeshAdapterError::PartialTriangle(indices.len()));
        }

        let mut builder = TopologyBuilder::new(vertex_count);
        for tri in indices.chunks_exact(3) {
            // Out-of-range indices are rejected by the builder
            let face_uvs = uvs.map(|uvs| {
                tri.iter()
                    .map(|&v| uvs.get(v).copied().map(Vec2::from).unwrap_or(Vec2::ZERO))
                    .collect()
            });
            builder.push_face(tri.to_vec(), face_uvs);
        }

        Ok(builder.build()?)
    }
}
