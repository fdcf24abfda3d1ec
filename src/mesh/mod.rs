//! Bevy [`Mesh`](bevy::mesh::Mesh) integration.
//!
//! Reading: [`Topology::from_mesh`](crate::topology::Topology::from_mesh)
//! turns a triangle mesh into solver input.
//! Writing: [`MeshHeightFillExt`] stores a solve result on the mesh as vertex
//! attributes, and can displace positions along normals.

mod adapter;
mod attributes;
mod extension;

pub use adapter::MeshAdapterError;
pub use attributes::{ATTRIBUTE_DISPLACEMENT, ATTRIBUTE_LAYER_IDS, ATTRIBUTE_LAYER_WEIGHTS};
pub use extension::MeshHeightFillExt;
