//! Writing solve results back onto a mesh.

use bevy::mesh::{Mesh, VertexAttributeValues};

use super::adapter::MeshAdapterError;
use super::attributes::{ATTRIBUTE_DISPLACEMENT, ATTRIBUTE_LAYER_IDS, ATTRIBUTE_LAYER_WEIGHTS};
use crate::preview::preview_weights;
use crate::solver::SolveResult;

/// Extension trait for storing height-fill results on a [`Mesh`].
///
/// The mesh must be the one the solve's topology was read from, so its
/// vertex order matches the result.
pub trait MeshHeightFillExt {
    /// Inserts displacement and preview layer weights as vertex attributes.
    ///
    /// # Panics
    /// Panics if the result's vertex count doesn't match the mesh.
    fn with_height_fill(self, result: &SolveResult) -> Self;

    /// Mutable version of [`with_height_fill`](Self::with_height_fill).
    fn insert_height_fill(&mut self, result: &SolveResult);

    /// Moves every position along its normal by the solved displacement.
    fn apply_displacement(&mut self, result: &SolveResult) -> Result<(), MeshAdapterError>;
}

impl MeshHeightFillExt for Mesh {
    fn with_height_fill(mut self, result: &SolveResult) -> Self {
        self.insert_height_fill(result);
        self
    }

    fn insert_height_fill(&mut self, result: &SolveResult) {
        let vertex_count = self.count_vertices();

        assert_eq!(
            result.vertex_count(),
            vertex_count,
            "Solve result length ({}) must match vertex count ({})",
            result.vertex_count(),
            vertex_count
        );

        let weights = preview_weights(result);
        let ids: Vec<u32> = weights.iter().map(|w| w.pack_ids()).collect();
        let packed: Vec<u32> = weights.iter().map(|w| w.pack_weights()).collect();

        self.insert_attribute(ATTRIBUTE_DISPLACEMENT, result.displacement.clone());
        self.insert_attribute(ATTRIBUTE_LAYER_IDS, ids);
        self.insert_attribute(ATTRIBUTE_LAYER_WEIGHTS, packed);
    }

    fn apply_displacement(&mut self, result: &SolveResult) -> Result<(), MeshAdapterError> {
        let normals = match self.attribute(Mesh::ATTRIBUTE_NORMAL) {
            Some(VertexAttributeValues::Float32x3(n)) => n.clone(),
            _ => return Err(MeshAdapterError::NoNormals),
        };
        let Some(VertexAttributeValues::Float32x3(positions)) =
            self.attribute_mut(Mesh::ATTRIBUTE_POSITION)
        else {
            return Err(MeshAdapterError::NoPositions);
        };

        if positions.len() != result.vertex_count() || normals.len() != positions.len() {
            return Err(MeshAdapterError::VertexCountMismatch {
                mesh: positions.len(),
                result: result.vertex_count(),
            });
        }

        for ((p, n), d) in positions.iter_mut().zip(&normals).zip(&result.displacement) {
            p[0] += n[0] * d;
            p[1] += n[1] * d;
            p[2] += n[2] * d;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::asset::RenderAssetUsages;
    use bevy::mesh::PrimitiveTopology;

    fn triangle() -> Mesh {
        Mesh::new(
            PrimitiveTopology::TriangleList,
            RenderAssetUsages::default(),
        )
        .with_inserted_attribute(
            Mesh::ATTRIBUTE_POSITION,
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]],
        )
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, vec![[0.0, 1.0, 0.0]; 3])
    }

    fn result() -> SolveResult {
        SolveResult {
            displacement: vec![0.5, -0.25, 0.0],
            alphas: vec![vec![1.0, 1.0, 0.0], vec![0.0, 1.0, 1.0]],
            degraded: Vec::new(),
        }
    }

    #[test]
    fn test_with_height_fill_inserts_attributes() {
        let mesh = triangle().with_height_fill(&result());

        assert!(mesh.attribute(ATTRIBUTE_DISPLACEMENT).is_some());
        let Some(VertexAttributeValues::Uint32(ids)) = mesh.attribute(ATTRIBUTE_LAYER_IDS) else {
            panic!("missing layer ids");
        };
        assert_eq!(ids[0], 0);
        assert_eq!(ids[2], 1);
        assert!(mesh.attribute(ATTRIBUTE_LAYER_WEIGHTS).is_some());
    }

    #[test]
    #[should_panic(expected = "must match vertex count")]
    fn test_with_height_fill_length_mismatch() {
        let mut r = result();
        r.displacement.pop();
        let _ = triangle().with_height_fill(&r);
    }

    #[test]
    fn test_apply_displacement() {
        let mut mesh = triangle();
        mesh.apply_displacement(&result()).unwrap();

        let Some(VertexAttributeValues::Float32x3(positions)) =
            mesh.attribute(Mesh::ATTRIBUTE_POSITION)
        else {
            panic!("missing positions");
        };
        assert_eq!(positions[0], [0.0, 0.5, 0.0]);
        assert_eq!(positions[1], [1.0, -0.25, 0.0]);
        assert_eq!(positions[2], [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_apply_displacement_needs_normals() {
        let mut mesh = Mesh::new(
            PrimitiveTopology::TriangleList,
            RenderAssetUsages::default(),
        )
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, vec![[0.0f32; 3]; 3]);
        assert_eq!(
            mesh.apply_displacement(&result()),
            Err(MeshAdapterError::NoNormals)
        );
    }
}
