//! Custom vertex attributes written from a height-fill solve.

use bevy::mesh::MeshVertexAttribute;
use bevy::render::render_resource::VertexFormat;

/// Scalar displacement per vertex, to be applied along the vertex normal.
///
/// This is `SolveResult::displacement` verbatim.
pub const ATTRIBUTE_DISPLACEMENT: MeshVertexAttribute =
    MeshVertexAttribute::new("HeightFillDisplacement", 611093240, VertexFormat::Float32);

/// Up to 4 layer indices packed as `[u8; 4]` into a `u32`, strongest first.
///
/// # Example
/// ```ignore
/// // Vertex showing layers 0, 3 and 7
/// let ids: u32 = 0 | (3 << 8) | (7 << 16) | (0 << 24);
/// ```
pub const ATTRIBUTE_LAYER_IDS: MeshVertexAttribute =
    MeshVertexAttribute::new("HeightFillLayerIds", 611093241, VertexFormat::Uint32);

/// Blend weights for the layers in [`ATTRIBUTE_LAYER_IDS`], packed as `[u8; 4]`.
///
/// Weights sum to 255.
pub const ATTRIBUTE_LAYER_WEIGHTS: MeshVertexAttribute =
    MeshVertexAttribute::new("HeightFillLayerWeights", 611093242, VertexFormat::Uint32);
