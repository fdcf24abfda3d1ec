//! # bevy_heightfill
//!
//! Multi-layer height-fill displacement for painted meshes.
//!
//! Artists stack layers, each carrying a height texture and a paint mask.
//! For every point on the mesh the solver decides how much each layer
//! contributes to the final surface height and which layer shows through.
//!
//! ## Features
//!
//! - Wrapped bilinear height sampling with luminance for color images
//! - Per-corner or per-vertex paint masks with corner-to-vertex fallback
//! - Three blend modes: simple mask lerp, height blend, and switch
//! - Per-vertex displacement plus one blend-weight field per layer
//! - Parallel per-corner fold (`parallel` feature, on by default)
//! - Bevy mesh/image adapters, mask packing, and per-face layer assignment
//!
//! ## Quick Start
//!
//! ```
//! use bevy::math::Vec2;
//! use bevy_heightfill::prelude::*;
//!
//! let topology = TopologyBuilder::new(3)
//!     .with_face([(0, Vec2::ZERO), (1, Vec2::X), (2, Vec2::Y)])
//!     .build()
//!     .unwrap();
//!
//! let layers = vec![
//!     Layer::new("ground")
//!         .with_height(Sampler::constant(0.7))
//!         .with_mask(MaskRef::filled(MaskDomain::Vertex, 3, 1.0)),
//! ];
//!
//! let params = GlobalParams::default().with_strength(2.0).with_midlevel(0.5);
//! let result = solve(&topology, &layers, &params).unwrap();
//! assert!((result.displacement[0] - 0.4).abs() < 1e-6);
//! ```
//!
//! The solve is a pure function of its inputs and keeps no cache. Re-run it
//! after any mask stroke, layer edit, or reorder.

pub mod assign;
pub mod blend;
pub mod layer;
pub mod mask;
pub mod mesh;
pub mod pack;
pub mod preview;
pub mod sampler;
pub mod solver;
pub mod topology;
pub mod validation;

pub mod prelude {
    pub use crate::assign::assign_faces;
    pub use crate::blend::{BlendMode, BlendParams};
    pub use crate::layer::{ColorChannel, GlobalParams, Layer, LayerStack};
    pub use crate::mask::{MaskDomain, MaskRef, MaskSource};
    pub use crate::mesh::{
        ATTRIBUTE_DISPLACEMENT, ATTRIBUTE_LAYER_IDS, ATTRIBUTE_LAYER_WEIGHTS, MeshHeightFillExt,
    };
    pub use crate::pack::{PackedColor, pack_masks};
    pub use crate::preview::{LayerWeights, preview_weights};
    pub use crate::sampler::Sampler;
    pub use crate::solver::{DegradedLayer, Degradation, SolveError, SolveResult, solve};
    pub use crate::topology::{Topology, TopologyBuilder};
    pub use crate::validation::{Severity, ValidationMessage, validate};
}
