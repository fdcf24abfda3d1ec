//! Height-fill solver.
//!
//! For every corner the enabled layers are folded bottom to top through their
//! blend strategies, producing a composite height and one blend factor per
//! layer. Corner results are then averaged onto vertices by valence.

use bevy::log::{debug, warn};
use thiserror::Error;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::layer::{GlobalParams, Layer};
use crate::mask::resolve_corner;
use crate::topology::{Corner, Topology};

/// Fatal solve failures. No partial result is produced.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveError {
    #[error("mesh has no UV coordinates")]
    NoUvData,

    #[error("no enabled layer has a usable height map")]
    NoUsableLayers,
}

impl SolveError {
    /// Message a host should show when a solve fails.
    pub const HOST_MESSAGE: &'static str = "height solve failed — check UV and height maps";
}

/// Why a layer contributed less than configured.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Degradation {
    /// Enabled, but without a height map; its height is 0.
    MissingHeight,
    /// Enabled, but without a mask; it has no footprint.
    MissingMask,
    /// The mask had no entry for `missing` corners; those read as 0.
    SparseMask { missing: usize },
}

/// A non-fatal problem found on one layer during a solve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DegradedLayer {
    pub layer: usize,
    pub reason: Degradation,
}

/// Per-vertex output of a solve.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SolveResult {
    /// Scalar displacement per vertex, meant to be applied along the normal.
    pub displacement: Vec<f32>,

    /// Blend weight per layer per vertex, indexed `[layer][vertex]`.
    ///
    /// Disabled layers have an all-zero field.
    pub alphas: Vec<Vec<f32>>,

    /// Layers that were degraded rather than failing the solve.
    pub degraded: Vec<DegradedLayer>,
}

impl SolveResult {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.displacement.len()
    }

    #[inline]
    pub fn layer_count(&self) -> usize {
        self.alphas.len()
    }

    /// Alpha of every layer at one vertex.
    pub fn vertex_alphas(&self, vertex: usize) -> Vec<f32> {
        self.alphas
            .iter()
            .map(|field| field.get(vertex).copied().unwrap_or(0.0))
            .collect()
    }
}

/// Composite height and per-layer blend factors at one corner.
#[derive(Clone, Debug, PartialEq)]
pub struct CornerSample {
    pub height: f32,
    pub alphas: Vec<f32>,
}

/// Folds the layer stack at one corner.
///
/// The first enabled layer is the base: `height = h * m`, `alpha = m`. Every
/// later enabled layer runs through its blend strategy and records only its
/// own blend factor; earlier alphas are left as they were.
pub fn fold_corner(layers: &[Layer], corner_index: usize, corner: &Corner) -> CornerSample {
    let mut alphas = vec![0.0; layers.len()];
    let mut height = 0.0;
    let mut base_done = false;

    for (i, layer) in layers.iter().enumerate().filter(|(_, l)| l.enabled) {
        let h = layer.height_at(corner.uv);
        let m = resolve_corner(layer.mask.as_ref(), corner_index, corner.vertex);

        if !base_done {
            height = h * m;
            alphas[i] = m;
            base_done = true;
            continue;
        }

        let blended = layer.blend_mode.apply(height, h, m, &layer.blend_params());
        height = blended.height;
        alphas[i] = blended.factor;
    }

    CornerSample { height, alphas }
}

/// Computes per-vertex displacement and layer alphas for a mesh.
///
/// Fails with [`SolveError::NoUvData`] if no corner has a UV coordinate, and
/// with [`SolveError::NoUsableLayers`] if no enabled layer has a height map.
/// Vertices no corner references get zero displacement and zero alphas.
pub fn solve(
    topology: &Topology,
    layers: &[Layer],
    params: &GlobalParams,
) -> Result<SolveResult, SolveError> {
    if !topology.has_uvs() {
        return Err(SolveError::NoUvData);
    }
    if !layers.iter().any(Layer::is_usable) {
        return Err(SolveError::NoUsableLayers);
    }

    let degraded = diagnose(topology, layers);
    for d in &degraded {
        warn!(
            "Height fill: layer {} ('{}') degraded: {:?}",
            d.layer, layers[d.layer].name, d.reason
        );
    }

    let samples = fold_corners(topology, layers);
    let (displacement, alphas) = reduce_to_vertices(topology, layers.len(), &samples, params);

    debug!(
        "Height fill solved {} corners onto {} vertices with {} layers",
        samples.len(),
        topology.vertex_count(),
        layers.len()
    );

    Ok(SolveResult {
        displacement,
        alphas,
        degraded,
    })
}

#[cfg(feature = "parallel")]
fn fold_corners(topology: &Topology, layers: &[Layer]) -> Vec<CornerSample> {
    topology
        .corners()
        .par_iter()
        .enumerate()
        .map(|(i, corner)| fold_corner(layers, i, corner))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn fold_corners(topology: &Topology, layers: &[Layer]) -> Vec<CornerSample> {
    topology
        .corners()
        .iter()
        .enumerate()
        .map(|(i, corner)| fold_corner(layers, i, corner))
        .collect()
}

/// Sequential fold, kept for comparing against the parallel path.
#[cfg(all(test, feature = "parallel"))]
fn fold_corners_sequential(topology: &Topology, layers: &[Layer]) -> Vec<CornerSample> {
    topology
        .corners()
        .iter()
        .enumerate()
        .map(|(i, corner)| fold_corner(layers, i, corner))
        .collect()
}

/// Scatters corner samples onto vertices and averages by valence.
///
/// Accumulation runs in corner order so the result does not depend on how
/// the fold was scheduled.
fn reduce_to_vertices(
    topology: &Topology,
    layer_count: usize,
    samples: &[CornerSample],
    params: &GlobalParams,
) -> (Vec<f32>, Vec<Vec<f32>>) {
    let vertex_count = topology.vertex_count();
    let mut displacement = vec![0.0f32; vertex_count];
    let mut alphas = vec![vec![0.0f32; vertex_count]; layer_count];
    let mut valence = vec![0u32; vertex_count];

    for (corner, sample) in topology.corners().iter().zip(samples) {
        let v = corner.vertex;
        valence[v] += 1;
        displacement[v] += (sample.height - params.midlevel) * params.strength;
        for (field, &alpha) in alphas.iter_mut().zip(&sample.alphas) {
            field[v] += alpha;
        }
    }

    for (v, &count) in valence.iter().enumerate() {
        let d = count.max(1) as f32;
        displacement[v] /= d;
        for field in &mut alphas {
            field[v] /= d;
        }
    }

    (displacement, alphas)
}

/// Collects non-fatal layer problems for the diagnostic channel.
fn diagnose(topology: &Topology, layers: &[Layer]) -> Vec<DegradedLayer> {
    let mut degraded = Vec::new();

    for (i, layer) in layers.iter().enumerate().filter(|(_, l)| l.enabled) {
        if layer.height.is_none() {
            degraded.push(DegradedLayer {
                layer: i,
                reason: Degradation::MissingHeight,
            });
        }

        match &layer.mask {
            None => degraded.push(DegradedLayer {
                layer: i,
                reason: Degradation::MissingMask,
            }),
            Some(mask) => {
                let missing = topology
                    .corners()
                    .iter()
                    .enumerate()
                    .filter(|(ci, c)| mask.resolve(*ci, c.vertex).is_none())
                    .count();
                if missing > 0 {
                    degraded.push(DegradedLayer {
                        layer: i,
                        reason: Degradation::SparseMask { missing },
                    });
                }
            }
        }
    }

    degraded
}
