//! Per-face dominant layer assignment from solved alphas.

use crate::layer::Layer;
use crate::solver::SolveResult;
use crate::topology::Topology;

/// Average alpha of `layer` over the vertices of `face`.
pub fn face_alpha(topology: &Topology, result: &SolveResult, layer: usize, face: usize) -> f32 {
    let (Some(corners), Some(field)) = (topology.face(face), result.alphas.get(layer)) else {
        return 0.0;
    };
    let sum: f32 = corners
        .iter()
        .map(|c| field.get(c.vertex).copied().unwrap_or(0.0))
        .sum();
    sum / corners.len().max(1) as f32
}

/// Picks the strongest layer for every face.
///
/// Only enabled layers with a height map compete. A face goes to the layer
/// with the highest average alpha if that average reaches `threshold`;
/// otherwise it is left unassigned. Ties keep the lower layer.
pub fn assign_faces(
    topology: &Topology,
    result: &SolveResult,
    layers: &[Layer],
    threshold: f32,
) -> Vec<Option<usize>> {
    let candidates: Vec<usize> = layers
        .iter()
        .enumerate()
        .filter(|(_, l)| l.is_usable())
        .map(|(i, _)| i)
        .collect();

    (0..topology.face_count())
        .map(|face| {
            let mut best: Option<(usize, f32)> = None;
            for &layer in &candidates {
                let alpha = face_alpha(topology, result, layer, face);
                if alpha > best.map_or(0.0, |(_, a)| a) {
                    best = Some((layer, alpha));
                }
            }
            best.filter(|&(_, a)| a >= threshold).map(|(layer, _)| layer)
        })
        .collect()
}
