//! Compact per-vertex layer weights for preview shading.
//!
//! A solve yields one alpha field per layer, which is too wide for a vertex
//! attribute. Preview meshes keep the four strongest layers per vertex, with
//! weights normalized to sum to 255.

use crate::solver::SolveResult;

/// Alphas at or below this are treated as absent.
const WEIGHT_EPSILON: f32 = 1e-4;

/// Up to four layers and their blend weights at one vertex.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayerWeights {
    /// Layer indices, strongest first. Unused slots are 0.
    pub ids: [u8; 4],

    /// Weights per slot, summing to 255.
    pub weights: [u8; 4],
}

impl LayerWeights {
    /// Full weight on one layer.
    ///
    /// # Example
    /// ```
    /// use bevy_heightfill::preview::LayerWeights;
    ///
    /// let w = LayerWeights::single(2);
    /// assert_eq!(w.ids, [2, 0, 0, 0]);
    /// assert_eq!(w.weights, [255, 0, 0, 0]);
    /// ```
    #[inline]
    pub const fn single(layer: u8) -> Self {
        Self {
            ids: [layer, 0, 0, 0],
            weights: [255, 0, 0, 0],
        }
    }

    /// Keeps the four strongest layers of `alphas` and normalizes them.
    ///
    /// Falls back to `single(0)` when every alpha is negligible. Layers past
    /// index 255 are ignored.
    pub fn from_alphas(alphas: &[f32]) -> Self {
        let mut ranked: Vec<(u8, f32)> = alphas
            .iter()
            .take(u8::MAX as usize + 1)
            .enumerate()
            .filter(|&(_, &a)| a > WEIGHT_EPSILON)
            .map(|(i, &a)| (i as u8, a))
            .collect();

        // Stable sort keeps lower layers first on ties
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(4);

        let sum: f32 = ranked.iter().map(|(_, a)| a).sum();
        if ranked.is_empty() || sum < WEIGHT_EPSILON {
            return Self::single(0);
        }

        let mut ids = [0u8; 4];
        let mut weights = [0u8; 4];
        let mut running = 0u8;
        let last = ranked.len() - 1;

        for (slot, &(layer, alpha)) in ranked.iter().enumerate() {
            ids[slot] = layer;
            if slot == last {
                // Last used slot absorbs rounding error
                weights[slot] = 255 - running;
            } else {
                let w = ((alpha / sum) * 255.0).round() as u8;
                weights[slot] = w.min(255 - running);
                running += weights[slot];
            }
        }

        Self { ids, weights }
    }

    /// Layer ids packed little-endian into a `u32`.
    #[inline]
    pub const fn pack_ids(&self) -> u32 {
        u32::from_le_bytes(self.ids)
    }

    /// Weights packed little-endian into a `u32`.
    #[inline]
    pub const fn pack_weights(&self) -> u32 {
        u32::from_le_bytes(self.weights)
    }
}

/// Preview weights for every vertex of a solve.
pub fn preview_weights(result: &SolveResult) -> Vec<LayerWeights> {
    (0..result.vertex_count())
        .map(|v| LayerWeights::from_alphas(&result.vertex_alphas(v)))
        .collect()
}
