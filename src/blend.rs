//! Layer blend strategies.
//!
//! Every strategy derives a blend factor from a layer's height and mask and
//! then lerps the running composite toward the layer height:
//! `new = current * (1 - factor) + layer_height * factor`.
//! A layer whose mask is `<= 0` never changes the composite.

/// How a layer is combined with the composite below it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlendMode {
    /// Mask-driven lerp; heights do not affect the mix ratio.
    #[default]
    Simple,
    /// Height-aware blend: the layer shows where it rises above the composite.
    HeightBlend,
    /// Mask times a per-layer opacity dial.
    Switch,
}

/// Mode parameters a blend strategy may read.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlendParams {
    /// Height-blend margin in `[0, 1]`. 0 never shows, 1 always shows.
    pub height_offset: f32,
    /// Switch-mode opacity in `[0, 1]`.
    pub switch_opacity: f32,
}

impl Default for BlendParams {
    fn default() -> Self {
        Self {
            height_offset: 0.5,
            switch_opacity: 1.0,
        }
    }
}

/// Result of blending one layer onto the composite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Blended {
    pub height: f32,
    pub factor: f32,
}

impl BlendMode {
    /// Blends `layer_height` (gated by `layer_mask`) onto `current`.
    pub fn apply(
        self,
        current: f32,
        layer_height: f32,
        layer_mask: f32,
        params: &BlendParams,
    ) -> Blended {
        if layer_mask <= 0.0 {
            return Blended {
                height: current,
                factor: 0.0,
            };
        }

        let factor = match self {
            Self::Simple => simple_factor(layer_mask),
            Self::HeightBlend => {
                height_blend_factor(current, layer_height, layer_mask, params.height_offset)
            }
            Self::Switch => switch_factor(layer_mask, params.switch_opacity),
        };

        Blended {
            height: current * (1.0 - factor) + layer_height * factor,
            factor,
        }
    }
}

#[inline]
fn simple_factor(mask: f32) -> f32 {
    mask.clamp(0.0, 1.0)
}

fn height_blend_factor(current: f32, layer_height: f32, mask: f32, height_offset: f32) -> f32 {
    let normalized = (layer_height - current + 1.0) * 0.5;

    let mut raw = if height_offset <= 0.0 {
        0.0
    } else if height_offset >= 1.0 {
        1.0
    } else {
        ((normalized - (1.0 - height_offset)) / height_offset).clamp(0.0, 1.0)
    };

    if raw > 0.0 && raw < 1.0 {
        raw = raw * raw * (3.0 - 2.0 * raw);
    }

    raw * mask
}

#[inline]
fn switch_factor(mask: f32, opacity: f32) -> f32 {
    (opacity * mask).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-6;

    fn params(height_offset: f32, switch_opacity: f32) -> BlendParams {
        BlendParams {
            height_offset,
            switch_opacity,
        }
    }

    #[test]
    fn test_zero_mask_never_changes_composite() {
        let p = params(1.0, 1.0);
        for mode in [BlendMode::Simple, BlendMode::HeightBlend, BlendMode::Switch] {
            for &(h, h2) in &[(0.0, 1.0), (0.3, -2.0), (0.8, 0.8)] {
                let out = mode.apply(h, h2, 0.0, &p);
                assert_eq!(
                    out,
                    Blended {
                        height: h,
                        factor: 0.0
                    },
                    "{mode:?}"
                );
                let out = mode.apply(h, h2, -0.5, &p);
                assert_eq!(out.factor, 0.0);
            }
        }
    }

    #[test]
    fn test_simple_full_mask_overrides() {
        let out = BlendMode::Simple.apply(0.3, 0.8, 1.0, &BlendParams::default());
        assert_eq!(
            out,
            Blended {
                height: 0.8,
                factor: 1.0
            }
        );
    }

    #[test]
    fn test_simple_partial_mask_lerps() {
        let out = BlendMode::Simple.apply(0.0, 1.0, 0.25, &BlendParams::default());
        assert!((out.height - 0.25).abs() < EPS);
        assert_eq!(out.factor, 0.25);

        let out = BlendMode::Simple.apply(0.0, 1.0, 3.0, &BlendParams::default());
        assert_eq!(out.factor, 1.0);
    }

    #[test]
    fn test_height_blend_offset_bounds() {
        for &(h, h2, m) in &[(0.2, 0.9, 1.0), (0.9, 0.1, 0.5), (0.5, 0.5, 0.3)] {
            let none = BlendMode::HeightBlend.apply(h, h2, m, &params(0.0, 1.0));
            assert_eq!(none.factor, 0.0);
            assert_eq!(none.height, h);

            let all = BlendMode::HeightBlend.apply(h, h2, m, &params(1.0, 1.0));
            assert_eq!(all.factor, m);
        }
    }

    #[test]
    fn test_height_blend_smoothstep() {
        // diff = 0 -> normalized 0.5; offset 0.75 -> raw = (0.5 - 0.25) / 0.75 = 1/3
        let raw: f32 = 1.0 / 3.0;
        let expected = raw * raw * (3.0 - 2.0 * raw);
        let out = BlendMode::HeightBlend.apply(0.4, 0.4, 1.0, &params(0.75, 1.0));
        assert!((out.factor - expected).abs() < EPS);
        assert!((out.height - 0.4).abs() < EPS);
    }

    #[test]
    fn test_height_blend_higher_layer_pokes_through() {
        let p = params(0.6, 1.0);
        let low = BlendMode::HeightBlend.apply(0.2, -0.2, 1.0, &p);
        let high = BlendMode::HeightBlend.apply(0.2, 1.0, 1.0, &p);
        assert_eq!(low.factor, 0.0);
        assert!(high.factor > 0.9);
    }

    #[test]
    fn test_switch_is_opacity_times_mask() {
        for &(opacity, mask) in &[(0.5, 0.5), (1.0, 0.3), (0.0, 1.0), (2.0, 0.8)] {
            let out = BlendMode::Switch.apply(0.1, 0.9, mask, &params(0.5, opacity));
            assert_eq!(out.factor, (opacity * mask).clamp(0.0, 1.0));
        }
    }
}
