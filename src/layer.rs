//! Layer stack and global solve parameters.

use bevy::image::Image;
use bevy::log::warn;
use bevy::prelude::*;

use crate::blend::{BlendMode, BlendParams};
use crate::mask::MaskRef;
use crate::sampler::Sampler;

/// Smallest tiling factor used when scaling UVs.
pub const MIN_TILING: f32 = 1e-8;

/// Vertex-color channel a layer's mask is packed into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorChannel {
    R,
    G,
    B,
    A,
}

impl ColorChannel {
    pub const ALL: [ColorChannel; 4] = [Self::R, Self::G, Self::B, Self::A];

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Self::R => 0,
            Self::G => 1,
            Self::B => 2,
            Self::A => 3,
        }
    }
}

/// One material in the stack: a height map gated by a paint mask.
///
/// Index 0 of a stack is the bottom layer.
#[derive(Clone, Debug)]
pub struct Layer {
    /// Display name for diagnostics.
    pub name: String,

    /// Disabled layers are skipped by the solver entirely.
    pub enabled: bool,

    /// Height texture. `None` contributes height 0.
    pub height: Option<Sampler>,

    /// Paint mask. `None` gives the layer no footprint.
    pub mask: Option<MaskRef>,

    /// UV scale applied before sampling.
    ///
    /// Default: 1.0
    pub tiling: f32,

    /// Multiplier applied to the sampled height.
    ///
    /// Default: 1.0
    pub strength: f32,

    /// Offset added after `strength`.
    ///
    /// Default: 0.0
    pub bias: f32,

    pub blend_mode: BlendMode,

    /// Margin for [`BlendMode::HeightBlend`], in `[0, 1]`.
    ///
    /// Default: 0.5
    pub height_offset: f32,

    /// Opacity for [`BlendMode::Switch`], in `[0, 1]`.
    ///
    /// Default: 1.0
    pub switch_opacity: f32,

    /// Channel this layer's mask is packed into, if any.
    pub pack_channel: Option<ColorChannel>,
}

impl Default for Layer {
    fn default() -> Self {
        Self {
            name: String::new(),
            enabled: true,
            height: None,
            mask: None,
            tiling: 1.0,
            strength: 1.0,
            bias: 0.0,
            blend_mode: BlendMode::Simple,
            height_offset: 0.5,
            switch_opacity: 1.0,
            pack_channel: None,
        }
    }
}

impl Layer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_height(mut self, sampler: Sampler) -> Self {
        self.height = Some(sampler);
        self
    }

    /// Sets the height map from raw pixels.
    ///
    /// A degenerate image is logged and leaves the layer without a height map.
    pub fn with_height_pixels(
        mut self,
        width: u32,
        height: u32,
        channels: u32,
        pixels: Vec<f32>,
    ) -> Self {
        self.height = match Sampler::new(width, height, channels, pixels) {
            Ok(sampler) => Some(sampler),
            Err(e) => {
                warn!("Layer '{}': height map ignored: {}", self.name, e);
                None
            }
        };
        self
    }

    /// Sets the height map from a CPU-side Bevy image.
    ///
    /// Unsupported or degenerate images are logged the same way as
    /// [`Layer::with_height_pixels`].
    pub fn with_height_image(mut self, image: &Image) -> Self {
        self.height = match Sampler::from_image(image) {
            Ok(sampler) => Some(sampler),
            Err(e) => {
                warn!("Layer '{}': height map ignored: {}", self.name, e);
                None
            }
        };
        self
    }

    pub fn with_mask(mut self, mask: MaskRef) -> Self {
        self.mask = Some(mask);
        self
    }

    pub fn with_tiling(mut self, tiling: f32) -> Self {
        self.tiling = tiling;
        self
    }

    pub fn with_strength(mut self, strength: f32) -> Self {
        self.strength = strength;
        self
    }

    pub fn with_bias(mut self, bias: f32) -> Self {
        self.bias = bias;
        self
    }

    pub fn with_blend_mode(mut self, mode: BlendMode) -> Self {
        self.blend_mode = mode;
        self
    }

    /// Switches to [`BlendMode::HeightBlend`] with the given margin.
    pub fn with_height_blend(mut self, height_offset: f32) -> Self {
        self.blend_mode = BlendMode::HeightBlend;
        self.height_offset = height_offset;
        self
    }

    /// Switches to [`BlendMode::Switch`] with the given opacity.
    pub fn with_switch(mut self, opacity: f32) -> Self {
        self.blend_mode = BlendMode::Switch;
        self.switch_opacity = opacity;
        self
    }

    pub fn with_pack_channel(mut self, channel: ColorChannel) -> Self {
        self.pack_channel = Some(channel);
        self
    }

    #[inline]
    pub fn blend_params(&self) -> BlendParams {
        BlendParams {
            height_offset: self.height_offset,
            switch_opacity: self.switch_opacity,
        }
    }

    /// Tiling clamped away from zero.
    #[inline]
    pub fn effective_tiling(&self) -> f32 {
        self.tiling.max(MIN_TILING)
    }

    /// Height of this layer at `uv`, after tiling, strength and bias.
    ///
    /// Layers without a height map return 0.
    #[inline]
    pub fn height_at(&self, uv: Option<Vec2>) -> f32 {
        let Some(sampler) = &self.height else {
            return 0.0;
        };
        let sampled = match uv {
            Some(uv) => {
                let uv = uv * self.effective_tiling();
                sampler.sample(uv.x, uv.y)
            }
            None => 0.0,
        };
        sampled * self.strength + self.bias
    }

    /// Whether the solver can draw height from this layer.
    #[inline]
    pub fn is_usable(&self) -> bool {
        self.enabled && self.height.is_some()
    }
}

/// Displacement parameters shared by every layer.
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct GlobalParams {
    /// Scale applied to the composite height after removing `midlevel`.
    ///
    /// Default: 0.1
    pub strength: f32,

    /// Composite height that maps to zero displacement, in `[0, 1]`.
    ///
    /// Default: 0.5
    pub midlevel: f32,

    /// Minimum face alpha for a layer to claim the face.
    ///
    /// Default: 0.05
    pub assign_threshold: f32,
}

impl Default for GlobalParams {
    fn default() -> Self {
        Self {
            strength: 0.1,
            midlevel: 0.5,
            assign_threshold: 0.05,
        }
    }
}

impl GlobalParams {
    pub fn with_strength(mut self, strength: f32) -> Self {
        self.strength = strength;
        self
    }

    pub fn with_midlevel(mut self, midlevel: f32) -> Self {
        self.midlevel = midlevel;
        self
    }

    pub fn with_assign_threshold(mut self, threshold: f32) -> Self {
        self.assign_threshold = threshold;
        self
    }
}

/// An ordered layer stack attached to a mesh entity.
///
/// Editing the stack does not re-run the solve; callers do that.
#[derive(Component, Clone, Debug, Default)]
pub struct LayerStack {
    pub layers: Vec<Layer>,
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn push(&mut self, layer: Layer) -> usize {
        self.layers.push(layer);
        self.layers.len() - 1
    }

    pub fn remove(&mut self, index: usize) -> Option<Layer> {
        (index < self.layers.len()).then(|| self.layers.remove(index))
    }

    /// Moves a layer one step toward the top. Returns its new index.
    pub fn move_up(&mut self, index: usize) -> Option<usize> {
        if index + 1 >= self.layers.len() {
            return None;
        }
        self.layers.swap(index, index + 1);
        Some(index + 1)
    }

    /// Moves a layer one step toward the bottom. Returns its new index.
    pub fn move_down(&mut self, index: usize) -> Option<usize> {
        if index == 0 || index >= self.layers.len() {
            return None;
        }
        self.layers.swap(index, index - 1);
        Some(index - 1)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl std::ops::Deref for LayerStack {
    type Target = [Layer];

    fn deref(&self) -> &[Layer] {
        &self.layers
    }
}
