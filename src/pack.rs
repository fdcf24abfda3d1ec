//! Packing layer masks into a single per-corner RGBA color.

use bytemuck::{Pod, Zeroable};

use crate::layer::{ColorChannel, Layer};
use crate::mask::{MaskRef, resolve_corner};
use crate::topology::Topology;

/// One packed corner color, laid out for direct GPU upload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct PackedColor {
    pub rgba: [f32; 4],
}

impl PackedColor {
    #[inline]
    pub fn channel(&self, channel: ColorChannel) -> f32 {
        self.rgba[channel.index()]
    }
}

/// Which layer feeds each channel. The first layer claiming a channel wins.
pub fn channel_map(layers: &[Layer]) -> [Option<usize>; 4] {
    let mut map = [None; 4];
    for (i, layer) in layers.iter().enumerate() {
        if let Some(ch) = layer.pack_channel {
            map[ch.index()].get_or_insert(i);
        }
    }
    map
}

/// Packs each layer's mask into its assigned channel, one color per corner.
///
/// Unassigned R/G/B channels are 0, or 1 with `fill_empty_white`. An
/// unassigned A channel is always 1. A channel whose layer has no mask keeps
/// that default.
pub fn pack_masks(
    topology: &Topology,
    layers: &[Layer],
    fill_empty_white: bool,
) -> Vec<PackedColor> {
    let empty = if fill_empty_white { 1.0 } else { 0.0 };

    // Channels backed by an actual mask; the rest keep their fill
    let masks: [Option<&MaskRef>; 4] = channel_map(layers).map(|slot| {
        slot.and_then(|layer| layers[layer].mask.as_ref()).filter(|m| !m.is_empty())
    });

    topology
        .corners()
        .iter()
        .enumerate()
        .map(|(ci, corner)| {
            let mut rgba = [empty, empty, empty, 1.0];
            for (value, mask) in rgba.iter_mut().zip(masks) {
                if let Some(mask) = mask {
                    *value = resolve_corner(Some(mask), ci, corner.vertex);
                }
            }
            PackedColor { rgba }
        })
        .collect()
}

/// Byte view of packed colors for buffer upload.
#[inline]
pub fn as_bytes(colors: &[PackedColor]) -> &[u8] {
    bytemuck::cast_slice(colors)
}
