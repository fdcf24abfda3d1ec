//! Paint masks and per-corner mask resolution.
//!
//! A layer's footprint is painted as scalars in `[0, 1]`, stored either per
//! corner (face-vertex) or per vertex. Corner data is authoritative where it
//! exists, which keeps sharp edges across UV seams; vertex data is the coarse
//! fallback.

/// Mesh domain a mask scalar array is keyed by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MaskDomain {
    Corner,
    Vertex,
}

/// A single painted scalar array.
#[derive(Clone, Debug, PartialEq)]
pub enum MaskSource {
    /// One value per mesh corner, indexed by corner index.
    PerCorner(Vec<f32>),
    /// One value per mesh vertex, indexed by vertex index.
    PerVertex(Vec<f32>),
}

impl MaskSource {
    #[inline]
    pub fn domain(&self) -> MaskDomain {
        match self {
            Self::PerCorner(_) => MaskDomain::Corner,
            Self::PerVertex(_) => MaskDomain::Vertex,
        }
    }

    #[inline]
    pub fn values(&self) -> &[f32] {
        match self {
            Self::PerCorner(v) | Self::PerVertex(v) => v,
        }
    }

    #[inline]
    fn values_mut(&mut self) -> &mut [f32] {
        match self {
            Self::PerCorner(v) | Self::PerVertex(v) => v,
        }
    }

    /// Looks up the value stored for a corner, if this source covers it.
    #[inline]
    fn lookup(&self, corner_index: usize, vertex_index: usize) -> Option<f32> {
        match self {
            Self::PerCorner(v) => v.get(corner_index).copied(),
            Self::PerVertex(v) => v.get(vertex_index).copied(),
        }
    }
}

/// The mask attached to a layer: one or more painted sources.
///
/// Corner sources are consulted before vertex sources, whatever order they
/// were added in.
///
/// # Example
/// ```
/// use bevy_heightfill::mask::{MaskDomain, MaskRef};
///
/// let mut mask = MaskRef::filled(MaskDomain::Vertex, 4, 0.0);
/// mask.set(MaskDomain::Vertex, 2, 1.0);
/// assert_eq!(mask.resolve(0, 2), Some(1.0));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaskRef {
    sources: Vec<MaskSource>,
}

impl MaskRef {
    pub fn per_corner(values: Vec<f32>) -> Self {
        Self {
            sources: vec![MaskSource::PerCorner(values)],
        }
    }

    pub fn per_vertex(values: Vec<f32>) -> Self {
        Self {
            sources: vec![MaskSource::PerVertex(values)],
        }
    }

    /// Creates a mask of `len` entries in `domain`, all set to `value`.
    pub fn filled(domain: MaskDomain, len: usize, value: f32) -> Self {
        let values = vec![value.clamp(0.0, 1.0); len];
        match domain {
            MaskDomain::Corner => Self::per_corner(values),
            MaskDomain::Vertex => Self::per_vertex(values),
        }
    }

    /// Adds another source to consult.
    pub fn with_source(mut self, source: MaskSource) -> Self {
        self.sources.push(source);
        self
    }

    /// Adds a per-vertex source used where corner data is missing.
    pub fn with_vertex_fallback(self, values: Vec<f32>) -> Self {
        self.with_source(MaskSource::PerVertex(values))
    }

    pub fn sources(&self) -> &[MaskSource] {
        &self.sources
    }

    pub fn is_empty(&self) -> bool {
        self.sources.iter().all(|s| s.values().is_empty())
    }

    /// Sets every painted value in every source.
    pub fn fill(&mut self, value: f32) {
        let value = value.clamp(0.0, 1.0);
        for source in &mut self.sources {
            source.values_mut().fill(value);
        }
    }

    /// Paints a single entry in the first source of `domain`.
    ///
    /// Returns `false` if no such source exists or `index` is out of range.
    pub fn set(&mut self, domain: MaskDomain, index: usize, value: f32) -> bool {
        let Some(slot) = self
            .sources
            .iter_mut()
            .find(|s| s.domain() == domain)
            .and_then(|s| s.values_mut().get_mut(index))
        else {
            return false;
        };
        *slot = value.clamp(0.0, 1.0);
        true
    }

    /// Resolves the mask at a corner, or `None` if no source covers it.
    pub fn resolve(&self, corner_index: usize, vertex_index: usize) -> Option<f32> {
        let by_domain = |domain| {
            self.sources
                .iter()
                .filter(move |s| s.domain() == domain)
                .find_map(|s| s.lookup(corner_index, vertex_index))
        };

        by_domain(MaskDomain::Corner)
            .or_else(|| by_domain(MaskDomain::Vertex))
            .map(|m| if m.is_nan() { 0.0 } else { m.clamp(0.0, 1.0) })
    }
}

/// Mask value of a layer at a corner, `0.0` where nothing is painted.
#[inline]
pub fn resolve_corner(mask: Option<&MaskRef>, corner_index: usize, vertex_index: usize) -> f32 {
    mask.and_then(|m| m.resolve(corner_index, vertex_index))
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_mask_is_zero() {
        assert_eq!(resolve_corner(None, 0, 0), 0.0);
        assert_eq!(resolve_corner(Some(&MaskRef::default()), 3, 1), 0.0);
    }

    #[test]
    fn test_corner_wins_over_vertex() {
        let mask = MaskRef::per_vertex(vec![0.2, 0.2])
            .with_source(MaskSource::PerCorner(vec![0.9, 0.8, 0.7]));
        assert_eq!(mask.resolve(1, 0), Some(0.8));
    }

    #[test]
    fn test_vertex_fallback_when_corner_missing() {
        let mask = MaskRef::per_corner(vec![1.0]).with_vertex_fallback(vec![0.0, 0.4]);
        assert_eq!(resolve_corner(Some(&mask), 0, 1), 1.0);
        assert_eq!(resolve_corner(Some(&mask), 5, 1), 0.4);
        assert_eq!(resolve_corner(Some(&mask), 5, 9), 0.0);
    }

    #[test]
    fn test_values_are_clamped() {
        let mask = MaskRef::per_corner(vec![1.5, -0.5, f32::NAN]);
        assert_eq!(mask.resolve(0, 0), Some(1.0));
        assert_eq!(mask.resolve(1, 0), Some(0.0));
        assert_eq!(mask.resolve(2, 0), Some(0.0));
    }

    #[test]
    fn test_fill_and_set() {
        let mut mask = MaskRef::filled(MaskDomain::Corner, 3, 0.0);
        mask.fill(1.0);
        assert!(mask.sources()[0].values().iter().all(|&v| v == 1.0));

        assert!(mask.set(MaskDomain::Corner, 1, 0.25));
        assert_eq!(mask.resolve(1, 0), Some(0.25));
        assert!(!mask.set(MaskDomain::Corner, 7, 0.25));
        assert!(!mask.set(MaskDomain::Vertex, 0, 0.25));
    }

    #[test]
    fn test_is_empty() {
        assert!(MaskRef::default().is_empty());
        assert!(MaskRef::per_vertex(Vec::new()).is_empty());
        assert!(!MaskRef::filled(MaskDomain::Vertex, 1, 0.0).is_empty());
    }
}
