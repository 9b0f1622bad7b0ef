use crate::resources::{EffectHandle, GeometryHandle, MaterialHandle};
use crate::scene::SurfaceHandle;

/// A fully resolved, submittable rendering instruction.
///
/// Draw calls are plain data: built by the [`crate::DrawCallPool`] when a
/// surface is registered or rebuilt, owned by the pool until the surface
/// leaves it, and never mutated in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawCall {
    /// The surface this call was generated from.
    pub surface: SurfaceHandle,
    pub geometry: GeometryHandle,
    pub material: MaterialHandle,
    pub effect: EffectHandle,
    /// Index of the resolved technique within the effect.
    pub technique: usize,
    /// Index of the pass within the technique; calls of one surface are
    /// submitted in pass order.
    pub pass: usize,
    pub vertex_count: u32,
    pub index_count: Option<u32>,
}
