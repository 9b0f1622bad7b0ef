//! Graphics-context seam.
//!
//! The orchestration core is backend-agnostic: a backend implements the
//! narrow [`RenderContext`] capability and receives plain [`DrawCall`]
//! records in submission order.

use glam::{IVec4, Vec4};
use slotmap::new_key_type;

use crate::renderer::draw_call::DrawCall;

new_key_type! {
    /// Backend texture usable as a render target.
    pub struct TextureHandle;
}

/// Where a frame's draw calls land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTarget {
    Backbuffer,
    Texture(TextureHandle),
}

/// Primitive operations a graphics backend must provide.
///
/// One `render` call assumes exclusive use of the context for its duration;
/// arbitration between renderers is the scene manager's concern.
pub trait RenderContext {
    /// The context's default backbuffer, if it has one. Offscreen contexts
    /// return `None`, in which case rendering requires an explicit target.
    fn default_target(&self) -> Option<RenderTarget>;

    /// Clears `target` with a packed `0xRRGGBBAA` color.
    fn clear(&mut self, target: RenderTarget, color: u32);

    /// Viewport rectangle as `(x, y, width, height)`.
    fn set_viewport(&mut self, rect: IVec4);

    /// Scissor rectangle as `(x, y, width, height)`.
    fn set_scissor(&mut self, rect: IVec4);

    /// Executes one draw call.
    fn submit(&mut self, call: &DrawCall);
}

/// Unpacks a `0xRRGGBBAA` color into normalized float components.
#[must_use]
pub fn color_to_vec4(rgba: u32) -> Vec4 {
    Vec4::new(
        ((rgba >> 24) & 0xFF) as f32 / 255.0,
        ((rgba >> 16) & 0xFF) as f32 / 255.0,
        ((rgba >> 8) & 0xFF) as f32 / 255.0,
        (rgba & 0xFF) as f32 / 255.0,
    )
}
