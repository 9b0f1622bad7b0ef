use crate::resources::{BindingTable, BindingValue, EffectHandle, GeometryHandle, MaterialHandle};
use crate::scene::graph::NodeHandle;

/// A renderable entity: geometry + material + optional rendering effect.
///
/// A surface with no effect of its own is rendered with the owning
/// renderer's default effect; with neither, it generates no draw calls.
/// Mutation goes through the [`crate::SceneGraph`] setters so that change
/// events reach the renderers tracking the surface.
#[derive(Debug, Clone)]
pub struct Surface {
    pub name: String,
    pub(crate) geometry: GeometryHandle,
    pub(crate) material: MaterialHandle,
    pub(crate) effect: Option<EffectHandle>,
    /// Surface-level bindings, overlaid on the material's during technique
    /// resolution.
    pub(crate) bindings: BindingTable,
    /// Owning node, set while the surface is attached.
    pub(crate) node: Option<NodeHandle>,
}

impl Surface {
    #[must_use]
    pub fn new(geometry: GeometryHandle, material: MaterialHandle) -> Self {
        Self {
            name: "Surface".to_string(),
            geometry,
            material,
            effect: None,
            bindings: BindingTable::default(),
            node: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    #[must_use]
    pub fn with_effect(mut self, effect: EffectHandle) -> Self {
        self.effect = Some(effect);
        self
    }

    #[must_use]
    pub fn with_binding(mut self, key: &str, value: BindingValue) -> Self {
        self.bindings.insert(key.to_string(), value);
        self
    }

    #[inline]
    #[must_use]
    pub fn geometry(&self) -> GeometryHandle {
        self.geometry
    }

    #[inline]
    #[must_use]
    pub fn material(&self) -> MaterialHandle {
        self.material
    }

    #[inline]
    #[must_use]
    pub fn effect(&self) -> Option<EffectHandle> {
        self.effect
    }

    #[inline]
    #[must_use]
    pub fn bindings(&self) -> &BindingTable {
        &self.bindings
    }

    /// The node this surface is attached to, if any.
    #[inline]
    #[must_use]
    pub fn node(&self) -> Option<NodeHandle> {
        self.node
    }
}
