use slotmap::{SlotMap, new_key_type};

use crate::resources::{Effect, Geometry, Material};

new_key_type! {
    pub struct GeometryHandle;
    pub struct MaterialHandle;
    pub struct EffectHandle;
}

/// Slotmap-backed storage for the resources draw calls reference.
///
/// Handles are stable indices; the rendering core holds handles, never
/// owning references.
#[derive(Debug, Default)]
pub struct Assets {
    geometries: SlotMap<GeometryHandle, Geometry>,
    materials: SlotMap<MaterialHandle, Material>,
    effects: SlotMap<EffectHandle, Effect>,
}

impl Assets {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_geometry(&mut self, geometry: Geometry) -> GeometryHandle {
        self.geometries.insert(geometry)
    }

    #[must_use]
    pub fn geometry(&self, handle: GeometryHandle) -> Option<&Geometry> {
        self.geometries.get(handle)
    }

    pub fn geometry_mut(&mut self, handle: GeometryHandle) -> Option<&mut Geometry> {
        self.geometries.get_mut(handle)
    }

    pub fn add_material(&mut self, material: Material) -> MaterialHandle {
        self.materials.insert(material)
    }

    #[must_use]
    pub fn material(&self, handle: MaterialHandle) -> Option<&Material> {
        self.materials.get(handle)
    }

    pub fn material_mut(&mut self, handle: MaterialHandle) -> Option<&mut Material> {
        self.materials.get_mut(handle)
    }

    pub fn add_effect(&mut self, effect: Effect) -> EffectHandle {
        self.effects.insert(effect)
    }

    #[must_use]
    pub fn effect(&self, handle: EffectHandle) -> Option<&Effect> {
        self.effects.get(handle)
    }

    pub fn effect_mut(&mut self, handle: EffectHandle) -> Option<&mut Effect> {
        self.effects.get_mut(handle)
    }
}
