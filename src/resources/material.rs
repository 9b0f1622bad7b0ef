use crate::resources::binding::{BindingTable, BindingValue};

/// Material description referenced by surfaces and draw calls.
///
/// The bindings a material carries feed technique resolution: a surface's
/// effective binding table is its material's table overlaid with the
/// surface's own bindings.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub bindings: BindingTable,
}

impl Material {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            bindings: BindingTable::default(),
        }
    }

    #[must_use]
    pub fn with_binding(mut self, key: &str, value: BindingValue) -> Self {
        self.bindings.insert(key.to_string(), value);
        self
    }
}
