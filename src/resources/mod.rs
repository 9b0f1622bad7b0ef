mod binding;
mod effect;
mod geometry;
mod material;
mod storage;

pub use binding::{BindingTable, BindingValue};
pub use effect::{Effect, Pass, Technique};
pub use geometry::Geometry;
pub use material::Material;
pub use storage::{Assets, EffectHandle, GeometryHandle, MaterialHandle};
