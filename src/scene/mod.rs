mod events;
mod graph;
mod manager;
mod node;
mod surface;

pub use events::{Component, SceneEvent, SurfaceChange};
pub use graph::{NodeHandle, ObserverHandle, SceneGraph, SurfaceHandle};
pub use manager::{RendererKey, SceneManager};
pub use node::Node;
pub use surface::Surface;
