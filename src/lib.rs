#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod errors;
pub mod renderer;
pub mod resources;
pub mod scene;
pub mod utils;

pub use errors::{RenderError, Result};
pub use renderer::{
    DrawCall, DrawCallPool, FilterChain, FilterKey, FilterScope, RenderContext, RenderEvent,
    RenderTarget, Renderer, SurfaceFilter, TextureHandle,
};
pub use resources::{
    Assets, BindingTable, BindingValue, Effect, EffectHandle, Geometry, GeometryHandle, Material,
    MaterialHandle, Pass, Technique,
};
pub use scene::{
    Component, Node, NodeHandle, ObserverHandle, RendererKey, SceneEvent, SceneGraph, SceneManager,
    Surface, SurfaceChange, SurfaceHandle,
};
pub use utils::signal::{Signal, SignalToken};
